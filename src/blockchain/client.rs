// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Read-only chain client for balances, course prices and NFT lookups.

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use tracing::{debug, warn};

use super::contracts::{ICourseRegistry, IStudentCertificate, ITeacherBadge};
use super::erc20::Erc20Contract;
use super::types::*;
use super::units::{format_amount, format_balance};

/// HTTP provider type (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Read-only client bound to one network and contract deployment.
pub struct ChainClient {
    network: NetworkConfig,
    contracts: ContractAddresses,
    provider: HttpProvider,
}

impl ChainClient {
    /// Create a new client for the specified network.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        contracts: ContractAddresses,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            network,
            contracts,
            provider,
        })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    /// Get the native ETH balance for an address.
    pub async fn native_balance(&self, owner: Address) -> Result<TokenBalance, ChainError> {
        let balance = self
            .provider
            .get_balance(owner)
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;

        Ok(TokenBalance {
            symbol: "ETH".to_string(),
            name: "Ether".to_string(),
            balance_raw: balance.to_string(),
            balance_formatted: format_balance(balance, 18),
            decimals: 18,
            contract_address: None,
        })
    }

    /// YD token balance with metadata.
    pub async fn yd_balance(&self, owner: Address) -> Result<TokenBalance, ChainError> {
        Erc20Contract::new(&self.provider, self.contracts.yd_token)
            .balance_of(owner)
            .await
    }

    /// Raw course price in YD base units.
    pub async fn course_price(&self, course_id: &str) -> Result<U256, ChainError> {
        Ok(self.registry_course(course_id).await?.priceYD)
    }

    /// Course as recorded by the registry.
    pub async fn course(&self, course_id: &str) -> Result<OnChainCourse, ChainError> {
        let course = self.registry_course(course_id).await?;
        Ok(OnChainCourse {
            course_id: course.courseId,
            teacher: course.teacher.to_string(),
            price_raw: course.priceYD.to_string(),
            price_yd: format_amount(course.priceYD, YD_DECIMALS),
            total_purchases: u256_to_u64(course.totalPurchases),
        })
    }

    async fn registry_course(
        &self,
        course_id: &str,
    ) -> Result<ICourseRegistry::Course, ChainError> {
        let registry = ICourseRegistry::new(self.contracts.course_registry, self.provider.clone());
        registry
            .getCourse(course_id.to_string())
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    /// Token ids of the certificates held by a student.
    pub async fn certificate_ids(&self, student: Address) -> Result<Vec<U256>, ChainError> {
        let certs =
            IStudentCertificate::new(self.contracts.student_certificate, self.provider.clone());
        certs
            .getCertificatesByStudent(student)
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    /// Certificates held by a student with their details.
    ///
    /// Certificates whose detail lookups fail are skipped with a warning.
    pub async fn certificates(&self, student: Address) -> Result<Vec<Certificate>, ChainError> {
        let ids = self.certificate_ids(student).await?;
        let certs =
            IStudentCertificate::new(self.contracts.student_certificate, self.provider.clone());

        let mut out = Vec::with_capacity(ids.len());
        for token_id in ids {
            let details = match certs.certificates(token_id).call().await {
                Ok(details) => details,
                Err(e) => {
                    warn!(token_id = %token_id, error = %e, "Failed to read certificate details");
                    continue;
                }
            };
            let token_uri = match certs.tokenURI(token_id).call().await {
                Ok(uri) => uri,
                Err(e) => {
                    warn!(token_id = %token_id, error = %e, "Failed to read certificate tokenURI");
                    continue;
                }
            };

            out.push(Certificate {
                token_id: token_id.to_string(),
                student: details.student.to_string(),
                course_id: details.courseId,
                issued_at: u256_to_u64(details.issuedAt),
                metadata_uri: details.metadataURI,
                token_uri,
            });
        }

        debug!(student = %student, count = out.len(), "Loaded certificates");
        Ok(out)
    }

    /// Number of certificates held by a student.
    pub async fn certificate_count(&self, student: Address) -> Result<u64, ChainError> {
        let certs =
            IStudentCertificate::new(self.contracts.student_certificate, self.provider.clone());
        certs
            .balanceOf(student)
            .call()
            .await
            .map(u256_to_u64)
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    /// Number of teacher badges held by a teacher.
    pub async fn badge_count(&self, teacher: Address) -> Result<u64, ChainError> {
        let badges = ITeacherBadge::new(self.contracts.teacher_badge, self.provider.clone());
        badges
            .balanceOf(teacher)
            .call()
            .await
            .map(u256_to_u64)
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    /// Get the current block number.
    pub async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))
    }
}

/// Saturating conversion for counters and timestamps.
fn u256_to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Timed out waiting for receipt of {0}")]
    ReceiptTimeout(String),
}

impl ChainError {
    /// The provider's short message, when the error wraps one.
    ///
    /// Node errors arrive as `... execution reverted: <reason>`; the reason is
    /// what a user needs to see.
    pub fn short_message(&self) -> String {
        let full = self.to_string();
        if let Some((_, reason)) = full.rsplit_once("execution reverted: ") {
            return reason.lines().next().unwrap_or(reason).trim().to_string();
        }
        full.lines().next().unwrap_or_default().to_string()
    }
}
