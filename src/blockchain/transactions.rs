// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Transaction building, broadcasting and receipt polling.
//!
//! Gas limit, nonce and chain id are filled by the provider; fee caps are
//! derived from the latest block's base fee.

use std::time::{Duration, Instant};

use alloy::{
    network::EthereumWallet,
    primitives::{Address, TxHash, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use tracing::{debug, info};

use super::client::ChainError;
use super::contracts::ICoursePlatform;
use super::erc20::IERC20;
use super::types::{ContractAddresses, NetworkConfig, SendResult, TxReceipt};

/// Priority fee (tip) attached to every transaction.
const PRIORITY_FEE_WEI: u128 = 1_500_000_000; // 1.5 gwei

/// Base fee assumed when the latest block does not report one.
const FALLBACK_BASE_FEE_WEI: u128 = 1_000_000_000; // 1 gwei

/// Signing transaction sender.
pub struct TxSender {
    network: NetworkConfig,
    contracts: ContractAddresses,
    poll_interval: Duration,
    receipt_timeout: Option<Duration>,
    provider: alloy::providers::fillers::FillProvider<
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::JoinFill<
                alloy::providers::Identity,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::GasFiller,
                    alloy::providers::fillers::JoinFill<
                        alloy::providers::fillers::BlobGasFiller,
                        alloy::providers::fillers::JoinFill<
                            alloy::providers::fillers::NonceFiller,
                            alloy::providers::fillers::ChainIdFiller,
                        >,
                    >,
                >,
            >,
            alloy::providers::fillers::WalletFiller<EthereumWallet>,
        >,
        alloy::providers::RootProvider<alloy::network::Ethereum>,
    >,
}

impl TxSender {
    /// Create a new sender with signing capabilities.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        contracts: ContractAddresses,
        wallet: EthereumWallet,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            network,
            contracts,
            poll_interval: Duration::from_secs(2),
            receipt_timeout: None,
            provider,
        })
    }

    /// Set the receipt polling interval and optional timeout.
    pub fn with_receipt_polling(mut self, interval: Duration, timeout: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self.receipt_timeout = timeout;
        self
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Approve `spender` to move `amount` YD from the wallet.
    pub async fn approve_yd(&self, spender: Address, amount: U256) -> Result<SendResult, ChainError> {
        let data = IERC20::approveCall { spender, amount }.abi_encode();
        let tx = TransactionRequest::default()
            .to(self.contracts.yd_token)
            .input(data.into());

        info!(spender = %spender, amount = %amount, "Submitting YD approval");
        self.send_transaction(tx).await
    }

    /// Call `purchaseCourse(courseId)` on the course platform.
    pub async fn purchase_course(&self, course_id: &str) -> Result<SendResult, ChainError> {
        let data = ICoursePlatform::purchaseCourseCall {
            courseId: course_id.to_string(),
        }
        .abi_encode();
        let tx = TransactionRequest::default()
            .to(self.contracts.course_platform)
            .input(data.into());

        info!(course_id = %course_id, "Submitting course purchase");
        self.send_transaction(tx).await
    }

    /// Get current fee caps from the network.
    async fn get_gas_prices(&self) -> Result<(u128, u128), ChainError> {
        let block = self
            .provider
            .get_block_by_number(alloy::eips::BlockNumberOrTag::Latest)
            .await
            .map_err(|e| ChainError::RpcError(format!("Failed to get block: {}", e)))?
            .ok_or_else(|| ChainError::RpcError("No latest block".to_string()))?;

        let base_fee: u128 = block
            .header
            .base_fee_per_gas
            .map(u128::from)
            .unwrap_or(FALLBACK_BASE_FEE_WEI);

        // Max fee = 2 * base_fee + priority_fee (allows for base fee increase)
        let max_fee = base_fee.saturating_mul(2).saturating_add(PRIORITY_FEE_WEI);

        Ok((max_fee, PRIORITY_FEE_WEI))
    }

    /// Send a transaction and return its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<SendResult, ChainError> {
        let (max_fee_per_gas, priority_fee) = self.get_gas_prices().await?;
        let tx = tx
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(priority_fee);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::TransactionFailed(e.to_string()))?;

        let tx_hash = pending.tx_hash().to_string();
        let explorer_url = self.network.tx_url(&tx_hash);
        debug!(tx_hash = %tx_hash, "Transaction broadcast");

        Ok(SendResult {
            tx_hash,
            explorer_url,
        })
    }

    /// Get the transaction status by checking for a receipt.
    pub async fn get_transaction_status(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TxReceipt>, ChainError> {
        let hash: TxHash = tx_hash
            .parse()
            .map_err(|e| ChainError::InvalidTxHash(format!("{tx_hash}: {e}")))?;

        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainError::RpcError(format!("Failed to get receipt: {}", e)))?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash: tx_hash.to_string(),
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used as u64,
            success: r.status(),
        }))
    }

    /// Poll until the transaction is mined and return its receipt.
    ///
    /// A reverted transaction still returns `Ok` with `success == false`.
    pub async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<TxReceipt, ChainError> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.get_transaction_status(tx_hash).await? {
                info!(
                    tx_hash = %tx_hash,
                    block = receipt.block_number,
                    success = receipt.success,
                    "Transaction mined"
                );
                return Ok(receipt);
            }

            if let Some(timeout) = self.receipt_timeout {
                if started.elapsed() >= timeout {
                    return Err(ChainError::ReceiptTimeout(tx_hash.to_string()));
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
