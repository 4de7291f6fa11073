// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Course purchase: approve YD to the platform, then buy.
//!
//! The steps run strictly in order and one purchase at a time:
//!
//! 1. read the course price from the registry
//! 2. approve the platform to spend exactly that price
//! 3. wait for the approval receipt (a revert aborts)
//! 4. call `purchaseCourse` and wait for its receipt
//!
//! Nothing is rolled back. A purchase that fails after a confirmed approval
//! leaves the allowance in place and says so.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::blockchain::{
    format_amount, ChainClient, ChainError, SendResult, TxReceipt, TxSender, YD_DECIMALS,
};

/// The chain operations a purchase needs.
#[async_trait]
pub trait CourseMarket: Send + Sync {
    /// Price in YD base units.
    async fn course_price(&self, course_id: &str) -> Result<U256, ChainError>;

    /// Address that must be approved to move the buyer's YD.
    fn spender(&self) -> Address;

    async fn approve(&self, spender: Address, amount: U256) -> Result<SendResult, ChainError>;

    async fn purchase(&self, course_id: &str) -> Result<SendResult, ChainError>;

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt, ChainError>;
}

/// [`CourseMarket`] over the deployed registry, token and platform.
pub struct ChainMarket {
    client: ChainClient,
    sender: TxSender,
}

impl ChainMarket {
    pub fn new(client: ChainClient, sender: TxSender) -> Self {
        Self { client, sender }
    }
}

#[async_trait]
impl CourseMarket for ChainMarket {
    async fn course_price(&self, course_id: &str) -> Result<U256, ChainError> {
        self.client.course_price(course_id).await
    }

    fn spender(&self) -> Address {
        self.client.contracts().course_platform
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<SendResult, ChainError> {
        self.sender.approve_yd(spender, amount).await
    }

    async fn purchase(&self, course_id: &str) -> Result<SendResult, ChainError> {
        self.sender.purchase_course(course_id).await
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt, ChainError> {
        self.sender.wait_for_confirmation(tx_hash).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("A purchase is already in progress")]
    InProgress,

    #[error("Failed to read course price: {0}")]
    Price(#[source] ChainError),

    #[error("Approval failed: {0}")]
    Approval(#[source] ChainError),

    #[error("Approval transaction {tx_hash} reverted")]
    ApprovalReverted { tx_hash: String },

    #[error(
        "Purchase failed after approval {approval_tx_hash} was confirmed; the YD allowance remains: {source}"
    )]
    Purchase {
        approval_tx_hash: String,
        #[source]
        source: ChainError,
    },

    #[error(
        "Purchase transaction {tx_hash} reverted; approval {approval_tx_hash} was confirmed and the YD allowance remains"
    )]
    PurchaseReverted {
        approval_tx_hash: String,
        tx_hash: String,
    },
}

impl PurchaseError {
    /// Revert reason when there is one.
    pub fn short_message(&self) -> String {
        match self {
            PurchaseError::Price(e) | PurchaseError::Approval(e) => e.short_message(),
            PurchaseError::Purchase { source, .. } => source.short_message(),
            other => other.to_string(),
        }
    }
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub course_id: String,
    pub price_raw: String,
    pub price_yd: String,
    pub approval: SendResult,
    pub purchase: SendResult,
    pub block_number: u64,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs purchases against a [`CourseMarket`], one at a time.
pub struct PurchaseFlow {
    market: Arc<dyn CourseMarket>,
    running: AtomicBool,
}

impl PurchaseFlow {
    pub fn new(market: Arc<dyn CourseMarket>) -> Self {
        Self {
            market,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Buy `course_id`. Fails fast with [`PurchaseError::InProgress`] while
    /// another purchase runs.
    pub async fn purchase(&self, course_id: &str) -> Result<PurchaseReceipt, PurchaseError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PurchaseError::InProgress);
        }
        let _guard = RunningGuard(&self.running);

        let price = self
            .market
            .course_price(course_id)
            .await
            .map_err(PurchaseError::Price)?;
        let price_yd = format_amount(price, YD_DECIMALS);
        info!(course_id = %course_id, price_yd = %price_yd, "Starting course purchase");

        let spender = self.market.spender();
        let approval = self
            .market
            .approve(spender, price)
            .await
            .map_err(PurchaseError::Approval)?;
        let approval_receipt = self
            .market
            .wait_for_receipt(&approval.tx_hash)
            .await
            .map_err(PurchaseError::Approval)?;
        if !approval_receipt.success {
            warn!(tx_hash = %approval.tx_hash, "Approval reverted");
            return Err(PurchaseError::ApprovalReverted {
                tx_hash: approval.tx_hash,
            });
        }
        info!(tx_hash = %approval.tx_hash, "Approval confirmed");

        let purchase = match self.market.purchase(course_id).await {
            Ok(sent) => sent,
            Err(source) => {
                warn!(
                    course_id = %course_id,
                    approval_tx_hash = %approval.tx_hash,
                    error = %source,
                    "Purchase failed after approval"
                );
                return Err(PurchaseError::Purchase {
                    approval_tx_hash: approval.tx_hash,
                    source,
                });
            }
        };
        let receipt = self
            .market
            .wait_for_receipt(&purchase.tx_hash)
            .await
            .map_err(|source| PurchaseError::Purchase {
                approval_tx_hash: approval.tx_hash.clone(),
                source,
            })?;
        if !receipt.success {
            warn!(tx_hash = %purchase.tx_hash, "Purchase reverted");
            return Err(PurchaseError::PurchaseReverted {
                approval_tx_hash: approval.tx_hash,
                tx_hash: purchase.tx_hash,
            });
        }

        info!(course_id = %course_id, tx_hash = %purchase.tx_hash, "Course purchased");
        Ok(PurchaseReceipt {
            course_id: course_id.to_string(),
            price_raw: price.to_string(),
            price_yd,
            approval,
            purchase,
            block_number: receipt.block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use alloy::primitives::address;

    use super::*;

    const PLATFORM: Address = address!("14d9DC7C093271e4D0D065FB7F15596fc5305942");
    const APPROVE_HASH: &str = "0xaaaa";
    const PURCHASE_HASH: &str = "0xbbbb";

    #[derive(Default)]
    struct ScriptedMarket {
        steps: Mutex<Vec<String>>,
        approval_reverts: bool,
        purchase_error: Option<String>,
        approval_delay: Option<Duration>,
    }

    impl ScriptedMarket {
        fn record(&self, step: String) {
            self.steps.lock().unwrap().push(step);
        }

        fn steps(&self) -> Vec<String> {
            self.steps.lock().unwrap().clone()
        }

        fn sent(hash: &str) -> SendResult {
            SendResult {
                tx_hash: hash.to_string(),
                explorer_url: format!("https://sepolia.etherscan.io/tx/{hash}"),
            }
        }
    }

    #[async_trait]
    impl CourseMarket for ScriptedMarket {
        async fn course_price(&self, course_id: &str) -> Result<U256, ChainError> {
            self.record(format!("price:{course_id}"));
            Ok(U256::from(25u64) * U256::from(10u64).pow(U256::from(18u64)))
        }

        fn spender(&self) -> Address {
            PLATFORM
        }

        async fn approve(&self, spender: Address, amount: U256) -> Result<SendResult, ChainError> {
            self.record(format!("approve:{spender}:{amount}"));
            if let Some(delay) = self.approval_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(Self::sent(APPROVE_HASH))
        }

        async fn purchase(&self, course_id: &str) -> Result<SendResult, ChainError> {
            self.record(format!("purchase:{course_id}"));
            match &self.purchase_error {
                Some(reason) => Err(ChainError::TransactionFailed(format!(
                    "server returned an error response: execution reverted: {reason}"
                ))),
                None => Ok(Self::sent(PURCHASE_HASH)),
            }
        }

        async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt, ChainError> {
            self.record(format!("wait:{tx_hash}"));
            Ok(TxReceipt {
                tx_hash: tx_hash.to_string(),
                block_number: 42,
                gas_used: 50_000,
                success: !(tx_hash == APPROVE_HASH && self.approval_reverts),
            })
        }
    }

    #[tokio::test]
    async fn approval_is_confirmed_before_purchase() {
        let market = Arc::new(ScriptedMarket::default());
        let flow = PurchaseFlow::new(market.clone());

        let receipt = flow.purchase("course-1").await.unwrap();

        assert_eq!(
            market.steps(),
            vec![
                "price:course-1".to_string(),
                format!("approve:{PLATFORM}:25000000000000000000"),
                format!("wait:{APPROVE_HASH}"),
                "purchase:course-1".to_string(),
                format!("wait:{PURCHASE_HASH}"),
            ]
        );
        assert_eq!(receipt.price_yd, "25");
        assert_eq!(receipt.approval.tx_hash, APPROVE_HASH);
        assert_eq!(receipt.purchase.tx_hash, PURCHASE_HASH);
        assert_eq!(receipt.block_number, 42);
        assert!(!flow.is_running());
    }

    #[tokio::test]
    async fn reverted_approval_aborts_before_purchase() {
        let market = Arc::new(ScriptedMarket {
            approval_reverts: true,
            ..Default::default()
        });
        let flow = PurchaseFlow::new(market.clone());

        let err = flow.purchase("course-1").await.unwrap_err();

        assert!(matches!(err, PurchaseError::ApprovalReverted { ref tx_hash } if tx_hash == APPROVE_HASH));
        assert!(!market.steps().iter().any(|s| s.starts_with("purchase:")));
    }

    #[tokio::test]
    async fn purchase_failure_reports_remaining_allowance() {
        let market = Arc::new(ScriptedMarket {
            purchase_error: Some("Already purchased".to_string()),
            ..Default::default()
        });
        let flow = PurchaseFlow::new(market);

        let err = flow.purchase("course-1").await.unwrap_err();

        match &err {
            PurchaseError::Purchase { approval_tx_hash, .. } => {
                assert_eq!(approval_tx_hash, APPROVE_HASH)
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("allowance remains"));
        assert_eq!(err.short_message(), "Already purchased");
        assert!(!flow.is_running());
    }

    #[tokio::test]
    async fn concurrent_purchase_fails_fast() {
        let market = Arc::new(ScriptedMarket {
            approval_delay: Some(Duration::from_millis(100)),
            ..Default::default()
        });
        let flow = PurchaseFlow::new(market.clone());

        let (first, second) = tokio::join!(flow.purchase("course-1"), flow.purchase("course-2"));

        assert!(first.is_ok());
        assert!(matches!(second, Err(PurchaseError::InProgress)));
        assert!(!market.steps().iter().any(|s| s.contains("course-2")));

        flow.purchase("course-2").await.unwrap();
    }
}
