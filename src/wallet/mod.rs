// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Wallet connection and message signing.
//!
//! [`WalletSigner`] is the signing seam used by the login flow;
//! [`LocalWallet`] implements it with a key held in process.
//! [`WalletConnection`] publishes connect/disconnect changes.

mod connection;
mod local;
pub mod signing;

use alloy::primitives::Address;
use async_trait::async_trait;

pub use connection::{ConnectionState, WalletConnection, WalletEvent};
pub use local::LocalWallet;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Failed to read key file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The signer refused or failed to sign.
    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("No wallet configured")]
    NotConfigured,
}

/// Produces personal-message signatures for one address.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn address(&self) -> Address;

    /// EIP-191 signature of `message`, `0x`-prefixed hex.
    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;
}
