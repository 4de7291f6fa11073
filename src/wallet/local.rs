// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Key-holding wallet backed by alloy's local signer.

use std::path::Path;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use tracing::debug;

use super::signing::{signer_from_hex, signer_from_pem};
use super::{WalletError, WalletSigner};

#[derive(Debug, Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn from_hex(private_key_hex: &str) -> Result<Self, WalletError> {
        signer_from_hex(private_key_hex).map(Self::new)
    }

    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, WalletError> {
        signer_from_pem(pem_bytes).map(Self::new)
    }

    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| WalletError::KeyFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_pem(&bytes)
    }

    /// Transaction-signing wallet for the alloy provider.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

#[async_trait]
impl WalletSigner for LocalWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        debug!(address = %self.signer.address(), "Message signed");
        Ok(format!("0x{}", alloy::hex::encode(signature.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    #[tokio::test]
    async fn signature_recovers_to_wallet_address() {
        let wallet = LocalWallet::from_hex(KEY).unwrap();
        let message = "Login to Web3 University:1700000000000";

        let hex_sig = wallet.sign_message(message).await.unwrap();
        assert!(hex_sig.starts_with("0x"));
        assert_eq!(hex_sig.len(), 2 + 130);

        let bytes = alloy::hex::decode(&hex_sig[2..]).unwrap();
        let signature = alloy::primitives::Signature::try_from(bytes.as_slice()).unwrap();
        let recovered = signature.recover_address_from_msg(message).unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[test]
    fn missing_key_file_is_reported() {
        let err = LocalWallet::from_pem_file("/nonexistent/key.pem").unwrap_err();
        assert!(matches!(err, WalletError::KeyFile { .. }));
    }
}
