// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Crate-level error type.
//!
//! Every module keeps its own error enum; this type aggregates them for
//! callers that drive several flows (the CLI in particular).

use crate::auth::AuthError;
use crate::blockchain::ChainError;
use crate::graphql::GraphQlError;
use crate::purchase::PurchaseError;
use crate::session::SessionError;
use crate::upload::UploadError;
use crate::wallet::WalletError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    GraphQl(#[from] GraphQlError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Purchase(#[from] PurchaseError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// One-line message suitable for a transient notification.
    ///
    /// Prefers the provider's own short message (revert reason, first GraphQL
    /// error) over the full error chain.
    pub fn short_message(&self) -> String {
        match self {
            Error::GraphQl(e) => e.short_message(),
            Error::Chain(e) => e.short_message(),
            Error::Purchase(e) => e.short_message(),
            Error::Auth(AuthError::Api(e)) => e.short_message(),
            Error::Upload(UploadError::Api(e)) => e.short_message(),
            other => other
                .to_string()
                .lines()
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_prefers_graphql_error_text() {
        let err = Error::from(GraphQlError::Response(vec![
            "Course not found".to_string(),
            "second".to_string(),
        ]));
        assert_eq!(err.short_message(), "Course not found");
    }

    #[test]
    fn short_message_prefers_revert_reason() {
        let err = Error::from(ChainError::TransactionFailed(
            "execution reverted: Already purchased".to_string(),
        ));
        assert_eq!(err.short_message(), "Already purchased");
    }

    #[test]
    fn config_errors_render_plainly() {
        let err = Error::Config("RPC_URL: invalid".to_string());
        assert_eq!(err.short_message(), "Configuration error: RPC_URL: invalid");
    }
}
