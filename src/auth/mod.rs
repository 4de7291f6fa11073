// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! # Authentication Module
//!
//! Wallet-signature login against the marketplace backend.
//!
//! ## Auth Flow
//!
//! 1. A wallet connects ([`crate::wallet::WalletConnection`])
//! 2. The client signs `Login to Web3 University:<unix millis>`
//! 3. The `login` mutation exchanges address, message and signature for a
//!    bearer token
//! 4. The token is persisted, attached to the GraphQL client and the current
//!    user is loaded
//!
//! Disconnecting the wallet while authenticated logs out. Login failures are
//! logged and leave the context unauthenticated; nothing is retried.

mod context;
pub mod error;

pub use context::{
    end_session, login_message, AuthContext, LoginOutcome, DEFAULT_AVATAR_URL,
};
pub use error::AuthError;
