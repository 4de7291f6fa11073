// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Web3 University - Course Marketplace Client
//!
//! Client for a course marketplace where teachers publish video courses and
//! students pay for them in the YD token on Sepolia. Catalog, profiles and
//! progress live behind a GraphQL backend; payment and certificates live on
//! chain.
//!
//! ## Modules
//!
//! - `auth` - Wallet-signature login and the session lifecycle
//! - `blockchain` - Contract reads and signed YD transactions (alloy)
//! - `dashboard` - Progress and dashboard statistics
//! - `graphql` - GraphQL transport and the typed backend operations
//! - `purchase` - Approve-then-purchase flow
//! - `session` - Persisted auth token
//! - `upload` - Pre-signed object storage uploads and thumbnails
//! - `wallet` - Local signer and connection state

pub mod auth;
pub mod blockchain;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod graphql;
pub mod models;
pub mod purchase;
pub mod query_cache;
pub mod session;
pub mod upload;
pub mod wallet;

#[cfg(test)]
mod test_support;

pub use error::Error;
