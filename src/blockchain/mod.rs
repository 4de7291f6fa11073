// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Blockchain integration for the platform contracts on Sepolia.
//!
//! This module provides functionality for:
//! - Querying native and YD token balances
//! - Reading course prices from the course registry
//! - Reading student certificates and teacher badges
//! - Sending approval and purchase transactions and polling their receipts

pub mod client;
pub mod contracts;
pub mod erc20;
pub mod transactions;
pub mod types;
pub mod units;

pub use client::{ChainClient, ChainError};
pub use transactions::TxSender;
pub use types::*;
pub use units::{format_amount, format_balance, parse_amount};
