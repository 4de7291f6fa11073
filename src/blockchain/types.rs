// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Blockchain types and constants.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Network configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Public RPC endpoint used when none is configured
    pub default_rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Ethereum Sepolia testnet, where the platform contracts are deployed.
pub const SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Sepolia",
    chain_id: 11155111,
    default_rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
};

impl NetworkConfig {
    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

/// Addresses of the platform contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    /// YD utility token (ERC-20) used for payment
    pub yd_token: Address,
    /// Student completion certificates (NFT)
    pub student_certificate: Address,
    /// Teacher achievement badges (NFT)
    pub teacher_badge: Address,
    /// Course prices and purchase counters
    pub course_registry: Address,
    /// Purchase execution; the spender approved for YD
    pub course_platform: Address,
}

/// Sepolia deployment.
pub const SEPOLIA_CONTRACTS: ContractAddresses = ContractAddresses {
    yd_token: address!("0x7866993488642d92c3B0f78d79aba511fdd947C1"),
    student_certificate: address!("0xB3a57E86DF7D86FDc9Ef913a295EF94d93D349fa"),
    teacher_badge: address!("0x10BEeb97F2cE91442cBb60be3353a40791BD5C00"),
    course_registry: address!("0xb48079bF33066F893E269ae1573FFE2A21Bf63aF"),
    course_platform: address!("0x14d9DC7C093271e4D0D065FB7F15596fc5305942"),
};

/// YD token decimals.
pub const YD_DECIMALS: u8 = 18;

/// Token balance information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Token symbol (e.g., "ETH", "YD")
    pub symbol: String,
    /// Token name
    pub name: String,
    /// Balance in smallest unit (wei for native, token decimals for ERC-20)
    pub balance_raw: String,
    /// Balance formatted with decimals
    pub balance_formatted: String,
    /// Number of decimals
    pub decimals: u8,
    /// Contract address (None for native token)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// Course state as recorded by the course registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OnChainCourse {
    pub course_id: String,
    pub teacher: String,
    /// Price in YD base units
    pub price_raw: String,
    /// Price formatted with 18 decimals
    pub price_yd: String,
    pub total_purchases: u64,
}

/// A student completion certificate NFT.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub token_id: String,
    pub student: String,
    pub course_id: String,
    /// Unix seconds
    pub issued_at: u64,
    pub metadata_uri: String,
    pub token_uri: String,
}

/// Transaction send result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendResult {
    /// Transaction hash
    pub tx_hash: String,
    /// Explorer URL for the transaction
    pub explorer_url: String,
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction was successful
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_links_use_network_base() {
        assert_eq!(
            SEPOLIA.tx_url("0xabc"),
            "https://sepolia.etherscan.io/tx/0xabc"
        );
    }

    #[test]
    fn sepolia_contracts_are_distinct() {
        let c = SEPOLIA_CONTRACTS;
        let all = [
            c.yd_token,
            c.student_certificate,
            c.teacher_badge,
            c.course_registry,
            c.course_platform,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
