// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the client. Configuration is loaded from the environment at
//! startup; the CLI mirrors every variable as a flag.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GRAPHQL_ENDPOINT` | GraphQL API endpoint | `http://127.0.0.1:3000/graphql` |
//! | `RPC_URL` | JSON-RPC endpoint of the chain | Sepolia public RPC |
//! | `DATA_DIR` | Directory holding the persisted auth token | `.web3-university` |
//! | `WALLET_PRIVATE_KEY` | Hex private key of the local wallet | - |
//! | `WALLET_KEY_PEM_PATH` | PEM private key file (alternative to the hex key) | - |
//! | `YD_TOKEN_ADDRESS` | YD token contract override | Sepolia deployment |
//! | `COURSE_REGISTRY_ADDRESS` | Course registry contract override | Sepolia deployment |
//! | `COURSE_PLATFORM_ADDRESS` | Course platform contract override | Sepolia deployment |
//! | `STUDENT_CERTIFICATE_ADDRESS` | Student certificate NFT override | Sepolia deployment |
//! | `TEACHER_BADGE_ADDRESS` | Teacher badge NFT override | Sepolia deployment |
//! | `HTTP_TIMEOUT_SECS` | Request timeout for GraphQL and uploads | `30` |
//! | `RECEIPT_POLL_INTERVAL_MS` | Receipt polling interval | `2000` |
//! | `RECEIPT_TIMEOUT_SECS` | Give up waiting for a receipt after this long | unset (wait) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use url::Url;

use crate::blockchain::{ContractAddresses, NetworkConfig, SEPOLIA, SEPOLIA_CONTRACTS};
use crate::error::Error;

pub const GRAPHQL_ENDPOINT_ENV: &str = "GRAPHQL_ENDPOINT";
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Environment variable name for the data directory.
///
/// Only the auth token is stored here; everything else is fetched on demand.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";
pub const WALLET_KEY_PEM_PATH_ENV: &str = "WALLET_KEY_PEM_PATH";

pub const YD_TOKEN_ADDRESS_ENV: &str = "YD_TOKEN_ADDRESS";
pub const COURSE_REGISTRY_ADDRESS_ENV: &str = "COURSE_REGISTRY_ADDRESS";
pub const COURSE_PLATFORM_ADDRESS_ENV: &str = "COURSE_PLATFORM_ADDRESS";
pub const STUDENT_CERTIFICATE_ADDRESS_ENV: &str = "STUDENT_CERTIFICATE_ADDRESS";
pub const TEACHER_BADGE_ADDRESS_ENV: &str = "TEACHER_BADGE_ADDRESS";

pub const HTTP_TIMEOUT_SECS_ENV: &str = "HTTP_TIMEOUT_SECS";
pub const RECEIPT_POLL_INTERVAL_MS_ENV: &str = "RECEIPT_POLL_INTERVAL_MS";
pub const RECEIPT_TIMEOUT_SECS_ENV: &str = "RECEIPT_TIMEOUT_SECS";

/// `json` or `pretty`.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://127.0.0.1:3000/graphql";
pub const DEFAULT_DATA_DIR: &str = ".web3-university";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub graphql_endpoint: String,
    pub rpc_url: String,
    pub network: NetworkConfig,
    pub contracts: ContractAddresses,
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
    pub receipt_poll_interval: Duration,
    /// `None` waits for a receipt indefinitely.
    pub receipt_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            graphql_endpoint: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            rpc_url: SEPOLIA.default_rpc_url.to_string(),
            network: SEPOLIA,
            contracts: SEPOLIA_CONTRACTS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            receipt_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults; set but malformed variables are
    /// reported as configuration errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(raw) = lookup(GRAPHQL_ENDPOINT_ENV) {
            Url::parse(&raw).map_err(|e| Error::Config(format!("{GRAPHQL_ENDPOINT_ENV}: {e}")))?;
            config.graphql_endpoint = raw;
        }
        if let Some(raw) = lookup(RPC_URL_ENV) {
            config.rpc_url = raw;
        }
        if let Some(raw) = lookup(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(raw);
        }

        let contracts = &mut config.contracts;
        for (name, slot) in [
            (YD_TOKEN_ADDRESS_ENV, &mut contracts.yd_token),
            (COURSE_REGISTRY_ADDRESS_ENV, &mut contracts.course_registry),
            (COURSE_PLATFORM_ADDRESS_ENV, &mut contracts.course_platform),
            (STUDENT_CERTIFICATE_ADDRESS_ENV, &mut contracts.student_certificate),
            (TEACHER_BADGE_ADDRESS_ENV, &mut contracts.teacher_badge),
        ] {
            if let Some(raw) = lookup(name) {
                *slot = Address::from_str(raw.trim())
                    .map_err(|e| Error::Config(format!("{name}: {e}")))?;
            }
        }

        if let Some(secs) = parse_nonzero_u64(&lookup, HTTP_TIMEOUT_SECS_ENV)? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(millis) = parse_nonzero_u64(&lookup, RECEIPT_POLL_INTERVAL_MS_ENV)? {
            config.receipt_poll_interval = Duration::from_millis(millis);
        }
        if let Some(secs) = parse_u64(&lookup, RECEIPT_TIMEOUT_SECS_ENV)? {
            config.receipt_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>, Error> {
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("{name}: {e}")))
        })
        .transpose()
}

fn parse_nonzero_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<u64>, Error> {
    match parse_u64(lookup, name)? {
        Some(0) => Err(Error::Config(format!("{name}: must be greater than zero"))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_local_api_and_sepolia() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.graphql_endpoint, DEFAULT_GRAPHQL_ENDPOINT);
        assert_eq!(config.network.chain_id, 11155111);
        assert_eq!(config.contracts, SEPOLIA_CONTRACTS);
        assert_eq!(config.receipt_timeout, None);
    }

    #[test]
    fn overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (GRAPHQL_ENDPOINT_ENV, "https://api.example.com/graphql"),
            (DATA_DIR_ENV, "/tmp/w3u"),
            (YD_TOKEN_ADDRESS_ENV, "0x1111111111111111111111111111111111111111"),
            (RECEIPT_TIMEOUT_SECS_ENV, "90"),
        ]))
        .unwrap();

        assert_eq!(config.graphql_endpoint, "https://api.example.com/graphql");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/w3u"));
        assert_eq!(
            config.contracts.yd_token.to_string().to_lowercase(),
            "0x1111111111111111111111111111111111111111"
        );
        assert_eq!(config.receipt_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[(HTTP_TIMEOUT_SECS_ENV, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(HTTP_TIMEOUT_SECS_ENV));

        let err = ClientConfig::from_lookup(lookup_from(&[(TEACHER_BADGE_ADDRESS_ENV, "0x12")]))
            .unwrap_err();
        assert!(err.to_string().contains(TEACHER_BADGE_ADDRESS_ENV));
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[(RECEIPT_POLL_INTERVAL_MS_ENV, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains(RECEIPT_POLL_INTERVAL_MS_ENV));

        let err = ClientConfig::from_lookup(lookup_from(&[(HTTP_TIMEOUT_SECS_ENV, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains(HTTP_TIMEOUT_SECS_ENV));

        let config =
            ClientConfig::from_lookup(lookup_from(&[(RECEIPT_POLL_INTERVAL_MS_ENV, "250")]))
                .unwrap();
        assert_eq!(config.receipt_poll_interval, Duration::from_millis(250));
    }
}
