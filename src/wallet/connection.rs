// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Wallet connection state, published over a `watch` channel.

use tokio::sync::watch;
use tracing::info;

use crate::models::WalletAddress;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected(WalletAddress),
}

impl ConnectionState {
    pub fn address(&self) -> Option<&WalletAddress> {
        match self {
            ConnectionState::Connected(address) => Some(address),
            ConnectionState::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }
}

/// A change in wallet connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    Connected(WalletAddress),
    Disconnected,
}

impl From<&ConnectionState> for WalletEvent {
    fn from(state: &ConnectionState) -> Self {
        match state {
            ConnectionState::Connected(address) => WalletEvent::Connected(address.clone()),
            ConnectionState::Disconnected => WalletEvent::Disconnected,
        }
    }
}

/// Tracks which wallet, if any, is connected.
///
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct WalletConnection {
    tx: watch::Sender<ConnectionState>,
}

impl Default for WalletConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletConnection {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::Disconnected);
        Self { tx }
    }

    /// Mark `address` as connected. Reconnecting the same address is not a
    /// change and wakes no subscriber.
    pub fn connect(&self, address: impl Into<WalletAddress>) {
        let next = ConnectionState::Connected(address.into());
        let changed = self.tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next.clone();
            true
        });
        if changed {
            info!(address = %next.address().map(|a| a.as_str()).unwrap_or_default(), "Wallet connected");
        }
    }

    pub fn disconnect(&self) {
        let changed = self.tx.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                return false;
            }
            *state = ConnectionState::Disconnected;
            true
        });
        if changed {
            info!("Wallet disconnected");
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.tx.borrow().clone()
    }

    pub fn address(&self) -> Option<WalletAddress> {
        self.tx.borrow().address().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }
}
