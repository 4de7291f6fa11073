// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! YD token reads. YD is a plain ERC-20; the platform contract pulls the
//! course price through an allowance.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::ChainError;
use super::types::{TokenBalance, YD_DECIMALS};
use super::units::format_amount;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
    address: Address,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        let contract = IERC20::new(address, provider.clone());
        Self { contract, address }
    }

    pub async fn name(&self) -> Result<String, ChainError> {
        self.contract
            .name()
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    pub async fn symbol(&self) -> Result<String, ChainError> {
        self.contract
            .symbol()
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    pub async fn decimals(&self) -> Result<u8, ChainError> {
        self.contract
            .decimals()
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    /// Raw balance in base units.
    pub async fn raw_balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    /// Balance with token metadata. Metadata falls back to the YD defaults;
    /// only the balance call itself is fatal.
    pub async fn balance_of(&self, owner: Address) -> Result<TokenBalance, ChainError> {
        let balance = self.raw_balance_of(owner).await?;

        let name = self.name().await.unwrap_or_else(|_| "YD Token".to_string());
        let symbol = self.symbol().await.unwrap_or_else(|_| "YD".to_string());
        let decimals = self.decimals().await.unwrap_or(YD_DECIMALS);

        Ok(TokenBalance {
            symbol,
            name,
            balance_raw: balance.to_string(),
            balance_formatted: format_amount(balance, decimals),
            decimals,
            contract_address: Some(self.address.to_string()),
        })
    }
}
