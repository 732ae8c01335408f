//! Ledger
//!
//! ERC20-like balance accounting for the Demy asset at the engine level.
//!
//! # Features
//!
//! - Capped minting (total supply never exceeds max supply)
//! - Transfer, approve and transfer-from with an unlimited-allowance sentinel
//! - Minter capability for components that pay rewards by minting
//!
//! Every operation validates before it mutates, so a failed call leaves the
//! ledger untouched.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{
    crypto::Address,
    error::{Result, TokenomicsError},
};

/// Amount in base units (10^decimals per whole token)
pub type Amount = u128;

/// Allowance value meaning "never decrement"
pub const UNLIMITED_ALLOWANCE: Amount = Amount::MAX;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    decimals: u8,
    max_supply: Amount,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    // owner -> spender -> remaining allowance
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    minters: HashSet<Address>,
}

impl Ledger {
    pub fn new(max_supply: Amount, decimals: u8) -> Self {
        Self {
            decimals,
            max_supply,
            ..Default::default()
        }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn max_supply(&self) -> Amount {
        self.max_supply
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Amount that can still be minted
    pub fn mintable(&self) -> Amount {
        self.max_supply.saturating_sub(self.total_supply)
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate over every account holding a non-zero balance
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter().filter(|(_, amount)| **amount > 0)
    }

    /// Sum of all balances, checked
    pub fn sum_balances(&self) -> Result<Amount> {
        self.balances
            .values()
            .try_fold(0 as Amount, |acc, amount| acc.checked_add(*amount))
            .ok_or(TokenomicsError::Overflow)
    }

    /// Fail with SupplyExceeded if `amount` cannot be minted
    pub fn ensure_mintable(&self, amount: Amount) -> Result<()> {
        match self.total_supply.checked_add(amount) {
            Some(new_total) if new_total <= self.max_supply => Ok(()),
            _ => Err(TokenomicsError::SupplyExceeded {
                requested: amount,
                total_supply: self.total_supply,
                max_supply: self.max_supply,
            }),
        }
    }

    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<()> {
        self.ensure_mintable(amount)?;
        let balance = self.balance_of(to);
        let new_balance = balance.checked_add(amount).ok_or(TokenomicsError::Overflow)?;

        self.total_supply += amount;
        self.balances.insert(*to, new_balance);

        debug!("Minted {} to {}, total supply {}", amount, to, self.total_supply);
        Ok(())
    }

    pub fn authorize_minter(&mut self, minter: Address) {
        if self.minters.insert(minter) {
            debug!("Authorized {} as minter", minter);
        }
    }

    pub fn is_minter(&self, account: &Address) -> bool {
        self.minters.contains(account)
    }

    /// Mint on behalf of an authorized minter
    pub fn mint_as(&mut self, minter: &Address, to: &Address, amount: Amount) -> Result<()> {
        if !self.is_minter(minter) {
            return Err(TokenomicsError::NotAuthorized("mint"));
        }
        self.mint(to, amount)
    }

    pub fn burn(&mut self, from: &Address, amount: Amount) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TokenomicsError::InsufficientBalance {
                need: amount,
                have: balance,
            });
        }

        self.balances.insert(*from, balance - amount);
        self.total_supply -= amount;

        debug!("Burned {} from {}, total supply {}", amount, from, self.total_supply);
        Ok(())
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenomicsError::InsufficientBalance {
                need: amount,
                have: from_balance,
            });
        }

        if from != to {
            // Cannot overflow: every balance is bounded by the total supply
            let to_balance = self.balance_of(to);
            self.balances.insert(*from, from_balance - amount);
            self.balances.insert(*to, to_balance + amount);
        }

        if log::log_enabled!(log::Level::Trace) {
            trace!("Transfer {} from {} to {}", amount, from, to);
        }
        Ok(())
    }

    /// Set the allowance of `spender` over `owner`'s balance (last write wins)
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);

        if log::log_enabled!(log::Level::Trace) {
            trace!("Approve {} for {} over {}", amount, spender, owner);
        }
    }

    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(TokenomicsError::InsufficientAllowance {
                need: amount,
                have: allowance,
            });
        }

        self.transfer(owner, to, amount)?;

        if allowance != UNLIMITED_ALLOWANCE {
            self.approve(owner, spender, allowance - amount);
        }
        Ok(())
    }
}
