use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    crypto::{compute_deterministic_account_address, Address},
    error::{Result, TokenomicsError},
    ledger::{Amount, Ledger},
    time::TimestampSeconds,
};

use super::VestingAccount;

/// Read-only view of a vesting account against a given time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingSnapshot {
    pub address: Address,
    pub beneficiary: Address,
    pub start: TimestampSeconds,
    pub duration: u64,
    pub held: Amount,
    pub released: Amount,
    pub vested: Amount,
    pub releasable: Amount,
    pub total_deposited: Amount,
}

/// Creates and tracks one vesting account per beneficiary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingFactory {
    address: Address,
    duration: u64,
    // beneficiary -> account
    accounts: HashMap<Address, VestingAccount>,
}

impl VestingFactory {
    pub fn new(address: Address, duration: u64) -> Self {
        Self {
            address,
            duration,
            accounts: HashMap::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Address of the vesting account of `beneficiary`, whether or not it exists yet
    pub fn vesting_address(&self, beneficiary: &Address) -> Address {
        compute_deterministic_account_address(&self.address, beneficiary)
    }

    pub fn get(&self, beneficiary: &Address) -> Option<&VestingAccount> {
        self.accounts.get(beneficiary)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &VestingAccount> {
        self.accounts.values()
    }

    pub fn get_or_create(
        &mut self,
        beneficiary: &Address,
        now: TimestampSeconds,
    ) -> &mut VestingAccount {
        let address = self.vesting_address(beneficiary);
        let duration = self.duration;
        self.accounts.entry(*beneficiary).or_insert_with(|| {
            info!(
                "Created vesting account {} for {} starting at {}",
                address, beneficiary, now
            );
            VestingAccount::new(address, *beneficiary, now, duration)
        })
    }

    /// Mint `amount` into the vesting account of `beneficiary`, creating it if absent
    pub fn deposit_minted(
        &mut self,
        ledger: &mut Ledger,
        beneficiary: &Address,
        amount: Amount,
        now: TimestampSeconds,
    ) -> Result<Address> {
        if amount == 0 {
            return Err(TokenomicsError::ZeroAmount);
        }

        let address = self.vesting_address(beneficiary);
        ledger.mint(&address, amount)?;

        // Deposits are bounded by the minted supply
        self.get_or_create(beneficiary, now).record_deposit(amount)?;
        debug!("Deposited {} into vesting account {}", amount, address);
        Ok(address)
    }

    /// Release what is due to `beneficiary`; no account means nothing is due
    pub fn release(
        &mut self,
        ledger: &mut Ledger,
        beneficiary: &Address,
        now: TimestampSeconds,
    ) -> Result<Amount> {
        match self.accounts.get_mut(beneficiary) {
            Some(account) => account.release(ledger, now),
            None => Ok(0),
        }
    }

    pub fn snapshot(
        &self,
        ledger: &Ledger,
        beneficiary: &Address,
        now: TimestampSeconds,
    ) -> Result<Option<VestingSnapshot>> {
        let Some(account) = self.get(beneficiary) else {
            return Ok(None);
        };

        let held = ledger.balance_of(account.address());
        Ok(Some(VestingSnapshot {
            address: *account.address(),
            beneficiary: *account.beneficiary(),
            start: account.start(),
            duration: account.duration(),
            held,
            released: account.released(),
            vested: account.vested_amount(held, now)?,
            releasable: account.releasable(held, now)?,
            total_deposited: account.total_deposited(),
        }))
    }

    /// Sum of the ledger balances held by every vesting account
    pub fn total_held(&self, ledger: &Ledger) -> Amount {
        self.accounts
            .values()
            .map(|account| ledger.balance_of(account.address()))
            .sum()
    }
}
