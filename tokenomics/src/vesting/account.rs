use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    crypto::Address,
    error::{Result, TokenomicsError},
    ledger::{Amount, Ledger},
    time::TimestampSeconds,
    utils::math::linear_vested,
};

/// Linear vesting holder of a single beneficiary
///
/// The vested balance itself lives in the ledger under `address`; this
/// struct only tracks the schedule and what was already paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingAccount {
    address: Address,
    beneficiary: Address,
    start: TimestampSeconds,
    duration: u64,
    released: Amount,
    total_deposited: Amount,
}

impl VestingAccount {
    pub fn new(
        address: Address,
        beneficiary: Address,
        start: TimestampSeconds,
        duration: u64,
    ) -> Self {
        Self {
            address,
            beneficiary,
            start,
            duration,
            released: 0,
            total_deposited: 0,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn beneficiary(&self) -> &Address {
        &self.beneficiary
    }

    pub fn start(&self) -> TimestampSeconds {
        self.start
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn end(&self) -> TimestampSeconds {
        self.start.saturating_add(self.duration)
    }

    pub fn released(&self) -> Amount {
        self.released
    }

    pub fn total_deposited(&self) -> Amount {
        self.total_deposited
    }

    pub(crate) fn record_deposit(&mut self, amount: Amount) -> Result<()> {
        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(TokenomicsError::Overflow)?;
        Ok(())
    }

    /// Amount vested at `timestamp` given the balance currently `held`
    pub fn vested_amount(&self, held: Amount, timestamp: TimestampSeconds) -> Result<Amount> {
        let allocation = held
            .checked_add(self.released)
            .ok_or(TokenomicsError::Overflow)?;
        linear_vested(allocation, self.start, self.duration, timestamp)
    }

    pub fn releasable(&self, held: Amount, timestamp: TimestampSeconds) -> Result<Amount> {
        Ok(self
            .vested_amount(held, timestamp)?
            .saturating_sub(self.released))
    }

    /// Transfer everything vested and not yet released to the beneficiary
    ///
    /// Returns the released amount, 0 when nothing is due.
    pub fn release(&mut self, ledger: &mut Ledger, now: TimestampSeconds) -> Result<Amount> {
        let held = ledger.balance_of(&self.address);
        let releasable = self.releasable(held, now)?;
        if releasable == 0 {
            return Ok(0);
        }

        ledger.transfer(&self.address, &self.beneficiary, releasable)?;
        self.released += releasable;

        debug!(
            "Vesting account {} released {} to {} ({} total)",
            self.address, releasable, self.beneficiary, self.released
        );
        Ok(releasable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(deposit: Amount) -> (VestingAccount, Ledger) {
        let mut account = VestingAccount::new(
            Address::new([0xAA; 32]),
            Address::new([0x01; 32]),
            1_000,
            100,
        );
        let mut ledger = Ledger::new(1_000_000, 18);
        ledger.mint(account.address(), deposit).unwrap();
        account.record_deposit(deposit).unwrap();
        (account, ledger)
    }

    #[test]
    fn test_vested_amount_curve() {
        let (account, ledger) = setup(80);
        let held = ledger.balance_of(account.address());

        assert_eq!(account.vested_amount(held, 999).unwrap(), 0);
        assert_eq!(account.vested_amount(held, 1_000).unwrap(), 0);
        assert_eq!(account.vested_amount(held, 1_050).unwrap(), 40);
        assert_eq!(account.vested_amount(held, 1_099).unwrap(), 79);
        assert_eq!(account.vested_amount(held, 1_100).unwrap(), 80);
        assert_eq!(account.vested_amount(held, 5_000).unwrap(), 80);
    }

    #[test]
    fn test_release_pays_beneficiary() {
        let (mut account, mut ledger) = setup(80);

        assert_eq!(account.release(&mut ledger, 1_025).unwrap(), 20);
        assert_eq!(ledger.balance_of(account.beneficiary()), 20);
        assert_eq!(account.released(), 20);

        // Held shrank but the curve still spans the full deposit
        assert_eq!(account.release(&mut ledger, 1_050).unwrap(), 20);
        assert_eq!(account.release(&mut ledger, 2_000).unwrap(), 40);
        assert_eq!(account.released(), 80);
        assert_eq!(ledger.balance_of(account.address()), 0);
    }

    #[test]
    fn test_release_nothing_due_is_noop() {
        let (mut account, mut ledger) = setup(80);
        assert_eq!(account.release(&mut ledger, 500).unwrap(), 0);
        assert_eq!(account.release(&mut ledger, 2_000).unwrap(), 80);
        assert_eq!(account.release(&mut ledger, 3_000).unwrap(), 0);
        assert_eq!(account.released(), 80);
    }

    #[test]
    fn test_later_deposit_extends_allocation() {
        let (mut account, mut ledger) = setup(80);
        account.release(&mut ledger, 1_050).unwrap();

        ledger.mint(account.address(), 20).unwrap();
        account.record_deposit(20).unwrap();
        assert_eq!(account.total_deposited(), 100);

        // (60 held + 40 released) * 50%
        let held = ledger.balance_of(account.address());
        assert_eq!(held, 60);
        assert_eq!(account.vested_amount(held, 1_050).unwrap(), 50);
        assert_eq!(account.releasable(held, 1_050).unwrap(), 10);
    }
}
