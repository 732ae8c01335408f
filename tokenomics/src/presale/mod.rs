//! Presale Purchase Flow
//!
//! Whitelisted buyers pay with an external asset and receive the same amount
//! of Demy: a fixed share immediately, the rest through their vesting
//! account. A one-time seeding hands a share of the seed pool to early
//! accounts.

mod payment;

pub use payment::PaymentAsset;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{
    crypto::Address,
    error::{Result, TokenomicsError},
    ledger::{Amount, Ledger},
    time::TimestampSeconds,
    utils::math::percent_of,
    vesting::VestingFactory,
};

/// Outcome of a successful purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub buyer: Address,
    pub amount: Amount,
    pub immediate: Amount,
    pub vested: Amount,
    pub vesting_account: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presale {
    immediate_percent: u8,
    seed_pool: Amount,
    whitelist: HashSet<Address>,
    seeders_initialized: bool,
}

impl Presale {
    pub fn new(immediate_percent: u8, seed_pool: Amount) -> Self {
        Self {
            immediate_percent,
            seed_pool,
            whitelist: HashSet::new(),
            seeders_initialized: false,
        }
    }

    pub fn immediate_percent(&self) -> u8 {
        self.immediate_percent
    }

    pub fn seed_pool(&self) -> Amount {
        self.seed_pool
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.contains(account)
    }

    pub fn seeders_initialized(&self) -> bool {
        self.seeders_initialized
    }

    /// Returns false if the account was already whitelisted
    pub fn add_to_whitelist(&mut self, account: Address) -> bool {
        let added = self.whitelist.insert(account);
        if added {
            debug!("Whitelisted {}", account);
        }
        added
    }

    /// Split of a purchase into (immediate, vested)
    pub fn split(&self, amount: Amount) -> Result<(Amount, Amount)> {
        let immediate = percent_of(amount, self.immediate_percent)?;
        Ok((immediate, amount - immediate))
    }

    /// Buy `amount` of Demy, paying the same amount of the payment asset
    ///
    /// `amount` is in base units (18 decimals), not whole tokens: buying one
    /// token is `10^18`, and `buy(100)` mints 20 base units immediately.
    ///
    /// The payment is pulled from `buyer` to `treasury` using the allowance
    /// `buyer` granted to `treasury` on the payment asset.
    pub fn buy<P: PaymentAsset>(
        &mut self,
        ledger: &mut Ledger,
        vesting: &mut VestingFactory,
        payment: &mut P,
        treasury: &Address,
        buyer: &Address,
        amount: Amount,
        now: TimestampSeconds,
    ) -> Result<PurchaseReceipt> {
        if !self.is_whitelisted(buyer) {
            return Err(TokenomicsError::NotWhitelisted);
        }
        if amount == 0 {
            return Err(TokenomicsError::ZeroAmount);
        }

        let (immediate, vested) = self.split(amount)?;
        // Nothing below may fail once the payment is collected
        ledger.ensure_mintable(amount)?;
        payment.transfer_from(treasury, buyer, treasury, amount)?;

        if immediate > 0 {
            ledger.mint(buyer, immediate)?;
        }
        let vesting_account = if vested > 0 {
            vesting.deposit_minted(ledger, buyer, vested, now)?
        } else {
            vesting.vesting_address(buyer)
        };

        info!(
            "{} bought {} ({} immediate, {} vested into {})",
            buyer, amount, immediate, vested, vesting_account
        );
        Ok(PurchaseReceipt {
            buyer: *buyer,
            amount,
            immediate,
            vested,
            vesting_account,
        })
    }

    /// One-time distribution of the seed pool by percentage
    pub fn init_seeders(
        &mut self,
        ledger: &mut Ledger,
        seeders: &[Address],
        percentages: &[u8],
    ) -> Result<Vec<(Address, Amount)>> {
        if self.seeders_initialized {
            return Err(TokenomicsError::AlreadyInitialized);
        }
        if seeders.is_empty() || seeders.len() != percentages.len() {
            return Err(TokenomicsError::InvalidSeeders(format!(
                "{} seeders for {} percentages",
                seeders.len(),
                percentages.len()
            )));
        }
        if percentages.iter().any(|pct| *pct == 0) {
            return Err(TokenomicsError::InvalidSeeders(
                "percentages must be positive".to_string(),
            ));
        }
        let total_percent: u32 = percentages.iter().map(|pct| *pct as u32).sum();
        if total_percent > 100 {
            return Err(TokenomicsError::InvalidSeeders(format!(
                "percentages sum to {}",
                total_percent
            )));
        }

        let mut grants = Vec::with_capacity(seeders.len());
        for (seeder, pct) in seeders.iter().zip(percentages) {
            grants.push((*seeder, percent_of(self.seed_pool, *pct)?));
        }
        let total: Amount = grants.iter().map(|(_, amount)| *amount).sum();
        ledger.ensure_mintable(total)?;

        for (seeder, amount) in &grants {
            ledger.mint(seeder, *amount)?;
        }
        self.seeders_initialized = true;

        info!("Initialized {} seeders with {} in total", grants.len(), total);
        Ok(grants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{crypto::derive_address, ledger::UNLIMITED_ALLOWANCE};

    struct Setup {
        presale: Presale,
        ledger: Ledger,
        vesting: VestingFactory,
        payment: Ledger,
        treasury: Address,
        buyer: Address,
    }

    fn setup() -> Setup {
        let treasury = derive_address("DEMY_ENGINE", b"test");
        let buyer = Address::new([7u8; 32]);
        let mut payment = Ledger::new(1_000_000, 18);
        payment.mint(&buyer, 1_000).unwrap();
        payment.approve(&buyer, &treasury, UNLIMITED_ALLOWANCE);

        Setup {
            presale: Presale::new(20, 10_000),
            ledger: Ledger::new(1_000_000, 18),
            vesting: VestingFactory::new(derive_address("DEMY_VESTING_FACTORY", b"test"), 100),
            payment,
            treasury,
            buyer,
        }
    }

    #[test]
    fn test_buy_requires_whitelist() {
        let mut s = setup();
        let err = s
            .presale
            .buy(&mut s.ledger, &mut s.vesting, &mut s.payment, &s.treasury, &s.buyer, 100, 0)
            .unwrap_err();
        assert_eq!(err, TokenomicsError::NotWhitelisted);
        assert_eq!(s.payment.balance_of(&s.buyer), 1_000);
    }

    #[test]
    fn test_buy_splits_purchase() {
        let mut s = setup();
        assert!(s.presale.add_to_whitelist(s.buyer));
        assert!(!s.presale.add_to_whitelist(s.buyer));

        let receipt = s
            .presale
            .buy(&mut s.ledger, &mut s.vesting, &mut s.payment, &s.treasury, &s.buyer, 100, 0)
            .unwrap();
        assert_eq!(receipt.immediate, 20);
        assert_eq!(receipt.vested, 80);
        assert_eq!(receipt.vesting_account, s.vesting.vesting_address(&s.buyer));

        assert_eq!(s.ledger.balance_of(&s.buyer), 20);
        assert_eq!(s.ledger.balance_of(&receipt.vesting_account), 80);
        assert_eq!(s.ledger.total_supply(), 100);
        assert_eq!(s.payment.balance_of(&s.buyer), 900);
        assert_eq!(s.payment.balance_of(&s.treasury), 100);
    }

    #[test]
    fn test_buy_without_allowance_changes_nothing() {
        let mut s = setup();
        s.presale.add_to_whitelist(s.buyer);
        s.payment.approve(&s.buyer, &s.treasury, 10);

        let err = s
            .presale
            .buy(&mut s.ledger, &mut s.vesting, &mut s.payment, &s.treasury, &s.buyer, 100, 0)
            .unwrap_err();
        assert_eq!(err, TokenomicsError::InsufficientAllowance { need: 100, have: 10 });
        assert_eq!(s.ledger.total_supply(), 0);
        assert!(s.vesting.get(&s.buyer).is_none());
    }

    #[test]
    fn test_buy_over_max_supply_keeps_payment() {
        let mut s = setup();
        s.presale.add_to_whitelist(s.buyer);
        s.ledger = Ledger::new(50, 18);

        let err = s
            .presale
            .buy(&mut s.ledger, &mut s.vesting, &mut s.payment, &s.treasury, &s.buyer, 100, 0)
            .unwrap_err();
        assert!(matches!(err, TokenomicsError::SupplyExceeded { .. }));
        assert_eq!(s.payment.balance_of(&s.buyer), 1_000);
    }

    #[test]
    fn test_init_seeders_once() {
        let mut s = setup();
        let a = Address::new([1u8; 32]);
        let b = Address::new([2u8; 32]);

        let grants = s.presale.init_seeders(&mut s.ledger, &[a, b], &[5, 10]).unwrap();
        assert_eq!(grants, vec![(a, 500), (b, 1_000)]);
        assert_eq!(s.ledger.balance_of(&a), 500);
        assert_eq!(s.ledger.balance_of(&b), 1_000);
        assert!(s.presale.seeders_initialized());

        assert_eq!(
            s.presale.init_seeders(&mut s.ledger, &[a], &[1]),
            Err(TokenomicsError::AlreadyInitialized)
        );
    }

    #[test]
    fn test_init_seeders_validation() {
        let mut s = setup();
        let a = Address::new([1u8; 32]);

        let cases: [(Vec<Address>, Vec<u8>); 4] = [
            (vec![], vec![]),
            (vec![a], vec![5, 5]),
            (vec![a], vec![0]),
            (vec![a, a], vec![60, 41]),
        ];
        for (seeders, percentages) in cases {
            assert!(matches!(
                s.presale.init_seeders(&mut s.ledger, &seeders, &percentages),
                Err(TokenomicsError::InvalidSeeders(_))
            ));
        }
        assert!(!s.presale.seeders_initialized());
        assert_eq!(s.ledger.total_supply(), 0);
    }
}
