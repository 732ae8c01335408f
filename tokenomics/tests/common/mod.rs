#![allow(dead_code)]

use demy_tokenomics::{
    config::EngineConfig,
    crypto::Address,
    ledger::{Amount, Ledger, UNLIMITED_ALLOWANCE},
    time::{ManualClock, TimestampSeconds},
    TokenomicsEngine,
};

pub const INIT: TimestampSeconds = 1_700_000_000;

pub fn owner() -> Address {
    Address::new([0x0A; 32])
}

pub fn account(id: u8) -> Address {
    Address::new([id; 32])
}

pub struct Harness {
    pub engine: TokenomicsEngine<Ledger>,
    pub clock: ManualClock,
}

impl Harness {
    pub fn deploy() -> Self {
        Self::deploy_with(EngineConfig::default())
    }

    pub fn deploy_with(config: EngineConfig) -> Self {
        let clock = ManualClock::new(INIT);
        // Stand-in payment token with no supply cap
        let payment = Ledger::new(Amount::MAX, 18);
        let engine = TokenomicsEngine::new(config, owner(), payment, Box::new(clock.clone()))
            .expect("default deployment");
        Self { engine, clock }
    }

    /// Give `buyer` payment tokens and an unlimited allowance to the engine
    pub fn fund_buyer(&mut self, buyer: &Address, amount: Amount) {
        let spender = *self.engine.address();
        let payment = self.engine.payment_mut();
        payment.mint(buyer, amount).expect("payment mint");
        payment.approve(buyer, &spender, UNLIMITED_ALLOWANCE);
    }

    /// Move free Demy from the liquidity account to `to`
    pub fn fund(&mut self, to: &Address, amount: Amount) {
        let liquidity = self.engine.config().liquidity.beneficiary;
        self.engine
            .transfer(&liquidity, to, amount)
            .expect("liquidity transfer");
    }

    pub fn set_time(&self, timestamp: TimestampSeconds) {
        self.clock.set(timestamp);
    }

    /// Every minted token is accounted for exactly once
    pub fn assert_supply_conserved(&self) {
        let engine = &self.engine;
        let ledger = engine.ledger();
        let breakdown = engine.supply_breakdown().expect("breakdown");

        assert_eq!(ledger.sum_balances().expect("sum"), ledger.total_supply());
        assert!(ledger.total_supply() <= ledger.max_supply());
        assert_eq!(engine.balance_of(engine.reserve()), breakdown.locked_in_tranches);
        assert_eq!(
            engine.balance_of(engine.staking_escrow()),
            breakdown.staked + breakdown.unstaking
        );
        assert_eq!(
            breakdown.circulating
                + breakdown.locked_in_tranches
                + breakdown.held_in_vesting
                + breakdown.staked
                + breakdown.unstaking,
            breakdown.total_supply
        );
    }
}
