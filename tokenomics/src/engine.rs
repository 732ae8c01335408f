//! Tokenomics Engine
//!
//! Facade wiring the ledger, the tranche release schedule, the vesting
//! factory, the presale and the stake ledger behind one owner and one clock.
//!
//! Every operation takes `&mut self` and either applies completely or
//! returns an error without touching state. Time always comes from the
//! injected [`Clock`].
//!
//! # Engine-owned accounts
//!
//! | Account         | Holds                                    |
//! |-----------------|------------------------------------------|
//! | engine address  | presale payments (on the payment asset)  |
//! | reserve         | locked tranche balances                  |
//! | vesting account | vested part of presale purchases         |
//! | staking escrow  | staked and unstaking balances            |

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    access::{ensure_authorized, Capability},
    allocation::{AllocationSchedule, AllocationSnapshot, Tranche},
    config::EngineConfig,
    crypto::{derive_address, Address},
    error::{Result, TokenomicsError},
    ledger::{Amount, Ledger},
    presale::{PaymentAsset, Presale, PurchaseReceipt},
    staking::{StakeLedger, StakeSummary, UnstakeRequest},
    time::{Clock, SystemClock, TimestampSeconds},
    utils::math::{percent_of, permille_of},
    vesting::{VestingFactory, VestingSnapshot},
};

/// Where the minted supply currently sits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyBreakdown {
    /// Freely transferable balances
    pub circulating: Amount,
    pub locked_in_tranches: Amount,
    pub held_in_vesting: Amount,
    pub staked: Amount,
    pub unstaking: Amount,
    pub total_supply: Amount,
    pub max_supply: Amount,
}

pub struct TokenomicsEngine<P: PaymentAsset> {
    owner: Address,
    address: Address,
    clock: Box<dyn Clock>,
    #[cfg(feature = "clock-override")]
    time_override: Option<TimestampSeconds>,
    config: EngineConfig,
    ledger: Ledger,
    allocations: AllocationSchedule,
    vesting: VestingFactory,
    presale: Presale,
    staking: StakeLedger,
    payment: P,
    liquidity_cap: Amount,
    liquidity_minted: Amount,
}

impl<P: PaymentAsset> TokenomicsEngine<P> {
    /// Deploy the engine
    ///
    /// Mints the locked tranches into the reserve, the immediate tranche
    /// shares to their beneficiaries and the initial liquidity share. The
    /// deployment time is the `init_date` of every tranche.
    pub fn new(
        config: EngineConfig,
        owner: Address,
        payment: P,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let address = derive_address("DEMY_ENGINE", owner.as_bytes());
        let reserve = derive_address("DEMY_RESERVE", address.as_bytes());
        let factory = derive_address("DEMY_VESTING_FACTORY", address.as_bytes());
        let escrow = derive_address("DEMY_STAKING_ESCROW", address.as_bytes());
        let init_date = clock.now();

        let mut ledger = Ledger::new(config.max_supply, config.decimals);
        let (allocations, immediate) = AllocationSchedule::from_config(&config, reserve, init_date)?;
        ledger.mint(&reserve, allocations.total_locked())?;
        for (beneficiary, amount) in &immediate {
            ledger.mint(beneficiary, *amount)?;
        }

        let liquidity_cap = permille_of(config.max_supply, config.liquidity.allocation_permille)?;
        let liquidity_minted = percent_of(liquidity_cap, config.liquidity.initial_percent)?;
        ledger.mint(&config.liquidity.beneficiary, liquidity_minted)?;

        let seed_pool = permille_of(config.max_supply, config.presale.seed_allocation_permille)?;
        let presale = Presale::new(config.presale.immediate_percent, seed_pool);
        let vesting = VestingFactory::new(factory, config.presale.vesting_duration);
        let staking = StakeLedger::new(
            escrow,
            config.staking.reward_rate_bps,
            config.staking.unstake_cooldown,
        );

        info!(
            "Deployed engine {} owned by {} at {}: {} minted of {}",
            address,
            owner,
            init_date,
            ledger.total_supply(),
            ledger.max_supply()
        );

        Ok(Self {
            owner,
            address,
            clock,
            #[cfg(feature = "clock-override")]
            time_override: None,
            config,
            ledger,
            allocations,
            vesting,
            presale,
            staking,
            payment,
            liquidity_cap,
            liquidity_minted,
        })
    }

    /// Deploy with the wall clock as time source
    pub fn with_system_clock(config: EngineConfig, owner: Address, payment: P) -> Result<Self> {
        Self::new(config, owner, payment, Box::new(SystemClock))
    }

    // ===== Time =====

    pub fn get_current_time(&self) -> TimestampSeconds {
        self.time_override().unwrap_or_else(|| self.clock.now())
    }

    #[cfg(feature = "clock-override")]
    fn time_override(&self) -> Option<TimestampSeconds> {
        self.time_override
    }

    #[cfg(not(feature = "clock-override"))]
    fn time_override(&self) -> Option<TimestampSeconds> {
        None
    }

    /// Pin the engine time, `None` goes back to the clock
    #[cfg(feature = "clock-override")]
    pub fn set_current_time(
        &mut self,
        caller: &Address,
        timestamp: Option<TimestampSeconds>,
    ) -> Result<()> {
        ensure_authorized(caller, &self.owner, Capability::SetClock)?;
        log::warn!("Engine time overridden to {:?}", timestamp);
        self.time_override = timestamp;
        Ok(())
    }

    // ===== Owner operations =====

    pub fn add_to_whitelist(&mut self, caller: &Address, account: Address) -> Result<bool> {
        ensure_authorized(caller, &self.owner, Capability::ManageWhitelist)?;
        Ok(self.presale.add_to_whitelist(account))
    }

    /// Release every tranche amount due at the current time
    pub fn release_locked_balances(&mut self, caller: &Address) -> Result<Vec<(Tranche, Amount)>> {
        ensure_authorized(caller, &self.owner, Capability::ReleaseAllocations)?;
        let now = self.get_current_time();
        self.allocations.release_all(&mut self.ledger, now)
    }

    pub fn init_seeders(
        &mut self,
        caller: &Address,
        seeders: &[Address],
        percentages: &[u8],
    ) -> Result<Vec<(Address, Amount)>> {
        ensure_authorized(caller, &self.owner, Capability::InitSeeders)?;
        self.presale
            .init_seeders(&mut self.ledger, seeders, percentages)
    }

    /// Grant the staking escrow the right to mint rewards
    pub fn set_stake_ledger(&mut self, caller: &Address) -> Result<()> {
        ensure_authorized(caller, &self.owner, Capability::WireStakeLedger)?;
        self.ledger.authorize_minter(*self.staking.escrow());
        info!("Stake ledger {} wired as reward minter", self.staking.escrow());
        Ok(())
    }

    pub fn mint_for_liquidity(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        ensure_authorized(caller, &self.owner, Capability::MintLiquidity)?;
        if amount == 0 {
            return Err(TokenomicsError::ZeroAmount);
        }

        let remaining = self.liquidity_remaining();
        if amount > remaining {
            return Err(TokenomicsError::LiquidityCapExceeded {
                requested: amount,
                remaining,
            });
        }

        self.ledger
            .mint(&self.config.liquidity.beneficiary, amount)?;
        self.liquidity_minted += amount;
        info!(
            "Minted {} for liquidity ({} of {})",
            amount, self.liquidity_minted, self.liquidity_cap
        );
        Ok(())
    }

    // ===== Ledger operations =====

    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        self.ledger.transfer(caller, to, amount)
    }

    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) {
        self.ledger.approve(caller, spender, amount)
    }

    pub fn transfer_from(
        &mut self,
        caller: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        self.ledger.transfer_from(caller, owner, to, amount)
    }

    // ===== Presale and vesting =====

    /// Presale purchase, `amount` in base units on both assets
    pub fn buy(&mut self, caller: &Address, amount: Amount) -> Result<PurchaseReceipt> {
        let now = self.get_current_time();
        self.presale.buy(
            &mut self.ledger,
            &mut self.vesting,
            &mut self.payment,
            &self.address,
            caller,
            amount,
            now,
        )
    }

    /// Release the vested balance of `beneficiary`; anyone may call it
    pub fn release_vesting(&mut self, beneficiary: &Address) -> Result<Amount> {
        let now = self.get_current_time();
        self.vesting.release(&mut self.ledger, beneficiary, now)
    }

    // ===== Staking =====

    pub fn stake(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        let now = self.get_current_time();
        self.staking.stake(&mut self.ledger, caller, amount, now)
    }

    pub fn claim(&mut self, caller: &Address) -> Result<Amount> {
        let now = self.get_current_time();
        self.staking.claim(&mut self.ledger, caller, now)
    }

    pub fn unstake(&mut self, caller: &Address, amount: Amount) -> Result<UnstakeRequest> {
        let now = self.get_current_time();
        self.staking.unstake(caller, amount, now)
    }

    pub fn withdraw(&mut self, caller: &Address) -> Result<Amount> {
        let now = self.get_current_time();
        self.staking.withdraw(&mut self.ledger, caller, now)
    }

    // ===== Queries =====

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Account receiving presale payments
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn payment(&self) -> &P {
        &self.payment
    }

    pub fn payment_mut(&mut self) -> &mut P {
        &mut self.payment
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn reserve(&self) -> &Address {
        self.allocations.reserve()
    }

    pub fn locked_balances(&self, tranche: Tranche) -> Result<AllocationSnapshot> {
        self.allocations.snapshot(tranche, self.get_current_time())
    }

    /// Ordinal tranche lookup, 0 = ecosystem .. 3 = advisors
    pub fn get_locked_balances(&self, index: u8) -> Result<AllocationSnapshot> {
        self.allocations
            .snapshot_by_index(index, self.get_current_time())
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.presale.is_whitelisted(account)
    }

    pub fn seeders_initialized(&self) -> bool {
        self.presale.seeders_initialized()
    }

    pub fn vesting_address(&self, beneficiary: &Address) -> Address {
        self.vesting.vesting_address(beneficiary)
    }

    pub fn vesting_snapshot(&self, beneficiary: &Address) -> Result<Option<VestingSnapshot>> {
        self.vesting
            .snapshot(&self.ledger, beneficiary, self.get_current_time())
    }

    pub fn vested_amount(&self, beneficiary: &Address) -> Result<Amount> {
        Ok(self
            .vesting_snapshot(beneficiary)?
            .map(|snapshot| snapshot.vested)
            .unwrap_or(0))
    }

    pub fn vesting_released(&self, beneficiary: &Address) -> Amount {
        self.vesting
            .get(beneficiary)
            .map(|account| account.released())
            .unwrap_or(0)
    }

    pub fn staking_escrow(&self) -> &Address {
        self.staking.escrow()
    }

    pub fn has_stake(&self, account: &Address) -> Result<StakeSummary> {
        self.staking.has_stake(account, self.get_current_time())
    }

    pub fn get_unstake_detail(&self, account: &Address) -> Option<UnstakeRequest> {
        self.staking.get_unstake_detail(account)
    }

    pub fn liquidity_minted(&self) -> Amount {
        self.liquidity_minted
    }

    pub fn liquidity_remaining(&self) -> Amount {
        self.liquidity_cap - self.liquidity_minted
    }

    pub fn supply_breakdown(&self) -> Result<SupplyBreakdown> {
        let total_supply = self.ledger.total_supply();
        let locked_in_tranches = self.allocations.total_locked();
        let held_in_vesting = self.vesting.total_held(&self.ledger);
        let staked = self.staking.total_staked();
        let unstaking = self.staking.total_unstaking();

        let circulating = [locked_in_tranches, held_in_vesting, staked, unstaking]
            .into_iter()
            .try_fold(total_supply, |acc, amount| acc.checked_sub(amount))
            .ok_or(TokenomicsError::Overflow)?;

        Ok(SupplyBreakdown {
            circulating,
            locked_in_tranches,
            held_in_vesting,
            staked,
            unstaking,
            total_supply,
            max_supply: self.ledger.max_supply(),
        })
    }
}
