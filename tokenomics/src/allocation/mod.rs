//! Allocation Release Engine
//!
//! Four stakeholder tranches are minted into the engine reserve at
//! deployment and released to their beneficiaries along a cliff followed by
//! a linear ramp:
//!
//! - Before `init_date + start_delay`: nothing releasable (cliff)
//! - During `duration`: floor(total * elapsed / duration)
//! - After: the whole tranche
//!
//! Tranches never influence each other and `released` only grows.

mod tranche;

pub use tranche::*;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    config::EngineConfig,
    crypto::Address,
    error::{Result, TokenomicsError},
    ledger::{Amount, Ledger},
    time::TimestampSeconds,
    utils::math::{linear_vested, percent_of, permille_of},
};

/// Release state of a tranche at a given time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationState {
    Cliff,
    Vesting,
    FullyReleased,
}

/// One locked stakeholder allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedAllocation {
    pub tranche: Tranche,
    pub beneficiary: Address,
    pub total_amount: Amount,
    pub released: Amount,
    pub init_date: TimestampSeconds,
    pub start_delay: u64,
    pub duration: u64,
}

impl LockedAllocation {
    /// Timestamp at which the linear ramp begins
    pub fn vesting_start(&self) -> TimestampSeconds {
        self.init_date.saturating_add(self.start_delay)
    }

    pub fn vested_amount(&self, now: TimestampSeconds) -> Result<Amount> {
        linear_vested(self.total_amount, self.vesting_start(), self.duration, now)
    }

    pub fn releasable(&self, now: TimestampSeconds) -> Result<Amount> {
        Ok(self.vested_amount(now)?.saturating_sub(self.released))
    }

    /// Amount still held in the reserve for this tranche
    pub fn locked(&self) -> Amount {
        self.total_amount - self.released
    }

    pub fn state(&self, now: TimestampSeconds) -> AllocationState {
        if self.released >= self.total_amount {
            AllocationState::FullyReleased
        } else if now < self.vesting_start() {
            AllocationState::Cliff
        } else {
            AllocationState::Vesting
        }
    }
}

/// Read-only view of a tranche against a given time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSnapshot {
    pub tranche: Tranche,
    pub beneficiary: Address,
    pub total_amount: Amount,
    pub released: Amount,
    pub releasable: Amount,
    /// Remaining locked balance (total - released)
    pub balance: Amount,
    pub state: AllocationState,
    pub init_date: TimestampSeconds,
    pub start_delay: u64,
    pub duration: u64,
}

/// The four tranches and the reserve account holding their locked balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSchedule {
    reserve: Address,
    allocations: [LockedAllocation; 4],
}

impl AllocationSchedule {
    pub fn new(reserve: Address, allocations: [LockedAllocation; 4]) -> Self {
        Self {
            reserve,
            allocations,
        }
    }

    /// Build the schedule from the deployment configuration
    ///
    /// Returns the schedule plus the immediate share of each tranche, which
    /// the caller mints directly to the beneficiaries.
    pub fn from_config(
        config: &EngineConfig,
        reserve: Address,
        init_date: TimestampSeconds,
    ) -> Result<(Self, Vec<(Address, Amount)>)> {
        let mut immediate = Vec::new();
        let allocations = Tranche::ALL.map(|tranche| -> Result<LockedAllocation> {
            let schedule = config.tranches.get(tranche);
            let allocation = permille_of(config.max_supply, schedule.allocation_permille)?;
            let upfront = percent_of(allocation, schedule.immediate_percent)?;
            if upfront > 0 {
                immediate.push((schedule.beneficiary, upfront));
            }

            Ok(LockedAllocation {
                tranche,
                beneficiary: schedule.beneficiary,
                total_amount: allocation - upfront,
                released: 0,
                init_date,
                start_delay: schedule.start_delay,
                duration: schedule.duration,
            })
        });

        let [ecosystem, partnerships, team, advisors] = allocations;
        let schedule = Self::new(reserve, [ecosystem?, partnerships?, team?, advisors?]);
        Ok((schedule, immediate))
    }

    pub fn reserve(&self) -> &Address {
        &self.reserve
    }

    pub fn get(&self, tranche: Tranche) -> &LockedAllocation {
        &self.allocations[tranche.index() as usize]
    }

    pub fn allocations(&self) -> &[LockedAllocation; 4] {
        &self.allocations
    }

    /// Sum of every tranche's remaining locked balance
    pub fn total_locked(&self) -> Amount {
        self.allocations.iter().map(LockedAllocation::locked).sum()
    }

    pub fn snapshot(&self, tranche: Tranche, now: TimestampSeconds) -> Result<AllocationSnapshot> {
        let allocation = self.get(tranche);
        Ok(AllocationSnapshot {
            tranche,
            beneficiary: allocation.beneficiary,
            total_amount: allocation.total_amount,
            released: allocation.released,
            releasable: allocation.releasable(now)?,
            balance: allocation.locked(),
            state: allocation.state(now),
            init_date: allocation.init_date,
            start_delay: allocation.start_delay,
            duration: allocation.duration,
        })
    }

    /// Ordinal lookup (0 = ecosystem .. 3 = advisors)
    pub fn snapshot_by_index(&self, index: u8, now: TimestampSeconds) -> Result<AllocationSnapshot> {
        let tranche = Tranche::from_index(index).ok_or(TokenomicsError::UnknownTranche(index))?;
        self.snapshot(tranche, now)
    }

    /// Release everything due at `now` from the reserve to the beneficiaries
    ///
    /// Returns the amount released per tranche (tranches with nothing due are
    /// omitted). Calling twice at the same timestamp releases nothing the
    /// second time.
    pub fn release_all(
        &mut self,
        ledger: &mut Ledger,
        now: TimestampSeconds,
    ) -> Result<Vec<(Tranche, Amount)>> {
        let mut due = Vec::with_capacity(self.allocations.len());
        for allocation in &self.allocations {
            let releasable = allocation.releasable(now)?;
            if releasable > 0 {
                due.push((allocation.tranche, releasable));
            }
        }

        let total: Amount = due.iter().map(|(_, amount)| *amount).sum();
        let reserve_balance = ledger.balance_of(&self.reserve);
        if reserve_balance < total {
            return Err(TokenomicsError::InsufficientBalance {
                need: total,
                have: reserve_balance,
            });
        }

        for (tranche, amount) in &due {
            let allocation = &mut self.allocations[tranche.index() as usize];
            ledger.transfer(&self.reserve, &allocation.beneficiary, *amount)?;
            allocation.released += amount;
            debug!(
                "Released {} of {} tranche to {} ({}/{})",
                amount, tranche, allocation.beneficiary, allocation.released, allocation.total_amount
            );
        }

        if !due.is_empty() {
            info!("Released {} across {} tranche(s) at {}", total, due.len(), now);
        }
        Ok(due)
    }
}
