//! Stake Ledger
//!
//! Holders lock Demy into the staking escrow and accrue a simple annual
//! reward on every stake independently. Leaving is a two step process:
//! `unstake` reserves an amount and starts a cooldown, `withdraw` returns it
//! once the cooldown elapsed. At most one unstake request per account.
//!
//! Rewards are paid by minting through the ledger's minter capability, which
//! the owner grants to the escrow address when wiring the stake ledger.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    config::{BPS_DENOMINATOR, YEAR_SECONDS},
    crypto::Address,
    error::{Result, TokenomicsError},
    ledger::{Amount, Ledger},
    time::TimestampSeconds,
    utils::math::mul_div,
};

/// One independent stake with its own accrual baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stake {
    pub amount: Amount,
    pub since: TimestampSeconds,
    /// Rewards already paid out on this stake
    pub claimed: Amount,
}

impl Stake {
    pub fn new(amount: Amount, since: TimestampSeconds) -> Self {
        Self {
            amount,
            since,
            claimed: 0,
        }
    }

    /// floor(amount * rate * elapsed / (10_000 * YEAR_SECONDS))
    pub fn accrued(&self, reward_rate_bps: u32, now: TimestampSeconds) -> Result<Amount> {
        let elapsed = now.saturating_sub(self.since) as u128;
        let numerator = (reward_rate_bps as u128)
            .checked_mul(elapsed)
            .ok_or(TokenomicsError::Overflow)?;
        mul_div(
            self.amount,
            numerator,
            BPS_DENOMINATOR as u128 * YEAR_SECONDS as u128,
        )
    }

    /// Accrued and not yet claimed
    ///
    /// A partial unstake lowers `amount` without touching `claimed`, so this
    /// can saturate at zero until accrual catches up again.
    pub fn claimable(&self, reward_rate_bps: u32, now: TimestampSeconds) -> Result<Amount> {
        Ok(self
            .accrued(reward_rate_bps, now)?
            .saturating_sub(self.claimed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnstakeRequest {
    pub balance: Amount,
    pub started_at: TimestampSeconds,
}

impl UnstakeRequest {
    pub fn ready_at(&self, cooldown: u64) -> TimestampSeconds {
        self.started_at.saturating_add(cooldown)
    }

    pub fn is_ready(&self, cooldown: u64, now: TimestampSeconds) -> bool {
        now >= self.ready_at(cooldown)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StakeAccount {
    // Insertion order is the public indexing order
    stakes: Vec<Stake>,
    // Unpaid rewards earned by unstaked amounts
    pending_rewards: Amount,
    unstake_request: Option<UnstakeRequest>,
}

impl StakeAccount {
    fn total_staked(&self) -> Amount {
        self.stakes.iter().map(|stake| stake.amount).sum()
    }

    fn is_empty(&self) -> bool {
        self.stakes.is_empty() && self.pending_rewards == 0 && self.unstake_request.is_none()
    }
}

/// Stake entry as returned by queries, with its live claimable reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeView {
    pub amount: Amount,
    pub since: TimestampSeconds,
    pub claimed: Amount,
    pub claimable: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeSummary {
    pub stakes: Vec<StakeView>,
    pub total_amount: Amount,
    pub pending_rewards: Amount,
}

impl StakeSummary {
    /// Everything `claim` would pay right now
    pub fn total_claimable(&self) -> Amount {
        self.stakes.iter().map(|stake| stake.claimable).sum::<Amount>() + self.pending_rewards
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeLedger {
    escrow: Address,
    reward_rate_bps: u32,
    unstake_cooldown: u64,
    accounts: HashMap<Address, StakeAccount>,
}

impl StakeLedger {
    pub fn new(escrow: Address, reward_rate_bps: u32, unstake_cooldown: u64) -> Self {
        Self {
            escrow,
            reward_rate_bps,
            unstake_cooldown,
            accounts: HashMap::new(),
        }
    }

    /// Ledger account holding every staked and unstaking token
    pub fn escrow(&self) -> &Address {
        &self.escrow
    }

    pub fn reward_rate_bps(&self) -> u32 {
        self.reward_rate_bps
    }

    pub fn unstake_cooldown(&self) -> u64 {
        self.unstake_cooldown
    }

    /// Lock `amount` of the staker's free balance into a new stake
    pub fn stake(
        &mut self,
        ledger: &mut Ledger,
        staker: &Address,
        amount: Amount,
        now: TimestampSeconds,
    ) -> Result<()> {
        if amount == 0 {
            return Err(TokenomicsError::ZeroAmount);
        }

        ledger.transfer(staker, &self.escrow, amount)?;

        let account = self.accounts.entry(*staker).or_default();
        account.stakes.push(Stake::new(amount, now));

        debug!(
            "{} staked {} at {} ({} stake(s), {} total)",
            staker,
            amount,
            now,
            account.stakes.len(),
            account.total_staked()
        );
        Ok(())
    }

    /// Pay every claimable reward of `staker`
    ///
    /// Returns the paid amount, 0 when nothing is due.
    pub fn claim(
        &mut self,
        ledger: &mut Ledger,
        staker: &Address,
        now: TimestampSeconds,
    ) -> Result<Amount> {
        let Some(account) = self.accounts.get_mut(staker) else {
            return Ok(0);
        };

        let mut accrued = Vec::with_capacity(account.stakes.len());
        let mut total = account.pending_rewards;
        for stake in &account.stakes {
            let stake_accrued = stake.accrued(self.reward_rate_bps, now)?;
            total = total
                .checked_add(stake_accrued.saturating_sub(stake.claimed))
                .ok_or(TokenomicsError::Overflow)?;
            accrued.push(stake_accrued);
        }

        if total == 0 {
            return Ok(0);
        }

        ledger.mint_as(&self.escrow, staker, total)?;

        for (stake, stake_accrued) in account.stakes.iter_mut().zip(accrued) {
            // A stake reduced below its paid rewards keeps the higher mark
            stake.claimed = stake.claimed.max(stake_accrued);
        }
        account.pending_rewards = 0;

        info!("{} claimed {} staking reward(s) at {}", staker, total, now);
        Ok(total)
    }

    /// Reserve `amount` of the staked total and start the cooldown
    ///
    /// Stakes are debited earliest first. A drained stake is removed and its
    /// unpaid reward is kept for the next claim; a partially debited stake
    /// hands the reward earned by the debited part to the same pending pot.
    pub fn unstake(
        &mut self,
        staker: &Address,
        amount: Amount,
        now: TimestampSeconds,
    ) -> Result<UnstakeRequest> {
        let account = self
            .accounts
            .get_mut(staker)
            .ok_or(TokenomicsError::NoActiveStake)?;

        // An open request wins even when it drained every stake
        if account.unstake_request.is_some() {
            return Err(TokenomicsError::CooldownAlreadyActive);
        }
        if account.stakes.is_empty() {
            return Err(TokenomicsError::NoActiveStake);
        }

        let staked = account.total_staked();
        if amount > staked {
            return Err(TokenomicsError::ExceedsStaked {
                requested: amount,
                staked,
            });
        }
        if amount == 0 {
            return Err(TokenomicsError::ZeroAmount);
        }

        // Nothing is mutated until every carried reward is computed
        let mut remaining = amount;
        let mut drained = 0;
        let mut carried: Amount = 0;
        for stake in &account.stakes {
            if remaining < stake.amount {
                break;
            }
            remaining -= stake.amount;
            drained += 1;
            carried = carried
                .checked_add(stake.claimable(self.reward_rate_bps, now)?)
                .ok_or(TokenomicsError::Overflow)?;
        }
        let mut debited = None;
        if remaining > 0 {
            if let Some(stake) = account.stakes.get(drained) {
                // The debited part keeps what it already earned
                let mut reduced = stake.clone();
                reduced.amount -= remaining;
                let before = stake.claimable(self.reward_rate_bps, now)?;
                let after = reduced.claimable(self.reward_rate_bps, now)?;
                carried = carried
                    .checked_add(before.saturating_sub(after))
                    .ok_or(TokenomicsError::Overflow)?;
                debited = Some(reduced);
            }
        }
        let pending_rewards = account
            .pending_rewards
            .checked_add(carried)
            .ok_or(TokenomicsError::Overflow)?;

        account.stakes.drain(..drained);
        if let (Some(reduced), Some(stake)) = (debited, account.stakes.first_mut()) {
            // Partial debit keeps `since` and `claimed`
            *stake = reduced;
        }
        account.pending_rewards = pending_rewards;

        let request = UnstakeRequest {
            balance: amount,
            started_at: now,
        };
        account.unstake_request = Some(request);

        info!(
            "{} unstaked {} ({} stake(s) drained), withdrawable at {}",
            staker,
            amount,
            drained,
            request.ready_at(self.unstake_cooldown)
        );
        Ok(request)
    }

    /// Return the unstaked balance once the cooldown elapsed
    pub fn withdraw(
        &mut self,
        ledger: &mut Ledger,
        staker: &Address,
        now: TimestampSeconds,
    ) -> Result<Amount> {
        let account = self
            .accounts
            .get_mut(staker)
            .ok_or(TokenomicsError::NoUnstakeRequest)?;
        let request = account
            .unstake_request
            .ok_or(TokenomicsError::NoUnstakeRequest)?;

        if !request.is_ready(self.unstake_cooldown, now) {
            return Err(TokenomicsError::CooldownNotElapsed {
                ready_at: request.ready_at(self.unstake_cooldown),
            });
        }

        ledger.transfer(&self.escrow, staker, request.balance)?;
        account.unstake_request = None;
        if account.is_empty() {
            self.accounts.remove(staker);
        }

        info!("{} withdrew {} from staking", staker, request.balance);
        Ok(request.balance)
    }

    /// Ordered stakes of `staker` with live claimable rewards
    pub fn has_stake(&self, staker: &Address, now: TimestampSeconds) -> Result<StakeSummary> {
        let Some(account) = self.accounts.get(staker) else {
            return Ok(StakeSummary::default());
        };

        let mut stakes = Vec::with_capacity(account.stakes.len());
        for stake in &account.stakes {
            stakes.push(StakeView {
                amount: stake.amount,
                since: stake.since,
                claimed: stake.claimed,
                claimable: stake.claimable(self.reward_rate_bps, now)?,
            });
        }

        Ok(StakeSummary {
            stakes,
            total_amount: account.total_staked(),
            pending_rewards: account.pending_rewards,
        })
    }

    pub fn get_unstake_detail(&self, staker: &Address) -> Option<UnstakeRequest> {
        self.accounts
            .get(staker)
            .and_then(|account| account.unstake_request)
    }

    /// Sum of every active stake
    pub fn total_staked(&self) -> Amount {
        self.accounts.values().map(StakeAccount::total_staked).sum()
    }

    /// Sum of every open unstake request
    pub fn total_unstaking(&self) -> Amount {
        self.accounts
            .values()
            .filter_map(|account| account.unstake_request)
            .map(|request| request.balance)
            .sum()
    }
}
