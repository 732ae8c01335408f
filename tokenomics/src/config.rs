use serde::{Deserialize, Serialize};

use crate::{
    allocation::Tranche,
    crypto::{derive_address, Address},
    error::{Result, TokenomicsError},
    ledger::Amount,
};

// ===== Asset =====

// Decimal places of the Demy asset
pub const DECIMALS: u8 = 18;
// 10^18 base units per whole token
pub const COIN_VALUE: Amount = 1_000_000_000_000_000_000;
// 5 billion whole tokens
pub const MAX_SUPPLY: Amount = 5_000_000_000 * COIN_VALUE;

// ===== Time =====

pub const DAY_SECONDS: u64 = 86_400;
// Vesting schedules count in four-week months
pub const MONTH_SECONDS: u64 = 28 * DAY_SECONDS;
// 365 days, the accrual base of the staking rate
pub const YEAR_SECONDS: u64 = 365 * DAY_SECONDS;

// ===== Stakeholder allocations (permille of max supply) =====

pub const ECOSYSTEM_ALLOCATION_PERMILLE: u32 = 60;
pub const PARTNERSHIPS_ALLOCATION_PERMILLE: u32 = 90;
pub const TEAM_ALLOCATION_PERMILLE: u32 = 96;
pub const ADVISORS_ALLOCATION_PERMILLE: u32 = 20;
// Share of the advisors allocation minted at deployment instead of locked
pub const ADVISORS_IMMEDIATE_PERCENT: u8 = 10;

pub const ECOSYSTEM_START_DELAY: u64 = 18 * MONTH_SECONDS;
pub const ECOSYSTEM_DURATION: u64 = 24 * MONTH_SECONDS;
pub const PARTNERSHIPS_START_DELAY: u64 = 6 * MONTH_SECONDS;
pub const PARTNERSHIPS_DURATION: u64 = 24 * MONTH_SECONDS;
pub const TEAM_START_DELAY: u64 = 12 * MONTH_SECONDS;
pub const TEAM_DURATION: u64 = 36 * MONTH_SECONDS;
pub const ADVISORS_START_DELAY: u64 = 0;
pub const ADVISORS_DURATION: u64 = 24 * MONTH_SECONDS;

// ===== Liquidity =====

pub const LIQUIDITY_ALLOCATION_PERMILLE: u32 = 63;
// Share of the liquidity allocation minted at deployment
pub const LIQUIDITY_INITIAL_PERCENT: u8 = 2;

// ===== Presale =====

// Share of every purchase credited immediately, the rest vests
pub const PRESALE_IMMEDIATE_PERCENT: u8 = 20;
pub const PRESALE_VESTING_DURATION: u64 = 12 * MONTH_SECONDS;
// Pool shared between seeders by percentage
pub const SEED_ALLOCATION_PERMILLE: u32 = 50;

// ===== Staking =====

// 13.9% simple annual reward
pub const STAKING_REWARD_RATE_BPS: u32 = 1_390;
pub const BPS_DENOMINATOR: u32 = 10_000;
pub const UNSTAKE_COOLDOWN_SECONDS: u64 = 7 * DAY_SECONDS;

// Permille denominator for allocations
pub const PERMILLE_DENOMINATOR: u32 = 1_000;

/// Vesting parameters of one stakeholder tranche
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrancheConfig {
    pub beneficiary: Address,
    pub allocation_permille: u32,
    /// Part of the allocation minted directly at deployment
    #[serde(default)]
    pub immediate_percent: u8,
    pub start_delay: u64,
    pub duration: u64,
}

/// The four tranche schedules, keyed by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrancheSchedules {
    pub ecosystem: TrancheConfig,
    pub partnerships: TrancheConfig,
    pub team: TrancheConfig,
    pub advisors: TrancheConfig,
}

impl TrancheSchedules {
    pub fn get(&self, tranche: Tranche) -> &TrancheConfig {
        match tranche {
            Tranche::Ecosystem => &self.ecosystem,
            Tranche::Partnerships => &self.partnerships,
            Tranche::Team => &self.team,
            Tranche::Advisors => &self.advisors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityConfig {
    pub beneficiary: Address,
    pub allocation_permille: u32,
    pub initial_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresaleConfig {
    pub immediate_percent: u8,
    pub vesting_duration: u64,
    pub seed_allocation_permille: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingConfig {
    pub reward_rate_bps: u32,
    pub unstake_cooldown: u64,
}

/// Full deployment configuration of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub max_supply: Amount,
    pub decimals: u8,
    pub tranches: TrancheSchedules,
    pub liquidity: LiquidityConfig,
    pub presale: PresaleConfig,
    pub staking: StakingConfig,
}

fn default_beneficiary(name: &str) -> Address {
    derive_address("DEMY_BENEFICIARY", name.as_bytes())
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_supply: MAX_SUPPLY,
            decimals: DECIMALS,
            tranches: TrancheSchedules {
                ecosystem: TrancheConfig {
                    beneficiary: default_beneficiary("ecosystem"),
                    allocation_permille: ECOSYSTEM_ALLOCATION_PERMILLE,
                    immediate_percent: 0,
                    start_delay: ECOSYSTEM_START_DELAY,
                    duration: ECOSYSTEM_DURATION,
                },
                partnerships: TrancheConfig {
                    beneficiary: default_beneficiary("partnerships"),
                    allocation_permille: PARTNERSHIPS_ALLOCATION_PERMILLE,
                    immediate_percent: 0,
                    start_delay: PARTNERSHIPS_START_DELAY,
                    duration: PARTNERSHIPS_DURATION,
                },
                team: TrancheConfig {
                    beneficiary: default_beneficiary("team"),
                    allocation_permille: TEAM_ALLOCATION_PERMILLE,
                    immediate_percent: 0,
                    start_delay: TEAM_START_DELAY,
                    duration: TEAM_DURATION,
                },
                advisors: TrancheConfig {
                    beneficiary: default_beneficiary("advisors"),
                    allocation_permille: ADVISORS_ALLOCATION_PERMILLE,
                    immediate_percent: ADVISORS_IMMEDIATE_PERCENT,
                    start_delay: ADVISORS_START_DELAY,
                    duration: ADVISORS_DURATION,
                },
            },
            liquidity: LiquidityConfig {
                beneficiary: default_beneficiary("liquidity"),
                allocation_permille: LIQUIDITY_ALLOCATION_PERMILLE,
                initial_percent: LIQUIDITY_INITIAL_PERCENT,
            },
            presale: PresaleConfig {
                immediate_percent: PRESALE_IMMEDIATE_PERCENT,
                vesting_duration: PRESALE_VESTING_DURATION,
                seed_allocation_permille: SEED_ALLOCATION_PERMILLE,
            },
            staking: StakingConfig {
                reward_rate_bps: STAKING_REWARD_RATE_BPS,
                unstake_cooldown: UNSTAKE_COOLDOWN_SECONDS,
            },
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TokenomicsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TokenomicsError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_supply == 0 {
            return Err(TokenomicsError::InvalidConfig(
                "max supply must be positive".to_string(),
            ));
        }

        let mut total_permille = self.liquidity.allocation_permille as u64
            + self.presale.seed_allocation_permille as u64;
        for tranche in Tranche::ALL {
            let schedule = self.tranches.get(tranche);
            if schedule.duration == 0 {
                return Err(TokenomicsError::InvalidConfig(format!(
                    "{} tranche duration must be positive",
                    tranche
                )));
            }
            if schedule.immediate_percent > 100 {
                return Err(TokenomicsError::InvalidConfig(format!(
                    "{} tranche immediate share above 100%",
                    tranche
                )));
            }
            if schedule.beneficiary.is_zero() {
                return Err(TokenomicsError::InvalidConfig(format!(
                    "{} tranche has no beneficiary",
                    tranche
                )));
            }
            total_permille += schedule.allocation_permille as u64;
        }

        if total_permille > PERMILLE_DENOMINATOR as u64 {
            return Err(TokenomicsError::InvalidConfig(format!(
                "allocations sum to {} permille",
                total_permille
            )));
        }

        if self.liquidity.initial_percent > 100 || self.presale.immediate_percent > 100 {
            return Err(TokenomicsError::InvalidConfig(
                "percentages must not exceed 100".to_string(),
            ));
        }

        if self.presale.vesting_duration == 0 {
            return Err(TokenomicsError::InvalidConfig(
                "presale vesting duration must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
