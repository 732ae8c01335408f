//! Tokenomics Error Codes
//!
//! Range: 0x0300 - 0x03FF
//! Format: TOKENOMICS_ERROR_<CATEGORY>_<SPECIFIC>

use thiserror::Error;

// ===== Ledger Errors (0x0300 - 0x030F) =====

pub const TOKENOMICS_ERROR_INSUFFICIENT_BALANCE: u64 = 0x0300;
pub const TOKENOMICS_ERROR_INSUFFICIENT_ALLOWANCE: u64 = 0x0301;
pub const TOKENOMICS_ERROR_SUPPLY_EXCEEDED: u64 = 0x0302;
pub const TOKENOMICS_ERROR_ZERO_AMOUNT: u64 = 0x0303;
pub const TOKENOMICS_ERROR_OVERFLOW: u64 = 0x0304;

// ===== Authorization Errors (0x0310 - 0x031F) =====

pub const TOKENOMICS_ERROR_NOT_AUTHORIZED: u64 = 0x0310;
pub const TOKENOMICS_ERROR_NOT_WHITELISTED: u64 = 0x0311;

// ===== Presale / Allocation Errors (0x0320 - 0x032F) =====

pub const TOKENOMICS_ERROR_ALREADY_INITIALIZED: u64 = 0x0320;
pub const TOKENOMICS_ERROR_INVALID_SEEDERS: u64 = 0x0321;
pub const TOKENOMICS_ERROR_LIQUIDITY_CAP_EXCEEDED: u64 = 0x0322;
pub const TOKENOMICS_ERROR_UNKNOWN_TRANCHE: u64 = 0x0323;

// ===== Staking Errors (0x0330 - 0x033F) =====

pub const TOKENOMICS_ERROR_NO_ACTIVE_STAKE: u64 = 0x0330;
pub const TOKENOMICS_ERROR_EXCEEDS_STAKED: u64 = 0x0331;
pub const TOKENOMICS_ERROR_COOLDOWN_ALREADY_ACTIVE: u64 = 0x0332;
pub const TOKENOMICS_ERROR_NO_UNSTAKE_REQUEST: u64 = 0x0333;
pub const TOKENOMICS_ERROR_COOLDOWN_NOT_ELAPSED: u64 = 0x0334;

// ===== Configuration Errors (0x0340 - 0x034F) =====

pub const TOKENOMICS_ERROR_INVALID_CONFIG: u64 = 0x0340;

/// Errors returned by every engine operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenomicsError {
    #[error("Insufficient balance: need {need}, have {have}")]
    InsufficientBalance { need: u128, have: u128 },

    #[error("Insufficient allowance: need {need}, have {have}")]
    InsufficientAllowance { need: u128, have: u128 },

    #[error("Max supply exceeded: minting {requested} over {total_supply} of {max_supply}")]
    SupplyExceeded {
        requested: u128,
        total_supply: u128,
        max_supply: u128,
    },

    #[error("Amount cannot be zero")]
    ZeroAmount,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Caller is not authorized for {0}")]
    NotAuthorized(&'static str),

    #[error("Only white listed accounts")]
    NotWhitelisted,

    #[error("Seeders already initialized")]
    AlreadyInitialized,

    #[error("Invalid seeders: {0}")]
    InvalidSeeders(String),

    #[error("Liquidity cap exceeded: requested {requested}, remaining {remaining}")]
    LiquidityCapExceeded { requested: u128, remaining: u128 },

    #[error("Unknown tranche index {0}")]
    UnknownTranche(u8),

    #[error("You must stake first")]
    NoActiveStake,

    #[error("Cannot withdraw more than you have staked: requested {requested}, staked {staked}")]
    ExceedsStaked { requested: u128, staked: u128 },

    #[error("You have an active unstake countdown")]
    CooldownAlreadyActive,

    #[error("You must unstake first")]
    NoUnstakeRequest,

    #[error("You must wait until {ready_at} to withdraw")]
    CooldownNotElapsed { ready_at: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TokenomicsError {
    /// Convert error to its stable u64 error code
    pub fn to_code(&self) -> u64 {
        match self {
            Self::InsufficientBalance { .. } => TOKENOMICS_ERROR_INSUFFICIENT_BALANCE,
            Self::InsufficientAllowance { .. } => TOKENOMICS_ERROR_INSUFFICIENT_ALLOWANCE,
            Self::SupplyExceeded { .. } => TOKENOMICS_ERROR_SUPPLY_EXCEEDED,
            Self::ZeroAmount => TOKENOMICS_ERROR_ZERO_AMOUNT,
            Self::Overflow => TOKENOMICS_ERROR_OVERFLOW,

            Self::NotAuthorized(_) => TOKENOMICS_ERROR_NOT_AUTHORIZED,
            Self::NotWhitelisted => TOKENOMICS_ERROR_NOT_WHITELISTED,

            Self::AlreadyInitialized => TOKENOMICS_ERROR_ALREADY_INITIALIZED,
            Self::InvalidSeeders(_) => TOKENOMICS_ERROR_INVALID_SEEDERS,
            Self::LiquidityCapExceeded { .. } => TOKENOMICS_ERROR_LIQUIDITY_CAP_EXCEEDED,
            Self::UnknownTranche(_) => TOKENOMICS_ERROR_UNKNOWN_TRANCHE,

            Self::NoActiveStake => TOKENOMICS_ERROR_NO_ACTIVE_STAKE,
            Self::ExceedsStaked { .. } => TOKENOMICS_ERROR_EXCEEDS_STAKED,
            Self::CooldownAlreadyActive => TOKENOMICS_ERROR_COOLDOWN_ALREADY_ACTIVE,
            Self::NoUnstakeRequest => TOKENOMICS_ERROR_NO_UNSTAKE_REQUEST,
            Self::CooldownNotElapsed { .. } => TOKENOMICS_ERROR_COOLDOWN_NOT_ELAPSED,

            Self::InvalidConfig(_) => TOKENOMICS_ERROR_INVALID_CONFIG,
        }
    }

    /// Stable name of the error kind, independent of the attached values
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "InsufficientBalance",
            Self::InsufficientAllowance { .. } => "InsufficientAllowance",
            Self::SupplyExceeded { .. } => "SupplyExceeded",
            Self::ZeroAmount => "ZeroAmount",
            Self::Overflow => "Overflow",
            Self::NotAuthorized(_) => "NotAuthorized",
            Self::NotWhitelisted => "NotWhitelisted",
            Self::AlreadyInitialized => "AlreadyInitialized",
            Self::InvalidSeeders(_) => "InvalidSeeders",
            Self::LiquidityCapExceeded { .. } => "LiquidityCapExceeded",
            Self::UnknownTranche(_) => "UnknownTranche",
            Self::NoActiveStake => "NoActiveStake",
            Self::ExceedsStaked { .. } => "ExceedsStaked",
            Self::CooldownAlreadyActive => "CooldownAlreadyActive",
            Self::NoUnstakeRequest => "NoUnstakeRequest",
            Self::CooldownNotElapsed { .. } => "CooldownNotElapsed",
            Self::InvalidConfig(_) => "InvalidConfig",
        }
    }

    /// Whether a raw code belongs to this error range
    pub fn is_known_code(code: u64) -> bool {
        matches!(
            code,
            TOKENOMICS_ERROR_INSUFFICIENT_BALANCE..=TOKENOMICS_ERROR_OVERFLOW
                | TOKENOMICS_ERROR_NOT_AUTHORIZED..=TOKENOMICS_ERROR_NOT_WHITELISTED
                | TOKENOMICS_ERROR_ALREADY_INITIALIZED..=TOKENOMICS_ERROR_UNKNOWN_TRANCHE
                | TOKENOMICS_ERROR_NO_ACTIVE_STAKE..=TOKENOMICS_ERROR_COOLDOWN_NOT_ELAPSED
                | TOKENOMICS_ERROR_INVALID_CONFIG
        )
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, TokenomicsError>;
