// Allow some clippy lints matching the rest of the workspace
#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::new_without_default)]

pub mod access;
pub mod allocation;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod logger;
pub mod presale;
pub mod staking;
pub mod time;
pub mod utils;
pub mod vesting;

pub use engine::{SupplyBreakdown, TokenomicsEngine};
pub use error::{Result, TokenomicsError};
