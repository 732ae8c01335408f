//! Vesting Factory and Vesting Account
//!
//! Presale buyers receive the vested part of each purchase into a
//! per-beneficiary account whose address is a pure function of the factory
//! and the beneficiary. The account is created lazily on the first deposit
//! and releases linearly from that moment on:
//!
//! - Before start: 0% vested
//! - During vesting period: (held + released) * elapsed / duration
//! - After end: everything deposited
//!
//! Anyone may trigger a release; the tokens always go to the beneficiary.

mod account;
mod factory;

pub use account::*;
pub use factory::*;
