//! Owner capability checks
//!
//! A single designated owner gates the administrative operations of the
//! engine. Each gated operation names the capability it requires and calls
//! [`ensure_authorized`] before touching any state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    crypto::Address,
    error::{Result, TokenomicsError},
};

/// Administrative capabilities held by the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Add an account to the presale allow-list
    ManageWhitelist,
    /// Trigger release of the stakeholder tranches
    ReleaseAllocations,
    /// One-time seeder initialization
    InitSeeders,
    /// Wire the stake ledger as reward minter
    WireStakeLedger,
    /// Mint from the liquidity allocation
    MintLiquidity,
    /// Override the engine clock
    SetClock,
}

impl Capability {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ManageWhitelist => "manage-whitelist",
            Self::ReleaseAllocations => "release-allocations",
            Self::InitSeeders => "init-seeders",
            Self::WireStakeLedger => "wire-stake-ledger",
            Self::MintLiquidity => "mint-liquidity",
            Self::SetClock => "set-clock",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fail with NotAuthorized unless `caller` is the owner
pub fn ensure_authorized(caller: &Address, owner: &Address, capability: Capability) -> Result<()> {
    if caller != owner {
        log::debug!("{} denied {} (owner is {})", caller, capability, owner);
        return Err(TokenomicsError::NotAuthorized(capability.name()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_authorized() {
        let owner = Address::new([1u8; 32]);
        assert!(ensure_authorized(&owner, &owner, Capability::ReleaseAllocations).is_ok());
    }

    #[test]
    fn test_non_owner_is_rejected() {
        let owner = Address::new([1u8; 32]);
        let other = Address::new([2u8; 32]);
        let err = ensure_authorized(&other, &owner, Capability::InitSeeders).unwrap_err();
        assert_eq!(err, TokenomicsError::NotAuthorized("init-seeders"));
        assert_eq!(err.to_string(), "Caller is not authorized for init-seeders");
    }
}
