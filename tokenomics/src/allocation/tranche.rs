use serde::{Deserialize, Serialize};
use std::fmt;

/// Stakeholder tranche, ordered as exposed by index queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tranche {
    Ecosystem = 0,
    Partnerships = 1,
    Team = 2,
    Advisors = 3,
}

impl Tranche {
    pub const ALL: [Tranche; 4] = [
        Tranche::Ecosystem,
        Tranche::Partnerships,
        Tranche::Team,
        Tranche::Advisors,
    ];

    pub const fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ecosystem => "ecosystem",
            Self::Partnerships => "partnerships",
            Self::Team => "team",
            Self::Advisors => "advisors",
        }
    }
}

impl fmt::Display for Tranche {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for tranche in Tranche::ALL {
            assert_eq!(Tranche::from_index(tranche.index()), Some(tranche));
        }
        assert_eq!(Tranche::from_index(4), None);
        assert_eq!(Tranche::Team.to_string(), "team");
    }
}
