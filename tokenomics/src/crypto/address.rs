use blake3::Hasher;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    convert::TryInto,
    fmt::{Display, Error, Formatter},
    str::FromStr,
};

pub const ADDRESS_SIZE: usize = 32; // 32 bytes / 256 bits

/// Account identity on the ledger
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub const fn zero() -> Self {
        Address::new([0; ADDRESS_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ADDRESS_SIZE]
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; ADDRESS_SIZE] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| "Invalid hex string")?;
        let bytes: [u8; ADDRESS_SIZE] = bytes.try_into().map_err(|_| "Invalid address")?;
        Ok(Address::new(bytes))
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", &self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        let hex = hex.strip_prefix("0x").unwrap_or(&hex);
        if hex.len() != ADDRESS_SIZE * 2 {
            return Err(SerdeError::custom("Invalid hex length"));
        }

        let decoded_hex = hex::decode(hex).map_err(SerdeError::custom)?;
        let bytes: [u8; ADDRESS_SIZE] = decoded_hex
            .try_into()
            .map_err(|_| SerdeError::custom("Could not transform hex to bytes array for Address"))?;
        Ok(Address::new(bytes))
    }
}

/// Derive an engine-owned address from a domain tag and arbitrary data
///
/// Formula: address = blake3(domain || ":" || data)
pub fn derive_address(domain: &str, data: &[u8]) -> Address {
    let mut hasher = Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(b":");
    hasher.update(data);
    Address(*hasher.finalize().as_bytes())
}

/// Compute the deterministic address of a per-beneficiary account (CREATE2-style)
///
/// Formula: address = blake3(0xff || factory || beneficiary)
///
/// Any caller can compute the address before the account exists.
pub fn compute_deterministic_account_address(factory: &Address, beneficiary: &Address) -> Address {
    let mut data = Vec::with_capacity(1 + ADDRESS_SIZE * 2);
    data.push(0xff);
    data.extend_from_slice(factory.as_bytes());
    data.extend_from_slice(beneficiary.as_bytes());
    Address(*blake3::hash(&data).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_address_computation() {
        let factory = derive_address("DEMY_VESTING_FACTORY", b"main");
        let alice = Address::new([1u8; 32]);
        let bob = Address::new([2u8; 32]);

        let a1 = compute_deterministic_account_address(&factory, &alice);
        let a2 = compute_deterministic_account_address(&factory, &alice);
        assert_eq!(a1, a2);
        assert_ne!(a1, compute_deterministic_account_address(&factory, &bob));

        // Same beneficiary under another factory lands elsewhere
        let other = derive_address("DEMY_VESTING_FACTORY", b"other");
        assert_ne!(a1, compute_deterministic_account_address(&other, &alice));
    }

    #[test]
    fn test_address_hex_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let address = derive_address("TEST", b"roundtrip");
        let json = serde_json::to_string(&address)?;
        let decoded: Address = serde_json::from_str(&json)?;
        assert_eq!(address, decoded);

        let parsed: Address = format!("0x{}", address.to_hex()).parse()?;
        assert_eq!(address, parsed);
        Ok(())
    }

    #[test]
    fn test_address_rejects_bad_length() {
        assert!(serde_json::from_str::<Address>("\"abcd\"").is_err());
        assert!("zz".parse::<Address>().is_err());
    }
}
