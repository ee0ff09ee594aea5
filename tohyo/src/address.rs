use crate::*;
use digest::Digest;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// An account identity
///
/// Owners, voters and candidates are all identified by a 20 byte address,
/// written as `0x` followed by 40 hex digits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address
    pub const ZERO: Address = Address([0; 20]);

    /// Generate a fresh random address
    pub fn random() -> Self {
        let mut csprng = rand::rngs::OsRng {};
        let bytes: [u8; 20] = csprng.gen();
        Address(bytes)
    }

    /// Derive the address of an election deployed by `deployer`.
    ///
    /// The same deployer and nonce always give the same address.
    pub fn derive(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = sha2::Sha512::new();
        hasher.update(&deployer.0);
        hasher.update(&nonce.to_be_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let bytes = hex::decode(s).map_err(|e| match e {
            hex::FromHexError::OddLength => Error::AddressBadLen,
            _ => Error::AddressBadHex,
        })?;
        if bytes.len() != 20 {
            return Err(Error::AddressBadLen);
        }

        let mut address = [0u8; 20];
        address.copy_from_slice(&bytes);
        Ok(Address(address))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let text = "0x1234567890123456789012345678901234567890";
        let address = Address::from_str(text).unwrap();
        assert_eq!(address.to_string(), text);

        // Prefix is optional and case is ignored
        let upper = Address::from_str("0987654321098765432109876543210987654ABC").unwrap();
        assert_eq!(
            upper.to_string(),
            "0x0987654321098765432109876543210987654abc"
        );
    }

    #[test]
    fn reject_malformed() {
        assert!(matches!(
            Address::from_str("0x12345"),
            Err(Error::AddressBadLen)
        ));
        assert!(matches!(
            Address::from_str("0x1234"),
            Err(Error::AddressBadLen)
        ));
        assert!(matches!(
            Address::from_str("0xzz34567890123456789012345678901234567890"),
            Err(Error::AddressBadHex)
        ));
    }

    #[test]
    fn derive_is_deterministic() {
        let deployer = Address::random();
        assert_eq!(Address::derive(&deployer, 0), Address::derive(&deployer, 0));
        assert_ne!(Address::derive(&deployer, 0), Address::derive(&deployer, 1));
        assert_ne!(Address::random(), Address::random());
    }

    #[test]
    fn serde_as_string() {
        let address = Address::from_str("0x1234567890123456789012345678901234567890").unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0x1234567890123456789012345678901234567890\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
