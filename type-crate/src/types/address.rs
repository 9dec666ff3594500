use core::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512_256};
use thiserror::Error;

const CHECKSUM_LEN: usize = 4;
const APP_ID_ADDRESS_PREFIX: &[u8] = b"appID";

/// A 32-byte ed25519 public key identifying a ledger account.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 32]);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is not valid base32: {0}")]
    InvalidEncoding(String),
    #[error("address decodes to {0} bytes, expected 36")]
    InvalidLength(usize),
    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0; 32]);

    /// Construct from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    /// Return the raw byte array.
    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(Address(array))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Escrow account controlled by the application `app_id`.
    pub fn for_application(app_id: u64) -> Self {
        let mut hasher = Sha512_256::new();
        hasher.update(APP_ID_ADDRESS_PREFIX);
        hasher.update(app_id.to_be_bytes());
        Address(hasher.finalize().into())
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let digest = Sha512_256::digest(self.0);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        checksum
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::ZERO
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(32 + CHECKSUM_LEN);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&self.checksum());
        write!(f, "{}", BASE32_NOPAD.encode(&raw))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|err| AddressError::InvalidEncoding(err.to_string()))?;
        if raw.len() != 32 + CHECKSUM_LEN {
            return Err(AddressError::InvalidLength(raw.len()));
        }
        let (key, checksum) = raw.split_at(32);
        let address = Address::from_slice(key).ok_or(AddressError::InvalidLength(raw.len()))?;
        if address.checksum() != checksum {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(address)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::from_str(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn zero_address_text() {
        assert_eq!(
            Address::ZERO.to_string(),
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
        );
    }

    #[test]
    fn text_round_trip() {
        let address = Address::new([7u8; 32]);
        let text = address.to_string();
        assert_eq!(text.len(), 58);
        assert_eq!(Address::from_str(&text).unwrap(), address);
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut text = Address::new([7u8; 32]).to_string();
        // Flip the final character, which lives entirely inside the checksum.
        let last = text.pop().unwrap();
        text.push(if last == 'A' { 'B' } else { 'A' });
        assert_matches!(
            Address::from_str(&text),
            Err(AddressError::ChecksumMismatch) | Err(AddressError::InvalidEncoding(_))
        );
    }

    #[test]
    fn rejects_short_input() {
        assert_matches!(
            Address::from_str("AAAAAAAA"),
            Err(AddressError::InvalidLength(5))
        );
    }

    #[test]
    fn application_addresses_differ_per_app() {
        assert_ne!(Address::for_application(1), Address::for_application(2));
        assert!(!Address::for_application(1).is_zero());
    }
}
