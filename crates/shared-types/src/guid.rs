//! # Token GUIDs
//!
//! A PIV token is identified by a fixed-length 16-byte GUID. GUIDs are
//! rendered as uppercase hex on the wire and in logs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Length in bytes of a token GUID.
pub const GUID_LEN: usize = 16;

/// A GUID of the wrong length was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("GUID must be {expected} bytes, got {actual}", expected = GUID_LEN)]
pub struct GuidLengthError {
    pub actual: usize,
}

/// Token GUID.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid([u8; GUID_LEN]);

impl Guid {
    pub const fn new(bytes: [u8; GUID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a GUID from a byte slice, rejecting any length other than
    /// [`GUID_LEN`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, GuidLengthError> {
        let arr: [u8; GUID_LEN] = bytes
            .try_into()
            .map_err(|_| GuidLengthError { actual: bytes.len() })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; GUID_LEN] {
        &self.0
    }

    /// Constant-time comparison against raw bytes.
    pub fn ct_eq_bytes(&self, other: &[u8]) -> bool {
        other.len() == GUID_LEN && bool::from(self.0.ct_eq(other))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

/// Parse failure for a hex GUID.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuidParseError {
    #[error("GUID is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Length(#[from] GuidLengthError),
}

impl FromStr for Guid {
    type Err = GuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Ok(Self::from_slice(&bytes)?)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert_eq!(Guid::from_slice(&[0u8; 15]), Err(GuidLengthError { actual: 15 }));
        assert_eq!(Guid::from_slice(&[0u8; 17]), Err(GuidLengthError { actual: 17 }));
        assert!(Guid::from_slice(&[7u8; GUID_LEN]).is_ok());
    }

    #[test]
    fn test_display_is_uppercase_hex() {
        let guid = Guid::new([0xab; GUID_LEN]);
        assert_eq!(guid.to_string(), "AB".repeat(GUID_LEN));
        assert_eq!(guid.to_string().parse::<Guid>().unwrap(), guid);
    }

    #[test]
    fn test_parse_accepts_lowercase() {
        let parsed: Guid = "0a".repeat(GUID_LEN).parse().unwrap();
        assert_eq!(parsed, Guid::new([0x0a; GUID_LEN]));
    }

    #[test]
    fn test_ct_eq_bytes() {
        let guid = Guid::new([1; GUID_LEN]);
        assert!(guid.ct_eq_bytes(&[1; GUID_LEN]));
        assert!(!guid.ct_eq_bytes(&[2; GUID_LEN]));
        assert!(!guid.ct_eq_bytes(&[1; 4]));
    }
}
