//! Pool and dataset name syntax.

use thiserror::Error;

/// Longest pool name accepted, in bytes.
pub const MAX_POOL_NAME_LEN: usize = 255;

const RESERVED_POOL_PREFIXES: [&str; 4] = ["mirror", "raidz", "draid", "spare"];
const RESERVED_POOL_NAMES: [&str; 1] = ["log"];

/// Why a name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name is empty")]
    Empty,
    #[error("name is {0} bytes, longer than {max}", max = MAX_POOL_NAME_LEN)]
    TooLong(usize),
    #[error("name must begin with a letter")]
    BadStart,
    #[error("name contains invalid character {0:?}")]
    InvalidChar(char),
    #[error("name begins with reserved word '{0}'")]
    Reserved(&'static str),
    #[error("name looks like a disk device")]
    DiskLike,
    #[error("snapshots and bookmarks cannot hold keys")]
    NotADataset,
}

/// Check `name` against pool naming rules.
pub fn validate_pool_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.len() > MAX_POOL_NAME_LEN {
        return Err(NameError::TooLong(name.len()));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | ' ')))
    {
        return Err(NameError::InvalidChar(c));
    }
    let bytes = name.as_bytes();
    if !bytes[0].is_ascii_alphabetic() {
        return Err(NameError::BadStart);
    }
    if let Some(prefix) = RESERVED_POOL_PREFIXES.iter().find(|p| name.starts_with(**p)) {
        return Err(NameError::Reserved(prefix));
    }
    if let Some(reserved) = RESERVED_POOL_NAMES.iter().find(|r| name == **r) {
        return Err(NameError::Reserved(reserved));
    }
    if bytes[0] == b'c' && bytes.get(1).is_some_and(u8::is_ascii_digit) {
        return Err(NameError::DiskLike);
    }
    Ok(())
}

/// Check that `name` names a filesystem or volume.
pub fn validate_dataset_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.contains(['@', '#']) {
        return Err(NameError::NotADataset);
    }
    Ok(())
}
