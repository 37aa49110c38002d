//! # Error Types
//!
//! Every failure reported to a client carries exactly one [`ErrorKind`], a
//! human-readable message, and the chain of underlying causes.
//!
//! Subsystem crates define their own `thiserror` enums and implement
//! [`Classified`] for them. The runtime turns the top-level error into an
//! [`ErrorReply`] by walking [`std::error::Error::source`].

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

/// Error classification visible to clients.
///
/// Variant names are the wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A required field is missing, mistyped or malformed.
    ParameterError,
    /// A supplied GUID has the wrong length.
    #[allow(clippy::upper_case_acronyms)]
    InvalidGUID,
    /// The command tag is missing, unreadable or unknown.
    InvalidCommand,
    /// The request is well-formed but not valid for the current state.
    ArgumentError,
    /// The dataset's key is already loaded.
    AlreadyUnlocked,
    /// A named token or pool does not exist.
    NotFoundError,
    /// The storage layer could not answer an existence query.
    StorageQueryError,
    /// Dataset metadata could not be read.
    ZfsError,
    /// The storage layer refused the key.
    KeyLoadError,
    /// The token layer failed.
    TokenError,
    /// A recovery box could not be fetched or opened.
    RecoveryBoxError,
    /// A recovery template could not be decoded.
    DecodeError,
    /// Pool provisioning failed.
    ProvisioningError,
    /// The recovery handshake failed or is in the wrong state.
    RecoveryError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ParameterError => "ParameterError",
            ErrorKind::InvalidGUID => "InvalidGUID",
            ErrorKind::InvalidCommand => "InvalidCommand",
            ErrorKind::ArgumentError => "ArgumentError",
            ErrorKind::AlreadyUnlocked => "AlreadyUnlocked",
            ErrorKind::NotFoundError => "NotFoundError",
            ErrorKind::StorageQueryError => "StorageQueryError",
            ErrorKind::ZfsError => "ZfsError",
            ErrorKind::KeyLoadError => "KeyLoadError",
            ErrorKind::TokenError => "TokenError",
            ErrorKind::RecoveryBoxError => "RecoveryBoxError",
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::ProvisioningError => "ProvisioningError",
            ErrorKind::RecoveryError => "RecoveryError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error that knows which [`ErrorKind`] it reports as.
pub trait Classified: StdError {
    fn kind(&self) -> ErrorKind;

    /// Underlying system error number, when the failure came from one.
    fn errno(&self) -> Option<i32> {
        None
    }
}

/// One link in a cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCause {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ErrorCause>>,
}

impl ErrorCause {
    fn chain(mut source: Option<&(dyn StdError + 'static)>) -> Option<Box<ErrorCause>> {
        let mut messages = Vec::new();
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }
        messages.into_iter().rev().fold(None, |cause, message| {
            Some(Box::new(ErrorCause { message, cause }))
        })
    }

    /// Iterate over this cause and everything beneath it.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorCause> {
        std::iter::successors(Some(self), |c| c.cause.as_deref())
    }
}

/// The error half of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ErrorCause>>,
}

impl ErrorReply {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errno: None,
            cause: None,
        }
    }

    /// Build a reply from a classified error, capturing its source chain.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: Classified + 'static,
    {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            errno: err.errno(),
            cause: ErrorCause::chain(err.source()),
        }
    }

    /// Messages of every cause, outermost first.
    pub fn cause_messages(&self) -> Vec<&str> {
        self.cause
            .as_deref()
            .map(|c| c.iter().map(|c| c.message.as_str()).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for ErrorReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        for message in self.cause_messages() {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}
