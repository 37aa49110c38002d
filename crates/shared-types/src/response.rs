//! The single reply produced for each request.

use crate::envelope::Envelope;
use crate::errors::ErrorReply;
use serde::{Deserialize, Serialize};

/// Exactly one of a success payload (possibly empty) or a classified error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Success(Envelope),
    Error(ErrorReply),
}

impl Response {
    pub fn empty() -> Self {
        Response::Success(Envelope::new())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn payload(&self) -> Option<&Envelope> {
        match self {
            Response::Success(env) => Some(env),
            Response::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorReply> {
        match self {
            Response::Success(_) => None,
            Response::Error(reply) => Some(reply),
        }
    }
}

impl From<Result<Envelope, ErrorReply>> for Response {
    fn from(result: Result<Envelope, ErrorReply>) -> Self {
        match result {
            Ok(env) => Response::Success(env),
            Err(reply) => Response::Error(reply),
        }
    }
}
