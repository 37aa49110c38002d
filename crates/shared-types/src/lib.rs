//! # Shared Types Crate
//!
//! Types shared by every keybroker subsystem.
//!
//! ## Contents
//!
//! - **Envelope**: the insertion-ordered, typed name/value container used for
//!   every request and response.
//! - **Identity**: token GUIDs and token descriptors.
//! - **Commands**: the closed set of command tags and well-known field names.
//! - **Errors**: the error-kind taxonomy and the reply shape sent to clients.
//! - **Recovery**: recovery templates, recovery boxes and recovered keys.
//!
//! Subsystem crates depend on this crate and never on each other, with the
//! exception of the system-identity store which several subsystems share.

pub mod command;
pub mod envelope;
pub mod errors;
pub mod guid;
pub mod naming;
pub mod recovery;
pub mod response;
pub mod template;
pub mod token;

pub use command::{fields, CommandTag, Pid};
pub use envelope::{Envelope, EnvelopeError, Field, LookupExt, Value};
pub use errors::{Classified, ErrorCause, ErrorKind, ErrorReply};
pub use guid::{Guid, GuidLengthError, GuidParseError, GUID_LEN};
pub use naming::{validate_dataset_name, validate_pool_name, NameError, MAX_POOL_NAME_LEN};
pub use recovery::{RecoveredKey, RecoveryBox};
pub use response::Response;
pub use template::{
    ConfigKind, JsonTemplateDecoder, RecoveryTemplate, TemplateConfig, TemplateDecodeError,
    TemplateDecoder, TemplatePart,
};
pub use token::Token;
