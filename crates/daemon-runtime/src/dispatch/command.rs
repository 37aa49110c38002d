//! Closed set of decoded commands.
//!
//! Decoding consumes the request envelope. After this point an unhandled
//! command cannot be expressed.

use kb_04_pool_create::PoolCreateRequest;
use shared_types::{fields, CommandTag, Envelope, EnvelopeError, LookupExt};

use super::error::DispatchError;

/// A request with its fields extracted and typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    UnlockDataset { dataset: String },
    CreatePool(PoolCreateRequest),
    RecoverStart { config: Option<u32> },
    RecoverResp { response: Vec<u8> },
    AddRecovery { template: Vec<u8>, stage: bool },
    ListRecovery,
    ActivateRecovery,
    CancelRecovery,
    SetSystemToken { guid: Vec<u8> },
    SetSystemPool { pool: String },
}

impl Command {
    /// Decode a request envelope.
    ///
    /// # Errors
    ///
    /// - `UnreadableCommand`: `command` is absent or not an int32
    /// - `UnknownCommand`: `command` is not a known tag
    /// - `Field`: a required field is absent, or any field has the wrong type
    pub fn decode(mut request: Envelope) -> Result<Self, DispatchError> {
        let raw = request
            .lookup_i32(fields::COMMAND)
            .map_err(DispatchError::UnreadableCommand)?;
        let tag = CommandTag::try_from(raw).map_err(DispatchError::UnknownCommand)?;
        Self::decode_fields(tag, &mut request).map_err(|source| DispatchError::Field {
            command: tag,
            source,
        })
    }

    fn decode_fields(tag: CommandTag, request: &mut Envelope) -> Result<Self, EnvelopeError> {
        let command = match tag {
            CommandTag::UnlockDataset => Command::UnlockDataset {
                dataset: request.take_string(fields::DATASET)?,
            },
            CommandTag::CreatePool => Command::CreatePool(PoolCreateRequest {
                dataset: request.take_string(fields::DATASET).optional()?,
                guid: request.take_bytes(fields::GUID).optional()?,
                template: request.take_bytes(fields::TEMPLATE).optional()?,
                recovery_token: request.take_bytes(fields::RECOVERY_TOKEN).optional()?,
            }),
            CommandTag::RecoverStart => Command::RecoverStart {
                config: request.optional_u32(fields::CONFIG)?,
            },
            CommandTag::RecoverResp => Command::RecoverResp {
                response: request.take_bytes(fields::RESPONSE)?,
            },
            CommandTag::AddRecovery => Command::AddRecovery {
                template: request.take_bytes(fields::TEMPLATE)?,
                stage: request.lookup_bool(fields::STAGE)?,
            },
            CommandTag::ListRecovery => Command::ListRecovery,
            CommandTag::ActivateRecovery => Command::ActivateRecovery,
            CommandTag::CancelRecovery => Command::CancelRecovery,
            CommandTag::SetSystemToken => Command::SetSystemToken {
                guid: request.take_bytes(fields::GUID)?,
            },
            CommandTag::SetSystemPool => Command::SetSystemPool {
                pool: request.take_string(fields::POOL)?,
            },
        };
        Ok(command)
    }

    pub fn tag(&self) -> CommandTag {
        match self {
            Command::UnlockDataset { .. } => CommandTag::UnlockDataset,
            Command::CreatePool(_) => CommandTag::CreatePool,
            Command::RecoverStart { .. } => CommandTag::RecoverStart,
            Command::RecoverResp { .. } => CommandTag::RecoverResp,
            Command::AddRecovery { .. } => CommandTag::AddRecovery,
            Command::ListRecovery => CommandTag::ListRecovery,
            Command::ActivateRecovery => CommandTag::ActivateRecovery,
            Command::CancelRecovery => CommandTag::CancelRecovery,
            Command::SetSystemToken { .. } => CommandTag::SetSystemToken,
            Command::SetSystemPool { .. } => CommandTag::SetSystemPool,
        }
    }
}
