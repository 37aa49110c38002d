//! Command tags and well-known envelope field names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process id of a requesting client, taken from the socket peer credentials.
pub type Pid = i32;

/// Integer command tags carried in the `command` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum CommandTag {
    UnlockDataset = 1,
    CreatePool = 2,
    RecoverStart = 3,
    RecoverResp = 4,
    AddRecovery = 5,
    ListRecovery = 6,
    ActivateRecovery = 7,
    CancelRecovery = 8,
    SetSystemToken = 9,
    SetSystemPool = 10,
}

impl CommandTag {
    pub const ALL: [CommandTag; 10] = [
        CommandTag::UnlockDataset,
        CommandTag::CreatePool,
        CommandTag::RecoverStart,
        CommandTag::RecoverResp,
        CommandTag::AddRecovery,
        CommandTag::ListRecovery,
        CommandTag::ActivateRecovery,
        CommandTag::CancelRecovery,
        CommandTag::SetSystemToken,
        CommandTag::SetSystemPool,
    ];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandTag::UnlockDataset => "unlock_dataset",
            CommandTag::CreatePool => "create_pool",
            CommandTag::RecoverStart => "recover_start",
            CommandTag::RecoverResp => "recover_resp",
            CommandTag::AddRecovery => "add_recovery",
            CommandTag::ListRecovery => "list_recovery",
            CommandTag::ActivateRecovery => "activate_recovery",
            CommandTag::CancelRecovery => "cancel_recovery",
            CommandTag::SetSystemToken => "set_system_token",
            CommandTag::SetSystemPool => "set_system_pool",
        }
    }
}

impl TryFrom<i32> for CommandTag {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        CommandTag::ALL
            .into_iter()
            .find(|tag| tag.as_i32() == value)
            .ok_or(value)
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Envelope field names.
pub mod fields {
    // Requests
    pub const COMMAND: &str = "command";
    pub const DATASET: &str = "dataset";
    pub const GUID: &str = "guid";
    pub const TEMPLATE: &str = "template";
    pub const RECOVERY_TOKEN: &str = "recovery_token";
    pub const STAGE: &str = "stage";
    pub const POOL: &str = "pool";
    pub const CONFIG: &str = "config";
    pub const RESPONSE: &str = "response";

    // Responses
    pub const STAGED: &str = "staged";
    pub const EFFECTIVE: &str = "effective";
    pub const PENDING: &str = "pending";
    pub const CHALLENGES: &str = "challenges";
    pub const REMAINING: &str = "remaining";
    pub const COMPLETE: &str = "complete";

    // Nested entries
    pub const KIND: &str = "kind";
    pub const THRESHOLD: &str = "threshold";
    pub const PARTS: &str = "parts";
    pub const NAME: &str = "name";
    pub const PART: &str = "part";
    pub const CHALLENGE: &str = "challenge";
}
