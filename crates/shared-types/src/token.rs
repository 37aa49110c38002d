//! PIV token descriptor.

use crate::guid::Guid;
use serde::{Deserialize, Serialize};

/// A hardware token known to the token directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub guid: Guid,
    /// Reader or card label, informational only.
    #[serde(default)]
    pub label: Option<String>,
}

impl Token {
    pub fn new(guid: Guid) -> Self {
        Self { guid, label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
