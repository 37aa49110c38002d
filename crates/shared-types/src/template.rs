//! # Recovery Templates
//!
//! A recovery template describes how a pool's key is split among tokens:
//! one primary configuration (normally a single local token) and any number
//! of recovery configurations, each requiring `threshold` of its `parts`.
//!
//! Templates travel as opaque bytes inside requests and are decoded through
//! the [`TemplateDecoder`] port.

use crate::errors::{Classified, ErrorKind};
use crate::guid::Guid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    Primary,
    Recovery,
}

impl ConfigKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKind::Primary => "primary",
            ConfigKind::Recovery => "recovery",
        }
    }
}

/// One token participating in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePart {
    #[serde(default)]
    pub name: Option<String>,
    pub guid: Guid,
}

/// An n-of-m configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub kind: ConfigKind,
    pub threshold: u8,
    pub parts: Vec<TemplatePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryTemplate {
    pub configs: Vec<TemplateConfig>,
}

impl RecoveryTemplate {
    /// Structural checks applied after decoding.
    pub fn validate(&self) -> Result<(), TemplateDecodeError> {
        if self.configs.is_empty() {
            return Err(TemplateDecodeError::NoConfigs);
        }
        for (index, config) in self.configs.iter().enumerate() {
            let parts = config.parts.len();
            if config.threshold == 0 || usize::from(config.threshold) > parts {
                return Err(TemplateDecodeError::BadThreshold {
                    config: index,
                    threshold: config.threshold,
                    parts,
                });
            }
        }
        Ok(())
    }

    pub fn config(&self, index: usize) -> Option<&TemplateConfig> {
        self.configs.get(index)
    }
}

#[derive(Debug, Error)]
pub enum TemplateDecodeError {
    #[error("template is not well-formed")]
    Syntax(#[source] serde_json::Error),

    #[error("template has no configurations")]
    NoConfigs,

    #[error("config {config}: threshold {threshold} invalid for {parts} parts")]
    BadThreshold {
        config: usize,
        threshold: u8,
        parts: usize,
    },
}

impl Classified for TemplateDecodeError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::DecodeError
    }
}

/// Decodes template bytes received from clients.
pub trait TemplateDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<RecoveryTemplate, TemplateDecodeError>;
}

/// Decodes templates serialized as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTemplateDecoder;

impl TemplateDecoder for JsonTemplateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RecoveryTemplate, TemplateDecodeError> {
        let template: RecoveryTemplate =
            serde_json::from_slice(bytes).map_err(TemplateDecodeError::Syntax)?;
        template.validate()?;
        Ok(template)
    }
}
