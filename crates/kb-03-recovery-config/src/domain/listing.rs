//! Envelope rendering of a [`RecoveryListing`].

use crate::domain::state::RecoveryListing;
use shared_types::{fields, Envelope, RecoveryTemplate, TemplateConfig};

impl RecoveryListing {
    pub fn to_envelope(&self) -> Envelope {
        let mut env = Envelope::new().with(fields::STAGED, self.staged);
        if let Some(effective) = &self.effective {
            env.insert(fields::EFFECTIVE, describe(effective));
        }
        if let Some(pending) = &self.pending {
            env.insert(fields::PENDING, describe(pending));
        }
        env
    }
}

fn describe(template: &RecoveryTemplate) -> Vec<Envelope> {
    template.configs.iter().map(describe_config).collect()
}

fn describe_config(config: &TemplateConfig) -> Envelope {
    let parts: Vec<Envelope> = config
        .parts
        .iter()
        .map(|part| {
            let mut env = Envelope::new();
            if let Some(name) = &part.name {
                env.insert(fields::NAME, name.as_str());
            }
            env.with(fields::GUID, part.guid.to_string())
        })
        .collect();
    Envelope::new()
        .with(fields::KIND, config.kind.as_str())
        .with(fields::THRESHOLD, u32::from(config.threshold))
        .with(fields::PARTS, parts)
}
