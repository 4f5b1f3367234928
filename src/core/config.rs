//! Workflow configuration
//!
//! Loaded from a YAML file; every field has a default so a missing or partial
//! file is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entities::classification::OutcomeType;
use crate::yaml::{parse_yaml_file, YamlError};

/// Business rules that organizations tune
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Sentinel events cannot be closed without at least one CAPA
    pub sentinel_requires_capa: bool,

    /// Sentinel events cannot be closed until someone acknowledges them
    pub require_sentinel_acknowledgement: bool,

    /// Outcome types that cannot be closed without at least one CAPA
    pub capa_required_for: Vec<OutcomeType>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            sentinel_requires_capa: true,
            require_sentinel_acknowledgement: false,
            capa_required_for: vec![
                OutcomeType::AlteracaoProcesso,
                OutcomeType::ManutencaoCorretiva,
            ],
        }
    }
}

impl WorkflowConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, YamlError> {
        let config: Self = parse_yaml_file(path)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded workflow config");
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    ///
    /// A path that was given but cannot be read is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, YamlError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Whether closing an outcome of this type needs a CAPA
    pub fn requires_capa(&self, tipo: OutcomeType) -> bool {
        self.capa_required_for.contains(&tipo)
    }
}
