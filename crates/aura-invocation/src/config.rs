//! Chain runtime configuration.

use crate::errors::{InvocationError, InvocationResult};
use serde::{Deserialize, Serialize};

/// Observability settings applied to a chain
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    /// Label attached to the chain's log events and descriptor
    pub label: Option<String>,
    /// Emit a trace event for every link dispatch
    pub trace_links: bool,
}

impl ChainConfig {
    /// Create a configuration with the given label
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Parse and validate a configuration from TOML
    pub fn from_toml_str(content: &str) -> InvocationResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            InvocationError::application("InvalidConfiguration", format!("Invalid TOML: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> InvocationResult<()> {
        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(InvocationError::application(
                    "InvalidConfiguration",
                    "chain label must not be blank",
                ));
            }
        }
        Ok(())
    }
}
