//! Orchestrator configuration

use crate::frame::DEFAULT_PREVIEW_ROWS;
use crate::schema;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default prefix of generated destination keys.
pub const DEFAULT_DESTINATION_PREFIX: &str = "predictions_";

/// Settings for a [`ScoringOrchestrator`](crate::orchestrator::ScoringOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Maximum rows in an attached predictions preview
    pub preview_rows: usize,
    /// Prefix of destination keys generated by `predict`
    pub destination_prefix: String,
    /// Wire schema versions to serve
    pub schema_versions: Vec<u32>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            destination_prefix: DEFAULT_DESTINATION_PREFIX.to_string(),
            schema_versions: vec![schema::v3::VERSION],
        }
    }
}

impl OrchestratorConfig {
    /// Create a configuration builder
    #[must_use]
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }

    /// Check that the configuration can be served.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero preview size or an empty version
    /// list, and [`Error::UnsupportedVersion`] for an unknown version
    pub fn validate(&self) -> Result<()> {
        if self.preview_rows == 0 {
            return Err(Error::Config("preview_rows must be positive".to_string()));
        }
        if self.schema_versions.is_empty() {
            return Err(Error::Config(
                "at least one schema version must be enabled".to_string(),
            ));
        }
        for &version in &self.schema_versions {
            schema::lookup(version)?;
        }
        Ok(())
    }
}

/// Builder for [`OrchestratorConfig`]
#[derive(Debug, Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    /// Set the maximum preview size
    #[must_use]
    pub const fn preview_rows(mut self, rows: usize) -> Self {
        self.config.preview_rows = rows;
        self
    }

    /// Set the generated destination key prefix
    #[must_use]
    pub fn destination_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.destination_prefix = prefix.into();
        self
    }

    /// Set the served schema versions
    #[must_use]
    pub fn schema_versions(mut self, versions: impl Into<Vec<u32>>) -> Self {
        self.config.schema_versions = versions.into();
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if validation fails
    pub fn build(self) -> Result<OrchestratorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.preview_rows, 100);
        assert_eq!(config.destination_prefix, "predictions_");
        assert_eq!(config.schema_versions, vec![3]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = OrchestratorConfig::builder()
            .preview_rows(10)
            .destination_prefix("preds_")
            .schema_versions([3])
            .build()
            .unwrap();
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.destination_prefix, "preds_");
    }

    #[test]
    fn test_builder_rejects_zero_preview() {
        let err = OrchestratorConfig::builder().preview_rows(0).build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_rejects_unknown_version() {
        let err = OrchestratorConfig::builder()
            .schema_versions(vec![2])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { version: 2, .. }));
    }

    #[test]
    fn test_builder_rejects_no_versions() {
        let err = OrchestratorConfig::builder()
            .schema_versions(Vec::new())
            .build()
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{ "preview_rows": 25 }"#).unwrap();
        assert_eq!(config.preview_rows, 25);
        assert_eq!(config.schema_versions, vec![3]);
    }
}
