//! Orchestrator policy configuration loaded via `ortho-config`.

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Disk template prefix that allows clone sources on non-root volumes.
pub const DEFAULT_EXTENDED_TEMPLATE_PREFIX: &str = "ext_";

/// Prefix prepended to volume identifiers to form their backend identity.
pub const DEFAULT_BACKEND_VOLUME_PREFIX: &str = "vol-";

/// Policy settings passed to [`crate::VolumeOrchestrator::new`].
///
/// Values merge defaults, `volwright.toml`, and `VOLWRIGHT_*` environment
/// variables in that order of precedence.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "VOLWRIGHT",
    discovery(
        app_name = "volwright",
        env_var = "VOLWRIGHT_CONFIG_PATH",
        config_file_name = "volwright.toml",
        dotfile_name = ".volwright.toml",
        project_file_name = "volwright.toml"
    )
)]
pub struct OrchestratorConfig {
    /// Disk templates starting with this prefix accept clone sources for
    /// every volume, not only the root volume.
    #[ortho_config(default = DEFAULT_EXTENDED_TEMPLATE_PREFIX.to_owned())]
    pub extended_template_prefix: String,
    /// Default for `delete_on_termination` when a request does not set it.
    /// Unset means `true`; see [`Self::delete_on_termination_default`].
    pub delete_on_termination: Option<bool>,
    /// Prefix used to derive a volume's backend identity from its id.
    #[ortho_config(default = DEFAULT_BACKEND_VOLUME_PREFIX.to_owned())]
    pub backend_volume_prefix: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            extended_template_prefix: DEFAULT_EXTENDED_TEMPLATE_PREFIX.to_owned(),
            delete_on_termination: None,
            backend_volume_prefix: DEFAULT_BACKEND_VOLUME_PREFIX.to_owned(),
        }
    }
}

impl OrchestratorConfig {
    /// Loads configuration without parsing CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when merging sources fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("volwright")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the `delete_on_termination` value applied to requests that
    /// leave it unset.
    #[must_use]
    pub fn delete_on_termination_default(&self) -> bool {
        self.delete_on_termination.unwrap_or(true)
    }

    /// Returns `true` when `disk_template` accepts clone sources on any
    /// volume.
    #[must_use]
    pub fn is_extended_template(&self, disk_template: &str) -> bool {
        disk_template.starts_with(&self.extended_template_prefix)
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and the configuration key that set the value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a prefix is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.extended_template_prefix,
            "extended disk template prefix",
            "VOLWRIGHT_EXTENDED_TEMPLATE_PREFIX",
            "extended_template_prefix",
        )?;
        Self::require_field(
            &self.backend_volume_prefix,
            "backend volume prefix",
            "VOLWRIGHT_BACKEND_VOLUME_PREFIX",
            "backend_volume_prefix",
        )
    }

    fn require_field(
        value: &str,
        description: &str,
        env_var: &str,
        toml_key: &str,
    ) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {description}: set {env_var} or add {toml_key} to volwright.toml"
            )));
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}
