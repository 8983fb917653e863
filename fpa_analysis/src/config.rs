//! Driver configuration.
//!
//! ```toml
//! [shared]
//! log_level = "info"
//!
//! [analysis]
//! root = "top"
//! mode = "restricted"
//! policy = "shortest"
//! ```
//!
//! Every table and key is optional. Command-line flags override the file.

use std::path::Path;

use fpa_common::config::{ConfigError, ConfigLoader, SharedConfig};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisMode;
use crate::populate::PopulationPolicy;

// ─── Config Types ───────────────────────────────────────────────────

/// Construction mode as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    /// Deepest policy plus binding synthesis.
    #[default]
    Default,
    /// `policy` over connections only.
    Restricted,
}

/// `[analysis]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSection {
    /// Path of the root node. Defaults to the model's root.
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub mode: ModeSetting,
    #[serde(default)]
    pub policy: PopulationPolicy,
}

/// Top-level driver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub analysis: AnalysisSection,
}

impl AnalysisConfig {
    /// Reject combinations the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.analysis.mode == ModeSetting::Default
            && self.analysis.policy != PopulationPolicy::Deepest
        {
            return Err(ConfigError::ValidationError(format!(
                "policy \"{}\" requires mode = \"restricted\"",
                self.analysis.policy
            )));
        }
        if let Some(root) = &self.analysis.root {
            if root.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "analysis.root cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Mode to build the analysis with.
    pub fn analysis_mode(&self) -> AnalysisMode {
        match self.analysis.mode {
            ModeSetting::Default => AnalysisMode::Default,
            ModeSetting::Restricted => AnalysisMode::Restricted(self.analysis.policy),
        }
    }
}

// ─── Loading ────────────────────────────────────────────────────────

/// Load and validate a driver configuration file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let config = AnalysisConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a driver configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<AnalysisConfig, ConfigError> {
    let config = AnalysisConfig::parse(content)?;
    config.validate()?;
    Ok(config)
}
