//! Planner configuration file support.
//!
//! Reads catalog locations, user-defined setups and recommendation thresholds from
//! a TOML file. Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PlannerError;
use crate::models::CustomSetup;

/// Planner configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    /// Camera + optic pairings added to the catalog's setups
    #[serde(default)]
    pub custom_setups: Vec<CustomSetup>,
}

/// Catalog sources. Bundled catalogs are used for missing paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub targets: Option<PathBuf>,
    #[serde(default)]
    pub gear: Option<PathBuf>,
}

/// Recommendation thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    #[serde(default = "default_gear_match_threshold")]
    pub gear_match_threshold: u8,
    #[serde(default = "default_suitable_setup_min_score")]
    pub suitable_setup_min_score: u8,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            gear_match_threshold: default_gear_match_threshold(),
            suitable_setup_min_score: default_suitable_setup_min_score(),
        }
    }
}

fn default_min_score() -> u8 {
    0
}

fn default_gear_match_threshold() -> u8 {
    60
}

fn default_suitable_setup_min_score() -> u8 {
    50
}

impl PlannerConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self, PlannerError> {
        let config: PlannerConfig = toml::from_str(content).map_err(|e| {
            PlannerError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load planner configuration from a TOML file.
    ///
    /// Relative catalog paths are resolved against the file's directory.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PlannerConfig)` if successful
    /// * `Err(PlannerError::Configuration)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PlannerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PlannerError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.catalog.targets = config.catalog.targets.map(|p| resolve_relative(base, p));
            config.catalog.gear = config.catalog.gear.map(|p| resolve_relative(base, p));
        }
        Ok(config)
    }

    /// Load planner configuration from the default location.
    ///
    /// Searches for `planner.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, PlannerError> {
        let search_paths = [
            PathBuf::from("planner.toml"),
            PathBuf::from("backend/planner.toml"),
            PathBuf::from("../planner.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(PlannerError::Configuration(
            "No planner.toml found in standard locations".to_string(),
        ))
    }

    fn validate(&self) -> Result<(), PlannerError> {
        let settings = &self.recommendation;
        for (name, value) in [
            ("min_score", settings.min_score),
            ("gear_match_threshold", settings.gear_match_threshold),
            ("suitable_setup_min_score", settings.suitable_setup_min_score),
        ] {
            if value > 100 {
                return Err(PlannerError::Configuration(format!(
                    "recommendation.{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn resolve_relative(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}
