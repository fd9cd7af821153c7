//! Pipeline configuration module.
//!
//! A pipeline is described by one TOML file (`nft-manager.toml` by default) naming
//! the project folders and the ordered list of steps to run.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All top-level options are optional - defaults shown below
//!
//! project_root = "."               # Relative paths resolve against this file's directory
//! input_dir = "input"              # Read by the first step, relative to project_root
//! images_dir = "images"            # Relative to input_dir
//! metadata_dir = "metadata"        # Relative to input_dir
//! metadata_preprocessor = "none"   # or "smart-quotes"
//!
//! [[steps]]
//! operation = "renumber"
//! [steps.options]
//! start_from_id = 1
//!
//! [[steps]]
//! operation = "update-metadata"
//! [steps.options]
//! update_name = "Token #{id}"
//! from_id = 1
//! to_id = 100
//! ```
//!
//! Steps run in file order. `from_id`/`to_id` are accepted by every operation.
//! Unknown keys are rejected to catch typos early; unknown step options are caught
//! when the step's options are resolved against its operation.

use crate::error::ValidationError;
use crate::manager::ProjectConfig;
use crate::metadata;
use crate::operation::{self, OperationKind};
use crate::options::RawOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "nft-manager.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {0} (run `nft-manager gen-config` to create one)")]
    NotFound(PathBuf),
    #[error("Step #{index} ({operation}) options cannot be converted: {source}")]
    Options {
        index: usize,
        operation: OperationKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("Step #{index} ({operation}): {source}")]
    Step {
        index: usize,
        operation: OperationKind,
        #[source]
        source: ValidationError,
    },
}

/// Text hook applied to metadata files before parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreprocessorKind {
    #[default]
    None,
    SmartQuotes,
}

/// Pipeline configuration loaded from `nft-manager.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub project_root: String,
    pub input_dir: String,
    pub images_dir: String,
    pub metadata_dir: String,
    pub metadata_preprocessor: PreprocessorKind,
    /// Operations to run, in order.
    pub steps: Vec<StepConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let project = ProjectConfig::default();
        Self {
            project_root: project.project_root.to_string_lossy().into_owned(),
            input_dir: project.input_dir.to_string_lossy().into_owned(),
            images_dir: project.images_dir.to_string_lossy().into_owned(),
            metadata_dir: project.metadata_dir.to_string_lossy().into_owned(),
            metadata_preprocessor: PreprocessorKind::None,
            steps: Vec::new(),
        }
    }
}

/// One pipeline step: an operation and its raw options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    pub operation: OperationKind,
    #[serde(default)]
    pub options: toml::Table,
}

impl StepConfig {
    /// Options as the JSON mapping operations resolve against.
    pub fn raw_options(&self) -> Result<RawOptions, serde_json::Error> {
        match serde_json::to_value(&self.options)? {
            Value::Object(map) => Ok(map),
            _ => Ok(RawOptions::new()),
        }
    }
}

impl PipelineConfig {
    /// Validate folder names are usable as relative paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("input_dir", &self.input_dir),
            ("images_dir", &self.images_dir),
            ("metadata_dir", &self.metadata_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
            if Path::new(value).is_absolute() {
                return Err(ConfigError::Validation(format!(
                    "{key} must be relative to its parent folder, got \"{value}\""
                )));
            }
        }
        if self.project_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "project_root must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Folder layout for [`Manager::new`](crate::manager::Manager::new).
    pub fn project(&self) -> ProjectConfig {
        ProjectConfig {
            project_root: PathBuf::from(&self.project_root),
            input_dir: PathBuf::from(&self.input_dir),
            images_dir: PathBuf::from(&self.images_dir),
            metadata_dir: PathBuf::from(&self.metadata_dir),
        }
    }

    pub fn preprocessor(&self) -> Option<fn(&str) -> String> {
        match self.metadata_preprocessor {
            PreprocessorKind::None => None,
            PreprocessorKind::SmartQuotes => Some(metadata::normalize_smart_quotes),
        }
    }

    /// Resolve every step's options against its operation without touching the filesystem.
    ///
    /// Stops at the first invalid step. Step indexes are 1-based.
    pub fn check_steps(&self) -> Result<(), ConfigError> {
        for (i, step) in self.steps.iter().enumerate() {
            let index = i + 1;
            let raw = step.raw_options().map_err(|source| ConfigError::Options {
                index,
                operation: step.operation,
                source,
            })?;
            let op = step.operation.build();
            operation::resolve_options(&*op, &raw).map_err(|source| ConfigError::Step {
                index,
                operation: step.operation,
                source,
            })?;
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PipelineConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, arrays included.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PipelineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the pipeline config at `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys and
/// validates the result. A missing file is an error: running the defaults would
/// recreate `output/` and process nothing.
/// A relative `project_root` is resolved against the config file's directory.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay =
        load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?;
    let mut config = resolve_config(base, Some(overlay))?;

    let root = Path::new(&config.project_root);
    if root.is_relative() {
        let config_dir = path.parent().unwrap_or(Path::new(""));
        config.project_root = config_dir.join(root).to_string_lossy().into_owned();
    }
    Ok(config)
}

/// Returns a fully-commented stock `nft-manager.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# NFT Manager Configuration
# =========================
# Top-level settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Project folder, relative to this file. Output is written to
# <project_root>/output/{images,metadata}.
project_root = "."

# Folders read by the first step. Later steps read the previous step's output.
input_dir = "input"        # relative to project_root
images_dir = "images"      # relative to input_dir
metadata_dir = "metadata"  # relative to input_dir

# Text fix applied to metadata files before JSON parsing:
#   "none"          leave files untouched
#   "smart-quotes"  turn typographic quotes into ASCII quotes
metadata_preprocessor = "none"

# ---------------------------------------------------------------------------
# Steps
# ---------------------------------------------------------------------------
# Each [[steps]] entry runs one operation. Steps run in file order, each one
# reading the output of the one before. Every operation also accepts:
#   from_id = <int>   skip records whose token id is lower
#   to_id = <int>     skip records whose token id is higher
# Run `nft-manager operations` for every operation and its options.

# [[steps]]
# operation = "renumber"
# [steps.options]
# start_from_id = 1
# update_metadata_image = "ipfs://<cid>/{id}.png"
# update_metadata_name = "Token #{id}"

# [[steps]]
# operation = "shuffle"
# [steps.options]
# update_metadata_image = "ipfs://<cid>/{id}.png"
# update_metadata_name = "Token #{id}"

# [[steps]]
# operation = "obfuscate"
# [steps.options]
# placeholder_image_absolute_path = "/absolute/path/to/unrevealed.png"
# placeholder_value = "?"

# [[steps]]
# operation = "format-metadata"

# [[steps]]
# operation = "update-metadata"
# [steps.options]
# update_base_uri = "ipfs://<cid>"
# update_external_url = "https://example.com/token/{id}"
# update_name = "Token #{id}"
# remove_attributes = ["Hidden"]
# remove_values = ["dna"]
# [steps.options.update_attributes]
# Background = "Blue"
"##
}
