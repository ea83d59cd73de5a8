//! Settings for the calc tool
//!
//! Priority (highest to lowest):
//! 1. Command-line flags
//! 2. Environment variables prefixed `CALC_` (e.g. `CALC_MAX_DEPTH=128`)
//! 3. Config file given with `--config`, or `calc.toml` in the working directory
//! 4. Default values

use anyhow::{bail, Context, Result};
use expr_calc::config::DEFAULT_MAX_DEPTH;
use expr_calc::EvaluatorConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "calc.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CALC_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Prompt shown by the interactive loop
    pub prompt: String,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Keep an in-memory history of entered lines
    pub history: bool,
    /// Deepest allowed nesting of brackets and function arguments
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: ">> ".to_string(),
            log_level: "warn".to_string(),
            history: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Settings {
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig::default().with_max_depth(self.max_depth)
    }
}

/// Load settings from defaults, an optional file and the environment
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let figment = Figment::from(Serialized::defaults(Settings::default()));

    let figment = match path {
        Some(path) => figment.merge(file_provider(path)?),
        None => figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
    };

    figment
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .context("Failed to load configuration")
}

fn file_provider(path: &Path) -> Result<Figment> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .context("Config file must have an extension")?;

    match extension {
        "toml" => Ok(Figment::new().merge(Toml::file(path))),
        "yaml" | "yml" => Ok(Figment::new().merge(Yaml::file(path))),
        _ => bail!("Unsupported config file format: {}", extension),
    }
}
