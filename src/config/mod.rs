//! Interpreter configuration.
//!
//! load_config -> ShellConfig (YAML or JSON file, chosen by extension)
//! resolve_config_path: --config flag > MYSHELL_CONFIG env.
//! All keys are optional; unknown keys are rejected.
//!
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cmd::tokenize::MAX_ARGS;

/// Environment fallback for the config file location.
pub const CONFIG_ENV: &str = "MYSHELL_CONFIG";

/// Settings for the read loop and the child-side builtins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Text printed before each read.
    pub prompt: String,
    /// Print the welcome line on start.
    pub banner: bool,
    /// Token limit per line (1..=15).
    pub max_args: usize,
    /// Utility that `list` replaces its child with.
    pub cat_program: PathBuf,
    /// Utility that `dir` replaces its child with.
    pub ls_program: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "shell> ".to_string(),
            banner: true,
            max_args: MAX_ARGS,
            cat_program: PathBuf::from("/bin/cat"),
            ls_program: PathBuf::from("/bin/ls"),
        }
    }
}

impl ShellConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ARGS).contains(&self.max_args) {
            bail!(
                "max_args must be between 1 and {MAX_ARGS}, got {}",
                self.max_args
            );
        }
        if self.cat_program.as_os_str().is_empty() || self.ls_program.as_os_str().is_empty() {
            bail!("cat_program / ls_program cannot be empty");
        }
        Ok(())
    }
}

/// Pick the config file: explicit flag first, then a non-blank `MYSHELL_CONFIG`.
pub fn resolve_config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        std::env::var(CONFIG_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    })
}

/// Read and parse a config file. `.yaml` / `.yml` parse as YAML, anything else as JSON.
pub fn load_config(path: &Path) -> Result<ShellConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let lower = path.to_string_lossy().to_ascii_lowercase();

    let config: ShellConfig = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        serde_yaml::from_str(&raw).context("failed to parse YAML config file")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON config file")?
    };

    config.validate()?;
    Ok(config)
}

/// Load from `path` when given, else defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ShellConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(ShellConfig::default()),
    }
}
