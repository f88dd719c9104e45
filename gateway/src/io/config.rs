//! Gateway configuration stored in `gateway.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::extract::LogVocabulary;

/// Default configuration file name, relative to the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "gateway.toml";
/// Wrapper script looked up under the project root.
pub const WRAPPER_SCRIPT: &str = "gradlew";

/// Gateway configuration (TOML).
///
/// Missing fields default to values suitable for a Gradle project rooted in the
/// current directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gradle project root; also the working directory of every build.
    pub project_root: PathBuf,

    /// Explicit wrapper script. Defaults to `<project_root>/gradlew`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<PathBuf>,

    /// Flag appended to every invocation to force re-execution.
    pub cache_bypass_flag: String,

    /// How long to keep draining output after the build process exited.
    pub drain_timeout_ms: u64,

    pub vocabulary: LogVocabulary,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            wrapper: None,
            cache_bypass_flag: "--no-build-cache".to_string(),
            drain_timeout_ms: 5_000,
            vocabulary: LogVocabulary::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.project_root.as_os_str().is_empty() {
            return Err(anyhow!("project_root must not be empty"));
        }
        if self.cache_bypass_flag.trim().is_empty() {
            return Err(anyhow!("cache_bypass_flag must not be empty"));
        }
        if self.drain_timeout_ms == 0 {
            return Err(anyhow!("drain_timeout_ms must be > 0"));
        }
        if self.vocabulary.unit_marker.is_empty() || self.vocabulary.failed_marker.is_empty() {
            return Err(anyhow!(
                "vocabulary.unit_marker and vocabulary.failed_marker must be non-empty"
            ));
        }
        if self.vocabulary.terminal_window == 0 || self.vocabulary.tail_window == 0 {
            return Err(anyhow!(
                "vocabulary.terminal_window and vocabulary.tail_window must be > 0"
            ));
        }
        Ok(())
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    /// Wrapper script path, before any existence check.
    pub fn wrapper_path(&self) -> PathBuf {
        match &self.wrapper {
            Some(path) => path.clone(),
            None => self.project_root.join(WRAPPER_SCRIPT),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GatewayConfig::default()`.
pub fn load_config(path: &Path) -> Result<GatewayConfig> {
    if !path.exists() {
        let cfg = GatewayConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GatewayConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &GatewayConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
