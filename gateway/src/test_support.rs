//! Test-only helpers: throwaway Gradle projects and a recording sink.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::io::config::{GatewayConfig, WRAPPER_SCRIPT};
use crate::io::sink::ProgressSink;

/// Temporary project directory with a shell-script `gradlew`.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Create a project whose wrapper runs `body` under `/bin/sh`.
    ///
    /// The wrapper receives the gateway's arguments as `$@`.
    pub fn with_wrapper(body: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp project")?;
        let project = Self { dir };
        write_script(&project.wrapper_path(), body)?;
        Ok(project)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn wrapper_path(&self) -> PathBuf {
        self.dir.path().join(WRAPPER_SCRIPT)
    }

    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            project_root: self.path().to_path_buf(),
            ..GatewayConfig::default()
        }
    }

    pub fn gateway(&self) -> Result<Gateway, GatewayError> {
        Gateway::new(&self.config())
    }
}

/// Write an executable `/bin/sh` script at `path`.
pub fn write_script(path: &Path, body: &str) -> Result<()> {
    fs::write(path, format!("#!/bin/sh\n{body}"))
        .with_context(|| format!("write script {}", path.display()))?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod script {}", path.display()))?;
    Ok(())
}

/// Sink that records every call for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub percents: Vec<u8>,
    pub lines: Vec<String>,
}

impl ProgressSink for RecordingSink {
    fn report(&mut self, percent: u8) {
        self.percents.push(percent);
    }

    fn log(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
