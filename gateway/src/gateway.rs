//! Gated entry points for running Gradle tasks.
//!
//! `run_task` is the general path: the task classifier and the argument policy
//! both run before any process exists. `run_clean` is the separate, explicitly
//! named path for destructive tasks and takes no caller flags at all. On both
//! paths the task name itself must be a plain task path, never a flag.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::core::args::ArgumentPolicy;
use crate::core::classifier::{is_destructive, is_task_path};
use crate::core::types::{ExecutionResult, Invocation, InvocationKind};
use crate::error::GatewayError;
use crate::io::config::GatewayConfig;
use crate::io::process::ProcessStreamer;
use crate::io::sink::ProgressSink;

/// Validated access to one Gradle project.
///
/// Holds no per-invocation state; concurrent invocations each own their child
/// process and buffers.
#[derive(Debug, Clone)]
pub struct Gateway {
    project_root: PathBuf,
    wrapper: PathBuf,
    policy: ArgumentPolicy,
    streamer: ProcessStreamer,
}

impl Gateway {
    /// Resolve the wrapper script. A missing wrapper is a configuration error
    /// raised here rather than on the first invocation.
    pub fn new(cfg: &GatewayConfig) -> Result<Self, GatewayError> {
        cfg.validate()
            .map_err(|e| GatewayError::Config(format!("{e:#}")))?;
        let wrapper = cfg.wrapper_path();
        if !wrapper.is_file() {
            return Err(GatewayError::WrapperNotFound { path: wrapper });
        }
        info!(
            project_root = %cfg.project_root.display(),
            wrapper = %wrapper.display(),
            "gateway ready"
        );
        Ok(Self {
            project_root: cfg.project_root.clone(),
            wrapper,
            policy: ArgumentPolicy::gradle(),
            streamer: ProcessStreamer::from_config(cfg),
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn wrapper(&self) -> &Path {
        &self.wrapper
    }

    /// Full command line `invocation` would run with.
    pub fn command_line(&self, invocation: &Invocation) -> Vec<String> {
        let mut line = vec![self.wrapper.display().to_string()];
        line.extend(invocation.command_args(self.streamer.cache_bypass_flag()));
        line
    }

    /// Run both pre-flight gates without starting a process.
    pub fn prepare_task(
        &self,
        task: &str,
        args: Option<&[String]>,
    ) -> Result<Invocation, GatewayError> {
        check_task_path(task)?;
        if is_destructive(task) {
            warn!(task, "refused cleaning task on general path");
            return Err(GatewayError::DisallowedTask {
                task: task.to_string(),
            });
        }
        let args = args.unwrap_or_default();
        self.policy.validate(args)?;
        Ok(Invocation::new(
            InvocationKind::Task,
            task.to_string(),
            args.to_vec(),
        ))
    }

    /// Run a non-destructive task with caller flags.
    ///
    /// Rejections are returned as errors before anything runs; build failures
    /// come back as an unsuccessful [`ExecutionResult`].
    #[instrument(skip_all, fields(task = %task))]
    pub async fn run_task<S: ProgressSink + ?Sized>(
        &self,
        task: &str,
        args: Option<&[String]>,
        sink: &mut S,
    ) -> Result<ExecutionResult, GatewayError> {
        let invocation = self.prepare_task(task, args)?;
        info!(args = ?invocation.extra_args(), "running task");
        let result = self.execute(&invocation, sink).await;
        log_outcome(&invocation, &result);
        Ok(result)
    }

    /// Run `clean` for `scope`, or for the root project when `scope` is
    /// `None`, empty or `:`.
    ///
    /// A scope that is not a task path is rejected before anything runs.
    #[instrument(skip_all, fields(scope = ?scope))]
    pub async fn run_clean<S: ProgressSink + ?Sized>(
        &self,
        scope: Option<&str>,
        sink: &mut S,
    ) -> Result<ExecutionResult, GatewayError> {
        let invocation = clean_invocation(scope)?;
        info!(task = invocation.task(), "running clean");
        let result = self.execute(&invocation, sink).await;
        log_outcome(&invocation, &result);
        Ok(result)
    }

    async fn execute<S: ProgressSink + ?Sized>(
        &self,
        invocation: &Invocation,
        sink: &mut S,
    ) -> ExecutionResult {
        self.streamer
            .execute(&self.wrapper, &self.project_root, invocation, sink)
            .await
    }
}

fn check_task_path(task: &str) -> Result<(), GatewayError> {
    if is_task_path(task) {
        return Ok(());
    }
    warn!(task, "refused malformed task path");
    Err(GatewayError::InvalidTaskPath {
        task: task.to_string(),
    })
}

fn clean_invocation(scope: Option<&str>) -> Result<Invocation, GatewayError> {
    let task = match scope.map(str::trim) {
        None | Some("") | Some(":") => "clean".to_string(),
        Some(scope) => {
            check_task_path(scope)?;
            format!("{}:clean", scope.trim_end_matches(':'))
        }
    };
    Ok(Invocation::new(InvocationKind::Clean, task, Vec::new()))
}

fn log_outcome(invocation: &Invocation, result: &ExecutionResult) {
    if result.success {
        info!(task = invocation.task(), "completed successfully");
    } else {
        warn!(
            task = invocation.task(),
            diagnostic_lines = result.diagnostic.as_deref().map_or(0, |d| d.lines().count()),
            "failed"
        );
    }
}
