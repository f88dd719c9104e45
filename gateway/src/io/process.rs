//! Streaming execution of the build process.
//!
//! stdout and stderr are drained by two independent reader tasks that feed a
//! single channel. The merge loop relays stdout lines and progress to the sink
//! as they arrive, keeps both streams for diagnosis, and watches for exit.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, instrument, trace, warn};

use crate::core::extract::LogVocabulary;
use crate::core::progress::parse_percent;
use crate::core::types::{Channel, ExecutionResult, Invocation, StreamEvent};
use crate::io::config::GatewayConfig;
use crate::io::sink::ProgressSink;

/// Lines a reader may run ahead of the merge loop.
const EVENT_BUFFER: usize = 64;

/// Runs one invocation at a time per call; holds no per-run state.
#[derive(Debug, Clone)]
pub struct ProcessStreamer {
    cache_bypass_flag: String,
    drain_timeout: Duration,
    vocabulary: LogVocabulary,
}

/// Lines captured from both streams, in read order per stream.
#[derive(Debug, Default)]
struct CapturedOutput {
    primary: Vec<String>,
    secondary: Vec<String>,
}

impl CapturedOutput {
    fn accept<S: ProgressSink + ?Sized>(&mut self, event: StreamEvent, sink: &mut S) {
        match event.channel {
            Channel::Primary => {
                if !event.text.trim().is_empty() {
                    sink.log(&event.text);
                }
                if let Some(percent) = event.progress {
                    sink.report(percent);
                }
                self.primary.push(event.text);
            }
            Channel::Secondary => {
                trace!(line = %event.text, "stderr");
                self.secondary.push(event.text);
            }
        }
    }
}

impl ProcessStreamer {
    pub fn new(
        cache_bypass_flag: impl Into<String>,
        drain_timeout: Duration,
        vocabulary: LogVocabulary,
    ) -> Self {
        Self {
            cache_bypass_flag: cache_bypass_flag.into(),
            drain_timeout,
            vocabulary,
        }
    }

    pub fn from_config(cfg: &GatewayConfig) -> Self {
        Self::new(
            cfg.cache_bypass_flag.clone(),
            cfg.drain_timeout(),
            cfg.vocabulary.clone(),
        )
    }

    pub fn cache_bypass_flag(&self) -> &str {
        &self.cache_bypass_flag
    }

    /// Run `invocation` with `executable` in `workdir`, streaming stdout to `sink`.
    ///
    /// Never fails: spawn and stream errors become a failed result carrying the
    /// error message. Dropping the returned future kills the child.
    #[instrument(skip_all, fields(task = invocation.task(), kind = ?invocation.kind()))]
    pub async fn execute<S: ProgressSink + ?Sized>(
        &self,
        executable: &Path,
        workdir: &Path,
        invocation: &Invocation,
        sink: &mut S,
    ) -> ExecutionResult {
        match self.run(executable, workdir, invocation, sink).await {
            Ok((status, _)) if status.success() => {
                debug!("build succeeded");
                ExecutionResult::succeeded()
            }
            Ok((status, captured)) => {
                warn!(
                    exit_code = ?status.code(),
                    stdout_lines = captured.primary.len(),
                    stderr_lines = captured.secondary.len(),
                    "build failed"
                );
                let diagnostic = self.vocabulary.extract(
                    &captured.primary.join("\n"),
                    &captured.secondary.join("\n"),
                    invocation.kind().fallback_message(),
                );
                ExecutionResult::failed(diagnostic)
            }
            Err(err) => {
                error!(err = %format!("{err:#}"), "build could not be executed");
                ExecutionResult::failed(format!("{err:#}"))
            }
        }
    }

    async fn run<S: ProgressSink + ?Sized>(
        &self,
        executable: &Path,
        workdir: &Path,
        invocation: &Invocation,
        sink: &mut S,
    ) -> Result<(ExitStatus, CapturedOutput)> {
        let mut cmd = Command::new(executable);
        cmd.args(invocation.command_args(&self.cache_bypass_flag))
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(executable = %executable.display(), "spawning child process");
        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                error!(err = %e, "failed to spawn command");
                return Err(e).with_context(|| format!("spawn {}", executable.display()));
            }
        };
        debug!(pid = ?child.id(), "child process spawned");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;

        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let mut readers = JoinSet::new();
        readers.spawn(read_lines(stdout, Channel::Primary, tx.clone()));
        readers.spawn(read_lines(stderr, Channel::Secondary, tx));

        let mut captured = CapturedOutput::default();
        let mut exit = None;
        while exit.is_none() {
            tokio::select! {
                biased;
                Some(event) = rx.recv() => captured.accept(event, &mut *sink),
                status = child.wait() => exit = Some(status.context("wait for command")?),
            }
        }
        let status = exit.ok_or_else(|| anyhow!("command exit status missing"))?;
        debug!(exit_code = ?status.code(), "command finished, draining output");

        let drained = timeout(self.drain_timeout, async {
            while let Some(event) = rx.recv().await {
                captured.accept(event, &mut *sink);
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                drain_timeout_ms = u64::try_from(self.drain_timeout.as_millis()).unwrap_or(u64::MAX),
                "output still open after exit, discarding the rest"
            );
            readers.abort_all();
        }

        while let Some(joined) = readers.join_next().await {
            match joined {
                Ok(result) => result?,
                Err(e) if e.is_cancelled() => {}
                Err(e) => return Err(anyhow!("output reader task failed: {e}")),
            }
        }

        Ok((status, captured))
    }
}

/// Send each line of `reader` as a [`StreamEvent`] until EOF.
async fn read_lines<R: AsyncRead + Unpin>(
    reader: R,
    channel: Channel,
    tx: mpsc::Sender<StreamEvent>,
) -> Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .with_context(|| format!("read {channel:?} output"))?;
        if n == 0 {
            break;
        }
        let text = decode_line(&buf);
        let progress = match channel {
            Channel::Primary => parse_percent(&text),
            Channel::Secondary => None,
        };
        let event = StreamEvent {
            channel,
            text,
            progress,
        };
        if tx.send(event).await.is_err() {
            // Merge loop is gone (run cancelled); stop reading.
            break;
        }
    }
    Ok(())
}

fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
