//! Gradle execution gateway CLI.
//!
//! Runs Gradle wrapper tasks through the same gates the library applies:
//! cleaning tasks only via `clean`, caller flags only from the allow-list.
//! Prints the `ExecutionResult` as JSON on stdout.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, warn};

use gateway::exit_codes;
use gateway::io::config::{DEFAULT_CONFIG_FILE, GatewayConfig, load_config, write_config};
use gateway::io::sink::{ConsoleSink, NullSink, ProgressSink, TracingSink};
use gateway::logging;
use gateway::{ExecutionResult, Gateway};

#[derive(Parser)]
#[command(
    name = "gateway",
    version,
    about = "Secure gateway for running Gradle wrapper tasks"
)]
struct Cli {
    /// Configuration file (TOML). A missing file means defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Gradle project root (overrides `project_root` in the config file).
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Wrapper script (overrides `wrapper` in the config file).
    #[arg(long, global = true)]
    wrapper: Option<PathBuf>,

    /// Debug logging for the gateway itself (ignored when `RUST_LOG` is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Where build output and progress go while a task runs.
    #[arg(long, global = true, value_enum, default_value_t = ProgressMode::Console)]
    progress: ProgressMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProgressMode {
    /// Echo output lines and progress to stderr.
    Console,
    /// Emit tracing events (target `gateway::progress`).
    Log,
    /// Discard.
    None,
}

impl ProgressMode {
    fn sink(self) -> Box<dyn ProgressSink> {
        match self {
            ProgressMode::Console => Box::new(ConsoleSink::stderr()),
            ProgressMode::Log => Box::new(TracingSink),
            ProgressMode::None => Box::new(NullSink),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Apply the pre-flight gates and print the command line without running it.
    Check {
        task: String,
        /// Gradle flags, after `--`.
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Run a non-destructive task, e.g. `gateway run :app:test -- --info`.
    Run {
        task: String,
        /// Gradle flags, after `--`.
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Clean build outputs (root project when no scope is given).
    Clean { scope: Option<String> },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let Cli {
        config,
        project_root,
        wrapper,
        progress,
        command,
        ..
    } = cli;

    if let Command::Init { force } = command {
        return cmd_init(&config, force);
    }

    let mut cfg = load_config(&config)?;
    if let Some(root) = project_root {
        cfg.project_root = root;
    }
    if let Some(wrapper) = wrapper {
        cfg.wrapper = Some(wrapper);
    }
    debug!(?cfg, "effective configuration");
    let gateway = Gateway::new(&cfg)?;

    match command {
        Command::Init { .. } => bail!("init is handled before configuration is loaded"),
        Command::Check { task, args } => cmd_check(&gateway, &task, &args),
        Command::Run { task, args } => cmd_run(&gateway, &task, &args, progress).await,
        Command::Clean { scope } => cmd_clean(&gateway, scope.as_deref(), progress).await,
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &GatewayConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_check(gateway: &Gateway, task: &str, args: &[String]) -> Result<i32> {
    let invocation = gateway.prepare_task(task, Some(args))?;
    println!("{}", gateway.command_line(&invocation).join(" "));
    Ok(exit_codes::OK)
}

async fn cmd_run(
    gateway: &Gateway,
    task: &str,
    args: &[String],
    progress: ProgressMode,
) -> Result<i32> {
    let mut sink = progress.sink();
    let outcome = until_interrupted(gateway.run_task(task, Some(args), &mut *sink)).await?;
    match outcome {
        Some(result) => print_result(&result?),
        None => Ok(exit_codes::INTERRUPTED),
    }
}

async fn cmd_clean(gateway: &Gateway, scope: Option<&str>, progress: ProgressMode) -> Result<i32> {
    let mut sink = progress.sink();
    match until_interrupted(gateway.run_clean(scope, &mut *sink)).await? {
        Some(result) => print_result(&result?),
        None => Ok(exit_codes::INTERRUPTED),
    }
}

/// Drive `fut` to completion unless Ctrl-C arrives first.
///
/// Dropping the build future on interrupt kills the child process.
async fn until_interrupted<F: Future>(fut: F) -> Result<Option<F::Output>> {
    tokio::select! {
        output = fut => Ok(Some(output)),
        signal = tokio::signal::ctrl_c() => {
            signal.context("listen for ctrl-c")?;
            warn!("interrupted, build process terminated");
            Ok(None)
        }
    }
}

fn print_result(result: &ExecutionResult) -> Result<i32> {
    let json = serde_json::to_string_pretty(result).context("serialize result")?;
    println!("{json}");
    Ok(if result.success {
        exit_codes::OK
    } else {
        exit_codes::FAILED
    })
}
