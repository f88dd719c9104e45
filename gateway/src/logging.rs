//! Tracing setup for the gateway binary.
//!
//! Diagnostics go to stderr through `tracing`; the `ExecutionResult` JSON on
//! stdout is the product output and is unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("warn,gateway=debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or gateway debug output with
/// `verbose`. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=gateway::io::process=trace gateway run build
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .init();
}
