//! Logging setup for the CLI.

use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter used by `--trace-vm`.
pub const TRACE_VM_FILTER: &str = "warn,lantern_vm=trace";

/// Installs a stderr `tracing` subscriber.
///
/// `RUST_LOG` overrides the default filter unless `trace_vm` is set, in
/// which case VM instruction tracing is always enabled. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_logging(trace_vm: bool) {
    let filter = if trace_vm {
        EnvFilter::new(TRACE_VM_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
