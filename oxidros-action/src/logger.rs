//! Logging setup for action servers.
//!
//! Everything in this crate logs through `tracing`. Binaries call
//! [`init_action_logging`] once; `log` crate records are bridged into the same
//! subscriber. The level comes from `RUST_LOG` and defaults to `info`.
//!
//! # Example
//!
//! ```ignore
//! use oxidros_action::logger::init_action_logging;
//!
//! init_action_logging("fibonacci_server");
//! tracing::info!("ready");
//! ```

use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a stderr subscriber and the `log` bridge.
///
/// Only the first call has an effect. If another global subscriber is already
/// installed it is left in place.
pub fn init_action_logging(name: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        tracing_log::LogTracer::init().ok();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr);

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(node = name, "logging initialized");
        }
    });
}

pub use tracing::{debug, error, info, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_action_logging("test_node");
        init_action_logging("test_node_2");
    }

    #[test]
    fn test_macros_after_init() {
        init_action_logging("test_macros");

        let goals = 3;
        trace!("trace message");
        debug!(goals, "debug with field");
        info!("formatted: {}", goals);
        warn!(target: "oxidros_action::test", "targeted message");
        error!("error message");
    }

    #[test]
    fn test_log_crate_is_bridged() {
        init_action_logging("test_log_bridge");

        log::info!("log crate info");
        log::warn!("log crate warn");
    }
}
