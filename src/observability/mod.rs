//! Logging setup and context tracking.
//!
//! Library code logs through the `log` facade and opens `tracing` spans
//! around analysis phases. Applications embedding the crate may install
//! their own subscriber; [`init_logging`] is a convenience that installs a
//! `fmt` subscriber filtered by `RUST_LOG`.
//!
//! ```ignore
//! use graderight::observability::{set_phase, AnalysisPhase};
//!
//! let _phase = set_phase(AnalysisPhase::Scoring);
//! // diagnostics taken here report the scoring phase
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, reset_context, set_current_blueprint, set_phase, AnalysisContext,
    AnalysisPhase, ContextGuard,
};
pub use panic_hook::{describe_context, install_panic_hook};

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber that also receives `log` records, plus the
/// context-reporting panic hook.
///
/// Defaults to `warn` when `RUST_LOG` is unset. Calling it again, or after
/// another subscriber was installed, does nothing.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();
    install_panic_hook();
    if installed {
        log::debug!("Logging initialised");
    }
}
