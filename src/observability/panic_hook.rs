//! Panic hook that reports the evaluation context.
//!
//! A panic inside scoring or aggregation is hard to place from the message
//! alone. The hook prints which blueprint and phase the panicking thread was
//! working on, then hands over to the previously installed hook.

use super::context::{get_current_context, AnalysisContext};
use std::panic::PanicHookInfo;
use std::sync::Once;

static INSTALL: Once = Once::new();

/// Install the context-reporting panic hook.
///
/// Installs at most once per process. The hook that was active before runs
/// after the context report, so test harness and backtrace output still
/// appear.
pub fn install_panic_hook() {
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            print_context_report(info);
            previous(info);
        }));
    });
}

fn print_context_report(info: &PanicHookInfo<'_>) {
    let context = get_current_context();
    let location = info
        .location()
        .map(|l| format!("{}:{}", l.file(), l.line()))
        .unwrap_or_else(|| "unknown location".to_string());

    eprintln!(
        "graderight {} panicked at {}: {}",
        env!("CARGO_PKG_VERSION"),
        location,
        extract_panic_message(info)
    );
    eprintln!("  while {}", describe_context(&context));
}

/// One-line description of what the thread was doing.
pub fn describe_context(context: &AnalysisContext) -> String {
    let phase = context
        .phase
        .map(|p| format!("in the {} phase", p))
        .unwrap_or_else(|| "outside any evaluation phase".to_string());
    match &context.blueprint_id {
        Some(id) => format!("evaluating blueprint '{}' {}", id, phase),
        None => format!("working {}", phase),
    }
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
