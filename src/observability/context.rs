//! Thread-local context tracking for diagnostics.
//!
//! Records which analysis phase and which blueprint the current thread is
//! working on. Each rayon worker has its own context; guards restore the
//! previous context on drop, so nesting works.

use std::cell::RefCell;

thread_local! {
    static CURRENT_CONTEXT: RefCell<AnalysisContext> = const { RefCell::new(AnalysisContext::new()) };
}

/// Context snapshot for the current operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisContext {
    pub phase: Option<AnalysisPhase>,
    /// Id of the blueprint being evaluated
    pub blueprint_id: Option<String>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            blueprint_id: None,
        }
    }
}

/// Stages of one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    /// Grading every student record
    Scoring,
    /// Per-category achievement metrics
    Aggregation,
    /// Item difficulty, discrimination and distractors
    Psychometrics,
    /// Course-level summary statistics
    Summary,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scoring => write!(f, "scoring"),
            Self::Aggregation => write!(f, "aggregation"),
            Self::Psychometrics => write!(f, "psychometrics"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn update(apply: impl FnOnce(&mut AnalysisContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        apply(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

/// Set the current analysis phase until the guard drops.
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    update(|ctx| ctx.phase = Some(phase))
}

/// Set the blueprint being evaluated until the guard drops.
#[must_use]
pub fn set_current_blueprint(id: impl Into<String>) -> ContextGuard {
    let id = id.into();
    update(|ctx| ctx.blueprint_id = Some(id))
}

#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Reset the current thread's context to empty.
pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = AnalysisContext::new();
    });
}
