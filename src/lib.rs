//! Assessment grading core.
//!
//! Builds evaluation blueprints, scores uploaded answer tables, converts
//! scores to grades and aggregates achievement by curricular category along
//! with classical item statistics.

pub mod analysis;
pub mod blueprint;
pub mod config;
pub mod core;
pub mod errors;
pub mod grading;
pub mod observability;
mod parallel;
pub mod ranges;

// Re-export commonly used types
pub use crate::analysis::{
    analyze, evaluate, AnalysisData, AnalysisItem, AnalysisMetrics, CourseSummary, Evaluation,
    ItemPsychometric, QuestionAnalysisItem,
};

pub use crate::blueprint::{Blueprint, BlueprintEdit, BlueprintStatus, Completeness};

pub use crate::config::{load_config, GraderightConfig};

pub use crate::core::{
    AnswerKey, AttendanceState, Catalog, PassState, QuestionAssignment, QuestionBlock,
    QuestionNumber, QuestionType, ScoredRecord, StudentRecord,
};

pub use crate::errors::{Error, Result, ResultExt};

pub use crate::grading::{
    grade_of, ingest::records_from_table, rescore_roster, score_roster, AchievementLevel,
    AnswerOutcome, Grader, ScoringKey,
};
