//! Data model shared by every component of the grading core.

pub mod catalog;
pub mod types;

pub use catalog::{collation_key, objective_code_number, Catalog};
pub use types::{
    AnswerKey, AttendanceState, CognitiveSkill, CognitiveTier, LearningObjective, PassState,
    QuestionAssignment, QuestionBlock, QuestionNumber, QuestionType, ScoredRecord, StudentRecord,
    ThematicAxis, Unit,
};
