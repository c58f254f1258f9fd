//! Common type definitions shared by the blueprint, grading and analysis modules

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::ranges;

/// Question numbers are 1-based.
pub type QuestionNumber = u32;

/// Kind of question a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MC3")]
    MultipleChoice3,
    #[serde(rename = "MC4")]
    MultipleChoice4,
    #[serde(rename = "MC5")]
    MultipleChoice5,
    TrueFalse,
    OpenResponse,
}

impl QuestionType {
    /// Valid answer letters for this question type.
    ///
    /// Open response questions have no fixed option set.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            QuestionType::MultipleChoice3 => &["A", "B", "C"],
            QuestionType::MultipleChoice4 => &["A", "B", "C", "D"],
            QuestionType::MultipleChoice5 => &["A", "B", "C", "D", "E"],
            QuestionType::TrueFalse => &["V", "F"],
            QuestionType::OpenResponse => &[],
        }
    }

    /// Whether a correct answer token must be entered for this type.
    pub fn requires_key(&self) -> bool {
        !self.is_open_response()
    }

    pub fn is_open_response(&self) -> bool {
        matches!(self, QuestionType::OpenResponse)
    }

    /// Get the display name for this question type
    pub fn display_name(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice3 => "Multiple choice (3 options)",
            QuestionType::MultipleChoice4 => "Multiple choice (4 options)",
            QuestionType::MultipleChoice5 => "Multiple choice (5 options)",
            QuestionType::TrueFalse => "True/False",
            QuestionType::OpenResponse => "Open response",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A set of questions sharing a type and a per-question point value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub range_expression: String,
    pub points_per_question: f64,
}

impl QuestionBlock {
    pub fn new(
        id: impl Into<String>,
        question_type: QuestionType,
        range_expression: impl Into<String>,
        points_per_question: f64,
    ) -> Self {
        Self {
            id: id.into(),
            question_type,
            range_expression: range_expression.into(),
            points_per_question,
        }
    }

    /// Default block: MC4, one point, no questions yet.
    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, QuestionType::MultipleChoice4, "", 1.0)
    }

    /// Question numbers claimed by this block.
    pub fn questions(&self) -> BTreeSet<QuestionNumber> {
        ranges::parse(&self.range_expression)
    }
}

/// Correct answer and point value for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerKey {
    pub question: QuestionNumber,
    /// `"A"`..`"E"`, `"V"`/`"F"`, or empty (open response or not yet entered)
    pub key: String,
    pub points: f64,
}

impl AnswerKey {
    pub fn new(question: QuestionNumber, key: impl Into<String>, points: f64) -> Self {
        Self {
            question,
            key: key.into(),
            points,
        }
    }

    /// Placeholder entry for a question that has no key yet.
    pub fn blank(question: QuestionNumber) -> Self {
        Self::new(question, "", 1.0)
    }

    pub fn has_key(&self) -> bool {
        !self.key.trim().is_empty()
    }
}

/// Objective and skill a question is meant to measure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAssignment {
    pub objective_id: String,
    pub skill_id: String,
}

impl QuestionAssignment {
    pub fn new(objective_id: impl Into<String>, skill_id: impl Into<String>) -> Self {
        Self {
            objective_id: objective_id.into(),
            skill_id: skill_id.into(),
        }
    }

    /// Key of the objective×skill intersection, `"{objectiveId}-{skillId}"`.
    pub fn pair_key(&self) -> String {
        format!("{}-{}", self.objective_id, self.skill_id)
    }
}

/// Curricular unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
}

/// Thematic axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThematicAxis {
    pub id: String,
    pub name: String,
}

/// Learning objective, e.g. "OA6", owned by one unit and one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningObjective {
    pub id: String,
    pub code: String,
    pub description: String,
    pub unit_id: String,
    pub axis_id: String,
}

/// Broad cognitive tier grouping several skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CognitiveTier {
    BasicKnowledge,
    Application,
    HigherOrder,
}

/// Cognitive skill such as "Apply" or "Analyze".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CognitiveSkill {
    pub id: String,
    pub name: String,
    pub tier: CognitiveTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceState {
    Present,
    Absent,
}

/// Raw answers of one student, as read from the uploaded table.
///
/// Never mutated after ingestion; scoring produces a [`ScoredRecord`]
/// that shares the raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub student_id: String,
    pub student_name: String,
    pub answers: BTreeMap<QuestionNumber, String>,
    pub attendance: AttendanceState,
}

impl StudentRecord {
    pub fn new(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        answers: BTreeMap<QuestionNumber, String>,
        attendance: AttendanceState,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            student_name: student_name.into(),
            answers,
            attendance,
        }
    }

    /// Present student whose answers are listed for questions 1, 2, 3...
    pub fn present<S: AsRef<str>>(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        answers: &[S],
    ) -> Self {
        let answers = answers
            .iter()
            .enumerate()
            .map(|(i, a)| (i as QuestionNumber + 1, a.as_ref().to_string()))
            .collect();
        Self::new(student_id, student_name, answers, AttendanceState::Present)
    }

    /// Raw token for a question; missing answers read as empty.
    pub fn answer(&self, question: QuestionNumber) -> &str {
        self.answers.get(&question).map(String::as_str).unwrap_or("")
    }

    pub fn is_present(&self) -> bool {
        self.attendance == AttendanceState::Present
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassState {
    Passed,
    Failed,
    Absent,
}

/// A student record together with the fields derived by grading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRecord {
    pub record: Arc<StudentRecord>,
    pub points_obtained: f64,
    pub points_total: f64,
    pub grade: f64,
    pub pass_state: PassState,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub omitted_count: u32,
}

impl ScoredRecord {
    pub fn student_id(&self) -> &str {
        &self.record.student_id
    }

    pub fn is_present(&self) -> bool {
        self.pass_state != PassState::Absent
    }

    /// Share of possible points obtained, 0..=100.
    pub fn score_percentage(&self) -> f64 {
        if self.points_total > 0.0 {
            self.points_obtained / self.points_total * 100.0
        } else {
            0.0
        }
    }
}
