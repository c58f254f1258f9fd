//! Evaluation blueprint: question blocks, answer keys, selected objectives and
//! skills, and the question→(objective, skill) assignment matrix.
//!
//! A [`Blueprint`] is an immutable snapshot. Edits go through
//! [`Blueprint::apply`], which returns a new snapshot and leaves the old one
//! untouched. The collections are `im` persistent structures, so every
//! snapshot shares most of its memory with its predecessor and callers may
//! hold as many snapshots as they like.

mod completeness;
mod diagnostics;
mod edit;
mod merge;

pub use completeness::Completeness;
pub use diagnostics::BlockDiagnostics;
pub use edit::BlueprintEdit;
pub use merge::{merge_blocks, merge_incoming_blocks, AnalyzedBlueprint};

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{GradingConfig, DEFAULT_PASS_THRESHOLD_PERCENT};
use crate::core::{AnswerKey, QuestionAssignment, QuestionBlock, QuestionNumber, QuestionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BlueprintStatus {
    #[default]
    Draft,
    Complete,
}

/// Which selection set an edit or query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Objectives,
    Skills,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: String,
    pub name: String,
    pub question_count: u32,
    pub pass_threshold_percent: f64,
    #[serde(default)]
    pub status: BlueprintStatus,
    #[serde(default)]
    pub objectives: OrdSet<String>,
    #[serde(default)]
    pub skills: OrdSet<String>,
    #[serde(default)]
    pub assignments: OrdMap<QuestionNumber, QuestionAssignment>,
    #[serde(default)]
    pub blocks: Vector<QuestionBlock>,
    #[serde(default)]
    pub keys: Vector<AnswerKey>,
}

impl Blueprint {
    /// Empty blueprint with one blank answer key per question.
    pub fn new(id: impl Into<String>, name: impl Into<String>, question_count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            question_count,
            pass_threshold_percent: DEFAULT_PASS_THRESHOLD_PERCENT,
            status: BlueprintStatus::Draft,
            objectives: OrdSet::new(),
            skills: OrdSet::new(),
            assignments: OrdMap::new(),
            blocks: Vector::new(),
            keys: (1..=question_count).map(AnswerKey::blank).collect(),
        }
    }

    pub fn with_pass_threshold(mut self, percent: f64) -> Self {
        self.pass_threshold_percent = percent;
        self
    }

    /// Empty blueprint starting from the configured passing threshold.
    pub fn from_config(
        id: impl Into<String>,
        name: impl Into<String>,
        question_count: u32,
        grading: &GradingConfig,
    ) -> Self {
        Self::new(id, name, question_count).with_pass_threshold(grading.pass_threshold_percent)
    }

    /// Answer key entry for a question, if the key array has one.
    pub fn key(&self, question: QuestionNumber) -> Option<&AnswerKey> {
        self.keys.iter().find(|k| k.question == question)
    }

    pub fn block(&self, id: &str) -> Option<&QuestionBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn assignment(&self, question: QuestionNumber) -> Option<&QuestionAssignment> {
        self.assignments.get(&question)
    }

    pub fn is_in_range(&self, question: QuestionNumber) -> bool {
        question >= 1 && question <= self.question_count
    }

    /// Question type of every question claimed by some block.
    ///
    /// When blocks overlap, the block listed last wins.
    pub fn question_types(&self) -> BTreeMap<QuestionNumber, QuestionType> {
        let mut types = BTreeMap::new();
        for block in &self.blocks {
            for question in block.questions() {
                types.insert(question, block.question_type);
            }
        }
        types
    }

    /// Per-question points implied by the block definitions (last block wins).
    pub fn block_points(&self) -> BTreeMap<QuestionNumber, f64> {
        let mut points = BTreeMap::new();
        for block in &self.blocks {
            for question in block.questions() {
                points.insert(question, block.points_per_question);
            }
        }
        points
    }

    /// Assignments for questions inside `[1, question_count]`.
    pub fn assignments_in_range(
        &self,
    ) -> impl Iterator<Item = (QuestionNumber, &QuestionAssignment)> + '_ {
        self.assignments
            .iter()
            .map(|(q, a)| (*q, a))
            .filter(move |(q, _)| self.is_in_range(*q))
    }

    pub fn assigned_count(&self) -> usize {
        self.assignments_in_range().count()
    }

    /// Questions whose assignment references `id` in the given selection.
    ///
    /// This is what a removal of `id` would unassign; callers show it in the
    /// confirmation prompt before sending the edit with `confirm_cascade`.
    pub fn dependent_assignments(&self, selection: Selection, id: &str) -> Vec<QuestionNumber> {
        self.assignments
            .iter()
            .filter(|(_, a)| match selection {
                Selection::Objectives => a.objective_id == id,
                Selection::Skills => a.skill_id == id,
            })
            .map(|(q, _)| *q)
            .collect()
    }

    pub fn is_selected(&self, selection: Selection, id: &str) -> bool {
        match selection {
            Selection::Objectives => self.objectives.contains(id),
            Selection::Skills => self.skills.contains(id),
        }
    }

    /// Total points of the evaluation according to the answer key.
    pub fn max_score(&self) -> f64 {
        self.keys.iter().map(|k| k.points).sum()
    }

    /// Fresh block id not used by any existing block.
    pub fn next_block_id(&self) -> String {
        fresh_block_id(self.blocks.iter().map(|b| b.id.as_str()))
    }
}

/// `block-{n}` numbered above every `block-{n}` id in `ids`.
pub(crate) fn fresh_block_id<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let next = ids
        .into_iter()
        .filter_map(|id| id.strip_prefix("block-")?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    format!("block-{}", next)
}
