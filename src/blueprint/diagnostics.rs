//! Warning-level blueprint checks: overlapping and out-of-range block
//! questions, plus the structural contract of the blueprint input.
//!
//! None of these block computation. Callers surface them next to the editor.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::Blueprint;
use crate::config::is_valid_authored_threshold;
use crate::core::QuestionNumber;
use crate::errors::Error;

/// Problems found in one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDiagnostics {
    pub block_id: String,
    /// In-range questions this block shares with another block
    pub overlapping: BTreeSet<QuestionNumber>,
    /// Questions outside `[1, question_count]`
    pub out_of_range: BTreeSet<QuestionNumber>,
}

impl BlockDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.overlapping.is_empty() && self.out_of_range.is_empty()
    }
}

impl Blueprint {
    /// Owners of every in-range question claimed by some block.
    fn question_owners(&self) -> BTreeMap<QuestionNumber, Vec<&str>> {
        let mut owners: BTreeMap<QuestionNumber, Vec<&str>> = BTreeMap::new();
        for block in &self.blocks {
            for question in block.questions() {
                if self.is_in_range(question) {
                    owners.entry(question).or_default().push(block.id.as_str());
                }
            }
        }
        owners
    }

    /// In-range questions claimed by two or more blocks.
    pub fn detect_overlaps(&self) -> BTreeSet<QuestionNumber> {
        self.question_owners()
            .into_iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(question, _)| question)
            .collect()
    }

    /// Block questions outside `[1, question_count]`.
    pub fn out_of_range_questions(&self) -> BTreeSet<QuestionNumber> {
        self.blocks
            .iter()
            .flat_map(|b| b.questions())
            .filter(|q| !self.is_in_range(*q))
            .collect()
    }

    pub fn block_diagnostics(&self) -> Vec<BlockDiagnostics> {
        let overlaps = self.detect_overlaps();
        self.blocks
            .iter()
            .map(|block| {
                let (in_range, out_of_range): (BTreeSet<_>, BTreeSet<_>) = block
                    .questions()
                    .into_iter()
                    .partition(|q| self.is_in_range(*q));
                BlockDiagnostics {
                    block_id: block.id.clone(),
                    overlapping: in_range.intersection(&overlaps).copied().collect(),
                    out_of_range,
                }
            })
            .collect()
    }

    /// Check the blueprint input contract, accumulating every violation.
    pub fn validate_contract(&self) -> Vec<Error> {
        let mut errors = Vec::new();

        if !is_valid_authored_threshold(self.pass_threshold_percent) {
            errors.push(Error::validation(format!(
                "Passing threshold out of range: {} (must be 1-99)",
                self.pass_threshold_percent
            )));
        }

        if self.keys.len() != self.question_count as usize {
            errors.push(Error::validation(format!(
                "Answer key has {} entries but the evaluation has {} questions",
                self.keys.len(),
                self.question_count
            )));
        }

        let misnumbered: Vec<QuestionNumber> = self
            .keys
            .iter()
            .enumerate()
            .filter(|(i, k)| k.question as usize != i + 1)
            .map(|(_, k)| k.question)
            .collect();
        if !misnumbered.is_empty() {
            errors.push(Error::validation(format!(
                "Answer key entries out of sequence: {:?}",
                misnumbered
            )));
        }

        for key in self.keys.iter().filter(|k| !(k.points.is_finite() && k.points >= 0.0)) {
            errors.push(Error::validation(format!(
                "Question {} has invalid points {}",
                key.question, key.points
            )));
        }

        for (question, assignment) in self.assignments_in_range() {
            if !self.objectives.contains(assignment.objective_id.as_str()) {
                errors.push(Error::validation(format!(
                    "Question {} is assigned to unselected objective '{}'",
                    question, assignment.objective_id
                )));
            }
            if !self.skills.contains(assignment.skill_id.as_str()) {
                errors.push(Error::validation(format!(
                    "Question {} is assigned to unselected skill '{}'",
                    question, assignment.skill_id
                )));
            }
        }

        errors
    }
}
