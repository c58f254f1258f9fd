//! Reconciling blueprint data proposed by an external source.
//!
//! Payloads come from a document-analysis assistant and are not trusted:
//! every entry is decoded on its own and entries that fail to decode are
//! dropped with a warning, never fatal.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::{fresh_block_id, Blueprint};
use crate::config::is_valid_authored_threshold;
use crate::core::{AnswerKey, QuestionAssignment, QuestionBlock, QuestionNumber, QuestionType};
use crate::ranges;

/// Partial blueprint produced outside the editor.
///
/// Absent fields leave the current blueprint untouched. List fields are kept
/// as raw JSON so one malformed entry cannot reject the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzedBlueprint {
    pub name: Option<String>,
    pub question_count: Option<u32>,
    pub pass_threshold_percent: Option<f64>,
    pub objectives: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub assignments: Option<Vec<Value>>,
    pub blocks: Option<Vec<Value>>,
    pub keys: Option<Vec<Value>>,
}

impl AnalyzedBlueprint {
    pub fn from_json(json: &str) -> crate::errors::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingBlock {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    question_type: QuestionType,
    range_expression: String,
    points_per_question: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingAssignment {
    question: QuestionNumber,
    objective_id: String,
    skill_id: String,
}

#[derive(Debug, Deserialize)]
struct IncomingKey {
    question: QuestionNumber,
    key: String,
}

fn decode<T: serde::de::DeserializeOwned>(kind: &str, value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::warn!("Skipping malformed incoming {}: {}", kind, e);
            None
        }
    }
}

/// Merge blocks sharing `(type, points)` into one block per pair.
///
/// Groups keep first-seen order and the id of their first block; ranges are
/// unioned and rewritten in canonical form. Blank or repeated ids get a fresh
/// `block-{n}` id that no other merged block uses. Blocks with a negative or
/// non-finite point value are dropped.
///
/// # Examples
///
/// ```
/// use graderight::blueprint::merge_blocks;
/// use graderight::core::{QuestionBlock, QuestionType};
///
/// let merged = merge_blocks(vec![
///     QuestionBlock::new("a", QuestionType::MultipleChoice4, "1-3", 1.0),
///     QuestionBlock::new("b", QuestionType::MultipleChoice4, "5,6", 1.0),
/// ]);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].range_expression, "1-3, 5-6");
/// ```
pub fn merge_blocks<I>(blocks: I) -> Vec<QuestionBlock>
where
    I: IntoIterator<Item = QuestionBlock>,
{
    let mut groups: Vec<(QuestionBlock, BTreeSet<QuestionNumber>)> = Vec::new();

    for block in blocks {
        if !block.points_per_question.is_finite() || block.points_per_question < 0.0 {
            log::warn!(
                "Skipping block '{}' with invalid points {}",
                block.id,
                block.points_per_question
            );
            continue;
        }

        let questions = block.questions();
        let existing = groups.iter_mut().find(|(first, _)| {
            first.question_type == block.question_type
                && first.points_per_question.to_bits() == block.points_per_question.to_bits()
        });

        match existing {
            Some((_, union)) => union.extend(questions),
            None => groups.push((block, questions)),
        }
    }

    let mut taken: BTreeSet<String> = groups
        .iter()
        .map(|(first, _)| first.id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let mut assigned: BTreeSet<String> = BTreeSet::new();

    groups
        .into_iter()
        .map(|(first, union)| {
            let explicit = first.id.trim();
            let id = if explicit.is_empty() || assigned.contains(explicit) {
                let fresh = fresh_block_id(taken.iter().map(String::as_str));
                taken.insert(fresh.clone());
                fresh
            } else {
                explicit.to_string()
            };
            assigned.insert(id.clone());
            QuestionBlock {
                id,
                range_expression: ranges::compact_to_canonical(union),
                ..first
            }
        })
        .collect()
}

/// Decode untrusted block JSON and merge what survives.
pub fn merge_incoming_blocks(incoming: &[Value]) -> Vec<QuestionBlock> {
    let decoded = incoming
        .iter()
        .filter_map(|value| decode::<IncomingBlock>("block", value))
        .map(|b| QuestionBlock {
            id: b.id.unwrap_or_default(),
            question_type: b.question_type,
            range_expression: b.range_expression,
            points_per_question: b.points_per_question,
        });
    merge_blocks(decoded)
}

/// Apply an external payload on top of `current`.
///
/// Answer key reconciliation, per question `1..=N` of the merged blueprint:
/// the incoming answer wins, else the prior one is kept, else blank. Points
/// always come from the merged blocks, falling back to the prior value, then
/// to 1.
pub(crate) fn merge_analyzed(current: &Blueprint, payload: AnalyzedBlueprint) -> Blueprint {
    let mut next = current.clone();

    if let Some(name) = payload.name {
        next.name = name;
    }
    if let Some(count) = payload.question_count {
        next.question_count = count;
    }
    match payload.pass_threshold_percent {
        Some(p) if is_valid_authored_threshold(p) => next.pass_threshold_percent = p,
        Some(p) => log::warn!("Ignoring incoming passing threshold {}", p),
        None => {}
    }
    if let Some(objectives) = payload.objectives {
        next.objectives = objectives.into_iter().collect::<OrdSet<_>>();
    }
    if let Some(skills) = payload.skills {
        next.skills = skills.into_iter().collect::<OrdSet<_>>();
    }
    if let Some(blocks) = payload.blocks {
        next.blocks = merge_incoming_blocks(&blocks).into_iter().collect::<Vector<_>>();
    }
    if let Some(assignments) = payload.assignments {
        next.assignments = assignments
            .iter()
            .filter_map(|v| decode::<IncomingAssignment>("assignment", v))
            .filter(|a| a.question > 0)
            .map(|a| (a.question, QuestionAssignment::new(a.objective_id, a.skill_id)))
            .collect::<OrdMap<_, _>>();
    }

    let incoming_keys: std::collections::BTreeMap<QuestionNumber, String> = payload
        .keys
        .unwrap_or_default()
        .iter()
        .filter_map(|v| decode::<IncomingKey>("key", v))
        .map(|k| (k.question, k.key.trim().to_uppercase()))
        .collect();

    let block_points = next.block_points();
    next.keys = (1..=next.question_count)
        .map(|question| {
            let prior = current.key(question);
            let key = incoming_keys
                .get(&question)
                .cloned()
                .or_else(|| prior.map(|k| k.key.clone()))
                .unwrap_or_default();
            let points = block_points
                .get(&question)
                .copied()
                .or_else(|| prior.map(|k| k.points))
                .unwrap_or(1.0);
            AnswerKey::new(question, key, points)
        })
        .collect();

    log::debug!(
        "Merged analyzed blueprint: {} blocks, {} assignments, {} incoming keys",
        next.blocks.len(),
        next.assignments.len(),
        incoming_keys.len()
    );

    next
}
