//! Classical test theory item statistics.
//!
//! Difficulty (p-value) is the share of present students answering a question
//! correctly. Discrimination compares that share between the highest and the
//! lowest scoring groups. The group size follows the usual 27% convention
//! for rosters above the small-roster limit and halves otherwise.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::blueprint::Blueprint;
use crate::config::{ItemQualityThresholds, PsychometricsConfig};
use crate::core::{QuestionNumber, QuestionType, ScoredRecord};
use crate::grading::{AnswerOutcome, ScoringKey};

pub const OMITTED_BUCKET: &str = "Omitted";
pub const CORRECT_BUCKET: &str = "Correct";
pub const INCORRECT_BUCKET: &str = "Incorrect";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DifficultyLabel {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiscriminationLabel {
    Good,
    Fair,
    Poor,
}

impl ItemQualityThresholds {
    pub fn difficulty(&self, p_value: f64) -> DifficultyLabel {
        if p_value > self.easy_above {
            DifficultyLabel::Easy
        } else if p_value < self.hard_below {
            DifficultyLabel::Hard
        } else {
            DifficultyLabel::Medium
        }
    }

    pub fn discrimination(&self, index: f64) -> DiscriminationLabel {
        if index > self.good_discrimination_above {
            DiscriminationLabel::Good
        } else if index < self.poor_discrimination_below {
            DiscriminationLabel::Poor
        } else {
            DiscriminationLabel::Fair
        }
    }
}

/// Difficulty and discrimination of one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPsychometric {
    pub question: QuestionNumber,
    pub p_value: f64,
    /// Absent when the roster is too small to form both groups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrimination_index: Option<f64>,
    pub difficulty: DifficultyLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrimination: Option<DiscriminationLabel>,
}

/// Answer distribution of one assigned question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysisItem {
    pub question: QuestionNumber,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    pub achievement_percentage: f64,
    /// Token (or Correct/Incorrect/Omitted for open response) to count
    pub answer_counts: BTreeMap<String, u32>,
    pub respondents: u32,
    pub objective_id: String,
    pub skill_id: String,
}

fn correct_count(students: &[&ScoredRecord], question: QuestionNumber, key: &ScoringKey) -> usize {
    students
        .iter()
        .filter(|s| key.classify(question, s.record.answer(question)) == Some(AnswerOutcome::Correct))
        .count()
}

fn fraction_correct(students: &[&ScoredRecord], question: QuestionNumber, key: &ScoringKey) -> f64 {
    if students.is_empty() {
        return 0.0;
    }
    correct_count(students, question, key) as f64 / students.len() as f64
}

/// High and low scoring groups, or `None` when either would be empty.
pub fn split_groups<'a, 'b>(
    students: &'b [&'a ScoredRecord],
    config: &PsychometricsConfig,
) -> Option<(Vec<&'a ScoredRecord>, Vec<&'a ScoredRecord>)> {
    let n = students.len();
    if n <= 1 {
        return None;
    }
    let size = config.group_size(n).min(n);
    if size == 0 {
        return None;
    }

    let mut ranked: Vec<&ScoredRecord> = students.to_vec();
    ranked.sort_by(|a, b| b.points_obtained.total_cmp(&a.points_obtained));

    let high = ranked[..size].to_vec();
    let low = ranked[n - size..].to_vec();
    Some((high, low))
}

/// Item statistics for every scorable question.
pub fn item_psychometrics(
    students: &[&ScoredRecord],
    key: &ScoringKey,
    config: &PsychometricsConfig,
) -> Vec<ItemPsychometric> {
    if students.is_empty() {
        return Vec::new();
    }
    let groups = split_groups(students, config);
    if groups.is_none() {
        log::debug!(
            "Roster of {} too small for discrimination groups",
            students.len()
        );
    }

    key.questions()
        .map(|question| {
            let p_value = fraction_correct(students, question, key);
            let discrimination_index = groups.as_ref().map(|(high, low)| {
                fraction_correct(high, question, key) - fraction_correct(low, question, key)
            });
            ItemPsychometric {
                question,
                p_value,
                discrimination_index,
                difficulty: config.labels.difficulty(p_value),
                discrimination: discrimination_index.map(|d| config.labels.discrimination(d)),
            }
        })
        .collect()
}

fn answer_counts(
    students: &[&ScoredRecord],
    question: QuestionNumber,
    key: &ScoringKey,
) -> BTreeMap<String, u32> {
    let question_type = key.question_type(question);
    let is_open = question_type.is_some_and(|t| t.is_open_response());

    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    if is_open {
        counts.insert(CORRECT_BUCKET.to_string(), 0);
        counts.insert(INCORRECT_BUCKET.to_string(), 0);
    } else if let Some(t) = question_type {
        for option in t.options() {
            counts.insert((*option).to_string(), 0);
        }
    }
    counts.insert(OMITTED_BUCKET.to_string(), 0);

    for student in students {
        let raw = student.record.answer(question);
        let bucket = match key.classify(question, raw) {
            Some(AnswerOutcome::Omitted) | None => OMITTED_BUCKET.to_string(),
            Some(AnswerOutcome::Correct) if is_open => CORRECT_BUCKET.to_string(),
            Some(AnswerOutcome::Incorrect) if is_open => INCORRECT_BUCKET.to_string(),
            Some(_) => raw.trim().to_uppercase(),
        };
        *counts.entry(bucket).or_insert(0) += 1;
    }
    counts
}

/// Distribution and achievement of every assigned, scorable question.
pub fn question_analysis(
    students: &[&ScoredRecord],
    blueprint: &Blueprint,
    key: &ScoringKey,
) -> Vec<QuestionAnalysisItem> {
    if students.is_empty() {
        return Vec::new();
    }

    blueprint
        .assignments_in_range()
        .filter(|(q, _)| key.is_scorable(*q))
        .map(|(question, assignment)| QuestionAnalysisItem {
            question,
            key: blueprint
                .key(question)
                .map(|k| k.key.clone())
                .unwrap_or_default(),
            question_type: key.question_type(question),
            achievement_percentage: fraction_correct(students, question, key) * 100.0,
            answer_counts: answer_counts(students, question, key),
            respondents: students.len() as u32,
            objective_id: assignment.objective_id.clone(),
            skill_id: assignment.skill_id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnswerTokens, GraderightConfig};
    use crate::core::{AnswerKey, QuestionAssignment, QuestionBlock, StudentRecord};
    use crate::grading::score_roster;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn blueprint() -> Blueprint {
        let mut bp = Blueprint::new("e1", "Prueba", 3);
        bp.blocks.push_back(QuestionBlock::new("b1", QuestionType::MultipleChoice4, "1-2", 1.0));
        bp.blocks.push_back(QuestionBlock::new("b2", QuestionType::OpenResponse, "3", 2.0));
        bp.keys = vec![
            AnswerKey::new(1, "A", 1.0),
            AnswerKey::new(2, "B", 1.0),
            AnswerKey::new(3, "", 2.0),
        ]
        .into_iter()
        .collect();
        for q in 1..=3 {
            bp.assignments.insert(q, QuestionAssignment::new("oa1", "h1"));
        }
        bp
    }

    fn scored(rows: &[[&str; 3]]) -> Vec<ScoredRecord> {
        let records: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, a)| Arc::new(StudentRecord::present(i.to_string(), "S", &a[..])))
            .collect();
        score_roster(&records, &blueprint(), &GraderightConfig::default())
    }

    fn key() -> ScoringKey {
        ScoringKey::from_blueprint(&blueprint(), &AnswerTokens::default())
    }

    #[test]
    fn test_discrimination_with_small_roster() {
        let roster = scored(&[
            ["A", "B", "1"],
            ["A", "B", "0"],
            ["B", "C", "1"],
            ["C", "O", ""],
        ]);
        let present: Vec<&ScoredRecord> = roster.iter().collect();
        let items = item_psychometrics(&present, &key(), &PsychometricsConfig::default());

        let q1 = &items[0];
        assert_eq!(q1.p_value, 0.5);
        assert_eq!(q1.discrimination_index, Some(1.0));
        assert_eq!(q1.discrimination, Some(DiscriminationLabel::Good));
        assert_eq!(q1.difficulty, DifficultyLabel::Medium);

        let q3 = &items[2];
        assert_eq!(q3.p_value, 0.5);
        assert_eq!(q3.discrimination_index, Some(0.0));
        assert_eq!(q3.discrimination, Some(DiscriminationLabel::Poor));
    }

    #[test]
    fn test_single_student_has_no_discrimination() {
        let roster = scored(&[["A", "B", "1"]]);
        let present: Vec<&ScoredRecord> = roster.iter().collect();
        let items = item_psychometrics(&present, &key(), &PsychometricsConfig::default());
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.discrimination_index.is_none()));
        assert_eq!(items[0].difficulty, DifficultyLabel::Easy);
    }

    #[test]
    fn test_group_sizes() {
        let roster = scored(&[["A", "B", "1"]; 10]);
        let present: Vec<&ScoredRecord> = roster.iter().collect();
        let (high, low) = split_groups(&present, &PsychometricsConfig::default()).unwrap();
        assert_eq!((high.len(), low.len()), (2, 2));
    }

    #[test]
    fn test_distractor_buckets() {
        let roster = scored(&[
            ["A", "b", "1"],
            ["d", "", "0"],
            ["X", "O", "7"],
        ]);
        let present: Vec<&ScoredRecord> = roster.iter().collect();
        let items = question_analysis(&present, &blueprint(), &key());

        let q1: Vec<(&str, u32)> = items[0]
            .answer_counts
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(
            q1,
            vec![("A", 1), ("B", 0), ("C", 0), ("D", 1), ("Omitted", 0), ("X", 1)]
        );
        assert_eq!(items[1].answer_counts["Omitted"], 2);
        assert_eq!(items[1].answer_counts["B"], 1);

        let q3: Vec<(&str, u32)> = items[2]
            .answer_counts
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(q3, vec![("Correct", 1), ("Incorrect", 1), ("Omitted", 1)]);
        assert_eq!(items[2].respondents, 3);
        assert!((items[0].achievement_percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_quality_labels() {
        let labels = ItemQualityThresholds::default();
        assert_eq!(labels.difficulty(0.76), DifficultyLabel::Easy);
        assert_eq!(labels.difficulty(0.75), DifficultyLabel::Medium);
        assert_eq!(labels.difficulty(0.2), DifficultyLabel::Hard);
        assert_eq!(labels.discrimination(0.3), DiscriminationLabel::Fair);
        assert_eq!(labels.discrimination(-0.2), DiscriminationLabel::Poor);
    }
}
