//! Grade calculation and per-student scoring.
//!
//! The grade curve is a two-segment piecewise-linear map anchored at the
//! passing threshold: zero score gives the minimum grade, the threshold gives
//! exactly the passing grade, a perfect score gives the maximum.

pub mod ingest;
pub mod levels;

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::blueprint::Blueprint;
use crate::config::{
    AnswerTokens, GradeScale, GraderightConfig, ParallelConfig, DEFAULT_PASS_THRESHOLD_PERCENT,
};
use crate::core::{PassState, QuestionNumber, QuestionType, ScoredRecord, StudentRecord};
use crate::parallel::map_slice;

pub use levels::AchievementLevel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeOutcome {
    pub grade: f64,
    pub passed: bool,
}

/// Grade on the default 1.0 to 7.0 scale, pass at 4.0, one decimal.
///
/// # Examples
///
/// ```
/// use graderight::grading::grade_of;
///
/// let outcome = grade_of(1.0, 2.0, 60.0);
/// assert_eq!(outcome.grade, 3.5);
/// assert!(!outcome.passed);
/// ```
pub fn grade_of(points_obtained: f64, points_total: f64, pass_threshold_percent: f64) -> GradeOutcome {
    grade_with_scale(
        points_obtained,
        points_total,
        pass_threshold_percent,
        &GradeScale::default(),
        1,
    )
}

/// Grade on an arbitrary scale.
///
/// A threshold that is not a positive number falls back to 60%. A threshold
/// of 100% or more degenerates to a single linear segment. A scale whose
/// anchors are not strictly increasing falls back to the default scale.
pub fn grade_with_scale(
    points_obtained: f64,
    points_total: f64,
    pass_threshold_percent: f64,
    scale: &GradeScale,
    decimals: u32,
) -> GradeOutcome {
    let scale = usable_scale(scale);
    let fraction = if points_total > 0.0 {
        points_obtained / points_total
    } else {
        0.0
    };

    let percent = if pass_threshold_percent > 0.0 {
        pass_threshold_percent
    } else {
        DEFAULT_PASS_THRESHOLD_PERCENT
    };
    let threshold = percent / 100.0;

    let raw = if threshold >= 1.0 {
        scale.min + (scale.max - scale.min) * fraction
    } else if fraction >= threshold {
        scale.pass + (scale.max - scale.pass) * (fraction - threshold) / (1.0 - threshold)
    } else {
        scale.min + (scale.pass - scale.min) * fraction / threshold
    };

    let grade = if raw.is_nan() {
        scale.min
    } else {
        round_to(raw.clamp(scale.min, scale.max), decimals)
    };

    GradeOutcome {
        grade,
        passed: grade >= scale.pass,
    }
}

fn usable_scale(scale: &GradeScale) -> GradeScale {
    if scale.is_valid() {
        *scale
    } else {
        GradeScale::default()
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// How one answer was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    Omitted,
}

#[derive(Debug, Clone, PartialEq)]
struct KeyEntry {
    key: String,
    points: f64,
    question_type: Option<QuestionType>,
}

/// The answer key of a blueprint reduced to what scoring needs.
///
/// Only scorable questions are kept: in range, with a key entry, and either
/// open response or carrying a non-empty key. Everything else is excluded
/// from scoring, aggregation and psychometrics alike.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringKey {
    entries: BTreeMap<QuestionNumber, KeyEntry>,
    tokens: AnswerTokens,
}

impl ScoringKey {
    pub fn from_blueprint(blueprint: &Blueprint, tokens: &AnswerTokens) -> Self {
        let types = blueprint.question_types();
        let mut entries = BTreeMap::new();

        for question in 1..=blueprint.question_count {
            let Some(key) = blueprint.key(question) else {
                log::warn!("Question {} has no answer key entry", question);
                continue;
            };
            let question_type = types.get(&question).copied();
            let is_open = question_type.is_some_and(|t| t.is_open_response());
            if !is_open && !key.has_key() {
                log::debug!("Question {} has an empty key; excluded from scoring", question);
                continue;
            }
            entries.insert(
                question,
                KeyEntry {
                    key: key.key.trim().to_uppercase(),
                    points: key.points,
                    question_type,
                },
            );
        }

        Self {
            entries,
            tokens: tokens.clone(),
        }
    }

    pub fn is_scorable(&self, question: QuestionNumber) -> bool {
        self.entries.contains_key(&question)
    }

    pub fn questions(&self) -> impl Iterator<Item = QuestionNumber> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn points(&self, question: QuestionNumber) -> f64 {
        self.entries.get(&question).map_or(0.0, |e| e.points)
    }

    /// Type of the block claiming the question, if any.
    pub fn question_type(&self, question: QuestionNumber) -> Option<QuestionType> {
        self.entries.get(&question).and_then(|e| e.question_type)
    }

    pub fn points_total(&self) -> f64 {
        self.entries.values().map(|e| e.points).sum()
    }

    pub fn tokens(&self) -> &AnswerTokens {
        &self.tokens
    }

    /// Judge a raw answer token; `None` for questions that are not scorable.
    pub fn classify(&self, question: QuestionNumber, raw: &str) -> Option<AnswerOutcome> {
        let entry = self.entries.get(&question)?;
        let token = raw.trim();

        let outcome = if self.tokens.is_omitted(token) {
            AnswerOutcome::Omitted
        } else if entry.question_type.is_some_and(|t| t.is_open_response()) {
            if token == self.tokens.open_correct {
                AnswerOutcome::Correct
            } else if token == self.tokens.open_incorrect {
                AnswerOutcome::Incorrect
            } else {
                AnswerOutcome::Omitted
            }
        } else if token.to_uppercase() == entry.key {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        };

        Some(outcome)
    }
}

/// Everything needed to score one roster.
#[derive(Debug, Clone)]
pub struct Grader {
    key: ScoringKey,
    pass_threshold_percent: f64,
    scale: GradeScale,
    decimals: u32,
}

impl Grader {
    /// Grader using the blueprint's passing threshold and the configured scale.
    pub fn new(blueprint: &Blueprint, config: &GraderightConfig) -> Self {
        let scale = &config.grading.scale;
        if !scale.is_valid() {
            log::warn!(
                "Grade scale {}/{}/{} is not increasing, using the default scale",
                scale.min,
                scale.pass,
                scale.max
            );
        }
        Self {
            key: ScoringKey::from_blueprint(blueprint, &config.answers),
            pass_threshold_percent: blueprint.pass_threshold_percent,
            scale: usable_scale(scale),
            decimals: config.grading.grade_decimals,
        }
    }

    pub fn with_pass_threshold(mut self, percent: f64) -> Self {
        self.pass_threshold_percent = percent;
        self
    }

    pub fn key(&self) -> &ScoringKey {
        &self.key
    }

    pub fn pass_threshold_percent(&self) -> f64 {
        self.pass_threshold_percent
    }

    pub fn grade(&self, points_obtained: f64, points_total: f64) -> GradeOutcome {
        grade_with_scale(
            points_obtained,
            points_total,
            self.pass_threshold_percent,
            &self.scale,
            self.decimals,
        )
    }
}

/// Score one student record.
///
/// Absent students keep their tallies but get the minimum grade and
/// [`PassState::Absent`].
pub fn score_record(record: Arc<StudentRecord>, grader: &Grader) -> ScoredRecord {
    let key = grader.key();
    let mut points_obtained = 0.0;
    let (mut correct, mut incorrect, mut omitted) = (0u32, 0u32, 0u32);

    for question in key.questions() {
        match key.classify(question, record.answer(question)) {
            Some(AnswerOutcome::Correct) => {
                correct += 1;
                points_obtained += key.points(question);
            }
            Some(AnswerOutcome::Incorrect) => incorrect += 1,
            Some(AnswerOutcome::Omitted) | None => omitted += 1,
        }
    }

    let points_total = key.points_total();
    let (grade, pass_state) = if record.is_present() {
        let outcome = grader.grade(points_obtained, points_total);
        let state = if outcome.passed {
            PassState::Passed
        } else {
            PassState::Failed
        };
        (outcome.grade, state)
    } else {
        (grader.scale.min, PassState::Absent)
    };

    ScoredRecord {
        record,
        points_obtained,
        points_total,
        grade,
        pass_state,
        correct_count: correct,
        incorrect_count: incorrect,
        omitted_count: omitted,
    }
}

/// Score every record, in input order.
pub fn score_roster(
    records: &[Arc<StudentRecord>],
    blueprint: &Blueprint,
    config: &GraderightConfig,
) -> Vec<ScoredRecord> {
    let grader = Grader::new(blueprint, config);
    score_with(records, &grader, &config.parallel)
}

/// Re-derive a fresh scored set for a new passing threshold.
///
/// Only the raw records are reused; no derived field of `scored` is read.
pub fn rescore_roster(
    scored: &[ScoredRecord],
    blueprint: &Blueprint,
    pass_threshold_percent: f64,
    config: &GraderightConfig,
) -> Vec<ScoredRecord> {
    let records: Vec<Arc<StudentRecord>> = scored.iter().map(|s| Arc::clone(&s.record)).collect();
    let grader = Grader::new(blueprint, config).with_pass_threshold(pass_threshold_percent);
    score_with(&records, &grader, &config.parallel)
}

pub(crate) fn score_with(
    records: &[Arc<StudentRecord>],
    grader: &Grader,
    parallel: &ParallelConfig,
) -> Vec<ScoredRecord> {
    let scored = map_slice(records, parallel, |record| {
        score_record(Arc::clone(record), grader)
    });
    log::debug!(
        "Scored {} students against {} questions ({} present)",
        scored.len(),
        grader.key().len(),
        scored.iter().filter(|s| s.is_present()).count()
    );
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::BlueprintEdit;
    use crate::core::{AnswerKey, AttendanceState, QuestionBlock};
    use proptest::prelude::*;

    fn two_question_blueprint() -> Blueprint {
        let mut bp = Blueprint::new("e1", "Prueba", 2);
        bp.blocks.push_back(QuestionBlock::new(
            "b1",
            QuestionType::MultipleChoice4,
            "1-2",
            1.0,
        ));
        bp.keys = vec![AnswerKey::new(1, "A", 1.0), AnswerKey::new(2, "B", 1.0)]
            .into_iter()
            .collect();
        bp
    }

    fn score(bp: &Blueprint, answers: &[&str]) -> ScoredRecord {
        let grader = Grader::new(bp, &GraderightConfig::default());
        score_record(Arc::new(StudentRecord::present("1", "Ana", answers)), &grader)
    }

    #[test]
    fn test_perfect_score_passes_with_max_grade() {
        let scored = score(&two_question_blueprint(), &["A", "B"]);
        assert_eq!(scored.points_obtained, 2.0);
        assert_eq!(scored.grade, 7.0);
        assert_eq!(scored.pass_state, PassState::Passed);
    }

    #[test]
    fn test_half_score_below_threshold_fails() {
        let scored = score(&two_question_blueprint(), &["A", "A"]);
        assert_eq!(scored.points_obtained, 1.0);
        assert_eq!(scored.grade, 3.5);
        assert_eq!(scored.pass_state, PassState::Failed);
        assert_eq!((scored.correct_count, scored.incorrect_count), (1, 1));
    }

    #[test]
    fn test_grade_curve_anchors() {
        assert_eq!(grade_of(0.0, 10.0, 60.0).grade, 1.0);
        assert_eq!(grade_of(6.0, 10.0, 60.0).grade, 4.0);
        assert_eq!(grade_of(10.0, 10.0, 60.0).grade, 7.0);
        assert_eq!(grade_of(8.0, 10.0, 60.0).grade, 5.5);
    }

    #[test]
    fn test_degenerate_thresholds() {
        assert_eq!(grade_of(5.0, 10.0, 100.0).grade, 4.0);
        assert_eq!(grade_of(3.0, 10.0, 0.0), grade_of(3.0, 10.0, 60.0));
        assert_eq!(grade_of(3.0, 10.0, f64::NAN), grade_of(3.0, 10.0, 60.0));
        assert_eq!(grade_of(3.0, 0.0, 60.0).grade, 1.0);
        assert_eq!(grade_of(f64::NAN, 10.0, 60.0).grade, 1.0);
    }

    #[test]
    fn test_malformed_scale_falls_back_to_default() {
        let inverted = GradeScale {
            min: 7.0,
            pass: 4.0,
            max: 1.0,
        };
        let outcome = grade_with_scale(5.0, 10.0, 60.0, &inverted, 1);
        assert_eq!(outcome, grade_of(5.0, 10.0, 60.0));

        let undefined = GradeScale {
            min: f64::NAN,
            ..GradeScale::default()
        };
        assert_eq!(grade_with_scale(10.0, 10.0, 60.0, &undefined, 1).grade, 7.0);
        assert_eq!(grade_with_scale(6.0, 10.0, 60.0, &GradeScale::default(), u32::MAX).grade, 4.0);
    }

    #[test]
    fn test_grader_with_inverted_scale_scores_absent_students_on_default_minimum() {
        let mut config = GraderightConfig::default();
        config.grading.scale = GradeScale {
            min: 7.0,
            pass: 4.0,
            max: 1.0,
        };
        let grader = Grader::new(&two_question_blueprint(), &config);
        let record = StudentRecord::new("9", "Beto", Default::default(), AttendanceState::Absent);
        assert_eq!(score_record(Arc::new(record), &grader).grade, 1.0);
        assert_eq!(grader.grade(2.0, 2.0).grade, 7.0);
    }

    #[test]
    fn test_classifier_rules() {
        let mut bp = two_question_blueprint().apply(BlueprintEdit::SetQuestionCount(3)).unwrap();
        bp.blocks
            .push_back(QuestionBlock::new("b2", QuestionType::OpenResponse, "3", 2.0));
        let key = ScoringKey::from_blueprint(&bp, &AnswerTokens::default());

        assert_eq!(key.classify(1, " a "), Some(AnswerOutcome::Correct));
        assert_eq!(key.classify(1, "o"), Some(AnswerOutcome::Omitted));
        assert_eq!(key.classify(1, ""), Some(AnswerOutcome::Omitted));
        assert_eq!(key.classify(2, "C"), Some(AnswerOutcome::Incorrect));
        assert_eq!(key.classify(3, "1"), Some(AnswerOutcome::Correct));
        assert_eq!(key.classify(3, "0"), Some(AnswerOutcome::Incorrect));
        assert_eq!(key.classify(3, "A"), Some(AnswerOutcome::Omitted));
        assert_eq!(key.classify(4, "A"), None);
    }

    #[test]
    fn test_open_response_uses_configured_marks() {
        let bp = Blueprint::new("e", "Abierta", 1)
            .apply(BlueprintEdit::AddBlock(QuestionBlock::new(
                "",
                QuestionType::OpenResponse,
                "1",
                2.0,
            )))
            .unwrap();
        let tokens = AnswerTokens {
            open_correct: "V".to_string(),
            open_incorrect: "X".to_string(),
            ..AnswerTokens::default()
        };
        let key = ScoringKey::from_blueprint(&bp, &tokens);

        assert_eq!(key.classify(1, "V"), Some(AnswerOutcome::Correct));
        assert_eq!(key.classify(1, "X"), Some(AnswerOutcome::Incorrect));
        assert_eq!(key.classify(1, "0"), Some(AnswerOutcome::Omitted));
        assert_eq!(key.classify(1, "1"), Some(AnswerOutcome::Omitted));
    }

    #[test]
    fn test_empty_key_is_not_scorable() {
        let bp = two_question_blueprint()
            .apply(BlueprintEdit::UpdateKey {
                question: 2,
                key: String::new(),
                points: None,
            })
            .unwrap();
        let scored = score(&bp, &["A", "B"]);
        assert_eq!(scored.points_total, 1.0);
        assert_eq!(scored.grade, 7.0);
        assert_eq!(scored.correct_count + scored.incorrect_count + scored.omitted_count, 1);
    }

    #[test]
    fn test_absent_student() {
        let grader = Grader::new(&two_question_blueprint(), &GraderightConfig::default());
        let record = StudentRecord::new("9", "Beto", Default::default(), AttendanceState::Absent);
        let scored = score_record(Arc::new(record), &grader);
        assert_eq!(scored.pass_state, PassState::Absent);
        assert_eq!(scored.grade, 1.0);
        assert_eq!(scored.omitted_count, 2);
    }

    #[test]
    fn test_rescore_is_idempotent_and_fresh() {
        let bp = two_question_blueprint();
        let config = GraderightConfig::default();
        let records = vec![
            Arc::new(StudentRecord::present("1", "Ana", &["A", "B"])),
            Arc::new(StudentRecord::present("2", "Beto", &["A", "C"])),
        ];
        let first = score_roster(&records, &bp, &config);
        let strict = rescore_roster(&first, &bp, 90.0, &config);
        let back = rescore_roster(&strict, &bp, 60.0, &config);

        assert_eq!(strict[1].pass_state, PassState::Failed);
        assert_eq!(first, back);
        assert!(Arc::ptr_eq(&first[0].record, &strict[0].record));
    }

    proptest! {
        #[test]
        fn prop_grade_bounds(
            obtained in 0.0f64..1000.0,
            total in 0.0f64..1000.0,
            threshold in 0.0f64..=100.0,
        ) {
            let grade = grade_of(obtained, total, threshold).grade;
            prop_assert!((1.0..=7.0).contains(&grade));
        }

        #[test]
        fn prop_grade_monotonic(
            a in 0.0f64..100.0,
            b in 0.0f64..100.0,
            total in 1.0f64..100.0,
            threshold in 1.0f64..=100.0,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(grade_of(low, total, threshold).grade <= grade_of(high, total, threshold).grade);
        }

        #[test]
        fn prop_threshold_maps_to_pass_grade(
            threshold in 1.0f64..100.0,
            total in 1.0f64..500.0,
        ) {
            let outcome = grade_of(threshold / 100.0 * total, total, threshold);
            prop_assert_eq!(outcome.grade, 4.0);
            prop_assert!(outcome.passed);
        }
    }
}
