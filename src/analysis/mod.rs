//! Aggregate analysis of a scored roster.
//!
//! [`analyze`] produces the [`AnalysisData`] handed to reporting and export
//! code. [`evaluate`] runs the whole pipeline from raw records: scoring,
//! aggregation, psychometrics and the course summary.

pub mod achievement;
pub mod metrics;
pub mod psychometrics;
pub mod summary;

pub use achievement::{student_metrics, Achievement, AnalysisItem};
pub use metrics::AnalysisMetrics;
pub use psychometrics::{
    item_psychometrics, question_analysis, split_groups, DifficultyLabel, DiscriminationLabel,
    ItemPsychometric, QuestionAnalysisItem,
};
pub use summary::{course_summary, CourseSummary, QuartileBand};

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug_span;

use crate::blueprint::Blueprint;
use crate::config::GraderightConfig;
use crate::core::{Catalog, ScoredRecord, StudentRecord};
use crate::grading::{score_with, Grader, ScoringKey};
use crate::observability::{
    describe_context, get_current_context, set_current_blueprint, set_phase, AnalysisPhase,
};

/// The output contract of the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub by_unit: Vec<AnalysisItem>,
    pub by_axis: Vec<AnalysisItem>,
    pub by_objective: Vec<AnalysisItem>,
    pub by_skill: Vec<AnalysisItem>,
    pub by_objective_skill: BTreeMap<String, AnalysisMetrics>,
    pub by_question: Vec<QuestionAnalysisItem>,
    pub item_psychometrics: Vec<ItemPsychometric>,
}

impl AnalysisData {
    pub fn to_json(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Aggregate a scored roster. Absent students are ignored throughout.
pub fn analyze(
    scored: &[ScoredRecord],
    blueprint: &Blueprint,
    catalog: &Catalog,
    config: &GraderightConfig,
) -> AnalysisData {
    let key = ScoringKey::from_blueprint(blueprint, &config.answers);
    analyze_with_key(scored, blueprint, catalog, &key, config)
}

fn analyze_with_key(
    scored: &[ScoredRecord],
    blueprint: &Blueprint,
    catalog: &Catalog,
    key: &ScoringKey,
    config: &GraderightConfig,
) -> AnalysisData {
    let present: Vec<&ScoredRecord> = scored.iter().filter(|s| s.is_present()).collect();
    if present.is_empty() {
        log::debug!("No present students; analysis is empty");
        return AnalysisData::default();
    }

    let achievement = {
        let _phase = set_phase(AnalysisPhase::Aggregation);
        let _span = debug_span!("aggregation", students = present.len()).entered();
        achievement::aggregate(&present, blueprint, catalog, key, &config.parallel)
    };

    let (by_question, item_psychometrics) = {
        let _phase = set_phase(AnalysisPhase::Psychometrics);
        let _span = debug_span!("psychometrics", questions = key.len()).entered();
        (
            question_analysis(&present, blueprint, key),
            item_psychometrics(&present, key, &config.psychometrics),
        )
    };

    AnalysisData {
        by_unit: achievement.by_unit,
        by_axis: achievement.by_axis,
        by_objective: achievement.by_objective,
        by_skill: achievement.by_skill,
        by_objective_skill: achievement.by_objective_skill,
        by_question,
        item_psychometrics,
    }
}

/// Everything derived from one roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub scored: Vec<ScoredRecord>,
    pub analysis: AnalysisData,
    pub summary: Option<CourseSummary>,
}

/// Score, aggregate and summarize raw records in one pass.
///
/// Pure in its arguments: running it again with another passing threshold
/// on the blueprint gives a fresh evaluation with nothing carried over.
pub fn evaluate(
    records: &[Arc<StudentRecord>],
    blueprint: &Blueprint,
    catalog: &Catalog,
    config: &GraderightConfig,
) -> Evaluation {
    let _blueprint = set_current_blueprint(blueprint.id.clone());
    let _span = debug_span!("evaluate", blueprint = %blueprint.id, students = records.len()).entered();

    let grader = Grader::new(blueprint, config);
    let scored = {
        let _phase = set_phase(AnalysisPhase::Scoring);
        let scored = score_with(records, &grader, &config.parallel);
        log::debug!(
            "Scored {} records {}",
            scored.len(),
            describe_context(&get_current_context())
        );
        scored
    };

    let analysis = analyze_with_key(&scored, blueprint, catalog, grader.key(), config);

    let summary = {
        let _phase = set_phase(AnalysisPhase::Summary);
        let summary = course_summary(&scored, blueprint.max_score());
        if summary.is_none() {
            log::debug!(
                "No present students {}",
                describe_context(&get_current_context())
            );
        }
        summary
    };

    Evaluation {
        scored,
        analysis,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnswerKey, AttendanceState, QuestionAssignment};

    fn blueprint() -> Blueprint {
        let mut bp = Blueprint::new("e1", "Prueba", 2);
        bp.keys = vec![AnswerKey::new(1, "A", 1.0), AnswerKey::new(2, "B", 1.0)]
            .into_iter()
            .collect();
        bp.assignments.insert(1, QuestionAssignment::new("oa1", "h1"));
        bp.assignments.insert(2, QuestionAssignment::new("oa1", "h2"));
        bp
    }

    #[test]
    fn test_everyone_absent_gives_empty_analysis() {
        let records = vec![Arc::new(StudentRecord::new(
            "1",
            "Ana",
            Default::default(),
            AttendanceState::Absent,
        ))];
        let evaluation = evaluate(&records, &blueprint(), &Catalog::new(), &GraderightConfig::default());
        assert_eq!(evaluation.analysis, AnalysisData::default());
        assert!(evaluation.summary.is_none());
        assert_eq!(evaluation.scored.len(), 1);
    }

    #[test]
    fn test_output_contract_field_names() {
        let records = vec![Arc::new(StudentRecord::present("1", "Ana", &["A", "C"]))];
        let evaluation = evaluate(&records, &blueprint(), &Catalog::new(), &GraderightConfig::default());
        let json: serde_json::Value =
            serde_json::from_str(&evaluation.analysis.to_json().unwrap()).unwrap();

        for field in [
            "byUnit",
            "byAxis",
            "byObjective",
            "bySkill",
            "byObjectiveSkill",
            "byQuestion",
            "itemPsychometrics",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["byObjective"][0]["name"], "oa1");
        assert_eq!(json["byObjectiveSkill"]["oa1-h2"]["incorrect"], 1);
        assert!(json["itemPsychometrics"][0].get("discriminationIndex").is_none());
    }

    #[test]
    fn test_analyze_matches_evaluate() {
        let records = vec![
            Arc::new(StudentRecord::present("1", "Ana", &["A", "B"])),
            Arc::new(StudentRecord::present("2", "Beto", &["O", "B"])),
        ];
        let config = GraderightConfig::default();
        let evaluation = evaluate(&records, &blueprint(), &Catalog::new(), &config);
        let again = analyze(&evaluation.scored, &blueprint(), &Catalog::new(), &config);
        assert_eq!(evaluation.analysis, again);
    }
}
