//! Per-category achievement metrics.
//!
//! A category is a set of questions selected through the assignment matrix:
//! every question of an objective, of a skill, of an objective×skill pair, or
//! of all objectives belonging to a unit or thematic axis. Only in-range,
//! scorable questions take part.

use serde::Serialize;
use std::collections::BTreeMap;

use super::metrics::AnalysisMetrics;
use crate::blueprint::Blueprint;
use crate::config::ParallelConfig;
use crate::core::catalog::{collation_key, objective_code_number};
use crate::core::{Catalog, QuestionAssignment, QuestionNumber, ScoredRecord};
use crate::grading::{AnswerOutcome, ScoringKey};
use crate::parallel::map_slice;

/// Achievement of one category, overall and per student.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_id: Option<String>,
    pub questions: Vec<QuestionNumber>,
    /// Counts summed over all present students
    pub general: AnalysisMetrics,
    pub by_student: BTreeMap<String, AnalysisMetrics>,
}

/// The five category breakdowns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Achievement {
    pub by_unit: Vec<AnalysisItem>,
    pub by_axis: Vec<AnalysisItem>,
    pub by_objective: Vec<AnalysisItem>,
    pub by_skill: Vec<AnalysisItem>,
    pub by_objective_skill: BTreeMap<String, AnalysisMetrics>,
}

#[derive(Debug, Clone)]
struct Category {
    id: String,
    name: String,
    unit_id: Option<String>,
    axis_id: Option<String>,
    questions: Vec<QuestionNumber>,
}

impl Category {
    fn new(id: impl Into<String>, name: impl Into<String>, questions: Vec<QuestionNumber>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_id: None,
            axis_id: None,
            questions,
        }
    }
}

/// Assignments that take part in aggregation.
pub(crate) fn scorable_assignments<'a>(
    blueprint: &'a Blueprint,
    key: &'a ScoringKey,
) -> Vec<(QuestionNumber, &'a QuestionAssignment)> {
    blueprint
        .assignments_in_range()
        .filter(|(q, _)| key.is_scorable(*q))
        .collect()
}

/// Metrics of one student over a question set.
pub fn student_metrics(
    student: &ScoredRecord,
    questions: &[QuestionNumber],
    key: &ScoringKey,
) -> AnalysisMetrics {
    AnalysisMetrics::from_outcomes(questions.iter().map(|q| {
        key.classify(*q, student.record.answer(*q))
            .unwrap_or(AnswerOutcome::Omitted)
    }))
}

fn measure(category: &Category, students: &[&ScoredRecord], key: &ScoringKey) -> AnalysisItem {
    let per_student: Vec<(String, AnalysisMetrics)> = students
        .iter()
        .map(|s| {
            (
                s.student_id().to_string(),
                student_metrics(s, &category.questions, key),
            )
        })
        .collect();

    let general = per_student.iter().map(|(_, m)| m).sum();

    AnalysisItem {
        id: category.id.clone(),
        name: category.name.clone(),
        unit_id: category.unit_id.clone(),
        axis_id: category.axis_id.clone(),
        questions: category.questions.clone(),
        general,
        by_student: per_student.into_iter().collect(),
    }
}

fn measure_all(
    categories: Vec<Category>,
    students: &[&ScoredRecord],
    key: &ScoringKey,
    parallel: &ParallelConfig,
) -> Vec<AnalysisItem> {
    map_slice(&categories, parallel, |c| measure(c, students, key))
        .into_iter()
        .filter(|item| !item.general.is_empty())
        .collect()
}

fn questions_where<F>(assignments: &[(QuestionNumber, &QuestionAssignment)], pred: F) -> Vec<QuestionNumber>
where
    F: Fn(&QuestionAssignment) -> bool,
{
    assignments
        .iter()
        .filter(|(_, a)| pred(a))
        .map(|(q, _)| *q)
        .collect()
}

fn unit_categories(
    catalog: &Catalog,
    assignments: &[(QuestionNumber, &QuestionAssignment)],
) -> Vec<Category> {
    catalog
        .units
        .iter()
        .map(|unit| {
            let questions = questions_where(assignments, |a| {
                catalog
                    .objective(&a.objective_id)
                    .is_some_and(|o| o.unit_id == unit.id)
            });
            Category::new(&unit.id, &unit.name, questions)
        })
        .filter(|c| !c.questions.is_empty())
        .collect()
}

fn axis_categories(
    catalog: &Catalog,
    assignments: &[(QuestionNumber, &QuestionAssignment)],
) -> Vec<Category> {
    catalog
        .axes
        .iter()
        .map(|axis| {
            let questions = questions_where(assignments, |a| {
                catalog
                    .objective(&a.objective_id)
                    .is_some_and(|o| o.axis_id == axis.id)
            });
            Category::new(&axis.id, &axis.name, questions)
        })
        .filter(|c| !c.questions.is_empty())
        .collect()
}

/// Objectives ordered by unit name, axis name, then code number. Names
/// compare without regard to case or accents. Objectives missing from the
/// catalog come last, named by their id.
fn objective_categories(
    catalog: &Catalog,
    assignments: &[(QuestionNumber, &QuestionAssignment)],
) -> Vec<Category> {
    let ids: Vec<&str> = assignments
        .iter()
        .map(|(_, a)| a.objective_id.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let (mut known, unknown): (Vec<&str>, Vec<&str>) =
        ids.into_iter().partition(|id| catalog.objective(id).is_some());

    let sort_key = |id: &str| {
        let objective = catalog.objective(id);
        let unit = objective
            .and_then(|o| catalog.unit(&o.unit_id))
            .map(|u| u.name.as_str())
            .unwrap_or("");
        let axis = objective
            .and_then(|o| catalog.axis(&o.axis_id))
            .map(|a| a.name.as_str())
            .unwrap_or("");
        let code = objective.map_or(999, |o| objective_code_number(&o.code));
        (collation_key(unit), unit, collation_key(axis), axis, code)
    };
    known.sort_by_cached_key(|id| sort_key(id));

    known
        .into_iter()
        .chain(unknown)
        .map(|id| {
            let questions = questions_where(assignments, |a| a.objective_id == id);
            match catalog.objective(id) {
                Some(o) => Category {
                    unit_id: Some(o.unit_id.clone()),
                    axis_id: Some(o.axis_id.clone()),
                    ..Category::new(
                        id,
                        format!(
                            "{} ({}): {}",
                            o.code,
                            catalog.unit_short_name(&o.unit_id),
                            o.description
                        ),
                        questions,
                    )
                },
                None => Category::new(id, id, questions),
            }
        })
        .collect()
}

/// Skills in catalog order, then skills missing from the catalog by id.
fn skill_categories(
    catalog: &Catalog,
    assignments: &[(QuestionNumber, &QuestionAssignment)],
) -> Vec<Category> {
    let used: std::collections::BTreeSet<&str> =
        assignments.iter().map(|(_, a)| a.skill_id.as_str()).collect();

    let known = catalog
        .skills
        .iter()
        .filter(|s| used.contains(s.id.as_str()))
        .map(|s| (s.id.as_str(), s.name.as_str()));
    let unknown = used
        .iter()
        .filter(|id| catalog.skill(id).is_none())
        .map(|id| (*id, *id));

    known
        .chain(unknown)
        .map(|(id, name)| {
            Category::new(id, name, questions_where(assignments, |a| a.skill_id == id))
        })
        .collect()
}

fn objective_skill_metrics(
    assignments: &[(QuestionNumber, &QuestionAssignment)],
    students: &[&ScoredRecord],
    key: &ScoringKey,
) -> BTreeMap<String, AnalysisMetrics> {
    let mut pairs: BTreeMap<String, Vec<QuestionNumber>> = BTreeMap::new();
    for (question, assignment) in assignments {
        pairs.entry(assignment.pair_key()).or_default().push(*question);
    }

    pairs
        .into_iter()
        .map(|(pair, questions)| {
            let metrics = students
                .iter()
                .map(|s| student_metrics(s, &questions, key))
                .sum();
            (pair, metrics)
        })
        .filter(|(_, metrics): &(String, AnalysisMetrics)| !metrics.is_empty())
        .collect()
}

/// Aggregate present students over every category.
pub fn aggregate(
    students: &[&ScoredRecord],
    blueprint: &Blueprint,
    catalog: &Catalog,
    key: &ScoringKey,
    parallel: &ParallelConfig,
) -> Achievement {
    let assignments = scorable_assignments(blueprint, key);
    log::debug!(
        "Aggregating {} students over {} scorable assignments",
        students.len(),
        assignments.len()
    );

    Achievement {
        by_unit: measure_all(unit_categories(catalog, &assignments), students, key, parallel),
        by_axis: measure_all(axis_categories(catalog, &assignments), students, key, parallel),
        by_objective: measure_all(
            objective_categories(catalog, &assignments),
            students,
            key,
            parallel,
        ),
        by_skill: measure_all(skill_categories(catalog, &assignments), students, key, parallel),
        by_objective_skill: objective_skill_metrics(&assignments, students, key),
    }
}
