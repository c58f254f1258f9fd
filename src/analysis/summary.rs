use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::{PassState, ScoredRecord};
use crate::grading::AchievementLevel;

/// Score band over the percentage of points obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum QuartileBand {
    #[serde(rename = "0-25%")]
    Lowest,
    #[serde(rename = "25-50%")]
    Low,
    #[serde(rename = "50-75%")]
    High,
    #[serde(rename = "75-100%")]
    Highest,
}

impl QuartileBand {
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 75.0 => QuartileBand::Highest,
            p if p >= 50.0 => QuartileBand::High,
            p if p >= 25.0 => QuartileBand::Low,
            _ => QuartileBand::Lowest,
        }
    }
}

/// Course-level statistics over present students.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub present_students: usize,
    pub absent_students: usize,
    pub average_points: f64,
    pub average_percentage: f64,
    pub median_points: f64,
    /// Population standard deviation of points obtained
    pub std_dev_points: f64,
    pub max_score: f64,
    pub level_histogram: BTreeMap<AchievementLevel, usize>,
    pub predominant_level: AchievementLevel,
    pub quartiles: BTreeMap<QuartileBand, usize>,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub total_omitted: u32,
    pub passed: usize,
    pub pass_rate: f64,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 0 => (sorted[mid - 1] + sorted[mid]) / 2.0,
        _ => sorted[mid],
    }
}

fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Summarize a scored roster; `None` when nobody was present.
///
/// `max_score` is the total of the answer key, reported as is.
pub fn course_summary(scored: &[ScoredRecord], max_score: f64) -> Option<CourseSummary> {
    let present: Vec<&ScoredRecord> = scored.iter().filter(|s| s.is_present()).collect();
    if present.is_empty() {
        return None;
    }

    let points: Vec<f64> = present.iter().map(|s| s.points_obtained).collect();
    let percentages: Vec<f64> = present.iter().map(|s| s.score_percentage()).collect();

    let mut level_histogram: BTreeMap<AchievementLevel, usize> =
        AchievementLevel::ALL.iter().map(|l| (*l, 0)).collect();
    let mut quartiles: BTreeMap<QuartileBand, usize> = [
        QuartileBand::Lowest,
        QuartileBand::Low,
        QuartileBand::High,
        QuartileBand::Highest,
    ]
    .into_iter()
    .map(|b| (b, 0))
    .collect();
    for p in &percentages {
        *level_histogram
            .entry(AchievementLevel::from_percentage(*p))
            .or_insert(0) += 1;
        *quartiles.entry(QuartileBand::from_percentage(*p)).or_insert(0) += 1;
    }

    // Ties go to the higher level: the histogram iterates lowest first.
    let predominant_level = level_histogram
        .iter()
        .fold((AchievementLevel::Insufficient, 0), |best, (level, count)| {
            if *count >= best.1 {
                (*level, *count)
            } else {
                best
            }
        })
        .0;

    let passed = present
        .iter()
        .filter(|s| s.pass_state == PassState::Passed)
        .count();

    Some(CourseSummary {
        present_students: present.len(),
        absent_students: scored.len() - present.len(),
        average_points: mean(&points),
        average_percentage: mean(&percentages),
        median_points: median(&points),
        std_dev_points: population_std_dev(&points),
        max_score,
        level_histogram,
        predominant_level,
        quartiles,
        total_correct: present.iter().map(|s| s.correct_count).sum(),
        total_incorrect: present.iter().map(|s| s.incorrect_count).sum(),
        total_omitted: present.iter().map(|s| s.omitted_count).sum(),
        passed,
        pass_rate: passed as f64 / present.len() as f64 * 100.0,
    })
}
