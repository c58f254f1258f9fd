use serde::Serialize;
use std::iter::Sum;

use crate::grading::AnswerOutcome;

/// Correct/incorrect/omitted tallies with the derived achievement percentage.
///
/// Values are only ever built by tallying outcomes or summing other metrics,
/// so the percentage always agrees with the counts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetrics {
    correct: u32,
    incorrect: u32,
    omitted: u32,
    total_questions: u32,
    achievement_percentage: f64,
}

impl AnalysisMetrics {
    fn from_counts(correct: u32, incorrect: u32, omitted: u32) -> Self {
        let total = correct + incorrect + omitted;
        let achievement_percentage = if total == 0 {
            0.0
        } else {
            f64::from(correct) / f64::from(total) * 100.0
        };
        Self {
            correct,
            incorrect,
            omitted,
            total_questions: total,
            achievement_percentage,
        }
    }

    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = AnswerOutcome>,
    {
        let (mut correct, mut incorrect, mut omitted) = (0, 0, 0);
        for outcome in outcomes {
            match outcome {
                AnswerOutcome::Correct => correct += 1,
                AnswerOutcome::Incorrect => incorrect += 1,
                AnswerOutcome::Omitted => omitted += 1,
            }
        }
        Self::from_counts(correct, incorrect, omitted)
    }

    /// Sum the counts of both and recompute the percentage.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        Self::from_counts(
            self.correct + other.correct,
            self.incorrect + other.incorrect,
            self.omitted + other.omitted,
        )
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    pub fn omitted(&self) -> u32 {
        self.omitted
    }

    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    pub fn achievement_percentage(&self) -> f64 {
        self.achievement_percentage
    }

    pub fn is_empty(&self) -> bool {
        self.total_questions == 0
    }
}

impl<'a> Sum<&'a AnalysisMetrics> for AnalysisMetrics {
    fn sum<I: Iterator<Item = &'a AnalysisMetrics>>(iter: I) -> Self {
        iter.fold(AnalysisMetrics::default(), |acc, m| acc.combine(m))
    }
}

impl Sum for AnalysisMetrics {
    fn sum<I: Iterator<Item = AnalysisMetrics>>(iter: I) -> Self {
        iter.fold(AnalysisMetrics::default(), |acc, m| acc.combine(&m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AnswerOutcome::*;

    #[test]
    fn test_tally_and_percentage() {
        let metrics = AnalysisMetrics::from_outcomes([Correct, Incorrect, Omitted, Correct]);
        assert_eq!(metrics.correct(), 2);
        assert_eq!(metrics.total_questions(), 4);
        assert_eq!(metrics.achievement_percentage(), 50.0);
    }

    #[test]
    fn test_empty_is_zero() {
        let metrics = AnalysisMetrics::from_outcomes([]);
        assert!(metrics.is_empty());
        assert_eq!(metrics.achievement_percentage(), 0.0);
    }

    #[test]
    fn test_sum_recomputes_from_counts() {
        // 1/1 and 0/3 average to 50%, but summed they are 1/4
        let parts = [
            AnalysisMetrics::from_outcomes([Correct]),
            AnalysisMetrics::from_outcomes([Incorrect, Incorrect, Omitted]),
        ];
        let total: AnalysisMetrics = parts.iter().sum();
        assert_eq!(total.achievement_percentage(), 25.0);
        assert_eq!(total.omitted(), 1);
    }
}
