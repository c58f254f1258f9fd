//! Validation with error accumulation for configuration.
//!
//! Every check runs and every problem is collected, so a user fixing a
//! configuration file sees all issues in one pass instead of one per run.

use super::core::{GraderightConfig, TableConfig};
use super::scoring::{AnswerTokens, GradingConfig};
use super::thresholds::PsychometricsConfig;
use crate::errors::{Error, Result};

/// Validate entire config, accumulating ALL errors.
///
/// # Example
///
/// ```rust
/// use graderight::config::{validate_config, GraderightConfig};
///
/// let config = GraderightConfig::default();
/// assert!(validate_config(&config).is_empty());
/// ```
pub fn validate_config(config: &GraderightConfig) -> Vec<Error> {
    validate_grading(&config.grading)
        .into_iter()
        .chain(validate_tokens(&config.answers))
        .chain(validate_psychometrics(&config.psychometrics))
        .chain(validate_table(&config.table))
        .collect()
}

/// Validate config, folding all problems into one error.
pub fn validate_config_result(config: &GraderightConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(Error::configuration(message))
}

/// Whether a passing threshold may be stored on an authored blueprint.
pub fn is_valid_authored_threshold(percent: f64) -> bool {
    (1.0..=99.0).contains(&percent)
}

fn validate_grading(grading: &GradingConfig) -> Vec<Error> {
    let mut errors = Vec::new();

    if !is_valid_authored_threshold(grading.pass_threshold_percent) {
        errors.push(Error::validation(format!(
            "grading.pass_threshold_percent out of range: {} (must be 1-99)",
            grading.pass_threshold_percent
        )));
    }

    if !grading.scale.is_valid() {
        errors.push(Error::validation(format!(
            "grading.scale must satisfy min < pass < max (got {} / {} / {})",
            grading.scale.min, grading.scale.pass, grading.scale.max
        )));
    }

    if grading.grade_decimals > 4 {
        errors.push(Error::validation(format!(
            "grading.grade_decimals too large: {} (max 4)",
            grading.grade_decimals
        )));
    }

    errors
}

fn validate_tokens(tokens: &AnswerTokens) -> Vec<Error> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("answers.omission", &tokens.omission),
        ("answers.open_correct", &tokens.open_correct),
        ("answers.open_incorrect", &tokens.open_incorrect),
    ] {
        if value.trim().is_empty() {
            errors.push(Error::validation(format!("{} must not be empty", field)));
        }
    }

    if tokens.open_correct == tokens.open_incorrect {
        errors.push(Error::validation(
            "answers.open_correct and answers.open_incorrect must differ",
        ));
    }

    if tokens.omission.eq_ignore_ascii_case(&tokens.open_correct) {
        errors.push(Error::validation(
            "answers.omission must differ from answers.open_correct",
        ));
    }

    errors
}

fn validate_psychometrics(config: &PsychometricsConfig) -> Vec<Error> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("psychometrics.group_fraction", config.group_fraction),
        ("psychometrics.small_group_fraction", config.small_group_fraction),
    ] {
        if !(value > 0.0 && value <= 0.5) {
            errors.push(Error::validation(format!(
                "{} out of range: {} (must be in (0, 0.5])",
                field, value
            )));
        }
    }

    let labels = &config.labels;
    if labels.hard_below >= labels.easy_above {
        errors.push(Error::validation(format!(
            "psychometrics.labels.hard_below ({}) must be below easy_above ({})",
            labels.hard_below, labels.easy_above
        )));
    }
    if labels.poor_discrimination_below >= labels.good_discrimination_above {
        errors.push(Error::validation(format!(
            "psychometrics.labels.poor_discrimination_below ({}) must be below good_discrimination_above ({})",
            labels.poor_discrimination_below, labels.good_discrimination_above
        )));
    }

    errors
}

fn validate_table(table: &TableConfig) -> Vec<Error> {
    [
        ("table.id_column", &table.id_column),
        ("table.name_column", &table.name_column),
        ("table.question_prefix", &table.question_prefix),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| Error::validation(format!("{} must not be empty", field)))
    .collect()
}
