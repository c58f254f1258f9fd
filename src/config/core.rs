use serde::{Deserialize, Serialize};

use super::parallel::ParallelConfig;
use super::scoring::{AnswerTokens, GradingConfig};
use super::thresholds::PsychometricsConfig;

/// Root configuration structure for graderight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraderightConfig {
    /// Grade curve and default passing threshold
    #[serde(default)]
    pub grading: GradingConfig,

    /// Omission and open-response marker tokens
    #[serde(default)]
    pub answers: AnswerTokens,

    /// Item analysis group split and quality labels
    #[serde(default)]
    pub psychometrics: PsychometricsConfig,

    /// Layout of uploaded answer tables
    #[serde(default)]
    pub table: TableConfig,

    /// Parallel processing configuration
    #[serde(default)]
    pub parallel: ParallelConfig,
}

/// Column layout of the raw answer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Header of the student id column
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Header of the student name column
    #[serde(default = "default_name_column")]
    pub name_column: String,

    /// Question columns are named `{prefix}{n}`
    #[serde(default = "default_question_prefix")]
    pub question_prefix: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            name_column: default_name_column(),
            question_prefix: default_question_prefix(),
        }
    }
}

impl TableConfig {
    /// Header of the column holding answers to `question`.
    pub fn question_column(&self, question: u32) -> String {
        format!("{}{}", self.question_prefix, question)
    }
}

fn default_id_column() -> String {
    "ID".to_string()
}
fn default_name_column() -> String {
    "Nombre".to_string()
}
fn default_question_prefix() -> String {
    "P".to_string()
}
