use serde::{Deserialize, Serialize};

/// Passing threshold used when a blueprint does not carry a usable one.
pub const DEFAULT_PASS_THRESHOLD_PERCENT: f64 = 60.0;

/// Grade scale anchors: lowest grade, minimum passing grade, highest grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeScale {
    #[serde(default = "default_min_grade")]
    pub min: f64,

    #[serde(default = "default_pass_grade")]
    pub pass: f64,

    #[serde(default = "default_max_grade")]
    pub max: f64,
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            min: default_min_grade(),
            pass: default_pass_grade(),
            max: default_max_grade(),
        }
    }
}

impl GradeScale {
    /// Anchors must be strictly increasing for the curve to be well formed.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min < self.pass
            && self.pass < self.max
    }
}

fn default_min_grade() -> f64 {
    1.0
}
fn default_pass_grade() -> f64 {
    4.0
}
fn default_max_grade() -> f64 {
    7.0
}

/// Grading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Passing threshold for new blueprints (percent of total points)
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold_percent: f64,

    #[serde(default)]
    pub scale: GradeScale,

    /// Decimal places kept on reported grades
    #[serde(default = "default_grade_decimals")]
    pub grade_decimals: u32,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            pass_threshold_percent: default_pass_threshold(),
            scale: GradeScale::default(),
            grade_decimals: default_grade_decimals(),
        }
    }
}

fn default_pass_threshold() -> f64 {
    DEFAULT_PASS_THRESHOLD_PERCENT
}
fn default_grade_decimals() -> u32 {
    1
}

/// Special answer tokens found in uploaded tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerTokens {
    /// Marks a deliberately skipped question (compared case-insensitively)
    #[serde(default = "default_omission_token")]
    pub omission: String,

    /// Open response marked correct by the grader
    #[serde(default = "default_open_correct_token")]
    pub open_correct: String,

    /// Open response marked incorrect by the grader
    #[serde(default = "default_open_incorrect_token")]
    pub open_incorrect: String,
}

impl Default for AnswerTokens {
    fn default() -> Self {
        Self {
            omission: default_omission_token(),
            open_correct: default_open_correct_token(),
            open_incorrect: default_open_incorrect_token(),
        }
    }
}

impl AnswerTokens {
    /// Blank answers and the omission token both count as omitted.
    pub fn is_omitted(&self, raw: &str) -> bool {
        let raw = raw.trim();
        raw.is_empty() || raw.eq_ignore_ascii_case(&self.omission)
    }
}

fn default_omission_token() -> String {
    "O".to_string()
}
fn default_open_correct_token() -> String {
    "1".to_string()
}
fn default_open_incorrect_token() -> String {
    "0".to_string()
}
