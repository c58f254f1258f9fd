use serde::{Deserialize, Serialize};

/// Item analysis thresholds.
///
/// The high/low group split follows the classical test theory convention:
/// top and bottom 27% of the roster, or halves for very small rosters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsychometricsConfig {
    /// Share of the roster in each of the high and low groups
    #[serde(default = "default_group_fraction")]
    pub group_fraction: f64,

    /// Share used instead when the roster has at most `small_roster_limit` students
    #[serde(default = "default_small_group_fraction")]
    pub small_group_fraction: f64,

    #[serde(default = "default_small_roster_limit")]
    pub small_roster_limit: usize,

    #[serde(default)]
    pub labels: ItemQualityThresholds,
}

impl Default for PsychometricsConfig {
    fn default() -> Self {
        Self {
            group_fraction: default_group_fraction(),
            small_group_fraction: default_small_group_fraction(),
            small_roster_limit: default_small_roster_limit(),
            labels: ItemQualityThresholds::default(),
        }
    }
}

impl PsychometricsConfig {
    /// Size of each extreme group for a roster of `n` students.
    pub fn group_size(&self, n: usize) -> usize {
        let fraction = if n > self.small_roster_limit {
            self.group_fraction
        } else {
            self.small_group_fraction
        };
        (n as f64 * fraction).floor() as usize
    }
}

fn default_group_fraction() -> f64 {
    0.27
}
fn default_small_group_fraction() -> f64 {
    0.5
}
fn default_small_roster_limit() -> usize {
    5
}

/// Cut points for labelling item difficulty and discrimination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemQualityThresholds {
    /// p-value above which an item is easy
    #[serde(default = "default_easy_above")]
    pub easy_above: f64,

    /// p-value below which an item is hard
    #[serde(default = "default_hard_below")]
    pub hard_below: f64,

    #[serde(default = "default_good_discrimination_above")]
    pub good_discrimination_above: f64,

    #[serde(default = "default_poor_discrimination_below")]
    pub poor_discrimination_below: f64,
}

impl Default for ItemQualityThresholds {
    fn default() -> Self {
        Self {
            easy_above: default_easy_above(),
            hard_below: default_hard_below(),
            good_discrimination_above: default_good_discrimination_above(),
            poor_discrimination_below: default_poor_discrimination_below(),
        }
    }
}

fn default_easy_above() -> f64 {
    0.75
}
fn default_hard_below() -> f64 {
    0.25
}
fn default_good_discrimination_above() -> f64 {
    0.3
}
fn default_poor_discrimination_below() -> f64 {
    0.1
}
