use serde::{Deserialize, Serialize};
use std::fmt;

/// Achievement band for a score percentage.
///
/// Ordered from lowest to highest so that `max()` picks the better level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AchievementLevel {
    Insufficient,
    Elementary,
    Adequate,
    Outstanding,
}

impl AchievementLevel {
    pub const ALL: [AchievementLevel; 4] = [
        AchievementLevel::Insufficient,
        AchievementLevel::Elementary,
        AchievementLevel::Adequate,
        AchievementLevel::Outstanding,
    ];

    /// Classify a percentage in `0..=100`.
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => AchievementLevel::Outstanding,
            p if p >= 70.0 => AchievementLevel::Adequate,
            p if p >= 40.0 => AchievementLevel::Elementary,
            _ => AchievementLevel::Insufficient,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AchievementLevel::Insufficient => "Insufficient",
            AchievementLevel::Elementary => "Elementary",
            AchievementLevel::Adequate => "Adequate",
            AchievementLevel::Outstanding => "Outstanding",
        }
    }
}

impl fmt::Display for AchievementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
