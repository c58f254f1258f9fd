// Sub-modules
mod core;
mod loader;
mod parallel;
mod scoring;
mod thresholds;
pub mod validation;

// Re-export core types
pub use self::core::{GraderightConfig, TableConfig};

pub use loader::{
    directory_ancestors, load_config, load_config_from, load_config_from_dir,
    parse_and_validate_config, CONFIG_FILE_NAME,
};

pub use parallel::ParallelConfig;

pub use scoring::{AnswerTokens, GradeScale, GradingConfig, DEFAULT_PASS_THRESHOLD_PERCENT};

pub use thresholds::{ItemQualityThresholds, PsychometricsConfig};

pub use validation::{is_valid_authored_threshold, validate_config, validate_config_result};
