use std::fs;
use std::path::{Path, PathBuf};

use super::core::GraderightConfig;
use super::validation::validate_config_result;
use crate::errors::{Result, ResultExt};

/// File name searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".graderight.toml";

/// Pure function to parse and validate config from TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<GraderightConfig> {
    let config = toml::from_str::<GraderightConfig>(contents)?;
    validate_config_result(&config)?;
    Ok(config)
}

/// Load and validate the configuration at `path`.
pub fn load_config_from(path: &Path) -> Result<GraderightConfig> {
    let contents = fs::read_to_string(path)?;
    parse_and_validate_config(&contents).context(format!("loading {}", path.display()))
}

/// Pure function to try loading config from a specific path
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<GraderightConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("Invalid {}: {}. Using defaults.", config_path.display(), e);
            None
        }
    }
}

/// Handle file read errors with appropriate logging
fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Find `.graderight.toml` from `start` upwards, falling back to defaults.
pub fn load_config_from_dir(start: PathBuf) -> GraderightConfig {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            GraderightConfig::default()
        })
}

/// Load configuration for the current working directory.
pub fn load_config() -> GraderightConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from_dir(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            GraderightConfig::default()
        }
    }
}
