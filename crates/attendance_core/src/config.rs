//! Tracker configuration: table locations and logging settings.
//!
//! # Responsibility
//! - Provide defaults matching the historical file names.
//! - Overlay environment variables; blank values are ignored.
//!
//! # Invariants
//! - Table file names are bare names resolved inside `data_dir`.
//! - `log_dir`, when set, is absolute.

use crate::logging::normalize_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_STUDENTS_FILE: &str = "students.csv";
pub const DEFAULT_ATTENDANCE_FILE: &str = "attendance_data.csv";

pub const DATA_DIR_ENV: &str = "ATTENDANCE_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "ATTENDANCE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "ATTENDANCE_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Table file name is blank or contains a path separator.
    InvalidFileName(String),
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFileName(name) => {
                write!(f, "table file name must be a bare file name, got `{name}`")
            }
            Self::InvalidLogLevel(level) => write!(f, "unsupported log level `{level}`"),
            Self::RelativeLogDir(path) => {
                write!(f, "log dir must be absolute, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Directory holding both tables. Relative paths resolve against the
    /// process working directory.
    pub data_dir: PathBuf,
    pub students_file: String,
    pub attendance_file: String,
    pub log_level: String,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            students_file: DEFAULT_STUDENTS_FILE.to_string(),
            attendance_file: DEFAULT_ATTENDANCE_FILE.to_string(),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl TrackerConfig {
    /// Defaults overlaid with `ATTENDANCE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_lookup(|key| std::env::var(key).ok())
    }

    /// Overlays values returned by `lookup` for the `ATTENDANCE_*` keys.
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(dir) = non_blank(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        if let Some(dir) = non_blank(LOG_DIR_ENV) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in [&self.students_file, &self.attendance_file] {
            if !is_bare_file_name(name) {
                return Err(ConfigError::InvalidFileName(name.clone()));
            }
        }
        normalize_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }

    pub fn students_path(&self) -> PathBuf {
        self.data_dir.join(&self.students_file)
    }

    pub fn attendance_path(&self) -> PathBuf {
        self.data_dir.join(&self.attendance_file)
    }
}

fn is_bare_file_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed == name
        && Path::new(name).file_name().is_some_and(|file| file == name)
}
