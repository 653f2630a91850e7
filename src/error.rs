use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MigrationError>;

#[derive(Error, Debug)]
pub enum MigrationError {
    // Standard library errors with automatic conversion
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Project root does not exist: {}", .0.display())]
    ProjectRootMissing(PathBuf),

    #[error("File is not valid UTF-8: {}", .0.display())]
    Encoding(PathBuf),

    #[error("No anchor for bound fields: {}", .0.join(", "))]
    Uninitialized(Vec<String>),

    #[error("No backup found for {}", .0.display())]
    BackupMissing(PathBuf),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<&str> for MigrationError {
    fn from(msg: &str) -> Self {
        MigrationError::Internal(msg.to_string())
    }
}

impl From<String> for MigrationError {
    fn from(msg: String) -> Self {
        MigrationError::Internal(msg)
    }
}

impl From<config::ConfigError> for MigrationError {
    fn from(err: config::ConfigError) -> Self {
        MigrationError::Configuration(err.to_string())
    }
}
