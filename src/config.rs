use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{MigrationError, Result};
use crate::injector::{HeuristicTables, MethodConventions};

/// Configuration file names looked up in the working directory.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["butterknife_migrator.json", "butterknife_migrator.toml"];

/// Main configuration structure for the migrator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub scan: ScanConfig,
    pub backup: BackupConfig,
    pub logging: LoggingConfig,
    pub report: ReportConfig,
    pub heuristics: HeuristicTables,
    pub conventions: MethodConventions,
}

/// How views are acquired in generated code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingMode {
    #[default]
    FindViewById,
    /// Accepted for compatibility; generates the same code as `FindViewById`.
    ViewBinding,
}

impl FromStr for BindingMode {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "findViewById" => Ok(BindingMode::FindViewById),
            "viewBinding" => Ok(BindingMode::ViewBinding),
            other => Err(MigrationError::Configuration(format!(
                "unknown binding mode '{other}' (expected findViewById or viewBinding)"
            ))),
        }
    }
}

impl fmt::Display for BindingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingMode::FindViewById => f.write_str("findViewById"),
            BindingMode::ViewBinding => f.write_str("viewBinding"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub binding_mode: BindingMode,
}

/// Which files the scanner picks up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Source roots relative to the project root; missing ones are skipped.
    pub directories: Vec<String>,
    /// Directory-name fragments pruned from the walk.
    pub exclude_directories: Vec<String>,
    /// File-name fragments that are never migrated.
    pub exclude_patterns: Vec<String>,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub enabled: bool,
    /// Backup tree, relative to the project root.
    pub directory: PathBuf,
    /// Appended to backup copies.
    pub extension: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Relative paths resolve against the project root.
    pub path: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            binding_mode: BindingMode::FindViewById,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directories: vec![
                "app/src/main/java".to_string(),
                "src/main/java".to_string(),
                "java".to_string(),
                "tests".to_string(),
            ],
            exclude_directories: vec![
                "build".to_string(),
                ".gradle".to_string(),
                ".idea".to_string(),
                "bin".to_string(),
                "gen".to_string(),
            ],
            exclude_patterns: vec!["R.java".to_string(), "BuildConfig.java".to_string()],
            extensions: vec![".java".to_string()],
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("butterknife_backup"),
            extension: ".bak".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(), // pretty, json, compact
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("butterknife_migration_report.json"),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json", "compact"];

impl Config {
    /// Load configuration with precedence:
    /// 1. Environment variables (BKM_*, `__` between section and key)
    /// 2. butterknife_migrator.{json,toml} in the current directory
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_dir(&std::env::current_dir()?)
    }

    /// Load configuration, looking for the default file names in `dir`
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let file = DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists());
        Self::build(file.as_deref())
    }

    /// Load configuration from an explicit document; the format follows the
    /// extension (json, toml, yaml).
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MigrationError::Configuration(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        Self::build(Some(path))
    }

    fn build(file: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(file) = file {
            builder = builder.add_source(File::from(file));
        }

        builder = builder.add_source(
            Environment::with_prefix("BKM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(MigrationError::Configuration(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(MigrationError::Configuration(format!(
                "unknown log format '{}'",
                self.logging.format
            )));
        }
        if self.scan.extensions.is_empty() {
            return Err(MigrationError::Configuration(
                "scan.extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the configuration as YAML for `.yaml`/`.yml` paths, JSON otherwise.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let content = if is_yaml {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Report location, resolved against `project_root` when relative.
    pub fn report_path(&self, project_root: &Path) -> PathBuf {
        if self.report.path.is_absolute() {
            self.report.path.clone()
        } else {
            project_root.join(&self.report.path)
        }
    }

    /// Create a new Config for testing
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn for_testing() -> Self {
        Self {
            backup: BackupConfig {
                enabled: false,
                ..BackupConfig::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "compact".to_string(),
            },
            ..Config::default()
        }
    }
}
