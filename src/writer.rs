use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::BackupConfig;
use crate::error::{MigrationError, Result};
use crate::models::{MigrationEntry, MigrationReport};

/// Backs files up, overwrites them, and keeps the run's migration log.
#[derive(Debug)]
pub struct FileWriter {
    project_root: PathBuf,
    backup: BackupConfig,
    log: Vec<MigrationEntry>,
    total_files: usize,
    butterknife_files: usize,
}

impl FileWriter {
    pub fn new(project_root: impl Into<PathBuf>, backup: BackupConfig) -> Self {
        Self {
            project_root: project_root.into(),
            backup,
            log: Vec::new(),
            total_files: 0,
            butterknife_files: 0,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Where the backup copy of `path` lives.
    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix(&self.project_root).unwrap_or(path);
        let relative = relative
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .collect::<PathBuf>();

        let mut name = relative.into_os_string();
        name.push(&self.backup.extension);
        self.project_root
            .join(&self.backup.directory)
            .join(PathBuf::from(name))
    }

    /// Copy `path` into the backup tree. Returns the copy's location.
    pub fn backup_file(&self, path: &Path) -> Result<PathBuf> {
        let target = self.backup_path(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &target)?;
        debug!("Backed up {} to {}", path.display(), target.display());
        Ok(target)
    }

    /// Back up (when enabled) and overwrite `path` with `content`.
    pub fn write(&self, path: &Path, content: &str) -> Result<()> {
        if self.backup.enabled {
            self.backup_file(path)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Copy the backup of `path` back over it.
    pub fn restore(&self, path: &Path) -> Result<()> {
        let backup = self.backup_path(path);
        if !backup.is_file() {
            return Err(MigrationError::BackupMissing(path.to_path_buf()));
        }
        fs::copy(&backup, path)?;
        info!("Restored {}", path.display());
        Ok(())
    }

    pub fn count_file(&mut self, has_bindings: bool) {
        self.total_files += 1;
        if has_bindings {
            self.butterknife_files += 1;
        }
    }

    pub fn record(&mut self, file: &Path, success: bool, message: impl Into<String>) {
        self.log.push(MigrationEntry {
            file: file.to_path_buf(),
            success,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        });
    }

    pub fn report(&self) -> MigrationReport {
        let successful = self.log.iter().filter(|e| e.success).count();
        MigrationReport {
            total_files: self.total_files,
            butterknife_files: self.butterknife_files,
            successful_migrations: successful,
            failed_migrations: self.log.len() - successful,
            per_file_detail: self.log.clone(),
        }
    }

    /// Write the report as pretty JSON.
    pub fn export_report(&self, path: &Path) -> Result<MigrationReport> {
        let report = self.report();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!("Migration report written to {}", path.display());
        Ok(report)
    }
}
