use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{BackupConfig, ScanConfig};
use crate::error::{MigrationError, Result};

/// Enumerates candidate source files under a project root.
#[derive(Debug, Clone)]
pub struct FileScanner {
    config: ScanConfig,
    /// Name of the backup tree, always pruned so backups are never migrated.
    backup_dir: Option<String>,
}

impl FileScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            backup_dir: None,
        }
    }

    pub fn with_backup(mut self, backup: &BackupConfig) -> Self {
        self.backup_dir = backup
            .directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        self
    }

    /// Find all candidate files, sorted and de-duplicated
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(MigrationError::ProjectRootMissing(root.to_path_buf()));
        }

        let mut files = BTreeSet::new();
        for dir in self.scan_roots(root) {
            debug!("Scanning {}", dir.display());
            let walker = WalkDir::new(&dir)
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded_dir(entry));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry: {}", e);
                        continue;
                    }
                };
                if entry.file_type().is_file() && self.is_candidate(entry.path()) {
                    files.insert(entry.into_path());
                }
            }
        }

        Ok(files.into_iter().collect())
    }

    /// Configured source roots that exist, or the project root itself.
    fn scan_roots(&self, root: &Path) -> Vec<PathBuf> {
        let roots: Vec<PathBuf> = self
            .config
            .directories
            .iter()
            .map(|dir| root.join(dir))
            .filter(|dir| dir.is_dir())
            .collect();

        if roots.is_empty() {
            vec![root.to_path_buf()]
        } else {
            roots
        }
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.backup_dir.as_deref() == Some(name.as_ref())
            || self
                .config
                .exclude_directories
                .iter()
                .any(|fragment| name.contains(fragment.as_str()))
    }

    /// Whether `path` passes the extension allowlist and name exclusions
    pub fn is_candidate(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.config
            .extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
            && !self
                .config
                .exclude_patterns
                .iter()
                .any(|fragment| name.contains(fragment.as_str()))
    }
}
