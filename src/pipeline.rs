//! Drives one migration run: scan, then extract, transform, inject and write
//! each file in turn.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{BindingMode, Config};
use crate::error::{MigrationError, Result};
use crate::extractor::AnnotationExtractor;
use crate::injector::CodeInjector;
use crate::models::{AnnotationRecord, MigrationReport};
use crate::scanner::FileScanner;
use crate::transform::{self, TransformPass};
use crate::writer::FileWriter;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// No ButterKnife usage; left untouched.
    NoBindings,
    /// Bindings found but the rewritten text equals the input.
    Unchanged,
    Migrated { bindings: usize },
}

pub struct Migrator {
    extractor: AnnotationExtractor,
    passes: Vec<Box<dyn TransformPass>>,
    injector: CodeInjector,
    scanner: FileScanner,
}

impl Migrator {
    pub fn new(config: &Config) -> Result<Self> {
        if config.project.binding_mode == BindingMode::ViewBinding {
            warn!("viewBinding mode is not implemented; generating findViewById code instead");
        }
        Ok(Self {
            extractor: AnnotationExtractor::with_tables(config.heuristics.clone())?,
            passes: transform::default_passes()?,
            injector: CodeInjector::new(config.heuristics.clone(), config.conventions.clone())?,
            scanner: FileScanner::new(config.scan.clone()).with_backup(&config.backup),
        })
    }

    pub fn scanner(&self) -> &FileScanner {
        &self.scanner
    }

    pub fn extract(&self, source: &str) -> AnnotationRecord {
        self.extractor.extract(source)
    }

    /// Rewrite one file's text. `None` when it has no ButterKnife usage; an
    /// error when a bound field would be left without a lookup.
    pub fn migrate_source(&self, source: &str) -> Result<Option<String>> {
        let record = self.extractor.extract(source);
        if !record.has_bindings {
            return Ok(None);
        }
        self.migrate_record(source, &record).map(Some)
    }

    fn migrate_record(&self, source: &str, record: &AnnotationRecord) -> Result<String> {
        let mut text = source.to_string();
        for pass in &self.passes {
            if pass.applies_to(record) {
                debug!("Applying {}", pass.name());
                text = pass.apply(&text, record)?;
            }
        }
        let text = self.injector.inject(&text, record);

        let uninitialized = self.injector.uninitialized_fields(&text, record)?;
        if !uninitialized.is_empty() {
            warn!("{} bound field(s) left without a lookup", uninitialized.len());
            return Err(MigrationError::Uninitialized(
                uninitialized.into_iter().map(String::from).collect(),
            ));
        }
        Ok(text)
    }

    /// Migrate every candidate file under the writer's project root. A file
    /// that fails is recorded and the batch continues.
    #[instrument(skip_all, fields(root = %writer.project_root().display(), dry_run))]
    pub fn run(&self, writer: &mut FileWriter, dry_run: bool) -> Result<MigrationReport> {
        let root = writer.project_root().to_path_buf();
        let files = self.scanner.scan(&root)?;
        info!("Found {} candidate files", files.len());

        for path in &files {
            match self.migrate_file(path, writer, dry_run) {
                Ok(FileOutcome::NoBindings) => {}
                Ok(FileOutcome::Unchanged) => {
                    info!("Already migrated: {}", path.display());
                    writer.record(path, true, "no changes needed");
                }
                Ok(FileOutcome::Migrated { bindings }) => {
                    let message = if dry_run {
                        format!("would migrate {bindings} bindings (dry run)")
                    } else {
                        format!("migrated {bindings} bindings")
                    };
                    info!("Migrated: {}", path.display());
                    writer.record(path, true, message);
                }
                Err(e) => {
                    error!("Failed to migrate {}: {}", path.display(), e);
                    writer.record(path, false, e.to_string());
                }
            }
        }

        Ok(writer.report())
    }

    fn migrate_file(&self, path: &Path, writer: &mut FileWriter, dry_run: bool) -> Result<FileOutcome> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                writer.count_file(false);
                return Err(MigrationError::Encoding(path.to_path_buf()));
            }
            Err(e) => {
                writer.count_file(false);
                return Err(e.into());
            }
        };

        let record = self.extractor.extract(&source);
        writer.count_file(record.has_bindings);
        if !record.has_bindings {
            return Ok(FileOutcome::NoBindings);
        }

        let migrated = self.migrate_record(&source, &record)?;
        if migrated == source {
            return Ok(FileOutcome::Unchanged);
        }
        if !dry_run {
            writer.write(path, &migrated)?;
        }
        Ok(FileOutcome::Migrated {
            bindings: record.binding_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TestProject, activity_source};

    #[test]
    fn test_migrate_source_without_bindings() {
        let migrator = Migrator::new(&Config::for_testing()).unwrap();
        assert_eq!(migrator.migrate_source("class A {}\n").unwrap(), None);
    }

    #[test]
    fn test_migrate_source_activity() {
        let migrator = Migrator::new(&Config::for_testing()).unwrap();
        let src = r#"package com.example;

import android.os.Bundle;
import android.widget.TextView;
import butterknife.BindView;
import butterknife.ButterKnife;

public class MainActivity extends AppCompatActivity {
    @BindView(R.id.title) TextView title;

    @Override
    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
        setContentView(R.layout.activity_main);
        ButterKnife.bind(this);
    }
}
"#;
        let out = migrator.migrate_source(src).unwrap().unwrap();
        assert!(!out.contains("butterknife"));
        assert!(!out.contains("ButterKnife"));
        assert!(!out.contains("@BindView"));
        assert!(out.contains("    TextView title;\n"));
        assert!(out.contains("        title = findViewById(R.id.title);\n"));
        assert!(out.contains("        setContentView(R.layout.activity_main);\n        initViews();\n"));
        assert_eq!(migrator.migrate_source(&out).unwrap(), None);
    }

    #[test]
    fn test_run_over_test_project() {
        let project = TestProject::with_source_root().unwrap();
        let path = project
            .add_java(
                "com/example/ListActivity.java",
                &activity_source("ListActivity", &[("list", "RecyclerView"), ("empty", "TextView")]),
            )
            .unwrap();

        let config = Config::for_testing();
        let migrator = Migrator::new(&config).unwrap();
        let mut writer = FileWriter::new(project.root(), config.backup.clone());
        let report = migrator.run(&mut writer, false).unwrap();

        assert_eq!(report.successful_migrations, 1);
        assert_eq!(report.per_file_detail[0].message, "migrated 2 bindings");
        let migrated = fs::read_to_string(path).unwrap();
        assert!(migrated.contains("        list = findViewById(R.id.list);\n        empty = findViewById(R.id.empty);\n"));
        assert!(!project.path("butterknife_backup").exists());
    }
}
