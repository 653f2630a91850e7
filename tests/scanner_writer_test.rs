use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use butterknife_migrator::config::{BackupConfig, ScanConfig};
use butterknife_migrator::{FileScanner, FileWriter, MigrationError};

fn touch(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_scanner_custom_configuration() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let a = touch(root, "module/src/A.java", "");
    let b = touch(root, "other/src/B.kt", "");
    touch(root, "module/src/generatedStuff/C.java", "");
    touch(root, "module/src/AutoValue_D.java", "");
    touch(root, "module/src/E.txt", "");

    let scanner = FileScanner::new(ScanConfig {
        directories: vec!["module".to_string(), "other".to_string(), "absent".to_string()],
        exclude_directories: vec!["generated".to_string()],
        exclude_patterns: vec!["AutoValue_".to_string()],
        extensions: vec![".java".to_string(), ".kt".to_string()],
    });
    assert_eq!(scanner.scan(root).unwrap(), vec![a, b]);
}

#[test]
fn test_scanner_deduplicates_overlapping_roots() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let a = touch(root, "src/main/java/A.java", "");

    let scanner = FileScanner::new(ScanConfig {
        directories: vec!["src".to_string(), "src/main/java".to_string()],
        ..ScanConfig::default()
    });
    assert_eq!(scanner.scan(root).unwrap(), vec![a]);
}

#[test]
fn test_scanner_is_candidate() {
    let scanner = FileScanner::new(ScanConfig::default());
    assert!(scanner.is_candidate(Path::new("src/MainActivity.java")));
    assert!(!scanner.is_candidate(Path::new("src/BuildConfig.java")));
    assert!(!scanner.is_candidate(Path::new("src/MainActivity.kt")));
    assert!(!scanner.is_candidate(Path::new("src/MainActivity.java.bak")));
}

#[test]
fn test_writer_backup_restore_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let file = touch(root, "app/src/main/java/Main.java", "original");

    let writer = FileWriter::new(
        root,
        BackupConfig {
            enabled: true,
            directory: PathBuf::from("backups"),
            extension: ".orig".to_string(),
        },
    );
    writer.write(&file, "migrated").unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "migrated");
    assert!(root.join("backups/app/src/main/java/Main.java.orig").is_file());

    writer.restore(&file).unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "original");
}

#[test]
fn test_writer_restore_without_backup() {
    let temp_dir = TempDir::new().unwrap();
    let file = touch(temp_dir.path(), "Main.java", "x");
    let writer = FileWriter::new(temp_dir.path(), BackupConfig::default());
    assert!(matches!(
        writer.restore(&file),
        Err(MigrationError::BackupMissing(_))
    ));
}

#[test]
fn test_writer_report_export() {
    let temp_dir = TempDir::new().unwrap();
    let mut writer = FileWriter::new(temp_dir.path(), BackupConfig::default());
    writer.count_file(true);
    writer.record(Path::new("Main.java"), true, "migrated 2 bindings");

    let path = temp_dir.path().join("butterknife_migration_report.json");
    let report = writer.export_report(&path).unwrap();
    assert_eq!(report.successful_migrations, 1);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["totalFiles"], 1);
    assert_eq!(json["butterknifeFiles"], 1);
    assert_eq!(json["perFileDetail"][0]["message"], "migrated 2 bindings");
    assert!(json["perFileDetail"][0]["timestamp"].is_string());
}
