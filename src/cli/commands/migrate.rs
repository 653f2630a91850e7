use anyhow::Result;
use clap::ArgMatches;
use std::path::PathBuf;
use std::time::Instant;

use butterknife_migrator::{Config, FileWriter, Migrator};

use crate::cli::utils::{format_duration, pluralize};
use crate::cli::{project_root, relative};

pub fn handle_migrate(matches: &ArgMatches, config: &Config) -> Result<()> {
    let dry_run = matches.get_flag("dry-run");
    let root = project_root(config)?;

    println!("🔪 ButterKnife migration: {}", root.display());
    println!("📋 Binding mode: {}", config.project.binding_mode);
    if dry_run {
        println!("🧪 Dry run: no files will be written");
    } else if config.backup.enabled {
        println!("💾 Backups: {}", root.join(&config.backup.directory).display());
    }
    println!();

    let started = Instant::now();
    let migrator = Migrator::new(config)?;
    let mut writer = FileWriter::new(&root, config.backup.clone());
    let report = migrator.run(&mut writer, dry_run)?;

    for entry in &report.per_file_detail {
        let icon = if entry.success { "✅" } else { "❌" };
        println!("  {} {}: {}", icon, relative(&entry.file, &root).display(), entry.message);
    }

    let report_path = match matches.get_one::<PathBuf>("report") {
        Some(path) => path.clone(),
        None => config.report_path(&root),
    };
    writer.export_report(&report_path)?;

    println!();
    println!(
        "📊 {} scanned, {} using ButterKnife, {} migrated",
        pluralize("file", report.total_files),
        report.butterknife_files,
        report.successful_migrations
    );
    if report.failed_migrations > 0 {
        println!("⚠️  {} failed", pluralize("file", report.failed_migrations));
    }
    println!("📄 Report: {}", report_path.display());
    println!("⏱️  Finished in {}", format_duration(started.elapsed()));

    Ok(())
}
