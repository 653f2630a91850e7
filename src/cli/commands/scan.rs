use anyhow::Result;
use std::fs;

use butterknife_migrator::{Config, Migrator};

use crate::cli::utils::pluralize;
use crate::cli::{project_root, relative};

/// List candidate files and what the extractor finds in each.
pub fn handle_scan(config: &Config) -> Result<()> {
    let root = project_root(config)?;
    let migrator = Migrator::new(config)?;
    let files = migrator.scanner().scan(&root)?;

    println!("🔍 Scanning {}", root.display());
    let mut with_bindings = 0;
    for path in &files {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                println!("  ⚠️  {}: {}", relative(path, &root).display(), e);
                continue;
            }
        };
        let record = migrator.extract(&source);
        if record.has_bindings {
            with_bindings += 1;
            println!(
                "  📄 {}: {}, {}, {}",
                relative(path, &root).display(),
                pluralize("view binding", record.field_bindings.len()),
                pluralize("click handler", record.click_bindings.len()),
                pluralize("long-click handler", record.long_click_bindings.len())
            );
        }
    }

    println!();
    println!(
        "📊 {} scanned, {} using ButterKnife",
        pluralize("file", files.len()),
        with_bindings
    );
    Ok(())
}
