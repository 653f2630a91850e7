use anyhow::Result;
use clap::ArgMatches;
use std::path::PathBuf;

use butterknife_migrator::{Config, FileWriter};

use crate::cli::{project_root, relative};

/// Copy backups back over migrated files. Relative paths resolve against the
/// project root.
pub fn handle_restore(matches: &ArgMatches, config: &Config) -> Result<()> {
    let root = project_root(config)?;
    let writer = FileWriter::new(&root, config.backup.clone());
    let files: Vec<&PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|v| v.collect())
        .unwrap_or_default();

    let mut failed = 0;
    for file in files {
        let path = if file.is_absolute() {
            file.clone()
        } else {
            root.join(file)
        };
        match writer.restore(&path) {
            Ok(()) => println!("  ♻️  Restored {}", relative(&path, &root).display()),
            Err(e) => {
                failed += 1;
                println!("  ❌ {}", e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} file(s) could not be restored", failed);
    }
    Ok(())
}
