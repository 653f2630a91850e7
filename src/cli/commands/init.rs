use anyhow::Result;
use clap::ArgMatches;
use std::path::PathBuf;

use butterknife_migrator::Config;

pub fn handle_init(matches: &ArgMatches) -> Result<()> {
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("butterknife_migrator.json"));

    if output.exists() && !matches.get_flag("force") {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    Config::default().save_to_file(&output)?;

    println!("✅ Wrote default configuration to {}", output.display());
    println!("💡 Edit scan.directories and heuristics to match your project");
    Ok(())
}
