pub mod commands;
pub mod utils;

use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use butterknife_migrator::{BindingMode, Config, MigrationError};

/// Resolve configuration: an explicit `--config` document, else the default
/// file names in the working directory, then command-line overrides.
pub fn load_config(matches: &ArgMatches, sub_matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    if let Ok(Some(project)) = sub_matches.try_get_one::<PathBuf>("project") {
        config.project.root = project.clone();
    }
    if let Ok(Some(mode)) = sub_matches.try_get_one::<String>("binding-mode") {
        config.project.binding_mode = mode.parse::<BindingMode>()?;
    }
    if sub_matches.try_get_one::<bool>("backup").ok().flatten() == Some(&true) {
        config.backup.enabled = true;
    }
    if sub_matches.try_get_one::<bool>("no-backup").ok().flatten() == Some(&true) {
        config.backup.enabled = false;
    }
    if matches.get_flag("verbose") {
        config.logging.level = "debug".to_string();
    }

    Ok(config)
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.logging.format.as_str() {
        "json" => registry.with(fmt::layer().json().with_writer(std::io::stderr)).init(),
        "compact" => registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

/// The configured project root, which must be an existing directory.
pub fn project_root(config: &Config) -> Result<PathBuf> {
    let root = config.project.root.as_path();
    if !root.is_dir() {
        return Err(MigrationError::ProjectRootMissing(root.to_path_buf()).into());
    }
    root.canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))
}

/// `path` relative to `root` for display, or unchanged when outside it.
pub fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
