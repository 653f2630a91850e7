use clap::{Arg, ArgAction, Command};
use dotenv::dotenv;
use std::path::PathBuf;
use std::process;

mod cli;

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let matches = build_cli().get_matches();

    if let Err(e) = run_command(matches) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn project_arg() -> Arg {
    Arg::new("project")
        .help("Android project root (default: project.root from configuration)")
        .required(false)
        .index(1)
        .value_parser(clap::value_parser!(PathBuf))
}

fn build_cli() -> Command {
    Command::new("butterknife-migrator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate Android Java sources from ButterKnife to findViewById")
        .long_about("Removes @BindView, @OnClick and @OnLongClick bindings and generates the equivalent explicit view lookups and listener registrations")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("migrate")
                .about("Rewrite every file that uses ButterKnife")
                .arg(project_arg())
                .arg(
                    Arg::new("binding-mode")
                        .long("binding-mode")
                        .help("How generated code acquires views")
                        .value_parser(["findViewById", "viewBinding"])
                )
                .arg(
                    Arg::new("backup")
                        .long("backup")
                        .help("Copy each file into the backup tree before rewriting it")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("no-backup")
                )
                .arg(
                    Arg::new("no-backup")
                        .long("no-backup")
                        .help("Rewrite files without keeping a backup")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report what would change without writing files")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .help("Where to write the JSON migration report")
                        .value_parser(clap::value_parser!(PathBuf))
                )
        )
        .subcommand(
            Command::new("scan")
                .about("List candidate files and the bindings each contains")
                .arg(project_arg())
        )
        .subcommand(
            Command::new("restore")
                .about("Copy backups back over migrated files")
                .arg(
                    Arg::new("project")
                        .long("project")
                        .short('p')
                        .help("Android project root")
                        .value_parser(clap::value_parser!(PathBuf))
                )
                .arg(
                    Arg::new("files")
                        .help("Files to restore")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PathBuf))
                )
        )
        .subcommand(
            Command::new("init-config")
                .about("Write the default configuration")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output file (.json, .yaml or .yml)")
                        .value_parser(clap::value_parser!(PathBuf))
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help("Overwrite an existing file")
                        .action(ArgAction::SetTrue)
                )
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .global(true)
                .action(ArgAction::SetTrue)
        )
}

fn run_command(matches: clap::ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("init-config", sub_matches)) => {
            cli::commands::init::handle_init(sub_matches)?
        }
        Some((name, sub_matches)) => {
            let config = cli::load_config(&matches, sub_matches)?;
            cli::init_logging(&config);

            match name {
                "migrate" => cli::commands::migrate::handle_migrate(sub_matches, &config)?,
                "scan" => cli::commands::scan::handle_scan(&config)?,
                "restore" => cli::commands::restore::handle_restore(sub_matches, &config)?,
                _ => unreachable!("Command parsing should ensure we never reach this"),
            }
        }
        None => {
            unreachable!("Command parsing should ensure we never reach this");
        }
    }

    Ok(())
}
