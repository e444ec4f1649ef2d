use clap::Parser;
use dirsort::cli::{EXIT_FATAL, OrganizeOptions, OutputFormat, run_cli};
use dirsort::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Sort the files of a directory into category subfolders.
#[derive(Parser, Debug)]
#[command(name = "dirsort", version, about, long_about = None)]
struct Cli {
    /// Directory whose files should be organized
    #[arg(short, long)]
    dir: PathBuf,

    /// Show the plan without moving anything
    #[arg(long)]
    dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    // clap's own usage error code (2) would collide with the partial-failure code.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_FATAL)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    let options = OrganizeOptions {
        target_dir: cli.dir,
        dry_run: cli.dry_run,
        config_path: cli.config,
        format: cli.format,
    };

    match run_cli(&options) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::from(EXIT_FATAL)
        }
    }
}
