//! Playlint CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use playlint::cli::{Cli, CommandDispatcher};
use playlint::config::find_project_root;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `-q` sets level to ERROR, `-v` to INFO and `-vv` to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(verbose: u8, quiet: u8) {
    let filter = match (verbose, quiet) {
        (0, 0) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        (_, q) if q > 0 => EnvFilter::new("error"),
        (1, _) => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(console::colors_enabled_stderr())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// `--project-dir`, else the nearest directory holding a config file or
/// `.git`, else the current directory.
fn project_root(cli: &Cli) -> std::io::Result<PathBuf> {
    if let Some(dir) = &cli.project_dir {
        return Ok(dir.clone());
    }
    let cwd = std::env::current_dir()?;
    Ok(find_project_root(&cwd).unwrap_or(cwd))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    init_tracing(cli.verbose, cli.quiet);

    tracing::debug!("Playlint starting with args: {:?}", cli);

    let project_root = match project_root(&cli) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };
    tracing::debug!(root = %project_root.display(), "Using project root");

    let dispatcher = CommandDispatcher::new(project_root);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match dispatcher.dispatch(&cli, &mut out) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
