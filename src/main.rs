//! Paneweave CLI entry point.
//!
//! This binary provides the `paneweave` command for creating tmux windows
//! and panes from a YAML or TOML session file.

use clap::Parser;
use paneweave::cli::Cli;
use paneweave::error::Result;
use paneweave::tmux::{self, DryRun, Multiplexer, Target, Tmux};
use paneweave::{PaneweaveError, loader, runner};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stdout; `PANEWEAVE_LOG` (or `RUST_LOG`) overrides the `info` default.
fn init_logging() {
    let filter = EnvFilter::try_from_env("PANEWEAVE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stdout)
        .try_init();
}

/// Main application logic.
fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.list {
        return print_listings();
    }

    let Some(ref session_arg) = cli.session else {
        return Err(PaneweaveError::ConfigNotFound("<no session given>".into()));
    };

    let path = loader::find_session(session_arg)?;
    info!("Loading session {}", path.display());
    let model = loader::load_session(
        &path,
        cli.overwrite.as_deref(),
        cli.missing_parameter_policy(),
    )?;

    let mut mux: Box<dyn Multiplexer> = if cli.dry_run {
        Box::new(DryRun::echoing())
    } else if let Some(ref socket) = cli.socket {
        Box::new(Tmux::with_socket(socket))
    } else {
        Box::new(Tmux::new())
    };

    let target = match cli.session_name {
        Some(ref name) => {
            tmux::new_session(mux.as_mut(), name)?;
            Target::session(name.as_str())
        }
        None if !cli.dry_run && !tmux::in_tmux() => return Err(PaneweaveError::NotInTmux),
        None => Target::current(),
    };

    runner::run(
        &model.windows,
        &model.common,
        cli.debug,
        &target,
        mux.as_mut(),
    )?;

    if let Some(ref name) = cli.session_name {
        if !cli.detach {
            if tmux::in_tmux() {
                tmux::switch_client(mux.as_mut(), name)?;
            } else {
                mux.attach(name)?;
            }
        }
    }

    Ok(())
}

/// Print all available named sessions.
fn print_listings() -> Result<()> {
    let dir = loader::sessions_dir()?;
    let sessions = loader::list_sessions_in(&dir)?;

    if sessions.is_empty() {
        println!("No sessions found in {}", dir.display());
        return Ok(());
    }

    println!("Sessions ({}):", dir.display());
    for session in sessions {
        println!("  {}", session);
    }
    Ok(())
}
