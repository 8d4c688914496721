//! Command-line interface for paneweave.
//!
//! Parses arguments using clap and provides the [`Cli`] struct containing
//! all user-specified options.

use crate::condition::MissingParameterPolicy;
use clap::Parser;

/// Command-line arguments for paneweave.
///
/// # Examples
///
/// ```bash
/// # Run ~/.config/paneweave/sessions/dev.yaml in the current tmux session
/// paneweave dev
///
/// # Start a new tmux session with overridden parameters
/// paneweave dev -n work --overwrite mode=prod,with_logs=false
///
/// # Show what would be sent to tmux
/// paneweave ./session.toml --dry-run
///
/// # List all available sessions
/// paneweave --list
/// ```
#[derive(Parser, Debug)]
#[command(name = "paneweave")]
#[command(version)]
#[command(about = "Tmux session launcher - create windows and panes from a session file")]
#[command(long_about = "Paneweave creates tmux windows and panes described by a YAML or TOML session file.\n\n\
    Session files declare parameters that can be overridden at launch time,\n\
    substituted into commands as ${name}, and used to switch windows on or off\n\
    with `if` / `unless` conditions.")]
pub struct Cli {
    /// Session to run: a file path or the name of a file in the sessions directory.
    #[arg(value_name = "SESSION", required_unless_present = "list")]
    pub session: Option<String>,

    /// Override session parameters (format: key=value,key2=value2).
    #[arg(long, value_name = "KEY=VALUE,...")]
    pub overwrite: Option<String>,

    /// Create a new detached tmux session with this name and attach to it.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub session_name: Option<String>,

    /// Do not attach to the session created with --session-name.
    #[arg(short, long, requires = "session_name")]
    pub detach: bool,

    /// tmux socket name (passed as `tmux -L <NAME>`).
    #[arg(short = 'L', long, value_name = "NAME")]
    pub socket: Option<String>,

    /// Dump each window's configuration after creating it.
    #[arg(long)]
    pub debug: bool,

    /// Print tmux commands instead of running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Fail when an `unless` condition names an undefined parameter
    /// (by default such windows are skipped).
    #[arg(long)]
    pub strict_unless: bool,

    /// List all available named sessions.
    #[arg(short, long)]
    pub list: bool,
}

impl Cli {
    /// Policy for `unless` conditions on undefined parameters.
    pub fn missing_parameter_policy(&self) -> MissingParameterPolicy {
        if self.strict_unless {
            MissingParameterPolicy::Fail
        } else {
            MissingParameterPolicy::Exclude
        }
    }
}
