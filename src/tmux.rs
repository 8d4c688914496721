//! Tmux command facade.
//!
//! Everything paneweave does to tmux goes through [`Multiplexer::invoke`],
//! which takes a tmux argument list and reports success plus captured output.
//! [`Tmux`] shells out to the real binary; [`DryRun`] only records and prints
//! the commands, which is what `--dry-run` and the tests use.
//!
//! Commands are issued one at a time and in order: later commands such as
//! `send-keys` act on the window or pane the previous command made active.

use crate::error::{PaneweaveError, Result};
use std::process::Command;
use tracing::debug;

/// Result of one tmux invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    /// Whether tmux exited successfully.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// A tmux control interface.
pub trait Multiplexer {
    /// Run one tmux command, e.g. `["select-window", "-t", "editor"]`.
    ///
    /// A command that runs but fails is reported through
    /// [`Output::success`]; `Err` is reserved for not being able to run it.
    fn invoke(&mut self, args: &[String]) -> Result<Output>;

    /// Attach the user's terminal to a session.
    ///
    /// The default goes through [`Multiplexer::invoke`]; implementations that
    /// talk to a real terminal hand it over to tmux instead.
    fn attach(&mut self, session: &str) -> Result<()> {
        let args = ["attach-session", "-t", session].map(String::from);
        let output = self.invoke(&args)?;
        if output.success {
            Ok(())
        } else {
            Err(PaneweaveError::TmuxError(format!(
                "attach-session -t {} failed: {}",
                session,
                output.stderr.trim()
            )))
        }
    }
}

/// Check if we're running inside a tmux session.
///
/// Checks for the `TMUX` environment variable, which tmux sets when active.
pub fn in_tmux() -> bool {
    std::env::var("TMUX").is_ok()
}

/// Runs commands against the tmux binary.
#[derive(Debug, Clone, Default)]
pub struct Tmux {
    socket: Option<String>,
}

impl Tmux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Talk to the server on a named socket (`tmux -L <name>`).
    pub fn with_socket(socket: impl Into<String>) -> Self {
        Tmux {
            socket: Some(socket.into()),
        }
    }
}

impl Multiplexer for Tmux {
    fn invoke(&mut self, args: &[String]) -> Result<Output> {
        let mut command = Command::new("tmux");
        if let Some(ref socket) = self.socket {
            command.arg("-L").arg(socket);
        }
        debug!("tmux {}", args.join(" "));

        let output = command
            .args(args)
            .output()
            .map_err(|e| PaneweaveError::TmuxError(e.to_string()))?;

        Ok(Output {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn attach(&mut self, session: &str) -> Result<()> {
        let mut command = Command::new("tmux");
        if let Some(ref socket) = self.socket {
            command.arg("-L").arg(socket);
        }

        // Inherit stdio: tmux needs the terminal to attach.
        let status = command
            .args(["attach-session", "-t", session])
            .status()
            .map_err(|e| PaneweaveError::TmuxError(e.to_string()))?;

        if !status.success() {
            return Err(PaneweaveError::TmuxError(format!(
                "attach-session -t {} failed",
                session
            )));
        }

        Ok(())
    }
}

/// Records commands instead of running them.
#[derive(Debug, Clone, Default)]
pub struct DryRun {
    calls: Vec<Vec<String>>,
    echo: bool,
    fail_on: Option<String>,
}

impl DryRun {
    /// A silent recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that also prints each command to stdout.
    pub fn echoing() -> Self {
        DryRun {
            echo: true,
            ..Self::default()
        }
    }

    /// Report failure for every command whose name is `command`.
    pub fn failing_on(mut self, command: impl Into<String>) -> Self {
        self.fail_on = Some(command.into());
        self
    }

    /// Every command seen so far, in order.
    pub fn calls(&self) -> &[Vec<String>] {
        &self.calls
    }

    /// Just the command names (`new-window`, `send-keys`, ...).
    pub fn command_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| call.first().map(String::as_str))
            .collect()
    }
}

impl Multiplexer for DryRun {
    fn invoke(&mut self, args: &[String]) -> Result<Output> {
        if self.echo {
            println!("tmux {}", args.join(" "));
        }
        self.calls.push(args.to_vec());

        let failed = match (&self.fail_on, args.first()) {
            (Some(fail), Some(name)) => fail == name,
            _ => false,
        };
        Ok(Output {
            success: !failed,
            stdout: String::new(),
            stderr: if failed {
                format!("{} refused by dry run", args.join(" "))
            } else {
                String::new()
            },
        })
    }
}

/// Run a command and turn an unsuccessful exit into [`PaneweaveError::TmuxError`].
pub fn expect_success(mux: &mut dyn Multiplexer, args: &[&str]) -> Result<Output> {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let output = mux.invoke(&args)?;

    if !output.success {
        let detail = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        return Err(PaneweaveError::TmuxError(format!(
            "{} failed: {}",
            args.join(" "),
            detail
        )));
    }

    Ok(output)
}

/// Which session the window and pane commands act on.
///
/// Without a session, commands go to whatever tmux considers current, which
/// inside tmux is the user's own session. With `-n NAME` every command is
/// pinned to `NAME:` so a freshly created session is never confused with the
/// one paneweave was launched from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    session: Option<String>,
}

impl Target {
    /// Act on tmux's current session.
    pub fn current() -> Self {
        Self::default()
    }

    /// Act on the named session.
    pub fn session(name: impl Into<String>) -> Self {
        Target {
            session: Some(name.into()),
        }
    }

    /// The `-t` value for the session's active window or pane, if pinned.
    pub fn active(&self) -> Option<String> {
        self.session.as_ref().map(|name| format!("{}:", name))
    }

    /// The `-t` value for a window by name or index.
    pub fn window(&self, window: &str) -> String {
        match self.session {
            Some(ref name) => format!("{}:{}", name, window),
            None => window.to_string(),
        }
    }
}

fn targeted(
    mux: &mut dyn Multiplexer,
    target: &Target,
    command: &str,
    rest: &[&str],
) -> Result<()> {
    let session = target.active();
    let mut args = vec![command];
    if let Some(ref session) = session {
        args.extend(["-t", session.as_str()]);
    }
    args.extend_from_slice(rest);
    expect_success(mux, &args).map(|_| ())
}

/// Create a new tmux window. The new window becomes the active window.
pub fn new_window(mux: &mut dyn Multiplexer, target: &Target) -> Result<()> {
    targeted(mux, target, "new-window", &[])
}

/// Rename the active window.
pub fn rename_window(mux: &mut dyn Multiplexer, target: &Target, name: &str) -> Result<()> {
    targeted(mux, target, "rename-window", &[name])
}

/// Split the active pane; the new pane becomes active.
pub fn split_window(mux: &mut dyn Multiplexer, target: &Target) -> Result<()> {
    targeted(mux, target, "split-window", &[])
}

/// Apply a layout to the active window.
pub fn select_layout(mux: &mut dyn Multiplexer, target: &Target, layout: &str) -> Result<()> {
    targeted(mux, target, "select-layout", &[layout])
}

/// Type a command into the active pane followed by Enter.
pub fn send_keys(mux: &mut dyn Multiplexer, target: &Target, command: &str) -> Result<()> {
    targeted(mux, target, "send-keys", &[command, "Enter"])
}

/// Switch to a window by name or index.
pub fn select_window(mux: &mut dyn Multiplexer, target: &Target, window: &str) -> Result<()> {
    let window = target.window(window);
    expect_success(mux, &["select-window", "-t", &window]).map(|_| ())
}

/// Start a detached session, which becomes the target of later commands.
pub fn new_session(mux: &mut dyn Multiplexer, name: &str) -> Result<()> {
    expect_success(mux, &["new-session", "-d", "-s", name]).map(|_| ())
}

/// Point the current client at another session (used instead of
/// attaching when already inside tmux).
pub fn switch_client(mux: &mut dyn Multiplexer, name: &str) -> Result<()> {
    expect_success(mux, &["switch-client", "-t", name]).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_records_in_order() {
        let mut mux = DryRun::new();
        let current = Target::current();
        new_window(&mut mux, &current).unwrap();
        send_keys(&mut mux, &current, "ls -la").unwrap();
        select_window(&mut mux, &current, "editor").unwrap();

        assert_eq!(mux.command_names(), vec!["new-window", "send-keys", "select-window"]);
        assert_eq!(mux.calls()[1], vec!["send-keys", "ls -la", "Enter"]);
        assert_eq!(mux.calls()[2], vec!["select-window", "-t", "editor"]);
    }

    #[test]
    fn test_expect_success_reports_failure() {
        let mut mux = DryRun::new().failing_on("select-window");
        let err = select_window(&mut mux, &Target::current(), "missing").unwrap_err();
        match err {
            PaneweaveError::TmuxError(msg) => {
                assert!(msg.starts_with("select-window -t missing failed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_attach_goes_through_invoke() {
        let mut mux = DryRun::new();
        new_session(&mut mux, "work").unwrap();
        mux.attach("work").unwrap();
        assert_eq!(mux.calls()[0], vec!["new-session", "-d", "-s", "work"]);
        assert_eq!(mux.calls()[1], vec!["attach-session", "-t", "work"]);

        let mut failing = DryRun::new().failing_on("attach-session");
        assert!(failing.attach("work").is_err());
    }

    #[test]
    fn test_failing_on_only_matches_command_name() {
        let mut mux = DryRun::new().failing_on("new-window");
        assert!(send_keys(&mut mux, &Target::current(), "new-window").is_ok());
        assert!(new_window(&mut mux, &Target::current()).is_err());
    }

    #[test]
    fn test_named_session_pins_every_command() {
        let mut mux = DryRun::new();
        let work = Target::session("work");
        new_window(&mut mux, &work).unwrap();
        rename_window(&mut mux, &work, "editor").unwrap();
        split_window(&mut mux, &work).unwrap();
        select_layout(&mut mux, &work, "tiled").unwrap();
        send_keys(&mut mux, &work, "vim").unwrap();
        select_window(&mut mux, &work, "editor").unwrap();

        let expected: Vec<Vec<&str>> = vec![
            vec!["new-window", "-t", "work:"],
            vec!["rename-window", "-t", "work:", "editor"],
            vec!["split-window", "-t", "work:"],
            vec!["select-layout", "-t", "work:", "tiled"],
            vec!["send-keys", "-t", "work:", "vim", "Enter"],
            vec!["select-window", "-t", "work:editor"],
        ];
        assert_eq!(mux.calls(), expected.as_slice());
    }

    #[test]
    fn test_target_values() {
        assert_eq!(Target::current().active(), None);
        assert_eq!(Target::current().window("2"), "2");
        assert_eq!(Target::session("work").active().as_deref(), Some("work:"));
        assert_eq!(Target::session("work").window("2"), "work:2");
    }
}
