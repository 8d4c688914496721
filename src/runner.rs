//! Session runner: turns a built session model into tmux windows.

use crate::config::{Common, WindowSpec};
use crate::error::Result;
use crate::tmux::{self, Multiplexer, Target};
use tracing::info;

/// Create every window in order, then focus the common `default_window`.
///
/// All commands are aimed at `target`. The first window reuses the window
/// tmux already has open. With `debug`
/// set each window's description is dumped right after it is created. An
/// empty window list is not an error: nothing is sent to tmux.
///
/// # Errors
///
/// The first failing tmux command aborts the run; windows created before it
/// are left in place.
pub fn run(
    windows: &[WindowSpec],
    common: &Common,
    debug: bool,
    target: &Target,
    mux: &mut dyn Multiplexer,
) -> Result<()> {
    if windows.is_empty() {
        info!("No windows to run found");
        return Ok(());
    }

    for (i, window) in windows.iter().enumerate() {
        window.create(i == 0, target, mux)?;
        if debug {
            window.debug();
        }
    }

    if let Some(ref window) = common.default_window {
        tmux::select_window(mux, target, window)?;
    }

    Ok(())
}
