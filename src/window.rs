//! Materialising a [`WindowSpec`] in tmux.

use crate::config::WindowSpec;
use crate::error::Result;
use crate::tmux::{self, Multiplexer, Target};
use std::fmt;
use tracing::info;

impl WindowSpec {
    /// Create this window and type its commands into each pane.
    ///
    /// Every command is aimed at `target`, so a window built for a named
    /// session lands there even when launched from inside another session.
    /// The first window of a session reuses the window tmux already opened
    /// instead of creating a new one. Each extra pane is split off the
    /// active one and the window is re-tiled straight away so tmux always
    /// has room for the next split; the configured layout is applied last.
    ///
    /// # Errors
    ///
    /// Any failing tmux command aborts the window with
    /// [`crate::PaneweaveError::TmuxError`].
    pub fn create(
        &self,
        is_first: bool,
        target: &Target,
        mux: &mut dyn Multiplexer,
    ) -> Result<()> {
        if !is_first {
            tmux::new_window(mux, target)?;
        }
        tmux::rename_window(mux, target, &self.name)?;

        for (i, split) in self.splits.iter().enumerate() {
            if i > 0 {
                tmux::split_window(mux, target)?;
                tmux::select_layout(mux, target, "tiled")?;
            }
            for command in self.before_commands.iter().chain(&split.commands) {
                tmux::send_keys(mux, target, command)?;
            }
        }

        if let Some(ref layout) = self.layout {
            tmux::select_layout(mux, target, layout.to_tmux_layout())?;
        }

        info!("Created window {} ({} panes)", self.name, self.splits.len());

        if let Some(delay) = self.delay {
            info!("Waiting {:?} after window {}", delay, self.name);
            std::thread::sleep(delay);
        }

        Ok(())
    }

    /// Describe the window, logging and returning the description.
    pub fn debug(&self) -> String {
        let out = self.to_string();
        for line in out.lines() {
            info!("{}", line);
        }
        out
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Window: {}", self.name)?;
        if let Some(ref layout) = self.layout {
            writeln!(f, "  layout: {}", layout.to_tmux_layout())?;
        }
        if !self.before_commands.is_empty() {
            writeln!(f, "  before_commands:")?;
            for command in &self.before_commands {
                writeln!(f, "    - {}", command)?;
            }
        }
        for (i, split) in self.splits.iter().enumerate() {
            writeln!(f, "  split {}:", i)?;
            for command in &split.commands {
                writeln!(f, "    - {}", command)?;
            }
        }
        Ok(())
    }
}
