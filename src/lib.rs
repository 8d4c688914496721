//! # Paneweave
//!
//! A tmux session launcher that creates windows and panes from a YAML or
//! TOML session file.
//!
//! Paneweave reads a declarative description of windows, panes and shell
//! commands, resolves its parameters, evaluates per-window conditions and
//! sends the resulting sequence of commands to tmux.
//!
//! ## Features
//!
//! - **Parameters**: `${name}` placeholders anywhere in the file, with defaults
//!   that can be overridden at launch (`--overwrite key=value,...`)
//! - **Conditions**: `if` / `unless` switch windows on or off per parameter
//! - **Common block**: `before_commands` shared by every window and a
//!   `default_window` to focus at the end
//! - **Layouts**: tiled, vertical, horizontal or any tmux layout string
//!
//! ## Quick Example
//!
//! ```yaml
//! # ~/.config/paneweave/sessions/dev.yaml
//!
//! common:
//!   default_window: editor
//!   before_commands:
//!     - cd ${project}
//!
//! parameters:
//!   project: ~/src/app
//!   with_db: true
//!
//! windows:
//!   - name: editor
//!     commands: vim
//!   - name: db
//!     if: with_db
//!     splits:
//!       - commands: docker compose up db
//!       - commands: psql
//! ```
//!
//! ## Architecture
//!
//! The crate is organized into these modules:
//!
//! - [`document`]: Untyped document tree and YAML/TOML parsing
//! - [`resolver`]: Parameter defaults and runtime overrides
//! - [`interpolate`]: `${name}` substitution through the document tree
//! - [`condition`]: `if` / `unless` window conditions
//! - [`config`]: Typed window, pane and common settings
//! - [`session`]: The build pipeline producing a [`SessionModel`]
//! - [`window`]: Creating a window and its panes in tmux
//! - [`runner`]: Creating all windows of a session
//! - [`tmux`]: The tmux command facade
//! - [`loader`]: Session file discovery and loading
//! - [`cli`]: Command-line argument parsing with clap
//! - [`error`]: Error types

pub mod cli;
pub mod condition;
pub mod config;
pub mod document;
pub mod error;
pub mod interpolate;
pub mod loader;
pub mod resolver;
pub mod runner;
pub mod session;
pub mod tmux;
pub mod window;

pub use config::{Cmd, Common, Layout, SplitSpec, WindowSpec};
pub use document::Node;
pub use error::{PaneweaveError, Result};
pub use session::{Session, SessionModel, build};
