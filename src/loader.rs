//! Session file discovery and loading.
//!
//! A session can be given as a path, or as a name that is looked up in the
//! sessions directory:
//!
//! 1. `$XDG_CONFIG_HOME/paneweave/sessions/`
//! 2. `~/.config/paneweave/sessions/`
//! 3. Platform default (e.g., `~/Library/Application Support` on macOS)
//!
//! Named sessions may use any of the extensions `.yaml`, `.yml` or `.toml`.

use crate::condition::MissingParameterPolicy;
use crate::error::{PaneweaveError, Result};
use crate::session::{Session, SessionModel};
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when resolving a session name.
pub const SESSION_EXTENSIONS: &[&str] = &["yaml", "yml", "toml"];

/// Determine the paneweave config directory.
///
/// Checks locations in order of preference:
/// 1. `$XDG_CONFIG_HOME/paneweave` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/paneweave` (common on Linux, often used on macOS)
/// 3. Platform default via `dirs::config_dir()`
///
/// If none of them exists, returns `~/.config/paneweave` as the default
/// location.
///
/// # Errors
///
/// Returns [`PaneweaveError::NoConfigDir`] if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("paneweave");
        if path.exists() {
            return Ok(path);
        }
    }

    let home = dirs::home_dir().ok_or(PaneweaveError::NoConfigDir)?;
    let dot_config = home.join(".config").join("paneweave");
    if dot_config.exists() {
        return Ok(dot_config);
    }

    if let Some(platform) = dirs::config_dir() {
        let path = platform.join("paneweave");
        if path.exists() {
            return Ok(path);
        }
    }

    Ok(dot_config)
}

/// Directory holding named session files.
pub fn sessions_dir() -> Result<PathBuf> {
    Ok(config_dir()?.join("sessions"))
}

/// Resolve a session argument to a file.
///
/// An existing path wins; otherwise the name is looked up in the sessions
/// directory.
///
/// # Errors
///
/// Returns [`PaneweaveError::ConfigNotFound`] if nothing matches.
pub fn find_session(arg: &str) -> Result<PathBuf> {
    let direct = PathBuf::from(arg);
    if direct.is_file() {
        return Ok(direct);
    }
    find_session_in(&sessions_dir()?, arg)
}

/// Look a session name up in `dir`.
pub fn find_session_in(dir: &Path, name: &str) -> Result<PathBuf> {
    for ext in SESSION_EXTENSIONS {
        let candidate = dir.join(format!("{}.{}", name, ext));
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(PaneweaveError::ConfigNotFound(
        dir.join(format!("{}.{}", name, SESSION_EXTENSIONS[0])),
    ))
}

/// List session names in `dir`, sorted alphabetically.
///
/// A missing directory simply has no sessions.
pub fn list_sessions_in(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut result = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if !SESSION_EXTENSIONS.contains(&ext) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            result.push(stem.to_string());
        }
    }
    result.sort();
    result.dedup();
    Ok(result)
}

/// List sessions in the default sessions directory.
pub fn list_sessions() -> Result<Vec<String>> {
    list_sessions_in(&sessions_dir()?)
}

/// Load and build a session file.
///
/// Convenience wrapper around [`Session::new`] and [`Session::load_file`].
pub fn load_session(
    path: &Path,
    overrides: Option<&str>,
    policy: MissingParameterPolicy,
) -> Result<SessionModel> {
    let mut session = Session::new(overrides)?.with_policy(policy);
    session.load_file(path)?;
    Ok(session.into_model())
}
