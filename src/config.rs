//! Typed session configuration.
//!
//! After parameters are substituted and conditions evaluated, each window
//! mapping is decoded into a [`WindowSpec`]. The common block is decoded into
//! [`Common`].
//!
//! # Window Format
//!
//! ```yaml
//! common:
//!   default_window: editor
//!   before_commands:
//!     - cd ~/src/app
//!
//! windows:
//!   - name: editor
//!     commands: vim
//!   - name: services
//!     layout: vertical
//!     delay: 1
//!     splits:
//!       - commands: [make db]
//!       - commands: [make api]
//! ```

use crate::document::{self, Mapping, Node};
use crate::error::{PaneweaveError, Result};
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Window keys consumed by the session builder rather than the window itself.
const CONDITION_KEYS: &[&str] = &["if", "unless"];

/// Command field that accepts either a single string or array of strings.
///
/// This allows flexible config syntax:
/// ```yaml
/// commands: single command
/// # or
/// commands: [command 1, command 2]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cmd {
    /// A single command string.
    Single(String),
    /// Multiple commands executed in sequence.
    Multiple(Vec<String>),
}

impl Cmd {
    /// Convert to a `Vec<String>`, normalizing both variants.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Cmd::Single(s) => vec![s.clone()],
            Cmd::Multiple(v) => v.clone(),
        }
    }
}

/// Layout options for tmux panes.
///
/// Maps to tmux's built-in layout algorithms:
/// - `Tiled`: Spread panes evenly in both directions
/// - `Vertical`: Side-by-side panes (tmux's "even-horizontal")
/// - `Horizontal`: Stacked panes (tmux's "even-vertical")
/// - `MainVertical` / `MainHorizontal`: one large pane plus the rest
/// - `Custom`: any other layout string, passed to tmux verbatim
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum Layout {
    /// Spread panes evenly (tmux: "tiled").
    #[default]
    Tiled,
    /// Side-by-side panes (tmux: "even-horizontal").
    Vertical,
    /// Stacked panes (tmux: "even-vertical").
    Horizontal,
    /// Large left pane (tmux: "main-vertical").
    MainVertical,
    /// Large top pane (tmux: "main-horizontal").
    MainHorizontal,
    /// A tmux layout string such as `"5e6b,200x50,0,0{...}"`.
    Custom(String),
}

impl Layout {
    /// Parse a layout name or alias.
    ///
    /// ```
    /// use paneweave::config::Layout;
    ///
    /// assert_eq!(Layout::from_name("vertical"), Layout::Vertical);
    /// assert_eq!(Layout::from_name("even-vertical"), Layout::Horizontal);
    /// assert_eq!(Layout::from_name("abcd,80x24,0,0,1").to_tmux_layout(), "abcd,80x24,0,0,1");
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "tiled" => Layout::Tiled,
            "vertical" | "even-horizontal" => Layout::Vertical,
            "horizontal" | "even-vertical" => Layout::Horizontal,
            "main-vertical" => Layout::MainVertical,
            "main-horizontal" => Layout::MainHorizontal,
            other => Layout::Custom(other.to_string()),
        }
    }

    /// Convert to the tmux layout name used by `select-layout`.
    pub fn to_tmux_layout(&self) -> &str {
        match self {
            Layout::Tiled => "tiled",
            Layout::Vertical => "even-horizontal",
            Layout::Horizontal => "even-vertical",
            Layout::MainVertical => "main-vertical",
            Layout::MainHorizontal => "main-horizontal",
            Layout::Custom(s) => s,
        }
    }
}

impl From<String> for Layout {
    fn from(name: String) -> Self {
        Layout::from_name(&name)
    }
}

/// `default_window` may name a window or give its index.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WindowRef {
    Name(String),
    Index(i64),
}

/// The parts of the common block paneweave interprets.
#[derive(Debug, Deserialize)]
struct CommonDef {
    #[serde(default)]
    default_window: Option<WindowRef>,
    #[serde(default)]
    before_commands: Option<Cmd>,
}

/// Session-wide settings from the `common` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Common {
    /// Window to focus once every window exists.
    pub default_window: Option<String>,
    /// The whole block, including keys paneweave does not interpret.
    pub raw: Mapping,
}

impl Common {
    /// Decode the common block. `origin` labels errors.
    ///
    /// # Errors
    ///
    /// Returns [`PaneweaveError::LoadFailure`] if `default_window` or
    /// `before_commands` has the wrong shape.
    pub fn from_mapping(raw: Mapping, origin: &Path) -> Result<Self> {
        let def: CommonDef = document::decode(&raw).map_err(|e| PaneweaveError::LoadFailure {
            path: origin.to_path_buf(),
            message: format!("invalid common block: {}", e),
        })?;

        let default_window = def.default_window.map(|target| match target {
            WindowRef::Name(name) => name,
            WindowRef::Index(index) => index.to_string(),
        });

        Ok(Common { default_window, raw })
    }

    /// Commands inherited by every window that does not set its own.
    pub fn before_commands(&self) -> Option<&Node> {
        self.raw.get("before_commands")
    }
}

/// One entry of `splits`: `~`, a bare command, or a mapping.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SplitDef {
    Empty,
    /// `- make test` as shorthand for `- commands: make test`
    Shorthand(String),
    Table {
        #[serde(default)]
        commands: Option<Cmd>,
    },
}

impl SplitDef {
    fn into_spec(self) -> SplitSpec {
        let commands = match self {
            SplitDef::Empty | SplitDef::Table { commands: None } => Vec::new(),
            SplitDef::Shorthand(cmd) => vec![cmd],
            SplitDef::Table {
                commands: Some(cmd),
            } => cmd.to_vec(),
        };
        SplitSpec { commands }
    }
}

/// A window entry as written in the session file.
#[derive(Debug, Deserialize)]
struct WindowDef {
    name: String,
    #[serde(default, alias = "panes")]
    splits: Option<Vec<SplitDef>>,
    #[serde(default)]
    commands: Option<Cmd>,
    #[serde(default)]
    before_commands: Option<Cmd>,
    #[serde(default)]
    layout: Option<Layout>,
    /// Seconds.
    #[serde(default)]
    delay: Option<f64>,
    #[serde(flatten)]
    other: BTreeMap<String, IgnoredAny>,
}

/// One pane of a window and the commands typed into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSpec {
    pub commands: Vec<String>,
}

/// A resolved window: conditions passed, placeholders substituted and common
/// defaults merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    /// tmux window name.
    pub name: String,
    /// Panes in creation order. Never empty.
    pub splits: Vec<SplitSpec>,
    /// Sent to every pane before its own commands.
    pub before_commands: Vec<String>,
    /// Applied with `select-layout` once all panes exist.
    pub layout: Option<Layout>,
    /// Pause after the window is fully created.
    pub delay: Option<Duration>,
}

impl WindowSpec {
    /// Build a window with a single empty pane.
    pub fn new(name: impl Into<String>) -> Self {
        WindowSpec {
            name: name.into(),
            splits: vec![SplitSpec::default()],
            before_commands: Vec::new(),
            layout: None,
            delay: None,
        }
    }

    /// Decode a merged window mapping.
    ///
    /// # Errors
    ///
    /// Returns [`PaneweaveError::InvalidWindow`] when `name` is missing or a
    /// field has the wrong shape.
    pub fn from_mapping(fields: &Mapping) -> Result<Self> {
        let label = fields
            .get("name")
            .and_then(Node::as_str)
            .unwrap_or("<unnamed>");
        let def: WindowDef = document::decode(fields).map_err(|e| invalid(label, e.to_string()))?;
        def.into_spec()
    }
}

impl WindowDef {
    fn into_spec(self) -> Result<WindowSpec> {
        let name = self.name;
        if name.is_empty() {
            return Err(invalid("<unnamed>", "'name' must not be empty".into()));
        }

        for key in self.other.keys() {
            if !CONDITION_KEYS.contains(&key.as_str()) {
                warn!("Ignoring unknown key '{}' in window {}", key, name);
            }
        }

        let splits = match (self.splits, self.commands) {
            (Some(_), Some(_)) => {
                return Err(invalid(
                    &name,
                    "window-level 'commands' cannot be combined with 'splits'".into(),
                ));
            }
            (Some(defs), None) if !defs.is_empty() => {
                defs.into_iter().map(SplitDef::into_spec).collect()
            }
            (None, Some(cmd)) => vec![SplitSpec {
                commands: cmd.to_vec(),
            }],
            _ => vec![SplitSpec::default()],
        };

        let delay = match self.delay {
            None => None,
            Some(secs) if secs >= 0.0 => Some(Duration::try_from_secs_f64(secs).map_err(|e| {
                invalid(&name, format!("'delay' of {} seconds is out of range: {}", secs, e))
            })?),
            Some(secs) => {
                return Err(invalid(
                    &name,
                    format!("'delay' must be a non-negative number of seconds, got {}", secs),
                ));
            }
        };

        Ok(WindowSpec {
            before_commands: self.before_commands.map(|c| c.to_vec()).unwrap_or_default(),
            layout: self.layout,
            splits,
            delay,
            name,
        })
    }
}

fn invalid(window: &str, message: String) -> PaneweaveError {
    PaneweaveError::InvalidWindow {
        window: window.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Format, parse};

    fn window(yaml: &str) -> Result<WindowSpec> {
        let node = parse(yaml, Format::Yaml, Path::new("<test>")).unwrap();
        WindowSpec::from_mapping(node.as_mapping().unwrap())
    }

    #[test]
    fn test_window_with_splits() {
        let spec = window(
            "name: services\nlayout: vertical\ndelay: 2\nsplits:\n  - commands: [make db]\n  - commands: make api\n",
        )
        .unwrap();

        assert_eq!(spec.name, "services");
        assert_eq!(spec.layout, Some(Layout::Vertical));
        assert_eq!(spec.delay, Some(Duration::from_secs(2)));
        assert_eq!(spec.splits.len(), 2);
        assert_eq!(spec.splits[0].commands, vec!["make db"]);
        assert_eq!(spec.splits[1].commands, vec!["make api"]);
    }

    #[test]
    fn test_window_commands_shorthand() {
        let spec = window("name: editor\ncommands: [cd src, vim]\n").unwrap();
        assert_eq!(
            spec.splits,
            vec![SplitSpec {
                commands: vec!["cd src".to_string(), "vim".to_string()]
            }]
        );
    }

    #[test]
    fn test_window_without_panes_gets_one() {
        let spec = window("name: shell\n").unwrap();
        assert_eq!(spec, WindowSpec::new("shell"));
        let spec = window("name: shell\nsplits: []\n").unwrap();
        assert_eq!(spec.splits.len(), 1);
    }

    #[test]
    fn test_panes_alias_and_string_split() {
        let spec = window("name: w\npanes:\n  - htop\n  - ~\n  - {}\n").unwrap();
        assert_eq!(spec.splits[0].commands, vec!["htop"]);
        assert!(spec.splits[1].commands.is_empty());
        assert!(spec.splits[2].commands.is_empty());
    }

    #[test]
    fn test_conditions_and_unknown_keys_accepted() {
        let spec = window("name: w\nif: feat\nunless: other\ncolour: red\n").unwrap();
        assert_eq!(spec, WindowSpec::new("w"));
    }

    #[test]
    fn test_window_requires_name() {
        let err = window("commands: ls\n").unwrap_err();
        assert!(matches!(err, PaneweaveError::InvalidWindow { .. }));
        assert!(window("name: ''\n").is_err());
    }

    #[test]
    fn test_window_rejects_bad_shapes() {
        assert!(window("name: w\ndelay: -1\n").is_err());
        assert!(window("name: w\nlayout: [a]\n").is_err());
        assert!(window("name: w\nsplits: ls\n").is_err());
        assert!(window("name: w\ncommands: ls\nsplits: [a]\n").is_err());
        assert!(window("name: w\nbefore_commands: [[a]]\n").is_err());
        assert!(window("name: w\nsplits: [a]\npanes: [b]\n").is_err());
    }

    #[test]
    fn test_fractional_delay() {
        let spec = window("name: w\ndelay: 0.5\n").unwrap();
        assert_eq!(spec.delay, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_huge_delay_is_an_error() {
        match window("name: slow\ndelay: 1.0e30\n").unwrap_err() {
            PaneweaveError::InvalidWindow { window, message } => {
                assert_eq!(window, "slow");
                assert!(message.contains("out of range"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_common_default_window() {
        let node = parse("default_window: 2\nfoo: bar\n", Format::Yaml, Path::new("<test>")).unwrap();
        let common =
            Common::from_mapping(node.as_mapping().unwrap().clone(), Path::new("dev.yaml")).unwrap();
        assert_eq!(common.default_window.as_deref(), Some("2"));
        assert!(common.before_commands().is_none());
        assert_eq!(common.raw.get("foo"), Some(&Node::from("bar")));
    }

    #[test]
    fn test_common_error_names_session_file() {
        let node = parse("default_window: [a]\n", Format::Yaml, Path::new("<test>")).unwrap();
        let err = Common::from_mapping(node.as_mapping().unwrap().clone(), Path::new("dev.yaml"))
            .unwrap_err();
        match err {
            PaneweaveError::LoadFailure { path, .. } => assert_eq!(path, Path::new("dev.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_layout_names() {
        assert_eq!(Layout::from_name("tiled").to_tmux_layout(), "tiled");
        assert_eq!(Layout::from_name("horizontal").to_tmux_layout(), "even-vertical");
        assert_eq!(Layout::from_name("main-vertical"), Layout::MainVertical);
    }
}
