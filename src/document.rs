//! Untyped session document tree.
//!
//! Session files are loaded into a [`Node`] tree before anything else happens,
//! because parameter substitution has to rewrite every string in the file
//! before the windows can be decoded into typed structures.
//!
//! Both YAML and TOML are accepted:
//!
//! ```yaml
//! common:
//!   default_window: editor
//! parameters:
//!   project: ~/src/app
//! windows:
//!   - name: editor
//!     commands: vim ${project}
//! ```

use crate::error::{PaneweaveError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A mapping node: key order is normalised, sequence order is kept.
pub type Mapping = BTreeMap<String, Node>;

/// One node of a loaded session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// YAML `~` / `null`. TOML has no equivalent.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Whole numbers.
    Integer(i64),
    /// Floating point numbers.
    Float(f64),
    /// Any string scalar; the only node kind substitution touches.
    String(String),
    /// Ordered list of nodes.
    Sequence(Vec<Node>),
    /// String-keyed table of nodes.
    Mapping(Mapping),
}

impl Node {
    /// Truthiness used by `if` / `unless` conditions.
    ///
    /// Empty strings, zero, `false`, null and empty collections are falsy.
    ///
    /// ```
    /// use paneweave::document::Node;
    ///
    /// assert!(Node::String("prod".into()).is_truthy());
    /// assert!(!Node::String(String::new()).is_truthy());
    /// assert!(!Node::Integer(0).is_truthy());
    /// assert!(!Node::Bool(false).is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Node::Null => false,
            Node::Bool(b) => *b,
            Node::Integer(i) => *i != 0,
            Node::Float(f) => *f != 0.0,
            Node::String(s) => !s.is_empty(),
            Node::Sequence(items) => !items.is_empty(),
            Node::Mapping(map) => !map.is_empty(),
        }
    }

    /// Short name of the node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Integer(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }
}

/// Renders scalars the way they are spliced into commands.
///
/// Collections use a compact flow style so that a misplaced placeholder is
/// at least readable in the resulting command line.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => Ok(()),
            Node::Bool(b) => write!(f, "{}", b),
            Node::Integer(i) => write!(f, "{}", i),
            Node::Float(x) => write!(f, "{}", x),
            Node::String(s) => f.write_str(s),
            Node::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Node::Mapping(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Integer(i)
    }
}

/// On-disk syntax of a session file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    /// Pick the format from a file extension. Anything that is not `.toml`
    /// is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }
}

/// Parse session text into a document tree.
///
/// `origin` is only used to label errors.
///
/// # Errors
///
/// Returns [`PaneweaveError::LoadFailure`] if the text does not parse or its
/// top level is not a mapping.
pub fn parse(text: &str, format: Format, origin: &Path) -> Result<Node> {
    let parsed = match format {
        Format::Yaml => serde_yaml::from_str::<Node>(text).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str::<Node>(text).map_err(|e| e.to_string()),
    };

    let node = parsed.map_err(|message| PaneweaveError::LoadFailure {
        path: origin.to_path_buf(),
        message,
    })?;

    match node {
        Node::Mapping(_) => Ok(node),
        other => Err(PaneweaveError::LoadFailure {
            path: origin.to_path_buf(),
            message: format!("top level must be a mapping, found {}", other.kind()),
        }),
    }
}

/// Decode part of a document into a typed structure.
///
/// The value goes through `serde_yaml::Value`, so every serde attribute on
/// `T` (defaults, aliases, untagged enums) applies as it would to a file.
///
/// ```
/// use paneweave::document::{decode, Node};
/// use std::collections::BTreeMap;
///
/// let mut map = BTreeMap::new();
/// map.insert("port".to_string(), Node::Integer(8080));
/// let decoded: BTreeMap<String, u16> = decode(&map).unwrap();
/// assert_eq!(decoded["port"], 8080);
/// ```
pub fn decode<T: DeserializeOwned>(
    value: &impl Serialize,
) -> std::result::Result<T, serde_yaml::Error> {
    serde_yaml::from_value(serde_yaml::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> &'static Path {
        Path::new("<test>")
    }

    #[test]
    fn test_parse_yaml_tree() {
        let text = "parameters:\n  mode: prod\n  count: 3\nwindows:\n  - name: a\n    if: mode\n";
        let doc = parse(text, Format::Yaml, origin()).unwrap();

        assert_eq!(
            doc.get("parameters").and_then(|p| p.get("mode")),
            Some(&Node::from("prod"))
        );
        assert_eq!(
            doc.get("parameters").and_then(|p| p.get("count")),
            Some(&Node::Integer(3))
        );
        let windows = doc.get("windows").and_then(Node::as_sequence).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].get("if"), Some(&Node::from("mode")));
    }

    #[test]
    fn test_parse_yaml_null() {
        let doc = parse("common:\n  note: ~\n", Format::Yaml, origin()).unwrap();
        assert_eq!(doc.get("common").and_then(|c| c.get("note")), Some(&Node::Null));
    }

    #[test]
    fn test_parse_toml_tree() {
        let text = r#"
[parameters]
debug = false

[[windows]]
name = "logs"
commands = ["tail -f app.log"]
"#;
        let doc = parse(text, Format::Toml, origin()).unwrap();
        assert_eq!(
            doc.get("parameters").and_then(|p| p.get("debug")),
            Some(&Node::Bool(false))
        );
        let windows = doc.get("windows").and_then(Node::as_sequence).unwrap();
        assert_eq!(windows[0].get("name"), Some(&Node::from("logs")));
    }

    #[test]
    fn test_parse_rejects_bad_yaml() {
        let err = parse("windows: [unclosed", Format::Yaml, origin()).unwrap_err();
        assert!(matches!(err, PaneweaveError::LoadFailure { .. }));
    }

    #[test]
    fn test_parse_rejects_non_mapping_top_level() {
        let err = parse("- a\n- b\n", Format::Yaml, origin()).unwrap_err();
        match err {
            PaneweaveError::LoadFailure { message, .. } => assert!(message.contains("sequence")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/dev.toml")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("a/dev.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a/dev")), Format::Yaml);
    }

    #[test]
    fn test_display_scalars_and_collections() {
        assert_eq!(Node::Bool(true).to_string(), "true");
        assert_eq!(Node::Integer(42).to_string(), "42");
        assert_eq!(Node::Null.to_string(), "");
        let seq = Node::Sequence(vec![Node::from("a"), Node::Integer(1)]);
        assert_eq!(seq.to_string(), "[a, 1]");
    }

    #[test]
    fn test_truthiness_collections() {
        assert!(!Node::Sequence(Vec::new()).is_truthy());
        assert!(Node::Sequence(vec![Node::Null]).is_truthy());
        assert!(!Node::Mapping(Mapping::new()).is_truthy());
        assert!(!Node::Null.is_truthy());
        assert!(Node::Float(0.5).is_truthy());
    }
}
