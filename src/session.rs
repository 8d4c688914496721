//! Session model building.
//!
//! A session file goes through a fixed pipeline before anything is sent to
//! tmux:
//!
//! 1. the `common` block is extracted,
//! 2. the `parameters` block is merged with runtime overrides,
//! 3. every string in the whole document has its `${name}` placeholders
//!    substituted,
//! 4. each entry of `windows` is checked against its `if` / `unless`
//!    conditions, merged with the common defaults and decoded.
//!
//! [`Session`] exposes the stages one by one; [`build`] runs them all.
//!
//! ```
//! use paneweave::document::{parse, Format};
//! use paneweave::session::build;
//! use std::path::Path;
//!
//! let text = "parameters:\n  mode: prod\nwindows:\n  - name: a\n    if: mode\n  - name: b\n    unless: mode\n";
//! let doc = parse(text, Format::Yaml, Path::new("dev.yaml")).unwrap();
//! let model = build(&doc, Some("mode=true")).unwrap();
//!
//! assert_eq!(model.windows.len(), 1);
//! assert_eq!(model.windows[0].name, "a");
//! assert_eq!(model.skipped[0].name, "b");
//! ```

use crate::condition::{self, MissingParameterPolicy, SkipReason, Verdict};
use crate::config::{Common, WindowSpec};
use crate::document::{self, Format, Mapping, Node};
use crate::error::{PaneweaveError, Result};
use crate::interpolate;
use crate::resolver::{self, Parameters};
use std::path::{Path, PathBuf};
use tracing::info;

/// A window left out by its conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWindow {
    pub name: String,
    pub reason: SkipReason,
}

/// Everything the runner needs, plus what was skipped along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionModel {
    /// Session-wide settings, after substitution.
    pub common: Common,
    /// Effective parameters (document defaults with overrides applied).
    pub parameters: Parameters,
    /// Included windows in document order.
    pub windows: Vec<WindowSpec>,
    /// Excluded windows in document order.
    pub skipped: Vec<SkippedWindow>,
}

/// Stage-by-stage session builder.
#[derive(Debug, Default)]
pub struct Session {
    overrides: Parameters,
    policy: MissingParameterPolicy,
    origin: PathBuf,
    document: Option<Node>,
    model: SessionModel,
}

impl Session {
    /// Create a builder with optional `key=value,...` runtime overrides.
    ///
    /// # Errors
    ///
    /// Malformed overrides are rejected here, before any file is read, with
    /// [`PaneweaveError::InvalidOverrideFormat`].
    pub fn new(runtime_overrides: Option<&str>) -> Result<Self> {
        let overrides = match runtime_overrides.map(str::trim) {
            Some(spec) if !spec.is_empty() => resolver::parse_overrides(spec)?,
            _ => Parameters::new(),
        };

        Ok(Session {
            overrides,
            origin: PathBuf::from("<memory>"),
            ..Session::default()
        })
    }

    /// Choose what happens when `unless` names an undefined parameter.
    pub fn with_policy(mut self, policy: MissingParameterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read, parse and build a session file.
    ///
    /// # Errors
    ///
    /// - [`PaneweaveError::ConfigNotFound`] if the file doesn't exist
    /// - [`PaneweaveError::IoError`] if reading fails
    /// - [`PaneweaveError::LoadFailure`] if parsing fails
    /// - anything the build stages return
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PaneweaveError::ConfigNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        self.origin = path.to_path_buf();
        let doc = document::parse(&text, Format::from_path(path), path)?;
        self.init_from_document(doc)
    }

    /// Parse session text and build it.
    pub fn load_str(&mut self, text: &str, format: Format) -> Result<()> {
        let doc = document::parse(text, format, &self.origin)?;
        self.init_from_document(doc)
    }

    /// Build from an already parsed document.
    pub fn init_from_document(&mut self, doc: Node) -> Result<()> {
        self.document = Some(doc);
        self.parse_common()?;
        self.parse_parameters()?;
        self.parse_windows()
    }

    /// Stage 1: extract the `common` block.
    pub fn parse_common(&mut self) -> Result<()> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PaneweaveError::NotLoaded("parse_common"))?;
        self.model.common = extract_common(doc, &self.origin)?;
        Ok(())
    }

    /// Stages 2 and 3: resolve parameters and substitute them through the
    /// whole document, including the common block and the parameters
    /// themselves. Conditions later see the substituted values, so
    /// `feat: ${base}` is as falsy as an empty `base`.
    pub fn parse_parameters(&mut self) -> Result<()> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PaneweaveError::NotLoaded("parse_parameters"))?;

        let defaults = match doc.get("parameters") {
            None | Some(Node::Null) => Parameters::new(),
            Some(Node::Mapping(map)) => map.clone(),
            Some(other) => {
                return Err(self.load_failure(format!(
                    "'parameters' must be a mapping, found {}",
                    other.kind()
                )));
            }
        };
        resolver::log_parameters("Parameters found in session config", &defaults);
        if !self.overrides.is_empty() {
            resolver::log_parameters("Parameters overwritten at runtime", &self.overrides);
        }

        let merged = resolver::merge(&defaults, &self.overrides);
        let values = interpolate::replacements(&merged);
        let resolved = interpolate::substitute(doc, &values);

        self.model.common = extract_common(&resolved, &self.origin)?;
        self.model.parameters = interpolate::substitute_mapping(&merged, &values);
        self.document = Some(resolved);
        Ok(())
    }

    /// Stage 4: evaluate conditions and decode the included windows.
    pub fn parse_windows(&mut self) -> Result<()> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PaneweaveError::NotLoaded("parse_windows"))?;

        self.model.windows.clear();
        self.model.skipped.clear();

        let entries = match doc.get("windows") {
            None | Some(Node::Null) => {
                info!("No window section found in session config");
                return Ok(());
            }
            Some(Node::Sequence(items)) => items,
            Some(other) => {
                return Err(self.load_failure(format!(
                    "'windows' must be a list, found {}",
                    other.kind()
                )));
            }
        };

        for (index, entry) in entries.iter().enumerate() {
            let fields = entry.as_mapping().ok_or_else(|| PaneweaveError::InvalidWindow {
                window: format!("#{}", index + 1),
                message: format!("window entries must be mappings, found {}", entry.kind()),
            })?;
            let name = fields
                .get("name")
                .and_then(Node::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", index + 1));

            match condition::evaluate(&name, fields, &self.model.parameters, self.policy)? {
                Verdict::Skipped(reason) => {
                    info!("Skipping window {} because {}", name, reason);
                    self.model.skipped.push(SkippedWindow { name, reason });
                }
                Verdict::Included => {
                    let merged = merge_common(&self.model.common, fields);
                    self.model.windows.push(WindowSpec::from_mapping(&merged)?);
                }
            }
        }

        Ok(())
    }

    /// Included windows built so far.
    pub fn windows(&self) -> &[WindowSpec] {
        &self.model.windows
    }

    pub fn common(&self) -> &Common {
        &self.model.common
    }

    pub fn parameters(&self) -> &Parameters {
        &self.model.parameters
    }

    /// Finish building and hand over the model.
    pub fn into_model(self) -> SessionModel {
        self.model
    }

    fn load_failure(&self, message: String) -> PaneweaveError {
        PaneweaveError::LoadFailure {
            path: self.origin.clone(),
            message,
        }
    }
}

/// Run the whole pipeline over a parsed document.
///
/// The document is not modified; substitution produces a new tree.
pub fn build(doc: &Node, runtime_overrides: Option<&str>) -> Result<SessionModel> {
    build_with_policy(doc, runtime_overrides, MissingParameterPolicy::default())
}

/// [`build`] with an explicit policy for `unless` on undefined parameters.
pub fn build_with_policy(
    doc: &Node,
    runtime_overrides: Option<&str>,
    policy: MissingParameterPolicy,
) -> Result<SessionModel> {
    let mut session = Session::new(runtime_overrides)?.with_policy(policy);
    session.init_from_document(doc.clone())?;
    Ok(session.into_model())
}

fn extract_common(doc: &Node, origin: &Path) -> Result<Common> {
    match doc.get("common") {
        None | Some(Node::Null) => Ok(Common::default()),
        Some(Node::Mapping(map)) => Common::from_mapping(map.clone(), origin),
        Some(other) => Err(PaneweaveError::LoadFailure {
            path: origin.to_path_buf(),
            message: format!("'common' must be a mapping, found {}", other.kind()),
        }),
    }
}

/// Common defaults first, then the window's own fields on top.
fn merge_common(common: &Common, fields: &Mapping) -> Mapping {
    let mut merged = Mapping::new();
    if let Some(before) = common.before_commands() {
        merged.insert("before_commands".to_string(), before.clone());
    }
    for (key, value) in fields {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
