//! Parameter resolution.
//!
//! A session file declares default parameters in its `parameters` block.
//! Callers can override any of them (or add new ones) at launch time with a
//! comma-separated list of `key=value` pairs:
//!
//! ```text
//! paneweave dev --overwrite mode=prod,replicas=3
//! ```
//!
//! Overrides always win. Override values are typed: `true`/`false` (and
//! `yes`/`no`/`on`/`off`) become booleans and numeric text becomes a number,
//! so `feature=false` really switches a feature off.

use crate::document::Node;
use crate::error::{PaneweaveError, Result};
use std::collections::BTreeMap;
use tracing::info;

/// Resolved parameter set: exactly one value per name.
pub type Parameters = BTreeMap<String, Node>;

/// Parse an override string into a parameter set.
///
/// Splitting is exact: there is no quoting, so values cannot contain `,`
/// or `=`.
///
/// # Errors
///
/// Returns [`PaneweaveError::InvalidOverrideFormat`] for any entry that is not
/// exactly one `key=value` pair, or whose key is empty.
///
/// # Examples
///
/// ```
/// use paneweave::document::Node;
/// use paneweave::resolver::parse_overrides;
///
/// let params = parse_overrides("mode=prod,verbose=true").unwrap();
/// assert_eq!(params["mode"], Node::from("prod"));
/// assert_eq!(params["verbose"], Node::Bool(true));
///
/// assert!(parse_overrides("badtoken").is_err());
/// ```
pub fn parse_overrides(spec: &str) -> Result<Parameters> {
    let mut overrides = Parameters::new();

    for entry in spec.split(',') {
        let parts: Vec<&str> = entry.split('=').collect();
        if parts.len() != 2 {
            return Err(PaneweaveError::InvalidOverrideFormat(entry.to_string()));
        }
        let (key, value) = (parts[0].trim(), parts[1].trim());
        if key.is_empty() {
            return Err(PaneweaveError::InvalidOverrideFormat(entry.to_string()));
        }
        overrides.insert(key.to_string(), coerce(value));
    }

    Ok(overrides)
}

/// Type a raw override value.
///
/// # Examples
///
/// ```
/// use paneweave::document::Node;
/// use paneweave::resolver::coerce;
///
/// assert_eq!(coerce("Off"), Node::Bool(false));
/// assert_eq!(coerce("8080"), Node::Integer(8080));
/// assert_eq!(coerce("0.5"), Node::Float(0.5));
/// assert_eq!(coerce("~/src"), Node::from("~/src"));
/// ```
pub fn coerce(raw: &str) -> Node {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => return Node::Bool(true),
        "false" | "no" | "off" => return Node::Bool(false),
        _ => {}
    }

    if let Ok(i) = raw.parse::<i64>() {
        return Node::Integer(i);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => Node::Float(f),
        _ => Node::String(raw.to_string()),
    }
}

/// Merge an already parsed override set over the defaults.
///
/// Keys only present in `overrides` are added.
pub fn merge(defaults: &Parameters, overrides: &Parameters) -> Parameters {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Resolve the effective parameter set from document defaults and an
/// optional override string.
///
/// An absent or blank override string leaves the defaults unchanged.
///
/// # Errors
///
/// Propagates [`PaneweaveError::InvalidOverrideFormat`] from [`parse_overrides`].
pub fn resolve(defaults: &Parameters, override_spec: Option<&str>) -> Result<Parameters> {
    match override_spec.map(str::trim) {
        Some(spec) if !spec.is_empty() => {
            let overrides = parse_overrides(spec)?;
            log_parameters("Parameters overwritten at runtime", &overrides);
            Ok(merge(defaults, &overrides))
        }
        _ => Ok(defaults.clone()),
    }
}

/// Log a parameter listing, one line per entry.
pub(crate) fn log_parameters(title: &str, params: &Parameters) {
    info!("{}:", title);
    for (key, value) in params {
        info!(" - {} = {}", key, value);
    }
}
