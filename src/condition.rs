//! Window inclusion conditions.
//!
//! A window can be gated on a parameter:
//!
//! ```yaml
//! windows:
//!   - name: monitoring
//!     if: with_monitoring      # only when the parameter is truthy
//!   - name: local-db
//!     unless: remote_db        # only when the parameter is falsy
//! ```
//!
//! `if` is checked before `unless` and both have to pass. A parameter that
//! does not exist never satisfies `if`; for `unless` the behaviour is chosen
//! by [`MissingParameterPolicy`].

use crate::document::{Mapping, Node};
use crate::error::{PaneweaveError, Result};
use crate::resolver::Parameters;
use std::fmt;

/// Which condition key excluded a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    If,
    Unless,
}

impl Gate {
    fn key(self) -> &'static str {
        match self {
            Gate::If => "if",
            Gate::Unless => "unless",
        }
    }
}

/// Why a window was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The condition names a parameter that is not defined.
    MissingParameter { gate: Gate, parameter: String },
    /// `if` parameter is falsy.
    SwitchedOff { parameter: String },
    /// `unless` parameter is truthy.
    SwitchedOn { parameter: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingParameter { gate, parameter } => write!(
                f,
                "parameter {} of its {} condition was not found",
                parameter,
                gate.key()
            ),
            SkipReason::SwitchedOff { parameter } => {
                write!(f, "parameter {} is switched off globally", parameter)
            }
            SkipReason::SwitchedOn { parameter } => {
                write!(f, "parameter {} is switched on globally", parameter)
            }
        }
    }
}

/// Outcome of evaluating a window's conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Included,
    Skipped(SkipReason),
}

impl Verdict {
    pub fn is_included(&self) -> bool {
        matches!(self, Verdict::Included)
    }
}

/// What to do when `unless` names an undefined parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingParameterPolicy {
    /// Skip the window, same as a missing `if` parameter.
    #[default]
    Exclude,
    /// Abort with [`PaneweaveError::ConditionLookupFailure`].
    Fail,
}

/// Evaluate the `if` / `unless` gates of one window entry.
///
/// `window` is only used for error messages.
///
/// # Errors
///
/// - [`PaneweaveError::InvalidWindow`] if a condition value is not a string
/// - [`PaneweaveError::ConditionLookupFailure`] for a missing `unless`
///   parameter under [`MissingParameterPolicy::Fail`]
pub fn evaluate(
    window: &str,
    entry: &Mapping,
    params: &Parameters,
    policy: MissingParameterPolicy,
) -> Result<Verdict> {
    if let Some(parameter) = condition(window, entry, Gate::If)? {
        match params.get(parameter) {
            None => {
                return Ok(Verdict::Skipped(SkipReason::MissingParameter {
                    gate: Gate::If,
                    parameter: parameter.to_string(),
                }));
            }
            Some(value) if !value.is_truthy() => {
                return Ok(Verdict::Skipped(SkipReason::SwitchedOff {
                    parameter: parameter.to_string(),
                }));
            }
            Some(_) => {}
        }
    }

    if let Some(parameter) = condition(window, entry, Gate::Unless)? {
        match params.get(parameter) {
            None => match policy {
                MissingParameterPolicy::Exclude => {
                    return Ok(Verdict::Skipped(SkipReason::MissingParameter {
                        gate: Gate::Unless,
                        parameter: parameter.to_string(),
                    }));
                }
                MissingParameterPolicy::Fail => {
                    return Err(PaneweaveError::ConditionLookupFailure {
                        window: window.to_string(),
                        parameter: parameter.to_string(),
                    });
                }
            },
            Some(value) if value.is_truthy() => {
                return Ok(Verdict::Skipped(SkipReason::SwitchedOn {
                    parameter: parameter.to_string(),
                }));
            }
            Some(_) => {}
        }
    }

    Ok(Verdict::Included)
}

/// Shorthand for [`evaluate`] with the default policy.
pub fn included(entry: &Mapping, params: &Parameters) -> Result<bool> {
    let name = entry.get("name").and_then(Node::as_str).unwrap_or("<unnamed>");
    evaluate(name, entry, params, MissingParameterPolicy::default()).map(|v| v.is_included())
}

fn condition<'a>(window: &str, entry: &'a Mapping, gate: Gate) -> Result<Option<&'a str>> {
    match entry.get(gate.key()) {
        None => Ok(None),
        Some(Node::String(parameter)) => Ok(Some(parameter.as_str())),
        Some(other) => Err(PaneweaveError::InvalidWindow {
            window: window.to_string(),
            message: format!(
                "'{}' must name a parameter, found {}",
                gate.key(),
                other.kind()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pairs: &[(&str, &str)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Node::from(*v)))
            .collect()
    }

    fn params(pairs: &[(&str, Node)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn eval(e: &Mapping, p: &Parameters) -> Verdict {
        evaluate("w", e, p, MissingParameterPolicy::Exclude).unwrap()
    }

    #[test]
    fn test_no_conditions_included() {
        assert!(included(&entry(&[("name", "w")]), &Parameters::new()).unwrap());
    }

    #[test]
    fn test_if_missing_parameter() {
        let verdict = eval(&entry(&[("if", "feat")]), &Parameters::new());
        assert_eq!(
            verdict,
            Verdict::Skipped(SkipReason::MissingParameter {
                gate: Gate::If,
                parameter: "feat".to_string()
            })
        );
    }

    #[test]
    fn test_if_falsy_and_truthy() {
        let e = entry(&[("if", "feat")]);
        assert!(!eval(&e, &params(&[("feat", Node::Bool(false))])).is_included());
        assert!(!eval(&e, &params(&[("feat", Node::from(""))])).is_included());
        assert!(!eval(&e, &params(&[("feat", Node::Integer(0))])).is_included());
        assert!(eval(&e, &params(&[("feat", Node::Bool(true))])).is_included());
        assert!(eval(&e, &params(&[("feat", Node::from("yes please"))])).is_included());
    }

    #[test]
    fn test_unless_truthy_excludes() {
        let e = entry(&[("unless", "remote")]);
        assert_eq!(
            eval(&e, &params(&[("remote", Node::Bool(true))])),
            Verdict::Skipped(SkipReason::SwitchedOn {
                parameter: "remote".to_string()
            })
        );
        assert!(eval(&e, &params(&[("remote", Node::Bool(false))])).is_included());
    }

    #[test]
    fn test_unless_missing_excluded_by_default() {
        let verdict = eval(&entry(&[("unless", "remote")]), &Parameters::new());
        assert!(matches!(
            verdict,
            Verdict::Skipped(SkipReason::MissingParameter {
                gate: Gate::Unless,
                ..
            })
        ));
    }

    #[test]
    fn test_unless_missing_fails_when_strict() {
        let err = evaluate(
            "db",
            &entry(&[("unless", "remote")]),
            &Parameters::new(),
            MissingParameterPolicy::Fail,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PaneweaveError::ConditionLookupFailure { window, parameter }
                if window == "db" && parameter == "remote"
        ));
    }

    #[test]
    fn test_if_checked_before_unless() {
        // `if` fails first, so the strict policy never sees the missing `unless`.
        let e = entry(&[("if", "a"), ("unless", "missing")]);
        let verdict = evaluate(
            "w",
            &e,
            &params(&[("a", Node::Bool(false))]),
            MissingParameterPolicy::Fail,
        )
        .unwrap();
        assert_eq!(
            verdict,
            Verdict::Skipped(SkipReason::SwitchedOff {
                parameter: "a".to_string()
            })
        );
    }

    #[test]
    fn test_both_gates_must_pass() {
        let e = entry(&[("if", "a"), ("unless", "b")]);
        let on = Node::Bool(true);
        let off = Node::Bool(false);
        assert!(eval(&e, &params(&[("a", on.clone()), ("b", off.clone())])).is_included());
        assert!(!eval(&e, &params(&[("a", on.clone()), ("b", on)])).is_included());
    }

    #[test]
    fn test_non_string_condition_rejected() {
        let mut e = Mapping::new();
        e.insert("if".to_string(), Node::Integer(3));
        let err = evaluate("w", &e, &Parameters::new(), MissingParameterPolicy::Exclude)
            .unwrap_err();
        assert!(matches!(err, PaneweaveError::InvalidWindow { .. }));
    }

    #[test]
    fn test_skip_reason_messages() {
        let reason = SkipReason::SwitchedOff {
            parameter: "feat".to_string(),
        };
        assert_eq!(reason.to_string(), "parameter feat is switched off globally");
    }
}
