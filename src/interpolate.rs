//! Placeholder substitution.
//!
//! Every string in a session document may reference parameters as `${name}`.
//! Substitution is a single left-to-right pass: text inserted for one
//! placeholder is never scanned again, so parameters that mention other
//! placeholders cannot chain or recurse. Unknown names are left untouched.
//!
//! # Example
//!
//! ```
//! use paneweave::interpolate::interpolate;
//! use std::collections::BTreeMap;
//!
//! let mut values = BTreeMap::new();
//! values.insert("dir".to_string(), "~/src/app".to_string());
//!
//! assert_eq!(interpolate("cd ${dir} && ${editor}", &values), "cd ~/src/app && ${editor}");
//! ```

use crate::document::{Mapping, Node};
use crate::resolver::Parameters;
use std::collections::BTreeMap;

/// Parameter values rendered as the text that replaces their placeholder.
pub type Replacements = BTreeMap<String, String>;

/// Render every parameter to its replacement text.
pub fn replacements(params: &Parameters) -> Replacements {
    params
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}

/// Replace every `${name}` whose name is in `values`.
pub fn interpolate(text: &str, values: &Replacements) -> String {
    if values.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            rest = &rest[start..];
            break;
        };

        match values.get(&after[..end]) {
            Some(value) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                // Keep the opener and rescan right after it, so `${${a}}`
                // still resolves the inner placeholder.
                out.push_str("${");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Rewrite a document tree, substituting placeholders in every string scalar.
///
/// Mapping keys are never rewritten, sequence order is preserved, and
/// non-string scalars are copied as they are.
pub fn substitute(node: &Node, values: &Replacements) -> Node {
    match node {
        Node::String(s) => Node::String(interpolate(s, values)),
        Node::Sequence(items) => {
            Node::Sequence(items.iter().map(|item| substitute(item, values)).collect())
        }
        Node::Mapping(map) => Node::Mapping(substitute_mapping(map, values)),
        scalar => scalar.clone(),
    }
}

/// [`substitute`] for a bare mapping, such as a parameter set.
pub fn substitute_mapping(map: &Mapping, values: &Replacements) -> Mapping {
    map.iter()
        .map(|(key, value)| (key.clone(), substitute(value, values)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Format, parse};
    use std::path::Path;

    fn values(pairs: &[(&str, &str)]) -> Replacements {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_interpolate_all_occurrences() {
        let v = values(&[("host", "db1")]);
        assert_eq!(
            interpolate("ssh ${host} && ping ${host}", &v),
            "ssh db1 && ping db1"
        );
    }

    #[test]
    fn test_interpolate_does_not_chain() {
        let v = values(&[("a", "${b}"), ("b", "x")]);
        assert_eq!(interpolate("${a}", &v), "${b}");
    }

    #[test]
    fn test_interpolate_unknown_passthrough() {
        let v = values(&[("other", "1")]);
        assert_eq!(interpolate("${missing}", &v), "${missing}");
    }

    #[test]
    fn test_interpolate_unterminated_and_nested() {
        let v = values(&[("a", "x")]);
        assert_eq!(interpolate("echo ${a", &v), "echo ${a");
        assert_eq!(interpolate("${${a}}", &v), "${x}");
        assert_eq!(interpolate("$a {a} $${a}", &v), "$a {a} $x");
    }

    #[test]
    fn test_substitute_empty_params_is_identity() {
        let text = "common:\n  before_commands: [\"cd ${dir}\"]\nwindows:\n  - name: w\n    delay: 2\n";
        let doc = parse(text, Format::Yaml, Path::new("<test>")).unwrap();
        assert_eq!(substitute(&doc, &Replacements::new()), doc);
    }

    #[test]
    fn test_substitute_whole_tree() {
        let text = "common:\n  default_window: ${main}\nwindows:\n  - name: ${main}\n    ${main}: keep\n    delay: 1\n    commands:\n      - cd ${dir}\n      - ls\n";
        let doc = parse(text, Format::Yaml, Path::new("<test>")).unwrap();
        let out = substitute(&doc, &values(&[("main", "editor"), ("dir", "/tmp")]));

        assert_eq!(
            out.get("common").and_then(|c| c.get("default_window")),
            Some(&Node::from("editor"))
        );
        let window = &out.get("windows").and_then(Node::as_sequence).unwrap()[0];
        assert_eq!(window.get("name"), Some(&Node::from("editor")));
        assert_eq!(window.get("${main}"), Some(&Node::from("keep")));
        assert_eq!(window.get("delay"), Some(&Node::Integer(1)));
        assert_eq!(
            window.get("commands"),
            Some(&Node::Sequence(vec![Node::from("cd /tmp"), Node::from("ls")]))
        );
    }

    #[test]
    fn test_replacements_render_values() {
        let mut params = Parameters::new();
        params.insert("on".to_string(), Node::Bool(true));
        params.insert("n".to_string(), Node::Integer(2));
        let r = replacements(&params);
        assert_eq!(r["on"], "true");
        assert_eq!(r["n"], "2");
    }
}
