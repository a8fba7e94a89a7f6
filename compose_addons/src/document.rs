//! YAML codec for [`ConfigTree`] documents.

use std::io::Write;

use serde_json::Value;
use thiserror::Error;

use crate::ConfigTree;

/// Errors raised while decoding or encoding a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    /// The bytes are not valid YAML.
    #[error("failed to parse document: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// A number has no finite value (`.nan`, `.inf`), which the document
    /// model cannot represent.
    #[error("document contains the non-finite number {value} at {path}")]
    NonFiniteNumber {
        /// The number as parsed.
        value: f64,
        /// Dotted path of keys and indices leading to the number.
        path: String,
    },

    /// The document parsed, but its root is not a mapping.
    #[error("document root must be a mapping, but found {found}")]
    NotAMapping {
        /// Kind of value found at the root.
        found: &'static str,
    },

    /// A parsed value has no equivalent in the document model.
    #[error("document cannot be represented: {0}")]
    Model(#[source] serde_json::Error),

    /// The serialized document could not be written out.
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Reject `.nan` and `.inf` anywhere in `value`.
fn ensure_finite(value: &serde_yaml::Value, path: &str) -> Result<(), DocumentError> {
    match value {
        serde_yaml::Value::Number(number) => match number.as_f64() {
            Some(float) if !float.is_finite() => Err(DocumentError::NonFiniteNumber {
                value: float,
                path: path.to_owned(),
            }),
            _ => Ok(()),
        },
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(index, item)| ensure_finite(item, &child_path(path, &index.to_string()))),
        serde_yaml::Value::Mapping(entries) => entries.iter().try_for_each(|(key, item)| {
            let key = key.as_str().map_or_else(|| format!("{key:?}"), str::to_owned);
            ensure_finite(item, &child_path(path, &key))
        }),
        serde_yaml::Value::Tagged(tagged) => ensure_finite(&tagged.value, path),
        _ => Ok(()),
    }
}

fn child_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_owned()
    } else {
        format!("{parent}.{child}")
    }
}

/// Parse a YAML document into a [`ConfigTree`].
///
/// An empty document (or one holding only `null`) parses to an empty tree.
/// Merge keys (`<<: *anchor`) are expanded, with keys written beside the
/// merge key taking precedence over merged ones.
///
/// # Errors
///
/// Returns a [`DocumentError`] if the bytes are not YAML, a merge key is
/// malformed, a number is `.nan` or infinite, or the root is not a mapping.
///
/// # Examples
///
/// ```
/// use compose_addons::parse_document;
///
/// let tree = parse_document(b"web:\n  image: example/web\n")?;
/// assert_eq!(tree["web"]["image"], "example/web");
/// # Ok::<(), compose_addons::DocumentError>(())
/// ```
pub fn parse_document(bytes: &[u8]) -> Result<ConfigTree, DocumentError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ConfigTree::new());
    }
    let mut parsed: serde_yaml::Value = serde_yaml::from_slice(bytes)?;
    parsed.apply_merge()?;
    ensure_finite(&parsed, "")?;
    match serde_json::to_value(parsed).map_err(DocumentError::Model)? {
        Value::Object(tree) => Ok(tree),
        Value::Null => Ok(ConfigTree::new()),
        other => Err(DocumentError::NotAMapping {
            found: kind_of(&other),
        }),
    }
}

/// Serialize `tree` as a block-style YAML document.
///
/// # Errors
///
/// Returns a [`DocumentError`] if serialization fails.
pub fn to_document_string(tree: &ConfigTree) -> Result<String, DocumentError> {
    Ok(serde_yaml::to_string(tree)?)
}

/// Serialize `tree` into `writer`.
///
/// # Errors
///
/// Returns a [`DocumentError`] if serialization or the write fails.
pub fn write_document<W: Write>(tree: &ConfigTree, mut writer: W) -> Result<(), DocumentError> {
    let rendered = to_document_string(tree)?;
    writer.write_all(rendered.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn parses_nested_services() {
        let tree = parse_document(
            b"web:\n  image: example/web:latest\n  links: [db]\ndb:\n  ports: [5432]\n",
        )
        .expect("parse");
        assert_eq!(
            Value::Object(tree),
            json!({
                "web": {"image": "example/web:latest", "links": ["db"]},
                "db": {"ports": [5432]},
            })
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("  \n\n")]
    #[case::null("~\n")]
    fn empty_documents_are_empty_trees(#[case] input: &str) {
        let tree = parse_document(input.as_bytes()).expect("parse");
        assert!(tree.is_empty());
    }

    #[rstest]
    #[case::scalar("just a string", "string")]
    #[case::sequence("- a\n- b\n", "sequence")]
    fn non_mapping_roots_are_rejected(#[case] input: &str, #[case] found: &str) {
        let err = parse_document(input.as_bytes()).expect_err("must fail");
        assert!(err.to_string().contains(found), "{err}");
    }

    #[test]
    fn malformed_yaml_is_a_syntax_error() {
        let err = parse_document(b"web: [unclosed").expect_err("must fail");
        assert!(matches!(err, DocumentError::Syntax(_)));
    }

    #[test]
    fn merge_keys_are_expanded() {
        let tree = parse_document(
            b"base: &base\n  image: x\n  restart: always\nweb:\n  <<: *base\n  image: y\n",
        )
        .expect("parse");
        assert_eq!(tree["web"], json!({"image": "y", "restart": "always"}));
    }

    #[test]
    fn merged_build_keys_meet_build_image_exclusivity() {
        let base = parse_document(b"defaults: &defaults\n  build: .\nweb:\n  <<: *defaults\n")
            .expect("parse");
        let layer = parse_document(b"web:\n  image: example/web\n").expect("parse");
        let merged = crate::merge_config(base, layer);
        assert_eq!(merged["web"], json!({"image": "example/web"}));
    }

    #[rstest]
    #[case::nan("ratio: .nan\n", "ratio")]
    #[case::infinity("web:\n  limits: [1, .inf]\n", "web.limits.1")]
    #[case::negative_infinity("floor: -.inf\n", "floor")]
    fn non_finite_numbers_are_rejected(#[case] input: &str, #[case] path: &str) {
        let err = parse_document(input.as_bytes()).expect_err("must fail");
        assert!(
            matches!(err, DocumentError::NonFiniteNumber { path: ref found, .. } if found == path),
            "{err}"
        );
    }

    #[test]
    fn scalars_survive_a_write_and_read() {
        let source = json!({
            "svc": {"enabled": true, "replicas": 3, "ratio": 0.5, "note": null, "name": "x"}
        });
        let Value::Object(tree) = source.clone() else {
            panic!("object literal");
        };
        let mut out = Vec::new();
        write_document(&tree, &mut out).expect("write");
        let reparsed = parse_document(&out).expect("reparse");
        assert_eq!(Value::Object(reparsed), source);
    }
}
