//! The in-memory document model shared by every transformation.

use serde_json::{Map, Value};

/// A configuration document: string keys mapped to nested values.
///
/// Keys are kept in sorted order so serialized output is deterministic.
pub type ConfigTree = Map<String, Value>;

/// Key holding the list of documents a document includes.
pub const INCLUDE_KEY: &str = "include";

/// Key holding the namespace an includable document was prefixed with.
pub const NAMESPACE_KEY: &str = "namespace";

/// Overlay the top-level keys of `layer` onto `base`.
///
/// This is a flat union: nested mappings in `layer` replace those in `base`
/// wholesale rather than being merged key by key.
///
/// # Examples
///
/// ```
/// use compose_addons::{ConfigTree, merge_flat};
/// use serde_json::json;
///
/// let mut base = ConfigTree::new();
/// base.insert("a".into(), json!({"image": "a"}));
/// let mut layer = ConfigTree::new();
/// layer.insert("a".into(), json!({"build": "."}));
/// merge_flat(&mut base, layer);
/// assert_eq!(base["a"], json!({"build": "."}));
/// ```
pub fn merge_flat(base: &mut ConfigTree, layer: ConfigTree) {
    base.extend(layer);
}

/// Borrow `value` as a tree when it is a mapping.
pub(crate) fn as_tree_mut(value: &mut Value) -> Option<&mut ConfigTree> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> ConfigTree {
        match value {
            Value::Object(map) => map,
            other => panic!("expected mapping, got {other}"),
        }
    }

    #[test]
    fn merge_flat_is_a_union_of_top_level_keys() {
        let mut base = tree(json!({"a": 1}));
        for layer in [json!({"b": 2}), json!({"c": 3, "d": 4})] {
            merge_flat(&mut base, tree(layer));
        }
        assert_eq!(Value::Object(base), json!({"a": 1, "b": 2, "c": 3, "d": 4}));
    }

    #[test]
    fn merge_flat_does_not_recurse() {
        let mut base = tree(json!({"web": {"image": "a", "links": ["db"]}}));
        merge_flat(&mut base, tree(json!({"web": {"image": "b"}})));
        assert_eq!(base["web"], json!({"image": "b"}));
    }
}
