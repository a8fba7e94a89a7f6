//! Deep merge of a base document with override documents.
//!
//! Used to layer local or temporary settings over a shared configuration:
//!
//! ```
//! use compose_addons::{merge_config, parse_document};
//!
//! let base = parse_document(b"web:\n  build: .\n  links: [db]\ndb:\n  build: database/\n")?;
//! let overrides = parse_document(b"web:\n  volumes: ['.:/code']\ndb:\n  image: db:debug\n")?;
//! let merged = merge_config(base, overrides);
//! assert_eq!(merged["web"]["links"][0], "db");
//! assert_eq!(merged["web"]["volumes"][0], ".:/code");
//! assert!(merged["db"].get("build").is_none());
//! # Ok::<(), compose_addons::DocumentError>(())
//! ```

use serde_json::Value;

use crate::ConfigTree;
use crate::tree::as_tree_mut;

/// Keys of which a service may define only one.
const EXCLUSIVE_KEYS: [(&str, &str); 2] = [("build", "image"), ("image", "build")];

/// Recursively merge `layer` over `base`.
///
/// Mappings present on both sides merge key by key; any other value in
/// `layer`, including `null`, replaces the base value.
#[must_use]
pub fn deep_merge(mut base: ConfigTree, layer: ConfigTree) -> ConfigTree {
    for (key, value) in layer {
        let merged = match (base.remove(&key), value) {
            (Some(Value::Object(lower)), Value::Object(upper)) => {
                Value::Object(deep_merge(lower, upper))
            }
            (_, other) => other,
        };
        base.insert(key, merged);
    }
    base
}

/// Drop `build` from base services the override gives an `image`, and the
/// reverse, so a service never ends up with both.
fn drop_replaced_sources(base: &mut ConfigTree, layer: &ConfigTree) {
    for (name, service) in base.iter_mut() {
        let Some(overriding) = layer.get(name).and_then(Value::as_object) else {
            continue;
        };
        let Some(service) = as_tree_mut(service) else {
            continue;
        };
        for (present, incoming) in EXCLUSIVE_KEYS {
            if service.contains_key(present) && overriding.contains_key(incoming) {
                service.remove(present);
            }
        }
    }
}

/// Merge one override document over `base`.
///
/// For every service the override gives an `image`, a base `build` is
/// dropped (and vice versa); everything else is deep merged.
#[must_use]
pub fn merge_config(mut base: ConfigTree, layer: ConfigTree) -> ConfigTree {
    drop_replaced_sources(&mut base, &layer);
    deep_merge(base, layer)
}

/// Merge each of `overrides` over `base`, in order.
#[must_use]
pub fn merge_documents<I>(base: ConfigTree, overrides: I) -> ConfigTree
where
    I: IntoIterator<Item = ConfigTree>,
{
    overrides.into_iter().fold(base, merge_config)
}
