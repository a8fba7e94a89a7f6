//! Namespacing of service names so a document can be included by others.
//!
//! Every service is renamed to `<namespace>.<service>`, references between
//! services of the same document (`links`, `volumes_from`, and the
//! `container:` form of `net` / `network_mode`) are rewritten to match, and a
//! `namespace` key recording the prefix is added. References to services the
//! document does not define are left alone.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::ConfigTree;
use crate::tree::{NAMESPACE_KEY, as_tree_mut};

/// Fields holding a `container:<service>` network reference.
const NETWORK_FIELDS: [&str; 2] = ["net", "network_mode"];

/// Split `field` on `:` into exactly `parts` pieces.
///
/// The last piece keeps any remaining separators; missing pieces are `None`.
///
/// # Examples
///
/// ```
/// use compose_addons::split_field;
///
/// assert_eq!(split_field("db:alias", 2), [Some("db"), Some("alias")]);
/// assert_eq!(split_field("db", 2), [Some("db"), None]);
/// ```
#[must_use]
pub fn split_field(field: &str, parts: usize) -> Vec<Option<&str>> {
    let mut pieces: Vec<Option<&str>> = field.splitn(parts, ':').map(Some).collect();
    pieces.resize(parts, None);
    pieces
}

struct Namespacer<'a> {
    prefix: String,
    services: &'a BTreeSet<String>,
}

impl Namespacer<'_> {
    fn owns(&self, name: &str) -> bool {
        self.services.contains(name)
    }

    fn prefixed(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    /// `service[:alias]` becomes `ns.service:alias`, the alias defaulting to
    /// the original name so existing lookups keep resolving.
    fn link(&self, link: &str) -> Option<String> {
        let (service, alias) = link.split_once(':').unwrap_or((link, link));
        self.owns(service)
            .then(|| format!("{}:{alias}", self.prefixed(service)))
    }

    fn volume_source(&self, source: &str) -> Option<String> {
        self.owns(source).then(|| self.prefixed(source))
    }

    fn network(&self, value: &str) -> Option<String> {
        match split_field(value, 2).as_slice() {
            [Some("container"), Some(name)] if self.owns(name) => {
                Some(format!("container:{}", self.prefixed(name)))
            }
            _ => None,
        }
    }

    fn rewrite_service(&self, service: &mut ConfigTree) {
        if let Some(links) = service.get_mut("links") {
            rewrite_each(links, |link| self.link(link));
        }
        if let Some(sources) = service.get_mut("volumes_from") {
            rewrite_each(sources, |source| self.volume_source(source));
        }
        for field in NETWORK_FIELDS {
            if let Some(value) = service.get_mut(field) {
                rewrite_string(value, |network| self.network(network));
            }
        }
    }
}

fn rewrite_string(value: &mut Value, rewrite: impl Fn(&str) -> Option<String>) {
    if let Some(rewritten) = value.as_str().and_then(&rewrite) {
        *value = Value::String(rewritten);
    }
}

fn rewrite_each(value: &mut Value, rewrite: impl Fn(&str) -> Option<String>) {
    if let Value::Array(entries) = value {
        for entry in entries {
            rewrite_string(entry, &rewrite);
        }
    }
}

/// Prefix every service in `tree` with `namespace` and rewrite internal
/// references to match.
///
/// # Examples
///
/// ```
/// use compose_addons::{add_namespace, parse_document};
/// use serde_json::json;
///
/// let tree = parse_document(b"web:\n  links: [db]\ndb: {}\n")?;
/// let namespaced = add_namespace(tree, "svc");
/// assert_eq!(namespaced["namespace"], "svc");
/// assert_eq!(namespaced["svc.web"]["links"], json!(["svc.db:db"]));
/// # Ok::<(), compose_addons::DocumentError>(())
/// ```
#[must_use]
pub fn add_namespace(tree: ConfigTree, namespace: &str) -> ConfigTree {
    let services: BTreeSet<String> = tree.keys().cloned().collect();
    let namespacer = Namespacer {
        prefix: format!("{namespace}."),
        services: &services,
    };
    let mut namespaced: ConfigTree = tree
        .into_iter()
        .map(|(name, mut service)| {
            if let Some(body) = as_tree_mut(&mut service) {
                namespacer.rewrite_service(body);
            }
            (namespacer.prefixed(&name), service)
        })
        .collect();
    namespaced.insert(NAMESPACE_KEY.to_owned(), Value::String(namespace.to_owned()));
    namespaced
}
