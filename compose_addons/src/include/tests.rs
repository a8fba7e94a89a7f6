//! Tests for include resolution against in-memory documents.

use super::*;
use crate::document::parse_document;
use crate::error::fetch_error;
use rstest::rstest;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory documents keyed by normalized reference, recording every fetch.
struct Documents {
    sources: RefCell<HashMap<String, String>>,
    fetched: RefCell<Vec<String>>,
}

impl Documents {
    fn new(sources: &[(&str, &str)]) -> Self {
        let sources = sources
            .iter()
            .map(|(raw, yaml)| {
                let key = Reference::parse(raw).expect("reference").to_string();
                (key, (*yaml).to_owned())
            })
            .collect();
        Self {
            sources: RefCell::new(sources),
            fetched: RefCell::new(Vec::new()),
        }
    }

    fn fetch(&self, reference: &Reference) -> ComposeResult<ConfigTree> {
        let key = reference.to_string();
        self.fetched.borrow_mut().push(key.clone());
        let yaml = self
            .sources
            .borrow()
            .get(&key)
            .cloned()
            .ok_or_else(|| fetch_error(reference, "no such document"))?;
        parse_document(yaml.as_bytes()).map_err(|err| fetch_error(reference, err))
    }

    fn replace(&self, raw: &str, yaml: &str) {
        let key = Reference::parse(raw).expect("reference").to_string();
        self.sources.borrow_mut().insert(key, yaml.to_owned());
    }

    fn resolve(&self, root: &str) -> ComposeResult<ConfigTree> {
        let root = parse_document(root.as_bytes()).expect("root document");
        IncludeResolver::new(|reference: &Reference| self.fetch(reference)).resolve(root)
    }

    fn fetch_count(&self, raw: &str) -> usize {
        let key = Reference::parse(raw).expect("reference").to_string();
        self.fetched.borrow().iter().filter(|k| **k == key).count()
    }
}

fn value(tree: ConfigTree) -> Value {
    Value::Object(tree)
}

#[test]
fn documents_without_includes_pass_through() {
    let docs = Documents::new(&[]);
    let resolved = docs.resolve("web:\n  image: foo\n").expect("resolve");
    assert_eq!(value(resolved), json!({"web": {"image": "foo"}}));
    assert!(docs.fetched.borrow().is_empty());
}

#[test]
fn later_includes_win_over_earlier_ones() {
    let docs = Documents::new(&[
        ("a.yml", "namespace: a\nk: from-a\nonly_a: 1\n"),
        ("b.yml", "namespace: b\nk: from-b\nonly_b: 2\n"),
    ]);
    let resolved = docs.resolve("include: [a.yml, b.yml]\n").expect("resolve");
    assert_eq!(
        value(resolved),
        json!({"k": "from-b", "only_a": 1, "only_b": 2})
    );
}

#[test]
fn root_keys_win_over_includes() {
    let docs = Documents::new(&[
        ("a.yml", "namespace: a\nk: from-a\n"),
        ("b.yml", "namespace: b\nk: from-b\n"),
    ]);
    let resolved = docs
        .resolve("include: [a.yml, b.yml]\nk: from-root\n")
        .expect("resolve");
    assert_eq!(value(resolved), json!({"k": "from-root"}));
}

#[test]
fn root_keys_win_across_transitive_levels() {
    let docs = Documents::new(&[
        ("a.yml", "namespace: a\ninclude: [c.yml]\nk: from-a\n"),
        ("c.yml", "namespace: c\nk: from-c\ndeep: from-c\n"),
    ]);
    let resolved = docs
        .resolve("include: [a.yml]\nk: from-root\n")
        .expect("resolve");
    assert_eq!(value(resolved), json!({"k": "from-root", "deep": "from-c"}));
}

#[test]
fn nested_includes_overwrite_the_including_document() {
    let docs = Documents::new(&[
        ("a.yml", "namespace: a\ninclude: [c.yml]\nk: from-a\nonly_a: 1\n"),
        ("c.yml", "namespace: c\nk: from-c\n"),
    ]);
    let resolved = docs.resolve("include: [a.yml]\n").expect("resolve");
    assert_eq!(value(resolved), json!({"k": "from-c", "only_a": 1}));
}

#[test]
fn later_nested_includes_win_over_earlier_ones() {
    let docs = Documents::new(&[
        ("a.yml", "namespace: a\ninclude: [b.yml, c.yml]\nk: from-a\n"),
        ("b.yml", "namespace: b\nk: from-b\n"),
        ("c.yml", "namespace: c\nk: from-c\n"),
    ]);
    let resolved = docs.resolve("include: [a.yml]\n").expect("resolve");
    assert_eq!(value(resolved), json!({"k": "from-c"}));
}

#[test]
fn include_and_namespace_keys_are_stripped() {
    let docs = Documents::new(&[
        ("a.yml", "namespace: a\ninclude: [b.yml]\na.web: {}\n"),
        ("b.yml", "namespace: b\nb.web: {}\n"),
    ]);
    let resolved = docs
        .resolve("include: [a.yml]\nnamespace: core\nweb: {}\n")
        .expect("resolve");
    assert!(!resolved.contains_key(INCLUDE_KEY));
    assert!(!resolved.contains_key(NAMESPACE_KEY));
    assert_eq!(
        resolved.keys().map(String::as_str).collect::<Vec<_>>(),
        ["a.web", "b.web", "web"]
    );
}

#[rstest]
#[case::absent("web: {}\n")]
#[case::empty("namespace: ''\nweb: {}\n")]
#[case::null("namespace: ~\nweb: {}\n")]
#[case::not_a_string("namespace: [a]\nweb: {}\n")]
fn includes_without_a_namespace_are_rejected(#[case] included: &str) {
    let url = "http://example.com/project.yml";
    let docs = Documents::new(&[(url, included)]);
    let err = docs
        .resolve(&format!("include: ['{url}']\n"))
        .expect_err("must fail");
    assert_eq!(
        err.to_string(),
        format!("Configuration {url} requires a namespace")
    );
    assert!(matches!(err, ComposeError::MissingNamespace { reference } if reference == url));
}

#[test]
fn unsupported_schemes_fail_before_any_fetch() {
    let docs = Documents::new(&[]);
    let err = docs
        .resolve("include: ['ftp://example.com/a.yml']\n")
        .expect_err("must fail");
    assert!(matches!(err, ComposeError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));
    assert!(docs.fetched.borrow().is_empty());
}

#[test]
fn fetch_errors_abort_the_whole_resolution() {
    let docs = Documents::new(&[("a.yml", "namespace: a\nk: 1\n")]);
    let err = docs
        .resolve("include: [a.yml, missing.yml]\n")
        .expect_err("must fail");
    assert!(matches!(err, ComposeError::Fetch { .. }));
}

#[rstest]
#[case::scalar("include: a.yml\n", "must be a list")]
#[case::mapping("include: {a: b}\n", "must be a list")]
#[case::non_string_entry("include: [1]\n", "entry 0 must be a string")]
fn malformed_include_directives_are_rejected(#[case] root: &str, #[case] message: &str) {
    let docs = Documents::new(&[]);
    let err = docs.resolve(root).expect_err("must fail");
    assert!(
        matches!(err, ComposeError::MalformedInclude { ref origin, .. } if origin == ROOT_ORIGIN)
    );
    assert!(err.to_string().contains(message), "{err}");
}

#[test]
fn null_include_is_treated_as_empty() {
    let docs = Documents::new(&[]);
    let resolved = docs.resolve("include: ~\nweb: {}\n").expect("resolve");
    assert_eq!(value(resolved), json!({"web": {}}));
}

#[test]
fn nested_includes_are_flattened() {
    let url = "http://example.com/project.yml";
    let docs = Documents::new(&[
        (
            url,
            "namespace: a\ninclude: [b, c]\na.web: {image: a, links: [b.web, c.web, a.db]}\na.db: {image: db}\n",
        ),
        ("b", "namespace: b\ninclude: [c]\nb.web: {image: b, links: [c.web]}\n"),
        ("c", "namespace: c\nc.web: {image: c}\n"),
    ]);
    let resolved = docs.resolve(&format!("include: ['{url}']\n")).expect("resolve");
    assert_eq!(
        value(resolved),
        json!({
            "a.web": {"image": "a", "links": ["b.web", "c.web", "a.db"]},
            "a.db": {"image": "db"},
            "b.web": {"image": "b", "links": ["c.web"]},
            "c.web": {"image": "c"},
        })
    );
    assert_eq!(docs.fetch_count("c"), 1);
}

#[test]
fn shared_includes_are_fetched_once() {
    let docs = Documents::new(&[
        ("a.yml", "namespace: a\na.web: {image: a-img}\n"),
        (
            "b.yml",
            "namespace: b\ninclude: [a.yml]\nb.web: {image: b-img, links: [a.web]}\n",
        ),
    ]);
    let resolved = docs
        .resolve("include: [a.yml, b.yml]\nweb: {image: root}\n")
        .expect("resolve");
    assert_eq!(
        value(resolved),
        json!({
            "web": {"image": "root"},
            "a.web": {"image": "a-img"},
            "b.web": {"image": "b-img", "links": ["a.web"]},
        })
    );
    assert_eq!(docs.fetch_count("a.yml"), 1);
}

#[test]
fn each_resolution_fetches_afresh() {
    let docs = Documents::new(&[("a.yml", "namespace: a\nk: v1\n")]);
    let mut resolver = IncludeResolver::new(|reference: &Reference| docs.fetch(reference));

    let first = resolver
        .resolve(parse_document(b"include: [a.yml]\n").expect("root"))
        .expect("first resolution");
    docs.replace("a.yml", "namespace: a\nk: v2\n");
    let second = resolver
        .resolve(parse_document(b"include: [a.yml]\n").expect("root"))
        .expect("second resolution");

    assert_eq!(value(first), json!({"k": "v1"}));
    assert_eq!(value(second), json!({"k": "v2"}));
    drop(resolver);
    assert_eq!(docs.fetch_count("a.yml"), 2);
}
