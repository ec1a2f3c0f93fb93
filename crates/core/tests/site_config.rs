//! Loading the documentation site configuration end to end.

use docs_kit_core::{
    ContentEntry, ContentIndex, Error, NavNode, Problem, ResolvedNavNode, load_str,
    resolve_autogen_nodes,
};
use proptest::prelude::*;
use std::collections::HashSet;

const DOCS_SITE: &str = include_str!("../../../demo/site.toml");

#[test]
fn test_docs_site_loads() {
    let config = load_str(DOCS_SITE).unwrap();
    assert_eq!(config.identity.title, "Docs | Val Town");
    assert_eq!(config.identity.canonical_url.as_str(), "https://docs.val.town/");
    assert_eq!(config.redirects.len(), 6);
    assert_eq!(config.sidebar.len(), 11);
    assert_eq!(config.head.len(), 4);
    assert_eq!(config.theme.custom_css.len(), 3);
    assert_eq!(config.plugins.len(), 2);
}

#[test]
fn test_docs_site_redirect_round_trip() {
    let config = load_str(DOCS_SITE).unwrap();
    assert_eq!(
        config.apply_redirects("/api/vals/"),
        Some("/openapi.html#tag/vals")
    );
    assert_eq!(
        config.apply_redirects("/api/run/"),
        Some("/openapi.html#tag/vals/GET/v1/run/{valname}")
    );
    assert_eq!(config.apply_redirects("/api/vals"), None);
    assert_eq!(config.apply_redirects("/"), None);
}

#[test]
fn test_docs_site_collapsed_flags_survive_load() {
    let config = load_str(DOCS_SITE).unwrap();
    let NavNode::Group(vals) = &config.sidebar[2] else {
        panic!("expected the Vals group");
    };
    assert!(!vals.collapsed);
    let NavNode::Autogen(http) = &vals.items[1] else {
        panic!("expected the HTTP autogenerated section");
    };
    assert!(http.collapsed);
    assert_eq!(http.directory, "types/http");
}

#[test]
fn test_explicit_group_collapse_preserved() {
    let toml = r#"
title = "Docs"
site = "https://docs.example.com/"

[[sidebar]]
label = "Collaboration"
collapsed = true
items = [{ label = "Forks", link = "collaboration/forks-branches" }]
"#;
    let config = load_str(toml).unwrap();
    let NavNode::Group(group) = &config.sidebar[0] else {
        panic!("expected group");
    };
    assert!(group.collapsed);
}

#[test]
fn test_all_problems_reported_in_one_pass() {
    let toml = r#"
title = "Docs"
site = "docs.example.com"
default_locale = "fr"

[locales.root]
lang = "en"

[[redirects]]
from = "/x/"
to = "/a/"

[[redirects]]
from = "/x/"
to = "/b/"

[[sidebar]]
label = "Guides"
autogenerate = { directory = "" }

[[head]]
attrs = { name = "robots" }
"#;
    let err = load_str(toml).unwrap_err();
    let problems = err.problems();
    let fields: Vec<String> = problems.iter().map(Problem::field).collect();
    assert_eq!(
        fields,
        vec![
            "site",
            "default_locale",
            "redirects[1].from",
            "sidebar[0].autogenerate.directory",
            "head[0].tag",
        ]
    );
    assert!(matches!(problems[2], Problem::RedirectCollision(_)));
    assert!(err.to_string().contains("5 problem(s)"));
}

#[test]
fn test_docs_site_resolves_against_index() {
    let config = load_str(DOCS_SITE).unwrap();
    let mut entries = vec![
        ContentEntry::new("quickstarts/first-website", "Your first website"),
        ContentEntry::new("types/http", "HTTP"),
        ContentEntry::new("reference/runtime", "Runtime"),
        ContentEntry::new("std/SQLite/usage", "Usage"),
        ContentEntry::new("api/authentication", "Authentication"),
        ContentEntry::new("troubleshooting/errors", "Common errors"),
        ContentEntry::new("guides/embedding", "Embedding videos"),
        ContentEntry::new("integrations/github", "GitHub"),
    ];
    let index = ContentIndex::new(entries.clone());
    let err = config.resolve_sidebar(&index).unwrap_err();
    assert!(matches!(err, Error::MissingDirectory(ref m) if m.len() == 1 && m[0].source_directory == "contact-us"));

    entries.push(ContentEntry::new("contact-us/contact-us", "Contact us"));
    let resolved = config.resolve_sidebar(&ContentIndex::new(entries)).unwrap();
    assert_eq!(resolved.len(), 11);
    assert!(
        resolved
            .iter()
            .all(|n| !matches!(n, ResolvedNavNode::Group(g) if g.items.is_empty()))
    );
}

fn slug_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just("guides"), Just("api"), Just("std"), Just("sqlite"), Just("intro"), Just("usage")], 1..4)
        .prop_map(|segments| segments.join("/"))
}

fn entry_strategy() -> impl Strategy<Value = ContentEntry> {
    (slug_strategy(), "[A-Z][a-z]{0,8}", prop::option::of(-5i64..5), any::<bool>()).prop_map(
        |(slug, title, order, hidden)| {
            let mut entry = ContentEntry::new(slug, title);
            entry.order = order;
            entry.hidden = hidden;
            entry
        },
    )
}

fn redirect_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("/[a-z]{1,6}/", "/[a-z]{1,6}/"), 0..12)
}

proptest! {
    /// Resolving the same sidebar against the same index twice yields identical trees
    #[test]
    fn prop_resolution_is_idempotent(entries in prop::collection::vec(entry_strategy(), 1..30)) {
        let config = load_str(r#"
title = "Docs"
site = "https://docs.example.com/"
build = { empty_autogen = "empty" }

[[sidebar]]
label = "Guides"
autogenerate = { directory = "guides" }

[[sidebar]]
label = "Nested"
items = [{ label = "API", autogenerate = { directory = "api" }, collapsed = true }]
"#).unwrap();
        let index = ContentIndex::new(entries);

        let first = config.resolve_sidebar(&index).unwrap();
        let second = config.resolve_sidebar(&index).unwrap();
        prop_assert_eq!(&first, &second);

        let strict_first = resolve_autogen_nodes(&config.sidebar, &index).ok();
        let strict_second = resolve_autogen_nodes(&config.sidebar, &index).ok();
        prop_assert_eq!(strict_first, strict_second);
    }

    /// Any redirect table that loads has unique source paths
    #[test]
    fn prop_loaded_redirects_are_unique(rules in redirect_strategy()) {
        let mut toml = String::from("title = \"Docs\"\nsite = \"https://docs.example.com/\"\n");
        for (from, to) in &rules {
            toml.push_str(&format!("\n[[redirects]]\nfrom = \"{}\"\nto = \"{}\"\n", from, to));
        }

        let distinct: HashSet<&String> = rules.iter().map(|(from, _)| from).collect();
        match load_str(&toml) {
            Ok(config) => {
                prop_assert_eq!(distinct.len(), rules.len());
                let loaded: HashSet<&str> = config.redirects.rules().iter().map(|r| r.from.as_str()).collect();
                prop_assert_eq!(loaded.len(), config.redirects.len());
                for (from, to) in &rules {
                    prop_assert_eq!(config.apply_redirects(from), Some(to.as_str()));
                }
            }
            Err(err) => {
                prop_assert!(distinct.len() < rules.len());
                prop_assert!(err.problems().iter().all(|p| matches!(p, Problem::RedirectCollision(_))));
            }
        }
    }
}
