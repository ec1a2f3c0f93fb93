//! In-memory index of the documents the content collection exposes.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// A single content document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentEntry {
    /// Path relative to the content directory, without extension; `index` collapses onto its directory
    pub slug: String,
    pub title: String,
    /// Explicit front-matter sidebar position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Front-matter sidebar label overriding the title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub hidden: bool,
    /// Raw link destinations found in the body
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<NaiveDate>,
}

impl ContentEntry {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            order: None,
            label: None,
            hidden: false,
            links: Vec::new(),
            last_modified: None,
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn sidebar_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.title)
    }

    pub fn href(&self) -> String {
        if self.slug.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", self.slug)
        }
    }
}

/// Documents sorted in sidebar order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentIndex {
    entries: Vec<ContentEntry>,
}

impl ContentIndex {
    /// Sorts into sidebar order; the first entry wins when slugs repeat.
    pub fn new(mut entries: Vec<ContentEntry>) -> Self {
        let mut seen = HashSet::new();
        entries.retain(|e| seen.insert(e.slug.clone()));
        entries.sort_by(sidebar_order);
        Self { entries }
    }

    pub fn entries(&self) -> &[ContentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&ContentEntry> {
        self.entries.iter().find(|e| e.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    /// Visible entries anywhere below `directory`, in sidebar order.
    pub fn under<'a>(&'a self, directory: &str) -> impl Iterator<Item = &'a ContentEntry> + use<'a> {
        let prefix = normalize_directory(directory);
        self.entries
            .iter()
            .filter(move |e| !e.hidden && in_directory(&e.slug, &prefix))
    }
}

/// `./types/http/` becomes `types/http`.
pub fn normalize_directory(directory: &str) -> String {
    directory
        .trim_start_matches("./")
        .trim_matches('/')
        .to_string()
}

fn in_directory(slug: &str, directory: &str) -> bool {
    if directory.is_empty() {
        return true;
    }
    slug == directory
        || slug
            .strip_prefix(directory)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Explicit order first (ascending), then by slug.
fn sidebar_order(a: &ContentEntry, b: &ContentEntry) -> Ordering {
    match (a.order, b.order) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.slug.cmp(&b.slug)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.slug.cmp(&b.slug),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_orders_explicit_before_alphabetical() {
        let index = ContentIndex::new(vec![
            ContentEntry::new("guides/zeta", "Zeta"),
            ContentEntry::new("guides/alpha", "Alpha"),
            ContentEntry::new("guides/last", "Last").with_order(9),
            ContentEntry::new("guides/first", "First").with_order(1),
        ]);
        let slugs: Vec<_> = index.entries().iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec!["guides/first", "guides/last", "guides/alpha", "guides/zeta"]
        );
    }

    #[test]
    fn test_under_matches_whole_segments() {
        let index = ContentIndex::new(vec![
            ContentEntry::new("api/vals", "Vals"),
            ContentEntry::new("api-legacy/old", "Old"),
            ContentEntry::new("api", "API"),
        ]);
        let slugs: Vec<_> = index.under("api").map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["api", "api/vals"]);
    }

    #[test]
    fn test_under_skips_hidden() {
        let mut hidden = ContentEntry::new("guides/draft", "Draft");
        hidden.hidden = true;
        let index = ContentIndex::new(vec![hidden, ContentEntry::new("guides/intro", "Intro")]);
        assert_eq!(index.under("./guides/").count(), 1);
    }

    #[test]
    fn test_duplicate_slugs_collapse() {
        let index = ContentIndex::new(vec![
            ContentEntry::new("std/blob", "Blob"),
            ContentEntry::new("std/blob", "Blob again"),
        ]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_entry_href() {
        assert_eq!(ContentEntry::new("", "Home").href(), "/");
        assert_eq!(ContentEntry::new("std/blob", "Blob").href(), "/std/blob/");
    }
}
