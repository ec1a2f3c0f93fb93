//! Content collection scanning.
//!
//! Walks the content directory and builds the [`ContentIndex`] the sidebar
//! resolver and link checker consume. Only front matter, the first heading
//! and link destinations are read; page bodies are never rendered.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use docs_kit_core::{ContentEntry, ContentIndex};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

const CONTENT_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    draft: bool,
    sidebar: SidebarMeta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SidebarMeta {
    order: Option<i64>,
    label: Option<String>,
    hidden: bool,
}

/// Scan a content directory into an index of documents
pub fn scan_content(dir: &Path) -> Result<ContentIndex> {
    if !dir.is_dir() {
        anyhow::bail!("Content directory does not exist: {}", dir.display());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_content_file(path) {
            continue;
        }
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut document = parse_document(&slug_for(relative), &source)
            .with_context(|| format!("Invalid front matter in {}", path.display()))?;
        document.last_modified = modified_date(path);
        entries.push(document);
    }

    tracing::debug!(dir = %dir.display(), documents = entries.len(), "scanned content directory");
    Ok(ContentIndex::new(entries))
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// `types/http/index.md` becomes `types/http`, `std/blob.md` becomes `std/blob`.
pub fn slug_for(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if segments.last().is_some_and(|s| s == "index") {
        segments.pop();
    }
    segments.join("/")
}

/// Build an entry from a document's source text.
pub fn parse_document(slug: &str, source: &str) -> Result<ContentEntry> {
    let (front_matter, body) = split_front_matter(source);
    let meta: FrontMatter = match front_matter {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
        _ => FrontMatter::default(),
    };

    let (heading, links) = scan_body(body);
    let title = meta
        .title
        .or(heading)
        .unwrap_or_else(|| fallback_title(slug));

    Ok(ContentEntry {
        slug: slug.to_string(),
        title,
        order: meta.sidebar.order,
        label: meta.sidebar.label,
        hidden: meta.sidebar.hidden || meta.draft,
        links,
        last_modified: None,
    })
}

/// Split `---` delimited YAML front matter from the body.
fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, source)
}

/// First heading text and every link destination in the body.
fn scan_body(body: &str) -> (Option<String>, Vec<String>) {
    let mut heading: Option<String> = None;
    let mut in_first_heading = false;
    let mut links = Vec::new();

    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading { .. }) if heading.is_none() => {
                in_first_heading = true;
                heading = Some(String::new());
            }
            Event::End(TagEnd::Heading(_)) => in_first_heading = false,
            Event::Text(text) | Event::Code(text) if in_first_heading => {
                if let Some(h) = heading.as_mut() {
                    h.push_str(&text);
                }
            }
            Event::Start(Tag::Link { dest_url, .. }) => links.push(dest_url.to_string()),
            _ => {}
        }
    }

    (heading.filter(|h| !h.trim().is_empty()), links)
}

fn fallback_title(slug: &str) -> String {
    let stem = slug.rsplit('/').next().unwrap_or(slug);
    if stem.is_empty() {
        return "Home".to_string();
    }
    stem.replace(['-', '_'], " ")
}

fn modified_date(path: &Path) -> Option<NaiveDate> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).date_naive())
}
