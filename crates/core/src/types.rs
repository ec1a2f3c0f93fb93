use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

use crate::content::ContentIndex;
use crate::error::Result;
use crate::nav::{NavResolver, ResolvedNavTree};
use crate::redirects::RedirectTable;

/// Complete, validated site configuration
#[derive(Debug, Clone, Serialize)]
pub struct Configuration {
    pub identity: SiteIdentity,
    pub redirects: RedirectTable,
    pub sidebar: Vec<NavNode>,
    pub head: Vec<HeadInjection>,
    pub theme: ThemeAssets,
    pub plugins: Vec<PluginRegistration>,
    pub options: SiteOptions,
    pub build: BuildOptions,
}

impl Configuration {
    /// True when a plugin with this id is registered at any stage.
    pub fn has_plugin(&self, id: &str) -> bool {
        self.plugins.iter().any(|p| p.id == id)
    }

    /// Exact-match redirect lookup for a request path.
    pub fn apply_redirects(&self, request_path: &str) -> Option<&str> {
        self.redirects.apply(request_path).map(|r| r.to.as_str())
    }

    /// Resolve the sidebar using the configured empty-directory policy.
    pub fn resolve_sidebar(&self, index: &ContentIndex) -> Result<ResolvedNavTree> {
        NavResolver::new(index)
            .empty_directories(self.build.empty_autogen)
            .resolve(&self.sidebar)
    }
}

/// Site identity and locales
#[derive(Debug, Clone, Serialize)]
pub struct SiteIdentity {
    pub title: String,
    pub canonical_url: Url,
    pub default_locale: String,
    pub locales: BTreeMap<String, Locale>,
}

impl SiteIdentity {
    pub fn default_locale(&self) -> Option<&Locale> {
        self.locales.get(&self.default_locale)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub lang: String,
    pub label: String,
}

/// One entry of the navigation sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavNode {
    Link(LinkNode),
    Autogen(AutogenNode),
    Group(GroupNode),
}

impl NavNode {
    pub fn label(&self) -> &str {
        match self {
            NavNode::Link(n) => &n.label,
            NavNode::Autogen(n) => &n.label,
            NavNode::Group(n) => &n.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkNode {
    pub label: String,
    pub target: String,
}

impl LinkNode {
    pub fn is_external(&self) -> bool {
        is_external_target(&self.target)
    }

    /// Site-relative href, e.g. `types/script` becomes `/types/script/`.
    pub fn href(&self) -> String {
        normalize_href(&self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutogenNode {
    pub label: String,
    pub directory: String,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupNode {
    pub label: String,
    pub collapsed: bool,
    pub items: Vec<NavNode>,
}

/// An element injected into every page head
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadInjection {
    pub tag: String,
    pub attrs: BTreeMap<String, AttrValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Text(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ThemeAssets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    pub custom_css: Vec<StylesheetRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Logo {
    pub light: PathBuf,
    pub dark: PathBuf,
    pub replaces_title: bool,
}

/// A custom stylesheet, either a file in the project or a package import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StylesheetRef {
    Local(PathBuf),
    Package(String),
}

impl StylesheetRef {
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with("./") || raw.starts_with("../") || raw.starts_with('/') {
            StylesheetRef::Local(PathBuf::from(raw))
        } else {
            StylesheetRef::Package(raw.to_string())
        }
    }

    /// The reference as written in the configuration
    pub fn href(&self) -> String {
        match self {
            StylesheetRef::Local(path) => path.to_string_lossy().into_owned(),
            StylesheetRef::Package(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRegistration {
    pub id: String,
    #[serde(default)]
    pub stage: PluginStage,
}

/// Where in the rendering pipeline a plugin hooks in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginStage {
    #[default]
    Integration,
    CodeBlock,
}

/// Registers the internal link check in the validator.
pub const LINKS_VALIDATOR_PLUGIN: &str = "links-validator";

#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_link_base: Option<Url>,
    pub last_updated: bool,
    pub pagination: bool,
    pub social: BTreeMap<String, Url>,
    pub components: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildOptions {
    pub content_dir: PathBuf,
    pub empty_autogen: EmptyAutogenPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            empty_autogen: EmptyAutogenPolicy::default(),
        }
    }
}

pub const DEFAULT_CONTENT_DIR: &str = "src/content/docs";

/// What to do when an autogenerated section finds no documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyAutogenPolicy {
    #[default]
    Error,
    Empty,
}

/// Absolute URLs and protocol links leave the site.
pub fn is_external_target(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:") || target.starts_with("//")
}

/// Normalize an in-site target to a rooted, slash-terminated href.
///
/// Fragments and query strings are kept after the normalized path;
/// external targets and file-like paths (`/openapi.html`) are returned as-is.
pub fn normalize_href(target: &str) -> String {
    if is_external_target(target) {
        return target.to_string();
    }
    let split_at = target.find(['#', '?']).unwrap_or(target.len());
    let (path, suffix) = target.split_at(split_at);
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return format!("/{}", suffix);
    }
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if last.contains('.') {
        format!("/{}{}", trimmed, suffix)
    } else {
        format!("/{}/{}", trimmed, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_href() {
        assert_eq!(normalize_href("/"), "/");
        assert_eq!(normalize_href(""), "/");
        assert_eq!(normalize_href("types/script"), "/types/script/");
        assert_eq!(normalize_href("/std/blob/"), "/std/blob/");
        assert_eq!(normalize_href("/openapi.html#tag/vals"), "/openapi.html#tag/vals");
        assert_eq!(normalize_href("guides/intro#setup"), "/guides/intro/#setup");
        assert_eq!(
            normalize_href("https://github.com/val-town"),
            "https://github.com/val-town"
        );
    }

    #[test]
    fn test_stylesheet_classify() {
        assert_eq!(
            StylesheetRef::classify("./src/styles/custom.css"),
            StylesheetRef::Local(PathBuf::from("./src/styles/custom.css"))
        );
        assert_eq!(
            StylesheetRef::classify("@fontsource/ibm-plex-sans/400.css"),
            StylesheetRef::Package("@fontsource/ibm-plex-sans/400.css".to_string())
        );
    }

    #[test]
    fn test_link_node_external() {
        let link = LinkNode {
            label: "GitHub".to_string(),
            target: "https://github.com/val-town".to_string(),
        };
        assert!(link.is_external());
        assert_eq!(link.href(), "https://github.com/val-town");
    }
}
