//! Internal link checking for the `links-validator` plugin.

use docs_kit_core::{Configuration, ContentIndex, is_external_target};
use std::path::Path;

use crate::PUBLIC_DIR;

/// Resolve a link found on the page at `base_href` to a rooted site path.
///
/// Returns `None` for links that leave the site or only point at a
/// fragment of the current page. Query strings and fragments are dropped.
pub fn resolve_link(base_href: &str, link: &str) -> Option<String> {
    if link.is_empty() || link.starts_with('#') || is_external_target(link) || link.contains(':') {
        return None;
    }
    let path = link.split(['#', '?']).next().unwrap_or(link);

    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        // Relative links resolve against the page's directory
        let base_dir = match base_href.rfind('/') {
            Some(i) => &base_href[..=i],
            None => "/",
        };
        format!("{}{}", base_dir, path)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut resolved = format!("/{}", segments.join("/"));
    if joined.ends_with('/') && resolved != "/" {
        resolved.push('/');
    }
    Some(resolved)
}

/// Whether a rooted path is served by a document, a redirect or a public file.
pub(crate) fn target_exists(root: &Path, config: &Configuration, index: &ContentIndex, href: &str) -> bool {
    let path = href.split(['#', '?']).next().unwrap_or(href);
    let slug = path.trim_matches('/');

    if index.contains(slug) {
        return true;
    }
    let with_slash = format!("{}/", path.trim_end_matches('/'));
    if config.redirects.apply(path).is_some() || config.redirects.apply(&with_slash).is_some() {
        return true;
    }
    !slug.is_empty() && root.join(PUBLIC_DIR).join(slug).is_file()
}

/// Every broken in-site link across the indexed documents.
pub(crate) fn check_document_links(root: &Path, config: &Configuration, index: &ContentIndex) -> Vec<String> {
    let mut broken = Vec::new();
    for entry in index.entries() {
        let base = entry.href();
        for link in &entry.links {
            let Some(resolved) = resolve_link(&base, link) else {
                continue;
            };
            if !target_exists(root, config, index, &resolved) {
                broken.push(format!(
                    "{}: broken link `{}` (resolved to `{}`)",
                    if entry.slug.is_empty() { "index" } else { entry.slug.as_str() },
                    link,
                    resolved
                ));
            }
        }
    }
    broken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(resolve_link("/guides/intro/", "/std/blob/"), Some("/std/blob/".to_string()));
        assert_eq!(
            resolve_link("/guides/intro/", "/openapi.html#tag/vals"),
            Some("/openapi.html".to_string())
        );
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_link("/types/http/", "./routing/"),
            Some("/types/http/routing/".to_string())
        );
        assert_eq!(
            resolve_link("/types/http/", "../cron/"),
            Some("/types/cron/".to_string())
        );
        assert_eq!(resolve_link("/a/", "../../../"), Some("/".to_string()));
    }

    #[test]
    fn test_resolve_skips_external_and_fragments() {
        assert_eq!(resolve_link("/a/", "https://github.com"), None);
        assert_eq!(resolve_link("/a/", "mailto:docs@val.town"), None);
        assert_eq!(resolve_link("/a/", "#section"), None);
        assert_eq!(resolve_link("/a/", ""), None);
    }
}
