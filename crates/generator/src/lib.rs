// Output for the parts of the site the configuration owns: redirect stubs,
// the resolved sidebar, the head fragment and a configuration echo.

pub mod content;
pub mod html;

use anyhow::{Context, Result};
use docs_kit_core::{Configuration, ContentIndex};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub use content::scan_content;

#[derive(Debug)]
pub struct GeneratedSite {
    pub pages: Vec<(String, String)>,   // (path, html)
    pub assets: Vec<(String, Vec<u8>)>, // (path, data)
}

impl GeneratedSite {
    pub fn page(&self, path: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, html)| html.as_str())
    }

    pub fn asset(&self, path: &str) -> Option<&[u8]> {
        self.assets
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, data)| data.as_slice())
    }
}

/// Generate every output file for a validated configuration
pub fn generate_site(config: &Configuration, index: &ContentIndex) -> Result<GeneratedSite> {
    let sidebar = config
        .resolve_sidebar(index)
        .context("Failed to resolve sidebar")?;

    let mut pages: Vec<(String, String)> = Vec::with_capacity(config.redirects.len());
    let mut sources: HashMap<String, &str> = HashMap::new();
    for rule in config.redirects.rules() {
        let path = redirect_page_path(&rule.from);
        if let Some(first) = sources.insert(path.clone(), &rule.from) {
            anyhow::bail!(
                "redirects `{}` and `{}` would both be written to {}",
                first,
                rule.from,
                path
            );
        }
        let html = html::render_redirect_page(rule, &config.identity.canonical_url);
        pages.push((path, html));
    }

    let assets = vec![
        (
            "sidebar.json".to_string(),
            serde_json::to_vec_pretty(&sidebar).context("Failed to serialize sidebar")?,
        ),
        (
            "site.json".to_string(),
            serde_json::to_vec_pretty(config).context("Failed to serialize configuration")?,
        ),
        (
            "content.json".to_string(),
            serde_json::to_vec_pretty(index).context("Failed to serialize content index")?,
        ),
        (
            "head.html".to_string(),
            html::render_head(&config.head, &config.theme.custom_css).into_bytes(),
        ),
    ];

    tracing::debug!(redirects = config.redirects.len(), "generated site output");
    Ok(GeneratedSite { pages, assets })
}

/// Write generated output below `out_dir`
pub fn write_site(site: &GeneratedSite, out_dir: &Path) -> Result<usize> {
    fs::create_dir_all(out_dir).context("Failed to create output directory")?;

    let files = site
        .pages
        .iter()
        .map(|(path, html)| (path, html.as_bytes()))
        .chain(site.assets.iter().map(|(path, data)| (path, data.as_slice())));

    let mut written = 0;
    for (relative, data) in files {
        let dest = out_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&dest, data).with_context(|| format!("Failed to write {}", dest.display()))?;
        written += 1;
    }
    Ok(written)
}

/// Write generated output as the whole content of `out_dir`.
///
/// Output is staged in a sibling directory and swapped in, so files from a
/// previous build that are no longer generated disappear.
pub fn replace_site(site: &GeneratedSite, out_dir: &Path) -> Result<usize> {
    let mut name = out_dir
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("site"));
    name.push(".next");
    let staging = out_dir.with_file_name(name);

    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("Failed to clear {}", staging.display()))?;
    }
    let written = write_site(site, &staging)?;

    if out_dir.exists() {
        fs::remove_dir_all(out_dir)
            .with_context(|| format!("Failed to remove {}", out_dir.display()))?;
    }
    fs::rename(&staging, out_dir)
        .with_context(|| format!("Failed to move output into {}", out_dir.display()))?;
    Ok(written)
}

/// Output file for a redirect source path.
///
/// `/api/vals/` becomes `api/vals/index.html`; paths naming a file
/// (`/old.html`) are written as that file. `.` and `..` segments are dropped.
pub fn redirect_page_path(from: &str) -> String {
    let path = PathBuf::from(from.trim_start_matches('/'));
    let segments: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    match segments.last() {
        Some(last) if last.contains('.') && !from.ends_with('/') => segments.join("/"),
        Some(_) => format!("{}/index.html", segments.join("/")),
        None => "index.html".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docs_kit_core::{ContentEntry, load_str};
    use tempfile::TempDir;

    const SITE: &str = r#"
title = "Docs"
site = "https://docs.example.com/"
custom_css = [
  "@fontsource/ibm-plex-sans/400.css",
  "@fontsource/ibm-plex-sans/600.css",
  "./src/styles/custom.css",
]

[redirects]
"/api/vals/" = "/openapi.html#tag/vals"
"/old.html" = "/new/"

[[sidebar]]
label = "Guides"
autogenerate = { directory = "guides" }

[[head]]
tag = "meta"
attrs = { name = "robots", content = "index" }
"#;

    fn index() -> ContentIndex {
        ContentIndex::new(vec![ContentEntry::new("guides/intro", "Intro")])
    }

    #[test]
    fn test_redirect_page_path() {
        assert_eq!(redirect_page_path("/api/vals/"), "api/vals/index.html");
        assert_eq!(redirect_page_path("/api/vals"), "api/vals/index.html");
        assert_eq!(redirect_page_path("/old.html"), "old.html");
        assert_eq!(redirect_page_path("/"), "index.html");
        assert_eq!(redirect_page_path("/../../etc/"), "etc/index.html");
    }

    #[test]
    fn test_generate_site() {
        let config = load_str(SITE).unwrap();
        let site = generate_site(&config, &index()).unwrap();

        assert_eq!(site.pages.len(), 2);
        assert!(
            site.page("api/vals/index.html")
                .unwrap()
                .contains("url=/openapi.html#tag/vals")
        );
        assert!(site.page("old.html").unwrap().contains("url=/new/"));

        let sidebar: serde_json::Value =
            serde_json::from_slice(site.asset("sidebar.json").unwrap()).unwrap();
        assert_eq!(sidebar[0]["kind"], "group");
        assert_eq!(sidebar[0]["label"], "Guides");
        assert_eq!(sidebar[0]["items"][0]["target"], "/guides/intro/");

        let head = std::str::from_utf8(site.asset("head.html").unwrap()).unwrap();
        let lines: Vec<&str> = head.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"<meta content="index" name="robots">"#,
                r#"<link rel="stylesheet" href="@fontsource/ibm-plex-sans/400.css">"#,
                r#"<link rel="stylesheet" href="@fontsource/ibm-plex-sans/600.css">"#,
                r#"<link rel="stylesheet" href="./src/styles/custom.css">"#,
            ]
        );

        let echo: serde_json::Value =
            serde_json::from_slice(site.asset("site.json").unwrap()).unwrap();
        assert_eq!(echo["identity"]["canonical_url"], "https://docs.example.com/");
        assert_eq!(echo["redirects"][0]["from"], "/api/vals/");
    }

    #[test]
    fn test_generate_site_fails_on_empty_autogen() {
        let config = load_str(SITE).unwrap();
        let err = generate_site(&config, &ContentIndex::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("`guides` contains no documents"));
    }

    #[test]
    fn test_generate_site_rejects_shared_output_path() {
        let config = load_str(
            r#"
title = "Docs"
site = "https://docs.example.com/"

[[redirects]]
from = "/api/vals/"
to = "/A"

[[redirects]]
from = "/api/vals"
to = "/B"
"#,
        )
        .unwrap();
        let err = generate_site(&config, &index()).unwrap_err().to_string();
        assert!(err.contains("`/api/vals/` and `/api/vals`"), "{}", err);
        assert!(err.contains("api/vals/index.html"), "{}", err);
    }

    #[test]
    fn test_replace_site_drops_stale_output() {
        let out = TempDir::new().unwrap();
        let dest = out.path().join("site");

        let config = load_str(SITE).unwrap();
        replace_site(&generate_site(&config, &index()).unwrap(), &dest).unwrap();
        assert!(dest.join("api/vals/index.html").is_file());

        let without_redirects = SITE.replace("[redirects]", "[unused]");
        let config = load_str(&without_redirects).unwrap();
        assert!(config.redirects.is_empty());
        let written = replace_site(&generate_site(&config, &index()).unwrap(), &dest).unwrap();

        assert_eq!(written, 4);
        assert!(!dest.join("api/vals/index.html").exists());
        assert!(!dest.join("old.html").exists());
        assert!(dest.join("head.html").is_file());
        assert!(!out.path().join("site.next").exists());
    }

    #[test]
    fn test_write_site() {
        let config = load_str(SITE).unwrap();
        let site = generate_site(&config, &index()).unwrap();
        let out = TempDir::new().unwrap();

        let written = write_site(&site, out.path()).unwrap();
        assert_eq!(written, 6);
        assert!(out.path().join("api/vals/index.html").is_file());
        assert!(out.path().join("old.html").is_file());
        assert!(out.path().join("sidebar.json").is_file());
    }
}
