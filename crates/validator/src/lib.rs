// Project-level checks that need the filesystem or the content index,
// on top of what loading the configuration already guarantees.

mod links;

use docs_kit_core::{
    Configuration, ContentIndex, EmptyAutogenPolicy, LINKS_VALIDATOR_PLUGIN, NavNode,
    StylesheetRef, is_external_target,
};
use std::collections::HashMap;
use std::path::Path;

pub use links::resolve_link;

/// Static files served as-is from this directory
pub const PUBLIC_DIR: &str = "public";

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a loaded configuration against the project on disk
pub fn validate_project(root: &Path, config: &Configuration, index: &ContentIndex) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_assets(root, config, &mut report);
    check_sidebar(root, config, index, &config.sidebar, &mut report);
    check_redirects(config, index, &mut report);

    if config.has_plugin(LINKS_VALIDATOR_PLUGIN) {
        let broken = links::check_document_links(root, config, index);
        report.info.push(format!(
            "{} checked internal links in {} documents",
            LINKS_VALIDATOR_PLUGIN,
            index.len()
        ));
        report.errors.extend(broken);
    }

    report.info.push(format!("{} documents indexed", index.len()));
    report
        .info
        .push(format!("{} redirect rules", config.redirects.len()));

    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "project validation finished"
    );
    report
}

fn check_assets(root: &Path, config: &Configuration, report: &mut ValidationReport) {
    let content_dir = root.join(&config.build.content_dir);
    if !content_dir.is_dir() {
        report.errors.push(format!(
            "build.content_dir: {} does not exist",
            config.build.content_dir.display()
        ));
    }

    if let Some(logo) = &config.theme.logo {
        for (field, path) in [("logo.light", &logo.light), ("logo.dark", &logo.dark)] {
            if !root.join(path).is_file() {
                report
                    .errors
                    .push(format!("{}: file not found: {}", field, path.display()));
            }
        }
    }

    for (i, css) in config.theme.custom_css.iter().enumerate() {
        if let StylesheetRef::Local(path) = css
            && !root.join(path).is_file()
        {
            report.errors.push(format!(
                "custom_css[{}]: file not found: {}",
                i,
                path.display()
            ));
        }
    }

    for (name, path) in &config.options.components {
        if !root.join(path).is_file() {
            report.errors.push(format!(
                "components.{}: file not found: {}",
                name,
                path.display()
            ));
        }
    }
}

fn check_sidebar(
    root: &Path,
    config: &Configuration,
    index: &ContentIndex,
    nodes: &[NavNode],
    report: &mut ValidationReport,
) {
    for node in nodes {
        match node {
            NavNode::Autogen(autogen) => {
                if index.under(&autogen.directory).next().is_none() {
                    let message = format!(
                        "sidebar `{}`: autogenerated directory `{}` contains no documents",
                        autogen.label, autogen.directory
                    );
                    match config.build.empty_autogen {
                        EmptyAutogenPolicy::Error => report.errors.push(message),
                        EmptyAutogenPolicy::Empty => report.warnings.push(message),
                    }
                }
            }
            NavNode::Link(link) if !link.is_external() => {
                let href = link.href();
                if !links::target_exists(root, config, index, &href) {
                    report.warnings.push(format!(
                        "sidebar `{}`: link target `{}` matches no document",
                        link.label, link.target
                    ));
                }
            }
            NavNode::Link(_) => {}
            NavNode::Group(group) => check_sidebar(root, config, index, &group.items, report),
        }
    }
}

fn check_redirects(config: &Configuration, index: &ContentIndex, report: &mut ValidationReport) {
    let mut by_trimmed: HashMap<&str, &str> = HashMap::new();

    for rule in config.redirects.rules() {
        let slug = rule.from.trim_matches('/');
        if index.contains(slug) {
            report.warnings.push(format!(
                "redirect `{}` shadows the document `{}`",
                rule.from, slug
            ));
        }

        let trimmed = rule.from.trim_end_matches('/');
        if let Some(other) = by_trimmed.insert(trimmed, &rule.from) {
            report.errors.push(format!(
                "redirects `{}` and `{}` differ only by a trailing slash; both would use the same redirect page",
                other, rule.from
            ));
        }

        if !is_external_target(&rule.to) && rule.to.trim_start_matches('/').is_empty() {
            report
                .info
                .push(format!("redirect `{}` points at the site root", rule.from));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docs_kit_core::{ContentEntry, load_str};
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/content/docs")).unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        dir
    }

    fn config(extra: &str) -> Configuration {
        load_str(&format!(
            "title = \"Docs\"\nsite = \"https://docs.example.com/\"\n{}",
            extra
        ))
        .unwrap()
    }

    #[test]
    fn test_missing_assets_are_errors() {
        let dir = project(&["src/assets/logo.svg"]);
        let config = config(
            r#"custom_css = ["@fontsource/ibm-plex-sans/400.css", "./src/styles/custom.css"]

[logo]
light = "./src/assets/logo.svg"
dark = "./src/assets/logo-dark.svg"

[components]
Footer = "./src/components/Footer.astro"
"#,
        );
        let report = validate_project(dir.path(), &config, &ContentIndex::default());
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].starts_with("logo.dark"));
        assert!(report.errors[1].starts_with("custom_css[1]"));
        assert!(report.errors[2].starts_with("components.Footer"));
    }

    #[test]
    fn test_missing_content_dir() {
        let dir = TempDir::new().unwrap();
        let report = validate_project(dir.path(), &config(""), &ContentIndex::default());
        assert!(!report.is_ok());
        assert!(report.errors[0].contains("build.content_dir"));
    }

    #[test]
    fn test_empty_autogen_follows_policy() {
        let dir = project(&[]);
        let sidebar = r#"
[[sidebar]]
label = "Guides"
items = [{ label = "All", autogenerate = { directory = "guides" } }]
"#;
        let strict = validate_project(dir.path(), &config(sidebar), &ContentIndex::default());
        assert_eq!(strict.errors.len(), 1);
        assert!(strict.errors[0].contains("`guides` contains no documents"));

        let lenient_config = config(&format!("build = {{ empty_autogen = \"empty\" }}\n{}", sidebar));
        let lenient = validate_project(dir.path(), &lenient_config, &ContentIndex::default());
        assert!(lenient.is_ok());
        assert_eq!(lenient.warnings.len(), 1);
    }

    #[test]
    fn test_dangling_sidebar_link_warns() {
        let dir = project(&["public/openapi.html"]);
        let config = config(
            r#"
[[sidebar]]
label = "Script"
link = "types/script"

[[sidebar]]
label = "Missing"
link = "types/nowhere"

[[sidebar]]
label = "API"
link = "/openapi.html"

[[sidebar]]
label = "GitHub"
link = "https://github.com/val-town"
"#,
        );
        let index = ContentIndex::new(vec![ContentEntry::new("types/script", "Script")]);
        let report = validate_project(dir.path(), &config, &index);
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("types/nowhere"));
    }

    #[test]
    fn test_redirect_problems() {
        let dir = project(&[]);
        let config = config(
            r#"
[[redirects]]
from = "/api/vals/"
to = "/openapi.html#tag/vals"

[[redirects]]
from = "/api/vals"
to = "/openapi.html"

[[redirects]]
from = "/guides/intro/"
to = "/guides/start/"
"#,
        );
        let index = ContentIndex::new(vec![ContentEntry::new("guides/intro", "Intro")]);
        let report = validate_project(dir.path(), &config, &index);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("`/api/vals/` and `/api/vals` differ only by a trailing slash"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("shadows the document `guides/intro`"));
    }

    #[test]
    fn test_link_check_only_with_plugin() {
        let dir = project(&[]);
        let mut entry = ContentEntry::new("guides/intro", "Intro");
        entry.links = vec!["/guides/missing/".to_string()];
        let index = ContentIndex::new(vec![entry]);

        let without = validate_project(dir.path(), &config(""), &index);
        assert!(without.is_ok());

        let with = validate_project(
            dir.path(),
            &config("[[plugins]]\nid = \"links-validator\"\n"),
            &index,
        );
        assert_eq!(with.errors.len(), 1);
        assert!(with.errors[0].contains("/guides/missing/"));
    }
}
