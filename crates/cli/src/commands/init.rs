use anyhow::{Context, Result};
use docs_kit_core::{CONFIG_FILE_NAME, DEFAULT_CONTENT_DIR};
use std::fs;
use std::path::{Path, PathBuf};

/// Escape a string for safe inclusion in a TOML basic string
///
/// Handles the required escape sequences for TOML basic strings:
/// - Backslash (\\) -> \\\\
/// - Quote (\") -> \\\"
/// - Backspace (\b) -> \\b
/// - Form feed (\f) -> \\f
/// - Newline (\n) -> \\n
/// - Carriage return (\r) -> \\r
/// - Tab (\t) -> \\t
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Initialize a new documentation project.
///
/// Creates:
/// - `site.toml` with identity, a redirect example and a starter sidebar
/// - the content directory with an index page and a `guides/` section
/// - an empty `public/` directory for static files
///
/// Refuses to overwrite an existing `site.toml`.
pub async fn run(path: PathBuf, title: &str, site: &str) -> Result<()> {
    println!("📚 Initializing documentation project at: {}", path.display());

    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists in {}", CONFIG_FILE_NAME, path.display());
    }

    create_directory_structure(&path)?;
    println!("   ✓ Created directories");

    fs::write(&config_path, generate_site_toml(title, site))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("   ✓ Generated {}", CONFIG_FILE_NAME);

    generate_starter_pages(&path, title)?;
    println!("   ✓ Generated starter pages");

    println!();
    println!("Next steps:");
    println!("   docs-kit validate {}", path.display());
    println!("   docs-kit preview {}", path.display());

    Ok(())
}

fn create_directory_structure(base: &Path) -> Result<()> {
    let content = base.join(DEFAULT_CONTENT_DIR);
    fs::create_dir_all(content.join("guides")).context("Failed to create content directory")?;
    fs::create_dir_all(base.join("public")).context("Failed to create public directory")?;
    Ok(())
}

fn generate_site_toml(title: &str, site: &str) -> String {
    format!(
        r#"# Site identity
title = "{title}"
site = "{site}"
default_locale = "root"
last_updated = true

[locales.root]
lang = "en"
label = "English"

# Old paths and where they moved to. Lookups are exact, so "/old/" and
# "/old" are different paths.
[redirects]
"/getting-started/" = "/guides/introduction/"

[[sidebar]]
label = "Home"
link = "/"

[[sidebar]]
label = "Guides"
autogenerate = {{ directory = "guides" }}

[[plugins]]
id = "links-validator"
"#,
        title = toml_escape_string(title),
        site = toml_escape_string(site),
    )
}

fn generate_starter_pages(base: &Path, title: &str) -> Result<()> {
    let content = base.join(DEFAULT_CONTENT_DIR);
    let yaml_title = title.replace('\'', "''");

    fs::write(
        content.join("index.md"),
        format!(
            "---\ntitle: '{}'\n---\n\nStart with the [introduction](/guides/introduction/).\n",
            yaml_title
        ),
    )
    .context("Failed to write index.md")?;

    fs::write(
        content.join("guides/introduction.md"),
        "---\ntitle: Introduction\nsidebar:\n  order: 1\n---\n\nWelcome! Head back [home](/).\n",
    )
    .context("Failed to write guides/introduction.md")?;

    Ok(())
}
