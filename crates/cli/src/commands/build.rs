use anyhow::{Context, Result};
use docs_kit_generator::{GeneratedSite, generate_site, replace_site, write_site};
use std::path::{Path, PathBuf};

use super::project::{Project, print_report};

/// Build generated output for deployment
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building site configuration output...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let project = Project::open(&path)?;
    println!("✓ Loaded: {}", project.config.identity.title);
    println!("  Documents: {}", project.index.len());
    println!();

    println!("🔍 Validating project...");
    print_report(&project.validate())?;
    println!();

    let site = build_project(&project, &output)?;

    println!("   ✓ {} redirect pages", site.pages.len());
    println!("   ✓ {} generated assets", site.assets.len());
    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());

    Ok(())
}

/// Generate and write output for an already validated project.
/// Shared between build and preview so both produce the same files.
pub fn build_project(project: &Project, output: &Path) -> Result<GeneratedSite> {
    let site = generate_site(&project.config, &project.index)
        .context("Failed to generate site output")?;
    let written = write_site(&site, output)?;
    tracing::info!(files = written, output = %output.display(), "wrote site output");
    Ok(site)
}

/// Like `build_project`, but `output` ends up holding only this build's files.
pub fn rebuild_project(project: &Project, output: &Path) -> Result<GeneratedSite> {
    let site = generate_site(&project.config, &project.index)
        .context("Failed to generate site output")?;
    let written = replace_site(&site, output)?;
    tracing::info!(files = written, output = %output.display(), "replaced site output");
    Ok(site)
}
