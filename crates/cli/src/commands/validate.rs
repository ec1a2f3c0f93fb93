use super::project::{Project, print_report};
use std::path::PathBuf;

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project = Project::open(&path)?;
    let config = &project.config;

    println!("✓ site.toml valid");
    println!("  Site: {} ({})", config.identity.title, config.identity.canonical_url);
    println!("  Sidebar entries: {}", config.sidebar.len());
    println!("  Redirects: {}", config.redirects.len());
    println!("  Documents: {}", project.index.len());
    println!();

    print_report(&project.validate())?;

    println!("\n✅ Project valid");
    Ok(())
}
