use super::project::Project;
use anyhow::Result;
use std::path::PathBuf;

/// Print the exact-match redirect for a request path
pub async fn run(path: PathBuf, request: &str) -> Result<()> {
    let project = Project::open(&path)?;

    match project.config.redirects.apply(request) {
        Some(rule) => {
            println!("{} {} -> {}", rule.status, rule.from, rule.to);
            Ok(())
        }
        None => {
            let trimmed = request.trim_end_matches('/');
            let near = project
                .config
                .redirects
                .rules()
                .iter()
                .find(|r| r.from.trim_end_matches('/') == trimmed);
            if let Some(rule) = near {
                println!("   ⚠ No exact match; did you mean `{}`?", rule.from);
            }
            anyhow::bail!("No redirect for {}", request)
        }
    }
}
