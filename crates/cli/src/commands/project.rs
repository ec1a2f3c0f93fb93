use anyhow::{Context, Result};
use docs_kit_core::{CONFIG_FILE_NAME, Configuration, ContentIndex, load};
use docs_kit_generator::scan_content;
use docs_kit_validator::{ValidationReport, validate_project};
use std::path::{Path, PathBuf};

/// A loaded project: configuration plus content index
pub struct Project {
    pub root: PathBuf,
    pub config: Configuration,
    pub index: ContentIndex,
}

impl Project {
    /// Load `site.toml` and scan the configured content directory.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.exists() {
            anyhow::bail!(
                "Project directory does not exist: {}\nRun 'docs-kit init {}' first",
                root.display(),
                root.display()
            );
        }

        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            anyhow::bail!(
                "{} not found in {}\nRun 'docs-kit init {}' first",
                CONFIG_FILE_NAME,
                root.display(),
                root.display()
            );
        }

        let config = load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        let index = scan_content(&root.join(&config.build.content_dir))
            .context("Failed to scan content")?;

        Ok(Self {
            root: root.to_path_buf(),
            config,
            index,
        })
    }

    pub fn validate(&self) -> ValidationReport {
        validate_project(&self.root, &self.config, &self.index)
    }
}

/// Print a validation report; errors turn into a failure.
pub fn print_report(report: &ValidationReport) -> Result<()> {
    for info in &report.info {
        println!("   ℹ {}", info);
    }
    for warning in &report.warnings {
        println!("   ⚠ {}", warning);
    }
    for error in &report.errors {
        println!("   ✗ {}", error);
    }

    if report.is_ok() {
        Ok(())
    } else {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len())
    }
}
