mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docs-kit")]
#[command(version, about = "Configuration tooling for the documentation site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Initialize a new documentation project
    Init {
        /// Path to create the project in
        path: PathBuf,

        /// Site title
        #[arg(long, default_value = "Docs")]
        title: String,

        /// Canonical site URL
        #[arg(long, default_value = "https://docs.example.com/")]
        site: String,
    },

    /// Validate site configuration and content
    Validate {
        /// Path to project directory
        path: PathBuf,
    },

    /// Preview generated output locally, rebuilding on change
    Preview {
        /// Path to project directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "4321")]
        port: u16,
    },

    /// Build redirect pages, sidebar and head fragment
    Build {
        /// Path to project directory
        path: PathBuf,

        /// Output directory for generated files
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Look up where a request path is redirected
    Redirect {
        /// Path to project directory
        path: PathBuf,

        /// Request path, e.g. /api/vals/
        request: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docs_kit=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init { path, title, site } => commands::init::run(path, &title, &site).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Preview { path, port } => commands::preview::run(path, port).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Redirect { path, request } => commands::redirect::run(path, &request).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "docs-kit", &mut io::stdout());
            Ok(())
        }
    }
}
