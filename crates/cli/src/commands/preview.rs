use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use docs_kit_core::RedirectTable;
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tempfile::TempDir;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::build::rebuild_project;
use super::project::{Project, print_report};

#[derive(Clone)]
struct AppState {
    redirects: Arc<RwLock<RedirectTable>>,
}

/// Start a preview server for the generated output.
///
/// This command:
/// - Loads and validates site.toml and the content directory
/// - Builds redirect pages, sidebar.json and head.html into a temp directory
/// - Serves that directory, answering configured redirects with their status
/// - Watches the project and rebuilds on change
///
/// # Arguments
///
/// * `path` - Path to project directory containing site.toml
/// * `port` - Port to serve on (default: 4321)
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("📚 Starting preview server...");
    println!("   Project: {}", path.display());

    let project = Project::open(&path)?;
    print_report(&project.validate())?;

    let out_dir = TempDir::new().context("Failed to create preview directory")?;
    rebuild_project(&project, out_dir.path())?;

    println!("   ✓ Loaded: {}", project.config.identity.title);
    println!("   ✓ Redirects: {}", project.config.redirects.len());
    println!("   ✓ Documents: {}", project.index.len());

    let state = AppState {
        redirects: Arc::new(RwLock::new(project.config.redirects.clone())),
    };
    let app = router(state.clone(), out_dir.path());

    // Start file watcher
    let watcher_root = path.clone();
    let watcher_out = out_dir.path().to_path_buf();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_root, watcher_out, state).await {
            tracing::error!(error = %e, "file watcher stopped");
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!("   Try http://localhost:{}/sidebar.json", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(state: AppState, out_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(out_dir))
        .layer(middleware::from_fn_with_state(state, redirect_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Answer exact-match redirects before falling through to static files
async fn redirect_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let target = {
        let redirects = match state.redirects.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        redirects
            .apply(request.uri().path())
            .map(|rule| (rule.status, rule.to.clone()))
    };

    match target {
        Some((status, to)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::MOVED_PERMANENTLY);
            (status, [(header::LOCATION, to)]).into_response()
        }
        None => next.run(request).await,
    }
}

/// Watch for project changes and rebuild
async fn watch_files(root: PathBuf, out_dir: PathBuf, state: AppState) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                // Filter out temporary files and hidden files
                if event.paths.iter().any(|p| {
                    let filename = p.file_name().unwrap_or_default().to_string_lossy();
                    !filename.starts_with('.') && !filename.ends_with('~')
                }) {
                    println!("   📝 File changed, rebuilding...");
                    if let Err(e) = rebuild(&root, &out_dir, &state) {
                        eprintln!("   ✗ Rebuild failed: {:#}", e);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn rebuild(root: &Path, out_dir: &Path, state: &AppState) -> Result<()> {
    let project = Project::open(root)?;
    print_report(&project.validate())?;
    rebuild_project(&project, out_dir)?;

    let mut redirects = match state.redirects.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *redirects = project.config.redirects;
    println!("   ✓ Rebuilt");
    Ok(())
}
