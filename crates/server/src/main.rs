mod config;
mod handlers;
mod range;
mod response;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hyper::Server;
use hyper::service::{make_service_fn, service_fn};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use lms_core::Clock;
use storage::repository::Storage;

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = ServerConfig::parse();
    info!("starting lms-server v{}", state::SERVICE_VERSION);

    if !config.content_dir.is_dir() {
        warn!(
            "content directory does not exist yet: {}",
            config.content_dir.display()
        );
    }

    // Open + migrate SQLite before anything else; an unusable database is an
    // unrecoverable startup error.
    let db_url = normalize_sqlite_url(config.db_url.clone());
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url)
        .await
        .context("cannot open database")?;
    info!("database ready at {db_url}");

    let state = Arc::new(AppState::new(
        &storage,
        &config.content_dir,
        &config.course_prefix,
        Clock::default_clock(),
    ));

    // Index the content tree once at startup; later rescans go through the
    // guarded /api/courses/scan endpoint.
    let courses = state
        .scanner
        .scan_courses()
        .await
        .context("startup course scan failed")?;
    info!("indexed {} courses", courses.len());
    for course in &courses {
        info!("  {} ({} modules)", course.title, course.total_modules);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let make_svc = make_service_fn(move |_conn| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, hyper::Error>(service_fn(move |req| {
                routes::handle_request(Arc::clone(&state), req)
            }))
        }
    });

    info!("server listening on http://{addr}");
    Server::bind(&addr)
        .serve(make_svc)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("failed to install the shutdown signal handler");
        return;
    }
    info!("shutting down gracefully");
}

/// Accepts `sqlite:`/bare file paths and normalizes them to `sqlite://`
/// URLs with absolute paths; `sqlite::memory:` passes through.
fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file and its parent directory so the first
/// connection does not fail on a missing path.
fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .with_context(|| format!("invalid database url: {db_url}"))?;
    let path = path.split('?').next().unwrap_or(path);
    anyhow::ensure!(!path.is_empty(), "invalid database url: {db_url}");

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
    }

    Ok(())
}
