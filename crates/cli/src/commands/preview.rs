use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use matrix_kit_generator::render::{RenderOptions, html_escape};
use matrix_kit_generator::{Routed, render_path};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use std::{net::SocketAddr, path::PathBuf};
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::load_site_dir;

#[derive(Clone)]
struct AppState {
    site_path: PathBuf,
    reload_tx: broadcast::Sender<()>,
}

/// Start preview server with hot reload for local development.
///
/// Pages are rendered per request from the site directory, so edits to
/// data or content show up on the next reload without a rebuild.
///
/// # Arguments
///
/// * `path` - Path to site directory containing site.toml
/// * `port` - Port to serve on (default: 8080)
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("🌎 Starting preview server...");
    println!("   Site: {}", path.display());

    // Fail fast on a broken site instead of on the first request
    let site = load_site_dir(&path)?;
    println!("   ✓ Loaded: {}", site.config.title);
    println!(
        "   ✓ Combinations: {}",
        site.matrix.declared_entries()
    );

    let (reload_tx, _) = broadcast::channel::<()>(100);

    let app = router(AppState {
        site_path: path.clone(),
        reload_tx: reload_tx.clone(),
    });

    let watcher_path = path.clone();
    let watcher_tx = reload_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_path, watcher_tx).await {
            tracing::error!(error = %e, "file watcher stopped");
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let static_dir = state.site_path.join("static");

    Router::new()
        .route("/_reload", get(sse_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(page_handler)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Watch for file changes and trigger reload
async fn watch_files(path: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher.watch(&path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                // Editor swap and backup files don't count
                if event.paths.iter().any(|p| {
                    let filename = p.file_name().unwrap_or_default().to_string_lossy();
                    !filename.starts_with('.') && !filename.ends_with('~')
                }) {
                    println!("   📝 File changed, reloading...");
                    let _ = reload_tx.send(());
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            if rx.recv().await.is_ok() {
                yield Ok(Event::default().data("reload"));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Render the requested path from a fresh load of the site directory
async fn page_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    let site_path = state.site_path.clone();

    let rendered = tokio::task::spawn_blocking(move || -> Result<Routed> {
        let site = matrix_kit_core::load_site(&site_path)?;
        Ok(render_path(&site, &path, RenderOptions { preview: true })?)
    })
    .await;

    match rendered {
        Ok(Ok(routed)) => {
            let status = if routed.found {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            (
                status,
                [(header::CONTENT_TYPE, routed.content_type)],
                routed.body,
            )
                .into_response()
        }
        Ok(Err(e)) => error_response(&format!("{:#}", e)),
        Err(e) => error_response(&e.to_string()),
    }
}

fn error_response(message: &str) -> Response {
    tracing::error!(error = %message, "preview render failed");
    let body = format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="UTF-8"><title>Preview error</title></head>
<body><h1>Preview error</h1><pre>{}</pre>
<script>new EventSource('/_reload').onmessage = () => location.reload();</script>
</body></html>"#,
        html_escape(message)
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        crate::commands::init::run(dir.path().to_path_buf(), None, None)
            .await
            .unwrap();
        let (reload_tx, _) = broadcast::channel(4);
        let app = router(AppState {
            site_path: dir.path().to_path_buf(),
            reload_tx,
        });
        (dir, app)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_listed_combination_renders_with_reload_script() {
        let (_dir, app) = test_app().await;
        let (status, body) = get(app, "/visas-matrix/digital-nomad/united-states/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Digital Nomad Visa for Americans"));
        assert!(body.contains("/_reload"));
    }

    #[tokio::test]
    async fn test_unlisted_combination_is_404() {
        let (_dir, app) = test_app().await;
        let (status, body) = get(app, "/visas-matrix/mercosur/united-states/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Page Not Found"));
    }

    #[tokio::test]
    async fn test_content_page_and_static_files() {
        let (dir, app) = test_app().await;
        fs::write(dir.path().join("static/robots.txt"), "User-agent: *").unwrap();

        let (status, body) = get(app.clone(), "/remote-work/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Remote Work"));

        let (status, body) = get(app, "/static/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "User-agent: *");
    }

    #[tokio::test]
    async fn test_broken_data_is_500() {
        let (dir, app) = test_app().await;
        fs::write(dir.path().join("data/visa_types.toml"), "not [valid").unwrap();

        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Preview error"));
    }
}
