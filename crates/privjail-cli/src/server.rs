//! Static file server run after privileges have been revoked.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Routes every request to the files below `root`.
///
/// `GET` and `HEAD` are answered from disk, directories are served through
/// their `index.html`, a directory requested without a trailing slash is
/// redirected, and paths containing `..` are refused.
pub fn router(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(TraceLayer::new_for_http())
}

/// Serves files below `root` on the already-bound `listener` until
/// interrupted.
///
/// # Errors
///
/// Returns an error if the listener cannot be registered with the runtime
/// or the server fails.
pub async fn serve(listener: std::net::TcpListener, root: PathBuf) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::from_std(listener)?;
    tracing::info!(addr = %listener.local_addr()?, root = %root.display(), "serving");

    axum::serve(listener, router(&root))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("file server error")?;

    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use tower::ServiceExt;

    use super::*;

    async fn send(root: &Path, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router(root).oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn get_returns_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hello world").unwrap();

        let response = send(dir.path(), Method::GET, "/hello.txt").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "hello world");
    }

    #[tokio::test]
    async fn head_returns_headers_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hello world").unwrap();

        let response = send(dir.path(), Method::HEAD, "/hello.txt").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "11");
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn directory_serves_its_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "<h1>docs</h1>").unwrap();

        let response = send(dir.path(), Method::GET, "/docs/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<h1>docs</h1>");
    }

    #[tokio::test]
    async fn directory_without_slash_is_redirected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "docs").unwrap();

        let response = send(dir.path(), Method::GET, "/docs").await;

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/docs/");
    }

    #[tokio::test]
    async fn traversal_does_not_leave_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("htdocs");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

        for uri in ["/../secret.txt", "/%2e%2e/secret.txt"] {
            let response = send(&root, Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert!(!body_text(response).await.contains("top secret"), "{uri}");
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(dir.path(), Method::GET, "/nope.txt").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(dir.path(), Method::DELETE, "/").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
