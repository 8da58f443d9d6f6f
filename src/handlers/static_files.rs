//! Static asset serving.
//!
//! Every request that matches no API route lands here. Files are read from
//! the configured static directory; `/` maps to `index.html`. Failures are
//! answered in plain text, not JSON, since browsers are the audience.

use std::{
    io,
    path::{Path, PathBuf},
};

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

const INDEX_DOCUMENT: &str = "index.html";

/// Why a static file could not be served.
#[derive(Debug, thiserror::Error)]
pub enum StaticFileError {
    #[error("404 Not Found")]
    NotFound,

    #[error("413 Payload Too Large")]
    TooLarge,

    #[error("405 Method Not Allowed")]
    MethodNotAllowed,

    #[error("failed to read static file: {0}")]
    Read(#[from] io::Error),
}

impl IntoResponse for StaticFileError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            StaticFileError::NotFound => (StatusCode::NOT_FOUND, "404 Not Found"),
            StaticFileError::TooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large"),
            StaticFileError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed")
            }
            StaticFileError::Read(e) => {
                tracing::error!("Static file read failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "500 Internal Server Error",
                )
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=UTF-8")],
            body,
        )
            .into_response()
    }
}

/// Serve a file from the static directory.
///
/// # Responses
///
/// - 200 with the file and a content type derived from its extension
/// - 404 when the file does not exist or the path tries to leave the directory
/// - 413 when the file exceeds the configured maximum size
/// - 405 for methods other than GET and HEAD
/// - 500 when the file exists but cannot be read
pub async fn serve_static(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, StaticFileError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(StaticFileError::MethodNotAllowed);
    }

    let mut path =
        resolve_path(&state.config.static_dir, uri.path()).ok_or(StaticFileError::NotFound)?;

    let mut metadata = tokio::fs::metadata(&path).await.map_err(not_found_or_read)?;
    if metadata.is_dir() {
        path.push(INDEX_DOCUMENT);
        metadata = tokio::fs::metadata(&path).await.map_err(not_found_or_read)?;
    }

    if metadata.len() > state.config.max_static_file_bytes {
        tracing::warn!(
            "Refusing to serve {} ({} bytes exceeds limit of {})",
            path.display(),
            metadata.len(),
            state.config.max_static_file_bytes
        );
        return Err(StaticFileError::TooLarge);
    }

    let contents = tokio::fs::read(&path).await.map_err(not_found_or_read)?;
    tracing::debug!("Serving static file {}", path.display());

    Ok(([(header::CONTENT_TYPE, content_type(&path))], contents).into_response())
}

/// Map a request path onto the static directory.
///
/// Returns `None` for paths containing `..` segments or backslashes.
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        return Some(root.join(INDEX_DOCUMENT));
    }

    let mut path = root.to_path_buf();
    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') => return None,
            s => path.push(s),
        }
    }

    Some(path)
}

/// Content type for a file, by extension.
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn not_found_or_read(e: io::Error) -> StaticFileError {
    if e.kind() == io::ErrorKind::NotFound {
        StaticFileError::NotFound
    } else {
        StaticFileError::Read(e)
    }
}
