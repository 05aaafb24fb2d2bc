//! Static-file fallback for requests no handler claims.
//!
//! Only a fixed whitelist of resource names is servable; everything else is a
//! 404. One designated path, `/classic.html`, is templated: its `{time}`
//! placeholder is replaced with the current timestamp before serving, and the
//! response's `Content-Length` reflects the substituted text.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::AsyncWrite;

use crate::http::{Responder, StatusCode};

/// Resource names servable via fallback resolution. Fixed at compile time,
/// not configurable at runtime.
const WHITELIST: &[&str] = &[
    "/index.html",
    "/spring.svg",
    "/spring.png",
    "/resources.html",
    "/styles.css",
    "/app.js",
    "/links.html",
    "/forms.html",
    "/classic.html",
    "/events.html",
    "/events.js",
];

/// The one whitelisted path that gets template substitution.
const TEMPLATED_PATH: &str = "/classic.html";

/// Placeholder label substituted in the templated resource, written `{time}`.
const TIME_LABEL: &str = "time";

/// Serves whitelisted files from a fixed resource root.
///
/// Invoked by the connection worker only after router lookup fails. The
/// whitelist is immutable configuration, so a `StaticFiles` can be shared
/// across workers freely.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Creates a fallback resolver rooted at `root` (typically `./public`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns `true` if `path` names a servable static resource.
    pub fn is_whitelisted(path: &str) -> bool {
        WHITELIST.contains(&path)
    }

    /// Resolves `path` and writes the response: 404 for non-whitelisted
    /// names, templated content for [`TEMPLATED_PATH`], raw file bytes
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures reading a whitelisted file or writing the
    /// response; the worker drops the connection in that case.
    pub async fn serve<W>(&self, path: &str, responder: &mut Responder<W>) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if !Self::is_whitelisted(path) {
            return responder.send_status(StatusCode::NotFound).await;
        }

        let file_path = self.root.join(path.trim_start_matches('/'));

        if path == TEMPLATED_PATH {
            let template = tokio::fs::read_to_string(&file_path).await?;
            let content = template.replace(&format!("{{{TIME_LABEL}}}"), &current_timestamp());
            return responder
                .send_content(StatusCode::Ok, content_type_for(&file_path), content.as_bytes())
                .await;
        }

        let bytes = tokio::fs::read(&file_path).await?;
        responder
            .send_content(StatusCode::Ok, content_type_for(&file_path), &bytes)
            .await
    }
}

/// Infers a content type from the file extension.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// The current time rendered as text: seconds since the Unix epoch.
fn current_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}
