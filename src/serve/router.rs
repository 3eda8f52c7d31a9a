//! Request resolution state machine
//!
//! Classifies each parsed request into one of five response kinds
//! (static file, directory listing, conditional 304, partial content,
//! CGI) and computes the status and headers for each. Every failure is
//! caught here and converted into a terminal response; nothing escapes
//! to the connection loop.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::http::mime;
use crate::http::range::compute_range;
use crate::http::request::{Method, Request};
use crate::http::response::{ContentSize, Response, ResponseKind};
use crate::http::writer::http_date;
use crate::serve::cgi::{self, CgiScript};
use crate::serve::{etag, listing};

/// Failure taxonomy, each mapped to a terminal status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeError {
    /// Malformed or unknown verb → 400
    Protocol,
    /// Path does not resolve → 404
    NotFound,
    /// Directory without an index and listing disabled → 403
    Forbidden,
    /// CGI spawn/exec failure → 500
    Gateway,
    /// Filesystem failure during listing → 500
    Internal,
}

impl ServeError {
    pub fn status(&self) -> u16 {
        match self {
            ServeError::Protocol => 400,
            ServeError::NotFound => 404,
            ServeError::Forbidden => 403,
            ServeError::Gateway | ServeError::Internal => 500,
        }
    }
}

/// Decides, per parsed request, which response kind applies and drives
/// the filesystem and CGI lookups.
pub struct Router {
    config: Arc<Config>,
}

impl Router {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Resolves a request into exactly one response, logging the terminal
    /// `(status, verb, path, peer)` tuple.
    pub async fn route(&self, request: &Request) -> Response {
        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => Response::error(e.status()),
        };

        tracing::info!(
            status = response.status,
            verb = %request.verb,
            path = %request.path,
            peer = %request.peer,
            "request"
        );

        response
    }

    async fn dispatch(&self, request: &Request) -> Result<Response, ServeError> {
        // Verb check first, so an unknown verb answers 400 even when the
        // path would not resolve.
        let method = request.method().ok_or(ServeError::Protocol)?;
        if !matches!(method, Method::GET | Method::POST | Method::PUT) {
            return Ok(Response::new(405));
        }

        // `..` segments are not filtered; the joined path may resolve
        // outside the static root.
        let full_path = self
            .config
            .static_dir
            .join(request.path.trim_start_matches('/'));

        let meta = tokio::fs::metadata(&full_path)
            .await
            .map_err(|_| ServeError::NotFound)?;

        if meta.is_dir() {
            self.resolve_directory(full_path, request).await
        } else {
            self.resolve_file(full_path, meta, request).await
        }
    }

    async fn resolve_directory(
        &self,
        dir: PathBuf,
        request: &Request,
    ) -> Result<Response, ServeError> {
        if self.config.show_dir {
            let body = listing::directory_listing(&dir, &request.path, &self.config)
                .await
                .map_err(|_| ServeError::Internal)?;

            return Ok(Response::new(200)
                .kind(ResponseKind::DirList)
                .with_body(body.into_bytes()));
        }

        // No listing: the directory must hold an index file.
        let index_path = dir.join(&self.config.index);
        let index_meta = tokio::fs::metadata(&index_path)
            .await
            .map_err(|_| ServeError::Forbidden)?;

        Ok(self.serve_static(index_path, &index_meta, request))
    }

    async fn resolve_file(
        &self,
        path: PathBuf,
        meta: std::fs::Metadata,
        request: &Request,
    ) -> Result<Response, ServeError> {
        if let Some(range_header) = request.header("range") {
            if let Some(range) = compute_range(range_header, meta.len()) {
                if !range.satisfiable(meta.len()) {
                    return Ok(Response::new(416)
                        .kind(ResponseKind::InvalidRange)
                        .with_size(ContentSize::Full(meta.len())));
                }

                return Ok(Response::new(206)
                    .kind(ResponseKind::ValidRange)
                    .with_size(ContentSize::Window {
                        start: range.start,
                        end: range.end,
                        total: meta.len(),
                    })
                    .with_stream(path, Some(range)));
            }
            // Unparsable range header: treated as no range requested.
        }

        if cgi::in_cgi_dir(&path, &self.config) && cgi::is_executable(&meta) {
            let script = CgiScript::new(&path, request, &self.config);
            let output = script
                .invoke(request.body.as_deref())
                .await
                .map_err(|e| {
                    tracing::warn!("CGI invocation failed: {:#}", e);
                    ServeError::Gateway
                })?;

            return Ok(Response::new(output.status)
                .kind(ResponseKind::Cgi)
                .with_cgi_headers(output.headers)
                .with_body(output.body));
        }

        Ok(self.serve_static(path, &meta, request))
    }

    fn serve_static(
        &self,
        path: PathBuf,
        meta: &std::fs::Metadata,
        request: &Request,
    ) -> Response {
        let tag = etag::from_metadata(meta);

        if request.header("if-none-match") == Some(tag.as_str()) {
            return Response::new(304).with_etag(tag);
        }

        let mut response = Response::new(200)
            .with_etag(tag)
            .with_mime(mime::from_path(&path))
            .with_size(ContentSize::Full(meta.len()));

        if let Ok(modified) = meta.modified() {
            response = response.with_last_modified(http_date(modified));
        }

        response.with_stream(path, None)
    }
}
