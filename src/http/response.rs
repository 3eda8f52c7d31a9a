use std::path::PathBuf;

use crate::http::range::ByteRange;

/// Reason phrase for a status code, per the static IANA table.
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        411 => "Length Required",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        416 => "Requested Range Not Satisfiable",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "Unknown",
    }
}

/// The response kind chosen by the router; drives which header block the
/// writer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Plain text body, or a bodiless error status.
    Plain,
    /// HTML directory listing held in the body.
    DirList,
    /// Satisfiable byte range, streamed from disk.
    ValidRange,
    /// Unsatisfiable byte range (416), bodiless with `Content-Range: bytes */total`.
    InvalidRange,
    /// Output of a CGI script: raw header lines plus a body.
    Cgi,
}

/// Content size advertised by the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSize {
    /// Size of the whole resource.
    Full(u64),
    /// An inclusive window into a resource of `total` bytes.
    Window { start: u64, end: u64, total: u64 },
}

/// A file the writer streams after flushing the header block.
#[derive(Debug, Clone)]
pub struct FileStream {
    pub path: PathBuf,
    /// Byte window to stream; `None` streams the whole file.
    pub window: Option<ByteRange>,
}

/// Response accumulator filled in by the router.
///
/// After routing exactly one of `body`/`stream` is populated, except for
/// bodiless statuses (304, 416, 400, 405).
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    /// Full in-memory body content.
    pub body: Option<Vec<u8>>,
    /// Streamed file content, piped after the header block.
    pub stream: Option<FileStream>,
    pub etag: Option<String>,
    pub mime: Option<String>,
    pub size: Option<ContentSize>,
    /// RFC-1123 modification time for full static streams.
    pub last_modified: Option<String>,
    /// Raw header lines returned by a CGI script, forwarded verbatim.
    pub cgi_headers: Option<Vec<String>>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            kind: ResponseKind::Plain,
            body: None,
            stream: None,
            etag: None,
            mime: None,
            size: None,
            last_modified: None,
            cgi_headers: None,
        }
    }

    /// An error response with the fixed human-readable sentence for codes
    /// that carry one; 304/400/405/416 stay bodiless.
    pub fn error(status: u16) -> Self {
        let body: Option<&str> = match status {
            404 => Some("The requested resource was not found."),
            403 => Some("You do not have permission to access this resource."),
            401 => Some("You are not authorized to access this resource."),
            500 => Some("Internal Server Error"),
            _ => None,
        };

        let mut resp = Self::new(status);
        resp.body = body.map(|s| s.as_bytes().to_vec());
        resp
    }

    pub fn kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_stream(mut self, path: PathBuf, window: Option<ByteRange>) -> Self {
        self.stream = Some(FileStream { path, window });
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn with_size(mut self, size: ContentSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_last_modified(mut self, stamp: impl Into<String>) -> Self {
        self.last_modified = Some(stamp.into());
        self
    }

    pub fn with_cgi_headers(mut self, headers: Vec<String>) -> Self {
        self.cgi_headers = Some(headers);
        self
    }
}
