//! CGI gateway
//!
//! Maps an HTTP request onto a subprocess environment, feeds the request
//! body to the script's stdin, and reinterprets the script's stdout as an
//! HTTP response per the CGI/1.1 convention.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::Config;
use crate::http::parser::find_headers_end;
use crate::http::request::Request;
use crate::server_ident;

/// A script's stdout, reinterpreted as status, header lines and body.
#[derive(Debug, PartialEq, Eq)]
pub struct CgiOutput {
    pub status: u16,
    /// Raw header lines forwarded verbatim to the client. The `Status`
    /// line and any script-emitted `Content-Length` are stripped; the
    /// writer appends a recomputed `Content-Length`.
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

/// One CGI invocation: the script path plus the environment built from
/// the request. The environment is constructed once and handed to the
/// spawn primitive; nothing mutates shared process state.
pub struct CgiScript {
    path: PathBuf,
    env: Vec<(String, String)>,
}

impl CgiScript {
    pub fn new(script_path: &Path, request: &Request, config: &Config) -> Self {
        let body_len = request
            .body
            .as_ref()
            .map(|b| b.len())
            .unwrap_or(0);

        let env = vec![
            ("REQUEST_METHOD".into(), request.verb.clone()),
            ("SCRIPT_NAME".into(), request.path.clone()),
            (
                "SCRIPT_FILENAME".into(),
                script_path.to_string_lossy().into_owned(),
            ),
            (
                "CONTENT_TYPE".into(),
                request.header("content-type").unwrap_or("").to_string(),
            ),
            ("CONTENT_LENGTH".into(), body_len.to_string()),
            (
                "QUERY_STRING".into(),
                request.query.clone().unwrap_or_default(),
            ),
            ("REMOTE_ADDR".into(), request.peer.ip().to_string()),
            ("REMOTE_HOST".into(), request.peer.ip().to_string()),
            ("REMOTE_PORT".into(), request.peer.port().to_string()),
            (
                "HTTP_COOKIE".into(),
                request.cookies().unwrap_or("").to_string(),
            ),
            (
                "HTTP_USER_AGENT".into(),
                request.header("user-agent").unwrap_or("").to_string(),
            ),
            (
                "HTTP_REFERER".into(),
                request.header("referer").unwrap_or("").to_string(),
            ),
            ("SERVER_SOFTWARE".into(), server_ident()),
            ("SERVER_PROTOCOL".into(), "HTTP/1.1".into()),
            ("GATEWAY_INTERFACE".into(), "CGI/1.1".into()),
            (
                "DOCUMENT_ROOT".into(),
                config.static_dir.to_string_lossy().into_owned(),
            ),
            ("REDIRECT_STATUS".into(), "200".into()),
        ];

        Self {
            path: script_path.to_path_buf(),
            env,
        }
    }

    /// Spawns the script and collects its reinterpreted output.
    ///
    /// The script runs as its own process with no shell interpretation.
    /// Stdin receives the request body (if any) and is then closed;
    /// stderr is discarded. Spawn failures surface as errors for the
    /// router to turn into a 500.
    pub async fn invoke(&self, body: Option<&[u8]>) -> anyhow::Result<CgiOutput> {
        let mut child = Command::new(&self.path)
            .env_clear()
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if body.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("spawning CGI script {}", self.path.display()))?;

        // Feed stdin from its own task so a script that fills its stdout
        // pipe before reading stdin cannot deadlock against the body
        // write; stdout is drained concurrently below.
        let writer = if let Some(body) = body {
            let mut stdin = child
                .stdin
                .take()
                .context("CGI child stdin unavailable")?;
            let body = body.to_vec();
            Some(tokio::spawn(async move {
                // A script may exit without reading its stdin; the broken
                // pipe is not an invocation failure.
                let _ = stdin.write_all(&body).await;
                // Dropping stdin closes the pipe so the script sees EOF.
            }))
        } else {
            None
        };

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("waiting for CGI script {}", self.path.display()))?;

        if let Some(writer) = writer {
            let _ = writer.await;
        }

        Ok(parse_output(&output.stdout))
    }
}

/// Reinterprets raw script stdout as status, header lines and body.
///
/// Without a CRLFCRLF boundary anywhere, the whole output is the body
/// with status 200. Otherwise the prefix holds RFC-822-style header
/// lines; a `Status` header's leading token is the numeric status code
/// (default 200).
pub fn parse_output(raw: &[u8]) -> CgiOutput {
    let Some(boundary) = find_headers_end(raw) else {
        return CgiOutput {
            status: 200,
            headers: Vec::new(),
            body: raw.to_vec(),
        };
    };

    let head = String::from_utf8_lossy(&raw[..boundary]);
    let body = raw[boundary + 4..].to_vec();

    let mut status = 200;
    let mut headers = Vec::new();

    for line in head.split("\r\n") {
        if line.is_empty() {
            continue;
        }

        match line.split_once(':') {
            Some((name, value)) if name.trim().eq_ignore_ascii_case("status") => {
                status = value
                    .trim()
                    .split(' ')
                    .next()
                    .and_then(|tok| tok.parse().ok())
                    .unwrap_or(200);
            }
            Some((name, _)) if name.trim().eq_ignore_ascii_case("content-length") => {
                // Dropped; the writer recomputes it from the actual body.
            }
            _ => headers.push(line.to_string()),
        }
    }

    CgiOutput {
        status,
        headers,
        body,
    }
}

/// Whether `path` sits under the configured CGI root.
pub fn in_cgi_dir(path: &Path, config: &Config) -> bool {
    path.starts_with(&config.cgi_dir)
}

/// Whether the file's owner-executable bit is set.
pub fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o100 != 0
}
