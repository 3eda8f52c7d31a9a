use std::io::SeekFrom;

use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::http::response::{reason_phrase, ContentSize, FileStream, Response, ResponseKind};
use crate::server_ident;

const HTTP_VERSION: &str = "HTTP/1.1";
const RFC1123: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Current time formatted for the `Date` header.
pub fn http_date_now() -> String {
    Utc::now().format(RFC1123).to_string()
}

/// A `SystemTime` formatted for the `Last-Modified` header.
pub fn http_date(time: std::time::SystemTime) -> String {
    chrono::DateTime::<Utc>::from(time).format(RFC1123).to_string()
}

/// Serializes the status line, header block and any in-memory body.
///
/// Stream-kind responses end at the blank line; the file bytes are piped
/// by [`ResponseWriter`] after the header block is flushed.
pub fn serialize_response(resp: &Response, keep_alive: bool) -> Vec<u8> {
    let mut lines: Vec<String> = Vec::new();

    // Status line
    lines.push(format!(
        "{} {} {}",
        HTTP_VERSION,
        resp.status,
        reason_phrase(resp.status)
    ));

    // Always-present headers
    lines.push(format!("Server: {}", server_ident()));
    lines.push(format!("Date: {}", http_date_now()));
    lines.push("Access-Control-Allow-Methods: GET".to_string());
    lines.push(format!(
        "Connection: {}",
        if keep_alive { "keep-alive" } else { "close" }
    ));

    // Kind-specific headers
    if let Some(body) = &resp.body {
        match resp.kind {
            ResponseKind::DirList => {
                lines.push("Content-Type: text/html;charset=UTF-8".to_string());
                lines.push(format!("Content-Length: {}", body.len()));
            }
            ResponseKind::Cgi => {
                if let Some(raw) = &resp.cgi_headers {
                    lines.extend(raw.iter().cloned());
                }
                lines.push(format!("Content-Length: {}", body.len()));
            }
            _ => {
                lines.push("Content-Type: text/plain;charset=UTF-8".to_string());
                lines.push(format!("Content-Length: {}", body.len()));
            }
        }
        lines.push("Cache-Control: no-cache".to_string());
    } else if resp.stream.is_some() {
        match resp.size {
            Some(ContentSize::Window { start, end, total }) => {
                lines.push(format!("Content-Range: bytes {}-{}/{}", start, end, total));
                // Long-standing quirk carried for compatibility: a
                // single-byte window advertises length 0 even though one
                // byte is streamed.
                let length = if start == end {
                    0
                } else {
                    end.saturating_sub(start) + 1
                };
                lines.push(format!("Content-Length: {}", length));
                lines.push("Accept-Ranges: bytes".to_string());
                lines.push("Cache-Control: no-cache".to_string());
            }
            _ => {
                lines.push(format!(
                    "Content-Type: {}",
                    resp.mime.as_deref().unwrap_or(crate::http::mime::DEFAULT)
                ));
                if let Some(ContentSize::Full(size)) = resp.size {
                    lines.push(format!("Content-Length: {}", size));
                }
                lines.push("Cache-Control: public, max-age=0".to_string());
                if let Some(stamp) = &resp.last_modified {
                    lines.push(format!("Last-Modified: {}", stamp));
                }
            }
        }
    } else {
        match resp.kind {
            ResponseKind::InvalidRange => {
                if let Some(ContentSize::Full(total)) = resp.size {
                    lines.push(format!("Content-Range: bytes */{}", total));
                }
                lines.push("Content-Length: 0".to_string());
            }
            // 304 advertises no length headers at all
            _ if resp.status == 304 => {}
            _ => lines.push("Content-Length: 0".to_string()),
        }
    }

    if let Some(etag) = &resp.etag {
        lines.push(format!("ETag: {}", etag));
    }

    let mut buf = lines.join("\r\n").into_bytes();
    buf.extend_from_slice(b"\r\n\r\n");

    if let Some(body) = &resp.body {
        buf.extend_from_slice(body);
    }

    buf
}

/// Writes a serialized response, then pipes the file window for
/// stream-kind responses.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
    stream: Option<FileStream>,
}

impl ResponseWriter {
    pub fn new(response: &Response, keep_alive: bool) -> Self {
        Self {
            buffer: serialize_response(response, keep_alive),
            written: 0,
            stream: response.stream.clone(),
        }
    }

    pub async fn write_to_stream(&mut self, stream: &mut TcpStream) -> anyhow::Result<()> {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        if let Some(file_stream) = &self.stream {
            let mut file = tokio::fs::File::open(&file_stream.path).await?;

            match file_stream.window {
                Some(window) => {
                    file.seek(SeekFrom::Start(window.start)).await?;
                    let mut limited = file.take(window.len());
                    tokio::io::copy(&mut limited, stream).await?;
                }
                None => {
                    tokio::io::copy(&mut file, stream).await?;
                }
            }
        }

        stream.flush().await?;
        Ok(())
    }
}
