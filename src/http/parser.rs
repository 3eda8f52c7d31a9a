use std::collections::HashMap;
use std::net::SocketAddr;

use percent_encoding::percent_decode_str;

use crate::http::request::Request;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidHeader,
    /// More bytes are needed before a complete request can be framed.
    Incomplete,
}

/// Parses one request from the front of an accumulation buffer.
///
/// Invoked again with the grown buffer whenever new bytes arrive; it never
/// blocks waiting for data. Framing: the header block ends at the first
/// CRLFCRLF, and POST/PUT requests are complete once Content-Length body
/// bytes follow it. On success returns the request and the number of bytes
/// consumed, leaving any keep-alive tail in place.
pub fn parse_request(buf: &[u8], peer: SocketAddr) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let verb = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    // Headers: lower-cased keys, first occurrence wins on duplicates
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;

        headers
            .entry(key.trim().to_ascii_lowercase())
            .or_insert_with(|| value.trim().to_string());
    }

    // Split the query off before decoding, so an encoded '?' in the path
    // cannot be misread as a query delimiter.
    let (path_part, query) = match target.split_once('?') {
        Some((p, q)) => (p, Some(q.to_string())),
        None => (target, None),
    };

    let path = percent_decode_str(path_part)
        .decode_utf8()
        .map_err(|_| ParseError::InvalidRequest)?
        .into_owned();

    // Body: only POST/PUT carry one; absent or invalid Content-Length
    // means no body.
    let expects_body = verb == "POST" || verb == "PUT";
    let content_length = if expects_body {
        headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0)
    } else {
        0
    };

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = if content_length > 0 {
        Some(body_bytes[..content_length].to_vec())
    } else {
        None
    };

    let request = Request {
        verb: verb.to_string(),
        raw_path: target.to_string(),
        path,
        query,
        version: version.to_string(),
        headers,
        body,
        peer,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))
}

pub(crate) fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_request(req, peer()).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn split_marker_is_incomplete() {
        // Chunk boundary splitting the CRLFCRLF marker
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r";
        assert_eq!(
            parse_request(req, peer()).unwrap_err(),
            ParseError::Incomplete
        );
    }
}
