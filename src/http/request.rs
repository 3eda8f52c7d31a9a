use std::collections::HashMap;
use std::net::SocketAddr;

/// HTTP request methods.
///
/// The verbs the server recognizes on the wire. Only GET, POST and PUT are
/// routed; the rest parse but answer 405. Verbs outside this list answer
/// 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit data (routed so request bodies reach CGI scripts)
    POST,
    /// PUT - Replace a resource
    PUT,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// DELETE - Delete a resource
    DELETE,
    /// COPY - Copy a resource
    COPY,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
}

impl Method {
    /// Parses an HTTP method from its wire form (case-sensitive).
    ///
    /// Returns `None` for verbs outside the allow-list; the parser still
    /// accepts such requests and leaves the rejection to the router.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            "COPY" => Some(Method::COPY),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            _ => None,
        }
    }
}

/// A fully parsed HTTP request, immutable once constructed.
///
/// Header keys are lower-cased at parse time; on duplicate headers the
/// first occurrence wins. `path` is percent-decoded and never carries the
/// query-string suffix.
#[derive(Debug, Clone)]
pub struct Request {
    /// The verb exactly as it appeared on the request line.
    pub verb: String,
    /// The request target before decoding or query splitting.
    pub raw_path: String,
    /// The percent-decoded path, query stripped.
    pub path: String,
    /// The raw query string, if the target carried one.
    pub query: Option<String>,
    /// HTTP version (typically "HTTP/1.1").
    pub version: String,
    /// Headers with lower-cased keys, first-match-wins on duplicates.
    pub headers: HashMap<String, String>,
    /// Request body; present iff the verb is POST/PUT and Content-Length > 0.
    pub body: Option<Vec<u8>>,
    /// Address and port of the peer socket.
    pub peer: SocketAddr,
}

impl Request {
    /// The recognized method for this request's verb, if any.
    pub fn method(&self) -> Option<Method> {
        Method::from_str(&self.verb)
    }

    /// Retrieves a header value by its lower-cased name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// The `cookie` header, verbatim.
    pub fn cookies(&self) -> Option<&str> {
        self.header("cookie")
    }

    /// The Content-Length header parsed as a usize, 0 when missing or
    /// invalid.
    pub fn content_length(&self) -> usize {
        self.header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Whether this verb carries a request body.
    pub fn has_body(&self) -> bool {
        self.verb == "POST" || self.verb == "PUT"
    }

    /// Whether the connection stays open after the response.
    ///
    /// Only an explicit `Connection: keep-alive` keeps the socket open.
    pub fn keep_alive(&self) -> bool {
        self.header("connection")
            .map(|v| v.eq_ignore_ascii_case("keep-alive"))
            .unwrap_or(false)
    }
}
