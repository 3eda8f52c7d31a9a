use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use minnow::config::Config;
use minnow::http::request::Request;
use minnow::http::response::{ContentSize, ResponseKind};
use minnow::http::writer::serialize_response;
use minnow::serve::Router;
use tempfile::TempDir;

fn peer() -> SocketAddr {
    "127.0.0.1:49152".parse().unwrap()
}

fn request(verb: &str, path: &str, headers: &[(&str, &str)]) -> Request {
    let mut map = HashMap::new();
    for (k, v) in headers {
        map.insert(k.to_string(), v.to_string());
    }

    Request {
        verb: verb.to_string(),
        raw_path: path.to_string(),
        path: path.to_string(),
        query: None,
        version: "HTTP/1.1".to_string(),
        headers: map,
        body: None,
        peer: peer(),
    }
}

fn router_for(root: &TempDir, show_dir: bool) -> Router {
    let mut cfg = Config {
        static_dir: root.path().to_path_buf(),
        show_dir,
        ..Config::default()
    };
    cfg.resolve_roots();
    Router::new(Arc::new(cfg))
}

#[tokio::test]
async fn test_static_file_served_with_etag_and_mime() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("hello.txt"), "hello world").unwrap();
    let router = router_for(&root, false);

    let resp = router.route(&request("GET", "/hello.txt", &[])).await;

    assert_eq!(resp.status, 200);
    assert!(resp.stream.is_some());
    assert!(resp.body.is_none());
    assert_eq!(resp.size, Some(ContentSize::Full(11)));
    assert_eq!(resp.mime.as_deref(), Some("text/plain; charset=utf-8"));
    assert!(resp.etag.is_some());
    assert!(resp.last_modified.is_some());
}

#[tokio::test]
async fn test_etag_is_idempotent_and_matching_yields_304() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("a.txt"), "stable").unwrap();
    let router = router_for(&root, false);

    let first = router.route(&request("GET", "/a.txt", &[])).await;
    let second = router.route(&request("GET", "/a.txt", &[])).await;
    assert_eq!(first.etag, second.etag);

    let tag = first.etag.unwrap();
    let conditional = router
        .route(&request("GET", "/a.txt", &[("if-none-match", &tag)]))
        .await;

    assert_eq!(conditional.status, 304);
    assert!(conditional.body.is_none());
    assert!(conditional.stream.is_none());
    assert_eq!(conditional.etag.as_deref(), Some(tag.as_str()));
}

#[tokio::test]
async fn test_missing_path_yields_404() {
    let root = TempDir::new().unwrap();
    let router = router_for(&root, false);

    let resp = router.route(&request("GET", "/nope.txt", &[])).await;

    assert_eq!(resp.status, 404);
    assert_eq!(
        resp.body.as_deref(),
        Some(b"The requested resource was not found.".as_slice())
    );
}

#[tokio::test]
async fn test_unknown_verb_yields_400_even_for_missing_path() {
    let root = TempDir::new().unwrap();
    let router = router_for(&root, false);

    let resp = router.route(&request("TRACE", "/nope.txt", &[])).await;

    assert_eq!(resp.status, 400);
    assert!(resp.body.is_none());
}

#[tokio::test]
async fn test_unrouted_verb_yields_405() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("a.txt"), "x").unwrap();
    let router = router_for(&root, false);

    let resp = router.route(&request("DELETE", "/a.txt", &[])).await;

    assert_eq!(resp.status, 405);
    assert!(resp.body.is_none());
}

#[tokio::test]
async fn test_directory_with_index_serves_index_file() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("docs")).unwrap();
    std::fs::write(root.path().join("docs/index.html"), "<h1>docs</h1>").unwrap();
    let router = router_for(&root, false);

    let resp = router.route(&request("GET", "/docs", &[])).await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.mime.as_deref(), Some("text/html; charset=utf-8"));
    let stream = resp.stream.unwrap();
    assert!(stream.path.ends_with("docs/index.html"));
}

#[tokio::test]
async fn test_directory_without_index_yields_403() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("empty")).unwrap();
    let router = router_for(&root, false);

    let resp = router.route(&request("GET", "/empty", &[])).await;

    assert_eq!(resp.status, 403);
    assert_eq!(
        resp.body.as_deref(),
        Some(b"You do not have permission to access this resource.".as_slice())
    );
}

#[tokio::test]
async fn test_directory_listing_sorted_dirs_first_then_files() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("b.txt"), "").unwrap();
    std::fs::write(root.path().join("a.txt"), "").unwrap();
    std::fs::create_dir(root.path().join("sub")).unwrap();
    let router = router_for(&root, true);

    let resp = router.route(&request("GET", "/", &[])).await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.kind, ResponseKind::DirList);
    let body = String::from_utf8(resp.body.unwrap()).unwrap();

    let sub = body.find(">sub/<").unwrap();
    let a = body.find(">a.txt<").unwrap();
    let b = body.find(">b.txt<").unwrap();
    assert!(sub < a && a < b, "expected sub/, a.txt, b.txt order");

    // Parent link comes first
    let parent = body.find(">..<").unwrap();
    assert!(parent < sub);
}

#[tokio::test]
async fn test_valid_range_yields_206_with_window() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("data.bin"), vec![0u8; 100]).unwrap();
    let router = router_for(&root, false);

    let resp = router
        .route(&request("GET", "/data.bin", &[("range", "bytes=5-10")]))
        .await;

    assert_eq!(resp.status, 206);
    assert_eq!(resp.kind, ResponseKind::ValidRange);
    assert_eq!(
        resp.size,
        Some(ContentSize::Window {
            start: 5,
            end: 10,
            total: 100
        })
    );
    let window = resp.stream.unwrap().window.unwrap();
    assert_eq!((window.start, window.end), (5, 10));
}

#[tokio::test]
async fn test_unsatisfiable_range_yields_416() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("data.bin"), vec![0u8; 100]).unwrap();
    let router = router_for(&root, false);

    let resp = router
        .route(&request("GET", "/data.bin", &[("range", "bytes=100-200")]))
        .await;

    assert_eq!(resp.status, 416);
    assert_eq!(resp.kind, ResponseKind::InvalidRange);
    assert_eq!(resp.size, Some(ContentSize::Full(100)));
    assert!(resp.body.is_none());
    assert!(resp.stream.is_none());
}

#[tokio::test]
async fn test_inverted_range_yields_416_and_serializes() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("data.bin"), vec![0u8; 100]).unwrap();
    let router = router_for(&root, false);

    let resp = router
        .route(&request("GET", "/data.bin", &[("range", "bytes=10-5")]))
        .await;

    assert_eq!(resp.status, 416);
    assert_eq!(resp.kind, ResponseKind::InvalidRange);
    assert_eq!(resp.size, Some(ContentSize::Full(100)));
    assert!(resp.stream.is_none());

    // The header block must assemble without arithmetic on the window
    let raw = serialize_response(&resp, false);
    let head = String::from_utf8(raw).unwrap();
    assert!(head.contains("Content-Range: bytes */100"));
    assert!(head.contains("Content-Length: 0"));
}

#[tokio::test]
async fn test_unparsable_range_served_as_plain_static() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("data.bin"), vec![0u8; 100]).unwrap();
    let router = router_for(&root, false);

    let resp = router
        .route(&request("GET", "/data.bin", &[("range", "lines=1-2")]))
        .await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.size, Some(ContentSize::Full(100)));
}

#[tokio::test]
async fn test_parent_segments_resolve_outside_static_root() {
    // `..` segments are passed through to the filesystem join; a path
    // climbing out of the static root is served when it resolves.
    let outer = TempDir::new().unwrap();
    let webroot = outer.path().join("webroot");
    std::fs::create_dir(&webroot).unwrap();
    std::fs::write(outer.path().join("sibling.txt"), "outside").unwrap();

    let mut cfg = Config {
        static_dir: webroot,
        ..Config::default()
    };
    cfg.resolve_roots();
    let router = Router::new(Arc::new(cfg));

    let resp = router
        .route(&request("GET", "/../sibling.txt", &[]))
        .await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.size, Some(ContentSize::Full(7)));
}

#[tokio::test]
async fn test_non_executable_file_in_cgi_dir_served_statically() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("cgi-bin")).unwrap();
    std::fs::write(root.path().join("cgi-bin/notes.txt"), "plain").unwrap();
    let router = router_for(&root, false);

    let resp = router.route(&request("GET", "/cgi-bin/notes.txt", &[])).await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.kind, ResponseKind::Plain);
    assert!(resp.stream.is_some());
    assert!(resp.cgi_headers.is_none());
}
