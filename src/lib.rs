//! Minnow - Static File + CGI Server
//!
//! Core library for the HTTP wire protocol, request routing and the CGI
//! gateway.

pub mod config;
pub mod http;
pub mod serve;
pub mod server;

/// Server name used in the `Server` header, the directory listing footer
/// and the CGI `SERVER_SOFTWARE` variable.
pub const SERVER_NAME: &str = "minnow";

/// Crate version, baked into the server identification string.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The canonical `minnow v<version>` identification string.
pub fn server_ident() -> String {
    format!("{} v{}", SERVER_NAME, SERVER_VERSION)
}
