//! Request resolution and content production
//!
//! This module decides what each parsed request maps to (static file,
//! directory listing, conditional 304, partial content, or CGI) and
//! produces the corresponding response.

pub mod cgi;
pub mod etag;
pub mod listing;
pub mod router;

pub use cgi::CgiScript;
pub use router::Router;
