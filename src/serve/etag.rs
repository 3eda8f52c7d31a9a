use std::fs::Metadata;
use std::time::UNIX_EPOCH;

/// Weak ETag fingerprint from a file's stat: size and mtime in hex.
///
/// Deterministic for an unchanged file, changes when the file changes.
pub fn from_metadata(meta: &Metadata) -> String {
    let mtime_ms = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis())
        .unwrap_or(0);

    format!("W/\"{:x}-{:x}\"", meta.len(), mtime_ms)
}
