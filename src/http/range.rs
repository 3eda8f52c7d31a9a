/// A concrete inclusive byte window within a resource of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes in the inclusive window. An inverted window
    /// counts as a single byte rather than underflowing.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }

    /// A window touching bytes at or past the end of the resource, or an
    /// inverted one (`start > end`), cannot be satisfied (answered with
    /// 416).
    pub fn satisfiable(&self, total: u64) -> bool {
        self.start <= self.end && self.start < total && self.end < total
    }
}

/// Turns a `Range` header into a concrete start/end pair.
///
/// Understands the single-range `bytes=START-END` form, with either group
/// optional: `bytes=5-` runs to the end of the resource and `bytes=-5` is
/// the five-byte suffix. Returns `None` for anything else; the caller
/// treats that as "no range requested". Multi-range is not supported.
pub fn compute_range(header: &str, total: u64) -> Option<ByteRange> {
    let spec = header.strip_prefix("bytes=")?;
    let (start_str, end_str) = spec.split_once('-')?;

    if !start_str.bytes().all(|b| b.is_ascii_digit())
        || !end_str.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    match (start_str.is_empty(), end_str.is_empty()) {
        // "bytes=-"
        (true, true) => None,

        // "bytes=START-"
        (false, true) => {
            let start = start_str.parse().ok()?;
            Some(ByteRange {
                start,
                end: total.saturating_sub(1),
            })
        }

        // "bytes=-SUFFIX"
        (true, false) => {
            let suffix: u64 = end_str.parse().ok()?;
            Some(ByteRange {
                start: total.saturating_sub(suffix),
                end: total.saturating_sub(1),
            })
        }

        // "bytes=START-END"
        (false, false) => Some(ByteRange {
            start: start_str.parse().ok()?,
            end: end_str.parse().ok()?,
        }),
    }
}
