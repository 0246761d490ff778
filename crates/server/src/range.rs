//! Single-range `Range` header parsing for audio streaming.

/// An inclusive byte window within a file of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parses a `Range` header against the file size. Multi-range requests,
/// malformed values, and windows past the end of the file all yield `None`,
/// which callers answer with 416.
#[must_use]
pub fn parse_range(header: &str, file_size: u64) -> Option<ByteRange> {
    let spec = header.strip_prefix("bytes=")?.trim();
    if spec.contains(',') || file_size == 0 {
        return None;
    }

    let (start_raw, end_raw) = spec.split_once('-')?;
    let clamp_end = file_size - 1;

    if start_raw.is_empty() {
        // Suffix form: the last N bytes.
        let suffix: u64 = end_raw.parse().ok()?;
        if suffix == 0 {
            return None;
        }
        return Some(ByteRange {
            start: file_size.saturating_sub(suffix),
            end: clamp_end,
        });
    }

    let start: u64 = start_raw.parse().ok()?;
    if start > clamp_end {
        return None;
    }

    let end = if end_raw.is_empty() {
        clamp_end
    } else {
        let requested: u64 = end_raw.parse().ok()?;
        if requested < start {
            return None;
        }
        requested.min(clamp_end)
    };

    Some(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_range_is_honored() {
        let range = parse_range("bytes=0-499", 1000).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 499 });
        assert_eq!(range.len(), 500);
    }

    #[test]
    fn open_range_runs_to_the_end() {
        assert_eq!(
            parse_range("bytes=500-", 1000),
            Some(ByteRange {
                start: 500,
                end: 999
            })
        );
    }

    #[test]
    fn suffix_range_takes_the_tail() {
        assert_eq!(
            parse_range("bytes=-200", 1000),
            Some(ByteRange {
                start: 800,
                end: 999
            })
        );
    }

    #[test]
    fn end_is_clamped_to_the_file() {
        assert_eq!(
            parse_range("bytes=900-5000", 1000),
            Some(ByteRange {
                start: 900,
                end: 999
            })
        );
    }

    #[test]
    fn rejects_start_past_the_end() {
        assert_eq!(parse_range("bytes=1000-1200", 1000), None);
    }

    #[test]
    fn rejects_malformed_specs() {
        assert_eq!(parse_range("bytes=abc-", 1000), None);
        assert_eq!(parse_range("items=0-10", 1000), None);
        assert_eq!(parse_range("bytes=0-10,20-30", 1000), None);
        assert_eq!(parse_range("bytes=10-5", 1000), None);
        assert_eq!(parse_range("bytes=0-10", 0), None);
    }
}
