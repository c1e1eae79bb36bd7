//! `range` header parsing and resolution against a content length.

use super::error::{NfsError, NfsResult};

/// A single byte range as sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=start-end`, both inclusive
    Bounded(u64, u64),
    /// `bytes=start-`
    From(u64),
    /// `bytes=-n`, the last n bytes
    Suffix(u64),
}

impl ByteRange {
    /// Parse a `range` header value such as `bytes=0-10`.
    pub fn parse(header: &str) -> NfsResult<Self> {
        let header = header.trim();
        let (unit, set) = header
            .split_once('=')
            .ok_or_else(|| invalid(format!("malformed range header '{}'", header)))?;

        if !unit.trim().eq_ignore_ascii_case("bytes") {
            return Err(invalid(format!(
                "range unit must be bytes, got '{}'",
                unit.trim()
            )));
        }

        let set = set.trim();
        if set.contains(',') {
            return Err(invalid("multiple ranges are not supported".to_string()));
        }

        let (start, end) = set
            .split_once('-')
            .ok_or_else(|| invalid(format!("malformed range '{}'", set)))?;
        let parse_bound = |bound: &str| {
            bound
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid(format!("malformed range '{}'", set)))
        };

        match (start.trim().is_empty(), end.trim().is_empty()) {
            (true, true) => Err(invalid(format!("malformed range '{}'", set))),
            (true, false) => Ok(ByteRange::Suffix(parse_bound(end)?)),
            (false, true) => Ok(ByteRange::From(parse_bound(start)?)),
            (false, false) => {
                let (start, end) = (parse_bound(start)?, parse_bound(end)?);
                if start > end {
                    return Err(invalid(format!(
                        "range start {} is after range end {}",
                        start, end
                    )));
                }
                Ok(ByteRange::Bounded(start, end))
            }
        }
    }

    /// Resolve to inclusive `(start, end)` offsets for content of `total`
    /// bytes. An end past the content is clamped to the last byte. An empty
    /// content resolves to `(0, 0)`.
    pub fn resolve(&self, total: u64) -> NfsResult<(u64, u64)> {
        if total == 0 {
            return match self {
                ByteRange::Bounded(0, _) | ByteRange::From(0) | ByteRange::Suffix(_) => Ok((0, 0)),
                _ => Err(invalid("range start exceeds file size 0".to_string())),
            };
        }

        let last = total - 1;
        match *self {
            ByteRange::Bounded(start, end) => {
                if start > last {
                    return Err(start_past_end(start, total));
                }
                Ok((start, end.min(last)))
            }
            ByteRange::From(start) => {
                if start > last {
                    return Err(start_past_end(start, total));
                }
                Ok((start, last))
            }
            ByteRange::Suffix(0) => Err(invalid("suffix range length must be positive".to_string())),
            ByteRange::Suffix(n) => Ok((total.saturating_sub(n), last)),
        }
    }
}

fn invalid(reason: String) -> NfsError {
    NfsError::InvalidRange(reason)
}

fn start_past_end(start: u64, total: u64) -> NfsError {
    invalid(format!("range start {} exceeds file size {}", start, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(ByteRange::parse("bytes=0-10").unwrap(), ByteRange::Bounded(0, 10));
        assert_eq!(ByteRange::parse("bytes=5-").unwrap(), ByteRange::From(5));
        assert_eq!(ByteRange::parse("bytes=-3").unwrap(), ByteRange::Suffix(3));
        assert_eq!(ByteRange::parse(" bytes = 1 - 2 ").unwrap(), ByteRange::Bounded(1, 2));
    }

    #[test]
    fn test_parse_rejects_other_units() {
        let err = ByteRange::parse("data=").unwrap_err();
        assert!(matches!(err, NfsError::InvalidRange(_)));
        assert!(err.to_string().contains("range"));
        assert!(ByteRange::parse("items=0-1").is_err());
        assert!(ByteRange::parse("bytes").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ByteRange::parse("bytes=-").is_err());
        assert!(ByteRange::parse("bytes=a-b").is_err());
        assert!(ByteRange::parse("bytes=5-1").is_err());
        assert!(ByteRange::parse("bytes=0-1,3-4").is_err());
    }

    #[test]
    fn test_resolve_clamps_end() {
        let len = "This is test file".len() as u64;
        let range = ByteRange::Bounded(0, len + 10);
        assert_eq!(range.resolve(len).unwrap(), (0, len - 1));
    }

    #[test]
    fn test_resolve_start_past_end() {
        assert!(ByteRange::Bounded(20, 30).resolve(10).is_err());
        assert!(ByteRange::From(10).resolve(10).is_err());
        assert_eq!(ByteRange::From(9).resolve(10).unwrap(), (9, 9));
    }

    #[test]
    fn test_resolve_suffix() {
        assert_eq!(ByteRange::Suffix(3).resolve(10).unwrap(), (7, 9));
        assert_eq!(ByteRange::Suffix(30).resolve(10).unwrap(), (0, 9));
        assert!(ByteRange::Suffix(0).resolve(10).is_err());
    }

    #[test]
    fn test_resolve_empty_content() {
        assert_eq!(ByteRange::Bounded(0, 10).resolve(0).unwrap(), (0, 0));
        assert!(ByteRange::From(1).resolve(0).is_err());
    }
}
