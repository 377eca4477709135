// Dotted version strings: normalization and ordering.
//
// Tags come in as "v1.2.0", "1.2", "Release 1.3 beta"... Everything but digits
// and dots is dropped, then the dotted segments are compared numerically with
// missing trailing segments treated as 0.

use std::cmp::Ordering;
use std::fmt;

/// A parsed version: one or more numeric segments.
///
/// Equality and ordering pad the shorter side with zeros, so `1.2 == 1.2.0`.
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    /// Parse a raw version string. `None` when no numeric segment survives.
    pub fn parse(raw: &str) -> Option<Self> {
        let kept = normalize(raw)?;
        let segments: Vec<u64> = kept
            .split('.')
            .filter(|s| !s.is_empty())
            // Only digits remain, so the sole failure mode is overflow.
            .map(|s| s.parse::<u64>().unwrap_or(u64::MAX))
            .collect();

        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let n = self.segments.len().max(other.segments.len());
        for i in 0..n {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.segments {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
            first = false;
        }
        Ok(())
    }
}

/// Trim, drop one leading `v`/`V`, keep only ASCII digits and dots.
///
/// Returns `None` when the result contains no digit at all; this is also the
/// display form of a release tag ("v1.1.0" -> "1.1.0").
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let no_prefix = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let kept: String = no_prefix
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if kept.chars().any(|c| c.is_ascii_digit()) {
        Some(kept)
    } else {
        None
    }
}

/// Returns true if `a` is newer than `b`.
///
/// Total over all strings: if either side has no numeric segment the answer
/// is `false`.
pub fn is_newer(a: &str, b: &str) -> bool {
    match (Version::parse(a), Version::parse(b)) {
        (Some(va), Some(vb)) => va > vb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_at_first_differing_segment() {
        assert!(is_newer("2.0", "1.9.9"));
        assert!(is_newer("2", "1.9.9"));
        assert!(is_newer("1.10", "1.9"));
        assert!(!is_newer("1.9.9", "2.0"));
    }

    #[test]
    fn trailing_zeros_compare_equal() {
        assert!(!is_newer("1.2", "1.2.0"));
        assert!(!is_newer("1.2.0", "1.2"));
        assert_eq!(Version::parse("1.2"), Version::parse("1.2.0"));
    }

    #[test]
    fn same_version_is_never_newer() {
        for v in ["0", "1.0.0", "v3.4", "10.20.30.40"] {
            assert!(!is_newer(v, v), "{} should not be newer than itself", v);
        }
    }

    #[test]
    fn unparseable_side_is_not_newer() {
        assert!(!is_newer("abc", "1.0"));
        assert!(!is_newer("1.0", "abc"));
        assert!(!is_newer("", ""));
        assert!(!is_newer("2.0", "dev"));
    }

    #[test]
    fn normalize_strips_prefix_and_noise() {
        assert_eq!(normalize("v1.1.0").as_deref(), Some("1.1.0"));
        assert_eq!(normalize("  V2.0 ").as_deref(), Some("2.0"));
        assert_eq!(normalize("1.3-beta2").as_deref(), Some("1.32"));
        assert_eq!(normalize("release"), None);
        assert_eq!(normalize("v"), None);
        assert_eq!(normalize("..."), None);
    }

    #[test]
    fn normalize_is_none_iff_no_digit() {
        for s in ["", "abc", "v", "vv", "v.", "x.y", "1", "a1", "v0", "..7.."] {
            let stripped = s.trim();
            let stripped = stripped
                .strip_prefix(|c: char| c == 'v' || c == 'V')
                .unwrap_or(stripped);
            let has_digit = stripped.chars().any(|c| c.is_ascii_digit());
            assert_eq!(normalize(s).is_none(), !has_digit, "input {:?}", s);
            assert_eq!(Version::parse(s).is_none(), !has_digit, "input {:?}", s);
        }
    }

    #[test]
    fn empty_segments_are_skipped() {
        let v = Version::parse("1..2").unwrap();
        assert_eq!(v.segments(), &[1, 2]);
        assert_eq!(v.to_string(), "1.2");
    }

    #[test]
    fn oversized_segment_saturates() {
        let v = Version::parse("99999999999999999999999").unwrap();
        assert_eq!(v.segments(), &[u64::MAX]);
    }
}
