//! Version parsing, comparison, and range matching.
//!
//! Fixed versions use a segment ordering close to Maven's:
//! - Segments are split on `.` and `-`
//! - Numeric segments compare as numbers
//! - Non-numeric segments compare lexically (case-insensitive), except for
//!   well-known qualifiers which have a defined rank:
//!   `alpha` < `beta` < `milestone` < `rc` < `snapshot` < `release` < `""` < `sp`
//! - A qualified version sorts before the unqualified version with the same
//!   numeric prefix (`1.0-SNAPSHOT` < `1.0.RELEASE` < `1.0`)
//!
//! Dynamic expressions (`1.4.+`, `latest.release`, `[1.0,2.0)`) are held by
//! [`VersionRange`] and resolved against a list of available versions.

use std::cmp::Ordering;
use std::fmt;

use strata_util::errors::StrataError;

/// A fixed version with comparable segments.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    segments: Vec<Segment>,
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Qualifier(QualifierKind),
    Text(String),
}

/// Well-known qualifiers with defined ordering.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum QualifierKind {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Release,
    Sp,
}

impl Version {
    /// Parse a fixed version literal such as `1.2.3` or `4.3.6.RELEASE`.
    pub fn parse(version: &str) -> Result<Self, StrataError> {
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(malformed(version, "empty version"));
        }
        if let Some(c) = trimmed.chars().find(|c| is_reserved(*c)) {
            return Err(malformed(
                version,
                &format!("'{c}' is not allowed in a fixed version"),
            ));
        }
        Ok(Self::from_literal(trimmed))
    }

    fn from_literal(version: &str) -> Self {
        Self {
            original: version.to_string(),
            segments: parse_segments(version),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn is_snapshot(&self) -> bool {
        self.original.to_uppercase().ends_with("SNAPSHOT")
    }

    /// The base version without the `-SNAPSHOT` suffix.
    pub fn base_version(&self) -> &str {
        self.original
            .strip_suffix("-SNAPSHOT")
            .unwrap_or(&self.original)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.segments.len().max(other.segments.len());
        for i in 0..max_len {
            let a = self.segments.get(i);
            let b = other.segments.get(i);
            let ord = compare_segments(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(s), None) => compare_segment_to_empty(s),
        (None, Some(s)) => compare_segment_to_empty(s).reverse(),
        (Some(a), Some(b)) => compare_two_segments(a, b),
    }
}

fn compare_segment_to_empty(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(0) => Ordering::Equal,
        Segment::Numeric(_) => Ordering::Greater,
        Segment::Qualifier(QualifierKind::Sp) => Ordering::Greater,
        Segment::Qualifier(_) => Ordering::Less,
        Segment::Text(_) => Ordering::Less,
    }
}

fn compare_two_segments(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(b),
        (Segment::Qualifier(a), Segment::Qualifier(b)) => a.cmp(b),
        (Segment::Numeric(_), Segment::Qualifier(_)) => Ordering::Greater,
        (Segment::Qualifier(_), Segment::Numeric(_)) => Ordering::Less,
        (Segment::Numeric(_), Segment::Text(_)) => Ordering::Greater,
        (Segment::Text(_), Segment::Numeric(_)) => Ordering::Less,
        (Segment::Text(a), Segment::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Segment::Qualifier(q), Segment::Text(_)) => {
            if *q >= QualifierKind::Release {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Segment::Text(_), Segment::Qualifier(q)) => {
            if *q >= QualifierKind::Release {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

fn parse_segments(version: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for ch in version.chars() {
        if ch == '.' || ch == '-' {
            if !current.is_empty() {
                segments.push(classify(&current));
                current.clear();
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        segments.push(classify(&current));
    }

    segments
}

fn classify(token: &str) -> Segment {
    if let Ok(n) = token.parse::<u64>() {
        return Segment::Numeric(n);
    }
    match token.to_lowercase().as_str() {
        "alpha" | "a" => Segment::Qualifier(QualifierKind::Alpha),
        "beta" | "b" => Segment::Qualifier(QualifierKind::Beta),
        "milestone" | "m" => Segment::Qualifier(QualifierKind::Milestone),
        "rc" | "cr" => Segment::Qualifier(QualifierKind::Rc),
        "snapshot" => Segment::Qualifier(QualifierKind::Snapshot),
        "ga" | "final" | "release" => Segment::Qualifier(QualifierKind::Release),
        "sp" => Segment::Qualifier(QualifierKind::Sp),
        _ => Segment::Text(token.to_string()),
    }
}

fn is_reserved(c: char) -> bool {
    c.is_whitespace() || matches!(c, '+' | ',' | ':' | '[' | ']' | '(' | ')')
}

fn malformed(input: &str, reason: &str) -> StrataError {
    StrataError::MalformedVersion {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// A version as declared on a dependency: unspecified, fixed, or dynamic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    value: String,
    kind: RangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RangeKind {
    Unspecified,
    Fixed(Version),
    /// `1.4.+` keeps the prefix `1.4.`
    Prefix(String),
    Latest,
    LatestRelease,
    Interval(Interval),
}

/// A bracketed interval: `[1.0,2.0)`, `[1.0,]`, `(,2.0)`, `[1.0]` (exact).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl VersionRange {
    /// Parse a declared version expression.
    ///
    /// An empty string yields an unspecified version, to be filled in later by a
    /// version provider.
    pub fn parse(spec: &str) -> Result<Self, StrataError> {
        let s = spec.trim();
        let kind = if s.is_empty() {
            RangeKind::Unspecified
        } else if s.starts_with('[') || s.starts_with('(') {
            RangeKind::Interval(parse_interval(s)?)
        } else {
            match s.to_lowercase().as_str() {
                "+" | "latest" | "latest.integration" => RangeKind::Latest,
                "latest.release" => RangeKind::LatestRelease,
                _ => match s.strip_suffix('+') {
                    Some(prefix) if prefix.contains('+') => {
                        return Err(malformed(spec, "'+' is only allowed at the end"));
                    }
                    Some(prefix) => {
                        if let Some(c) = prefix.chars().find(|c| is_reserved(*c)) {
                            return Err(malformed(spec, &format!("unexpected '{c}'")));
                        }
                        RangeKind::Prefix(prefix.to_string())
                    }
                    None => RangeKind::Fixed(Version::parse(s)?),
                },
            }
        };
        Ok(Self {
            value: s.to_string(),
            kind,
        })
    }

    /// A version left for the version provider to fill in.
    pub fn unspecified() -> Self {
        Self {
            value: String::new(),
            kind: RangeKind::Unspecified,
        }
    }

    pub fn fixed(version: Version) -> Self {
        Self {
            value: version.as_str().to_string(),
            kind: RangeKind::Fixed(version),
        }
    }

    /// The expression as declared.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self.kind, RangeKind::Unspecified)
    }

    /// Whether this is a plain literal. Decidable without any repository access.
    pub fn is_fixed(&self) -> bool {
        matches!(self.kind, RangeKind::Fixed(_))
    }

    /// Whether this must be resolved against the available versions of a module.
    pub fn is_dynamic(&self) -> bool {
        !self.is_fixed() && !self.is_unspecified()
    }

    /// The literal version when [`is_fixed`](Self::is_fixed).
    pub fn fixed_version(&self) -> Option<&Version> {
        match &self.kind {
            RangeKind::Fixed(v) => Some(v),
            _ => None,
        }
    }

    /// Check if a candidate version satisfies this expression.
    pub fn matches(&self, candidate: &Version) -> bool {
        match &self.kind {
            RangeKind::Unspecified => false,
            RangeKind::Fixed(v) => v == candidate,
            RangeKind::Prefix(prefix) => candidate.as_str().starts_with(prefix.as_str()),
            RangeKind::Latest => true,
            RangeKind::LatestRelease => !candidate.is_snapshot(),
            RangeKind::Interval(interval) => interval.contains(candidate),
        }
    }

    /// Pick the highest available version matching this expression.
    pub fn select<'a>(&self, available: &'a [Version]) -> Option<&'a Version> {
        available.iter().filter(|v| self.matches(v)).max()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<Version> for VersionRange {
    fn from(version: Version) -> Self {
        Self::fixed(version)
    }
}

fn parse_interval(s: &str) -> Result<Interval, StrataError> {
    if s.len() < 2 || !(s.ends_with(']') || s.ends_with(')')) {
        return Err(malformed(s, "unterminated range"));
    }
    let open_inclusive = s.starts_with('[');
    let close_inclusive = s.ends_with(']');
    let inner = &s[1..s.len() - 1];

    let bound = |text: &str, inclusive: bool| -> Result<Option<Bound>, StrataError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(Bound {
            version: Version::parse(text).map_err(|_| malformed(s, "invalid range bound"))?,
            inclusive,
        }))
    };

    let interval = match inner.split_once(',') {
        Some((_, upper)) if upper.contains(',') => {
            return Err(malformed(s, "a range has at most two bounds"));
        }
        Some((lower, upper)) => Interval {
            lower: bound(lower, open_inclusive)?,
            upper: bound(upper, close_inclusive)?,
        },
        None => {
            // Exact version: [1.0] means exactly 1.0
            if !open_inclusive || !close_inclusive {
                return Err(malformed(s, "an exact range must use '[' and ']'"));
            }
            let exact = bound(inner, true)?.ok_or_else(|| malformed(s, "empty range"))?;
            Interval {
                lower: Some(exact.clone()),
                upper: Some(exact),
            }
        }
    };

    if interval.lower.is_none() && interval.upper.is_none() {
        return Err(malformed(s, "empty range"));
    }
    if let (Some(lower), Some(upper)) = (&interval.lower, &interval.upper) {
        if lower.version > upper.version {
            return Err(malformed(s, "lower bound is greater than upper bound"));
        }
    }
    Ok(interval)
}

impl Interval {
    /// Check if a version satisfies this interval.
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(ref lower) = self.lower {
            let cmp = version.cmp(&lower.version);
            if lower.inclusive {
                if cmp == Ordering::Less {
                    return false;
                }
            } else if cmp != Ordering::Greater {
                return false;
            }
        }
        if let Some(ref upper) = self.upper {
            let cmp = version.cmp(&upper.version);
            if upper.inclusive {
                if cmp == Ordering::Greater {
                    return false;
                }
            } else if cmp != Ordering::Less {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn three_part_ordering() {
        assert!(v("1.0.0") < v("1.0.1"));
        assert!(v("1.0.1") < v("1.1.0"));
        assert!(v("1.9") < v("1.10"));
    }

    #[test]
    fn qualifier_ordering() {
        assert!(v("1.0-alpha") < v("1.0-beta"));
        assert!(v("1.0-beta") < v("1.0-rc"));
        assert!(v("1.0-rc") < v("1.0-SNAPSHOT"));
        assert!(v("1.0-SNAPSHOT") < v("1.0.RELEASE"));
        assert!(v("1.0.RELEASE") < v("1.0"));
        assert!(v("1.0") < v("1.0-sp"));
    }

    #[test]
    fn release_qualified_numeric_ordering() {
        assert!(v("4.3.6.RELEASE") < v("4.3.14.RELEASE"));
        assert!(v("4.0.0.RELEASE") < v("4.3.6.RELEASE"));
    }

    #[test]
    fn trailing_zeros_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
    }

    #[test]
    fn numeric_beats_text() {
        assert!(v("1.0.0") > v("1.0.0-jre"));
        assert!(v("31.0-jre") < v("32.0-jre"));
    }

    #[test]
    fn text_segments_compare_lexically() {
        assert!(v("1.0-apple") < v("1.0-banana"));
    }

    #[test]
    fn snapshot_detection() {
        let snap = v("1.0-SNAPSHOT");
        assert!(snap.is_snapshot());
        assert_eq!(snap.base_version(), "1.0");
        assert!(!v("1.0.0").is_snapshot());
    }

    #[test]
    fn fixed_version_rejects_reserved_characters() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("1.0 beta").is_err());
        assert!(Version::parse("1.+").is_err());
        assert!(Version::parse("1:0").is_err());
    }

    #[test]
    fn parse_fixed_range() {
        let range = VersionRange::parse("1.5.3.RELEASE").unwrap();
        assert!(range.is_fixed());
        assert!(!range.is_dynamic());
        assert_eq!(range.fixed_version().unwrap().as_str(), "1.5.3.RELEASE");
    }

    #[test]
    fn parse_dynamic_forms() {
        for s in ["1.4.+", "+", "latest", "latest.release", "latest.integration", "[1.0,2.0)"] {
            let range = VersionRange::parse(s).unwrap();
            assert!(range.is_dynamic(), "{s} should be dynamic");
            assert_eq!(range.as_str(), s);
        }
    }

    #[test]
    fn parse_empty_is_unspecified() {
        let range = VersionRange::parse("  ").unwrap();
        assert!(range.is_unspecified());
        assert!(!range.is_fixed());
        assert!(!range.is_dynamic());
    }

    #[test]
    fn malformed_expressions() {
        for s in ["1.+.2", "[1.0", "[,]", "[2.0,1.0]", "[1.0,2.0,3.0]", "(1.0)", "1.0 2.0"] {
            let err = VersionRange::parse(s).unwrap_err();
            assert!(
                matches!(err, StrataError::MalformedVersion { .. }),
                "{s} should be malformed"
            );
        }
    }

    #[test]
    fn prefix_matches_within_range_only() {
        let range = VersionRange::parse("1.4.+").unwrap();
        assert!(range.matches(&v("1.4.0")));
        assert!(range.matches(&v("1.4.7.RELEASE")));
        assert!(!range.matches(&v("1.5.0")));
        assert!(!range.matches(&v("1.40.0")));
    }

    #[test]
    fn select_highest_matching() {
        let available = vec![v("1.4.0"), v("1.4.7"), v("1.5.0")];
        let range = VersionRange::parse("1.4.+").unwrap();
        assert_eq!(range.select(&available).unwrap().as_str(), "1.4.7");

        let latest = VersionRange::parse("latest").unwrap();
        assert_eq!(latest.select(&available).unwrap().as_str(), "1.5.0");
    }

    #[test]
    fn latest_release_skips_snapshots() {
        let available = vec![v("1.0"), v("2.0-SNAPSHOT")];
        let range = VersionRange::parse("latest.release").unwrap();
        assert_eq!(range.select(&available).unwrap().as_str(), "1.0");
    }

    #[test]
    fn interval_bounds() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        assert!(range.matches(&v("1.0")));
        assert!(range.matches(&v("1.9.9")));
        assert!(!range.matches(&v("2.0")));

        let open = VersionRange::parse("(,2.0]").unwrap();
        assert!(open.matches(&v("0.1")));
        assert!(open.matches(&v("2.0")));

        let exact = VersionRange::parse("[1.5]").unwrap();
        assert!(exact.matches(&v("1.5")));
        assert!(!exact.matches(&v("1.6")));
    }

    #[test]
    fn unspecified_matches_nothing() {
        assert!(!VersionRange::unspecified().matches(&v("1.0")));
    }
}
