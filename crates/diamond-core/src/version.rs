//! Package version parsing, comparison, and range matching.
//!
//! Versions use a lenient dotted ordering:
//! - Segments are split on `.` and `-`
//! - Numeric segments compare as numbers
//! - String qualifiers have a special ordering:
//!   `alpha` < `beta` < `milestone` < `rc` < `snapshot` < `""` (release) < `sp`
//! - Trailing zero and release segments are insignificant, so `1.0 == 1.0.0`

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use diamond_util::errors::DiamondError;
use serde::{Deserialize, Serialize};

/// A parsed package version with comparable segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComparableVersion {
    pub original: String,
    segments: Vec<Segment>,
}

impl PartialEq for ComparableVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ComparableVersion {}

impl Hash for ComparableVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `Ord`: insignificant trailing segments are skipped.
        self.significant_segments().hash(state);
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
enum Segment {
    Numeric(u64),
    Qualifier(QualifierKind),
    /// Unknown qualifier, stored lowercased.
    Text(String),
}

/// Well-known qualifiers with defined ordering.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
enum QualifierKind {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Release,
    Sp,
}

impl ComparableVersion {
    pub fn parse(version: &str) -> Self {
        let segments = parse_segments(version.trim());
        Self {
            original: version.trim().to_string(),
            segments,
        }
    }

    fn significant_segments(&self) -> &[Segment] {
        let mut end = self.segments.len();
        while end > 0 && compare_segment_to_empty(&self.segments[end - 1]) == Ordering::Equal {
            end -= 1;
        }
        &self.segments[..end]
    }
}

impl FromStr for ComparableVersion {
    type Err = DiamondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(DiamondError::Metadata {
                message: "empty version string".to_string(),
            });
        }
        Ok(Self::parse(s))
    }
}

impl TryFrom<String> for ComparableVersion {
    type Error = DiamondError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComparableVersion> for String {
    fn from(value: ComparableVersion) -> Self {
        value.original
    }
}

impl fmt::Display for ComparableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for ComparableVersion {
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

impl PartialOrd for ComparableVersion {
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
        Segment::Qualifier(q) => q.cmp(&QualifierKind::Release),
        Segment::Text(s) if s.is_empty() => Ordering::Equal,
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
        (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
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
    let lower = token.to_lowercase();
    match lower.as_str() {
        "alpha" | "a" => Segment::Qualifier(QualifierKind::Alpha),
        "beta" | "b" => Segment::Qualifier(QualifierKind::Beta),
        "milestone" | "m" => Segment::Qualifier(QualifierKind::Milestone),
        "rc" | "cr" => Segment::Qualifier(QualifierKind::Rc),
        "snapshot" => Segment::Qualifier(QualifierKind::Snapshot),
        "ga" | "final" | "release" => Segment::Qualifier(QualifierKind::Release),
        "sp" => Segment::Qualifier(QualifierKind::Sp),
        _ => Segment::Text(lower),
    }
}

/// A version range expression.
///
/// Supports interval notation `[1.0,2.0)`, `[1.0,]`, `(,2.0)`, `[1.0]`
/// (exact), and a bare version `1.0` meaning "1.0 or higher".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: ComparableVersion,
    pub inclusive: bool,
}

impl VersionRange {
    /// A range without bounds.
    pub fn all() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// `version` or higher.
    pub fn at_least(version: ComparableVersion) -> Self {
        Self {
            lower: Some(Bound {
                version,
                inclusive: true,
            }),
            upper: None,
        }
    }

    /// Exactly `version`.
    pub fn exact(version: ComparableVersion) -> Self {
        Self {
            lower: Some(Bound {
                version: version.clone(),
                inclusive: true,
            }),
            upper: Some(Bound {
                version,
                inclusive: true,
            }),
        }
    }

    /// Parse a range string.
    pub fn parse(input: &str) -> Result<Self, DiamondError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(invalid_range(input, "empty range"));
        }

        if !s.starts_with('[') && !s.starts_with('(') {
            return Ok(Self::at_least(ComparableVersion::parse(s)));
        }

        if s.len() < 2 || !(s.ends_with(']') || s.ends_with(')')) {
            return Err(invalid_range(input, "unterminated interval"));
        }

        let open_inclusive = s.starts_with('[');
        let close_inclusive = s.ends_with(']');
        let inner = &s[1..s.len() - 1];

        let range = if let Some((lower, upper)) = inner.split_once(',') {
            let lower = lower.trim();
            let upper = upper.trim();
            VersionRange {
                lower: (!lower.is_empty()).then(|| Bound {
                    version: ComparableVersion::parse(lower),
                    inclusive: open_inclusive,
                }),
                upper: (!upper.is_empty()).then(|| Bound {
                    version: ComparableVersion::parse(upper),
                    inclusive: close_inclusive,
                }),
            }
        } else {
            let inner = inner.trim();
            if inner.is_empty() || !open_inclusive || !close_inclusive {
                return Err(invalid_range(input, "exact versions use `[x]`"));
            }
            Self::exact(ComparableVersion::parse(inner))
        };

        if let (Some(lower), Some(upper)) = (&range.lower, &range.upper) {
            if lower.version > upper.version {
                return Err(invalid_range(input, "lower bound exceeds upper bound"));
            }
        }

        Ok(range)
    }

    /// Check if a version satisfies this range.
    pub fn satisfies(&self, version: &ComparableVersion) -> bool {
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

    /// Interval notation that [`VersionRange::parse`] reads back.
    pub fn to_normalized_string(&self) -> String {
        match (&self.lower, &self.upper) {
            (Some(l), None) if l.inclusive => l.version.to_string(),
            (Some(l), Some(u)) if l.inclusive && u.inclusive && l.version == u.version => {
                format!("[{}]", l.version)
            }
            (lower, upper) => format!(
                "{}{},{}{}",
                if lower.as_ref().is_some_and(|b| b.inclusive) { '[' } else { '(' },
                lower.as_ref().map(|b| b.version.to_string()).unwrap_or_default(),
                upper.as_ref().map(|b| b.version.to_string()).unwrap_or_default(),
                if upper.as_ref().is_some_and(|b| b.inclusive) { ']' } else { ')' },
            ),
        }
    }
}

fn invalid_range(input: &str, reason: &str) -> DiamondError {
    DiamondError::Metadata {
        message: format!("invalid version range `{input}`: {reason}"),
    }
}

impl FromStr for VersionRange {
    type Err = DiamondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = DiamondError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(value: VersionRange) -> Self {
        value.to_normalized_string()
    }
}

/// Human-readable form used in conflict messages: `>= 1.0`, `[1.0, 2.0)`, `= 1.5`.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.lower, &self.upper) {
            (None, None) => f.write_str("*"),
            (Some(l), None) => {
                write!(f, "{} {}", if l.inclusive { ">=" } else { ">" }, l.version)
            }
            (None, Some(u)) => {
                write!(f, "{} {}", if u.inclusive { "<=" } else { "<" }, u.version)
            }
            (Some(l), Some(u)) if l.inclusive && u.inclusive && l.version == u.version => {
                write!(f, "= {}", l.version)
            }
            (Some(l), Some(u)) => write!(
                f,
                "{}{}, {}{}",
                if l.inclusive { '[' } else { '(' },
                l.version,
                u.version,
                if u.inclusive { ']' } else { ')' },
            ),
        }
    }
}
