//! Dotted version comparison.

use std::cmp::Ordering;

/// A version compared numerically segment by segment.
///
/// `"5.10"` is greater than `"5.9"`, and missing trailing segments count as
/// zero, so `"5.3"` equals `"5.3.0"`.
///
/// A `dev`, `alpha`/`a`, `beta`/`b` or `rc` suffix marks a pre-release, which
/// sorts below the plain version in that order: `8.3.0-dev < 8.3.0alpha1 <
/// 8.3.0RC1 < 8.3.0RC2 < 8.3.0`. Any other suffix is ignored. A segment too
/// large for `u64` saturates instead of wrapping to zero.
///
/// # Example
///
/// ```rust
/// use install_preflight::DottedVersion;
///
/// let host = DottedVersion::parse("5.6.2");
/// assert!(host >= DottedVersion::parse("5.3.0"));
/// assert!(DottedVersion::parse("5.2.9") < DottedVersion::parse("5.3.0"));
/// assert!(DottedVersion::parse("8.3.0RC1") < DottedVersion::parse("8.3.0"));
/// ```
#[derive(Debug, Clone)]
pub struct DottedVersion {
    segments: Vec<u64>,
    pre_release: Option<PreRelease>,
}

/// Pre-release stage, ordered from earliest to latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Dev,
    Alpha,
    Beta,
    Rc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PreRelease {
    stage: Stage,
    number: u64,
}

impl DottedVersion {
    /// Parse a dotted version string. Never fails; unparsable segments are zero.
    ///
    /// Parsing stops at the first pre-release marker.
    pub fn parse(input: &str) -> Self {
        let mut segments = Vec::new();
        let mut pre_release = None;

        for segment in input.trim().split('.') {
            let split = segment
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(segment.len());
            let (digits, suffix) = segment.split_at(split);
            let pre = parse_pre_release(suffix);
            if !digits.is_empty() || pre.is_none() {
                segments.push(parse_number(digits));
            }
            if pre.is_some() {
                pre_release = pre;
                break;
            }
        }

        Self {
            segments,
            pre_release,
        }
    }

    /// Numeric segments as parsed.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Whether the version carries a pre-release marker.
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

/// Parse a run of ASCII digits, saturating at `u64::MAX`. Empty is zero.
fn parse_number(digits: &str) -> u64 {
    digits.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    })
}

/// Recognize a pre-release marker such as `RC1`, `-dev` or `beta2`.
fn parse_pre_release(suffix: &str) -> Option<PreRelease> {
    let tag = suffix
        .trim_start_matches(['-', '_', '+'])
        .to_ascii_lowercase();
    let letters_end = tag
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(tag.len());
    let (word, rest) = tag.split_at(letters_end);

    let stage = match word {
        "dev" => Stage::Dev,
        "alpha" | "a" => Stage::Alpha,
        "beta" | "b" => Stage::Beta,
        "rc" => Stage::Rc,
        _ => return None,
    };
    let digits: String = rest
        .trim_start_matches(['-', '_', '.'])
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    Some(PreRelease {
        stage,
        number: parse_number(&digits),
    })
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DottedVersion {}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}
