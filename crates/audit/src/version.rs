// Release-delta classification on numeric version prefixes.
//
// This is not PEP 440 or semver precedence: pre-release tags, local versions
// and build metadata only terminate the numeric prefix.

use crate::types::UpdateType;
use std::cmp::Ordering;

/// One numeric release component, compared by value with no width limit.
///
/// Leading zeros are stripped, so zero is the empty digit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component<'a>(&'a str);

const ZERO: Component<'static> = Component("");

impl<'a> Component<'a> {
    fn new(digits: &'a str) -> Self {
        Self(digits.trim_start_matches('0'))
    }

    pub fn digits(&self) -> &'a str {
        if self.0.is_empty() {
            "0"
        } else {
            self.0
        }
    }
}

impl Ord for Component<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.len().cmp(&other.0.len()).then_with(|| self.0.cmp(other.0))
    }
}

impl PartialOrd for Component<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Leading numeric components of a version, e.g. `1.2.3.post1` -> `[1, 2, 3]`.
///
/// Segments are split on `.`, `-` and `+`; collection stops at the first
/// segment that is empty or does not start with a digit.
pub fn numeric_prefix(version: &str) -> Vec<Component<'_>> {
    let mut parts = Vec::new();
    for segment in version.split(['.', '-', '+']) {
        let digits = &segment[..segment
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(segment.len())];
        if digits.is_empty() {
            break;
        }
        parts.push(Component::new(digits));
    }
    parts
}

/// Classify the jump from `current` to `candidate`.
pub fn classify_update(current: &str, candidate: &str) -> UpdateType {
    let mut current = numeric_prefix(current);
    let mut candidate = numeric_prefix(candidate);
    if current.is_empty() || candidate.is_empty() {
        return UpdateType::Unknown;
    }

    let width = current.len().max(candidate.len()).max(3);
    current.resize(width, ZERO);
    candidate.resize(width, ZERO);

    if candidate[0] > current[0] {
        UpdateType::Major
    } else if candidate[0] == current[0] && candidate[1] > current[1] {
        UpdateType::Minor
    } else if candidate[0] == current[0]
        && candidate[1] == current[1]
        && candidate[2] > current[2]
    {
        UpdateType::Patch
    } else {
        UpdateType::Unknown
    }
}
