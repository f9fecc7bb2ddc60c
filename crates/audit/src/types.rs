use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A resolved package from the lockfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identity used for de-duplication and vulnerability lookups.
    pub fn key(&self) -> DependencyKey {
        DependencyKey {
            name: self.name.to_lowercase(),
            version: self.version.clone(),
        }
    }

    /// Lowercase name with any `[extra]` suffix removed, used to match
    /// against top-level manifest names and to key update results.
    pub fn lookup_name(&self) -> String {
        self.name
            .split('[')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

/// `(lowercase name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyKey {
    pub name: String,
    pub version: String,
}

/// One advisory affecting a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub id: String,
    pub summary: Option<String>,
    /// All reported `TYPE: SCORE` pairs joined with `", "`.
    pub severity: Option<String>,
    pub affected_ranges: Vec<String>,
    /// Deduplicated and sorted.
    pub fixed_versions: Vec<String>,
    pub references: Vec<String>,
}

pub type VulnerabilityMap = HashMap<DependencyKey, Vec<VulnerabilityRecord>>;

/// Size of the jump between the installed and the latest release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    Patch,
    Minor,
    Major,
    Unknown,
}

impl UpdateType {
    /// Patch and minor updates are expected to be backwards compatible.
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Patch | Self::Minor)
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Result of looking up the latest release of a top-level package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub current: String,
    pub latest: Option<String>,
    pub update_type: Option<UpdateType>,
    pub is_breaking: bool,
}

impl UpdateInfo {
    /// A lookup that produced nothing usable.
    pub fn unavailable(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            latest: None,
            update_type: None,
            is_breaking: false,
        }
    }

    pub fn resolved(current: impl Into<String>, latest: impl Into<String>) -> Self {
        let current = current.into();
        let latest = latest.into();
        let update_type = crate::version::classify_update(&current, &latest);
        Self {
            current,
            latest: Some(latest),
            update_type: Some(update_type),
            is_breaking: update_type == UpdateType::Major,
        }
    }

    /// The latest release, when it differs from the installed one.
    pub fn available(&self) -> Option<&str> {
        self.latest
            .as_deref()
            .filter(|latest| *latest != self.current)
    }

    /// The latest release and its classification relative to `installed`,
    /// when the two differ. Used when one name is locked at several versions.
    pub fn available_for(&self, installed: &str) -> Option<(&str, UpdateType)> {
        let latest = self.latest.as_deref().filter(|latest| *latest != installed)?;
        Some((latest, crate::version::classify_update(installed, latest)))
    }
}

/// Update results keyed by [`Dependency::lookup_name`].
pub type UpdateMap = HashMap<String, UpdateInfo>;
