// Parsers for uv.lock and pyproject.toml.
//
// A missing file is not an error: the audit reports an explicit "not found"
// placeholder instead. A file that exists but is not valid TOML is.

use crate::error::{AuditError, AuditResult};
use crate::types::{Dependency, DependencyKey};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Read a file that may legitimately be absent.
pub(crate) fn read_optional(path: &Path) -> AuditResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|source| AuditError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn load_toml(path: &Path) -> AuditResult<Option<toml::Value>> {
    let Some(content) = read_optional(path)? else {
        return Ok(None);
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| AuditError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Resolved packages from a uv lockfile.
///
/// Every `[[package]]` table with a non-empty string `name` and `version`
/// becomes a [`Dependency`]; other entries are skipped. Entries sharing a
/// [`DependencyKey`] collapse into one: the last occurrence wins, placed at
/// the position of the first.
pub fn parse_lockfile(path: &Path) -> AuditResult<Vec<Dependency>> {
    let Some(lock) = load_toml(path)? else {
        tracing::info!(path = %path.display(), "Lockfile not found");
        return Ok(Vec::new());
    };

    let mut dependencies: Vec<Dependency> = Vec::new();
    let mut positions: HashMap<DependencyKey, usize> = HashMap::new();

    let packages = lock
        .get("package")
        .and_then(|p| p.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    for package in packages {
        let field = |key: &str| {
            package
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
        };
        let (Some(name), Some(version)) = (field("name"), field("version")) else {
            continue;
        };

        let dependency = Dependency::new(name, version);
        match positions.get(&dependency.key()) {
            Some(&index) => dependencies[index] = dependency,
            None => {
                positions.insert(dependency.key(), dependencies.len());
                dependencies.push(dependency);
            }
        }
    }

    tracing::debug!(count = dependencies.len(), "Parsed lockfile packages");
    Ok(dependencies)
}

/// Leading distribution name of a requirement specifier, e.g.
/// `"pkg[extra]>=1.2.3"` -> `"pkg"`.
pub fn requirement_name(specifier: &str) -> Option<&str> {
    let end = specifier
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        .unwrap_or(specifier.len());
    let name = &specifier[..end];
    (!name.is_empty()).then_some(name)
}

/// Lowercased names of the packages declared in `[project].dependencies`.
pub fn parse_manifest_top_level_names(path: &Path) -> AuditResult<BTreeSet<String>> {
    let Some(manifest) = load_toml(path)? else {
        tracing::info!(path = %path.display(), "Manifest not found");
        return Ok(BTreeSet::new());
    };

    let names = manifest
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_str())
                .filter_map(requirement_name)
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default();

    Ok(names)
}
