// Markdown rendering of the audit report.
//
// `render` is pure: the report date is an argument and nothing is read from
// disk or the network, so the same inputs always produce the same document.

use crate::types::{Dependency, UpdateMap, UpdateType, VulnerabilityMap};
use chrono::NaiveDate;

const MAX_REFERENCES: usize = 3;

/// Render the full report.
pub fn render(
    dependencies: &[Dependency],
    vulnerabilities: &VulnerabilityMap,
    updates: &UpdateMap,
    system_packages: &[String],
    generated_on: NaiveDate,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# Dependency Audit — {}", generated_on.format("%Y-%m-%d")));
    lines.push(String::new());
    lines.push(
        "Scope: Python (uv.lock/pyproject.toml); Dockerfile apt packages (informational)."
            .to_string(),
    );
    lines.push(String::new());

    render_dependencies(&mut lines, dependencies, vulnerabilities, updates);
    lines.push(String::new());
    render_system_packages(&mut lines, system_packages);
    lines.push(String::new());
    render_update_summary(&mut lines, dependencies, updates);
    lines.push(String::new());
    render_next_steps(&mut lines);

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn render_dependencies(
    lines: &mut Vec<String>,
    dependencies: &[Dependency],
    vulnerabilities: &VulnerabilityMap,
    updates: &UpdateMap,
) {
    lines.push("## Python (uv.lock)".to_string());
    if dependencies.is_empty() {
        lines.push("- No uv.lock found or no packages parsed.".to_string());
        return;
    }

    let mut sorted: Vec<&Dependency> = dependencies.iter().collect();
    sorted.sort_by_cached_key(|d| (d.name.to_lowercase(), d.version.clone()));

    for dep in sorted {
        let mut line = format!("- {}", dep);
        if let Some(update) = updates.get(&dep.lookup_name()) {
            if let Some((latest, kind)) = update.available_for(&dep.version) {
                line.push_str(&format!(" | Update available: {} ({})", latest, kind));
                if kind == UpdateType::Major {
                    line.push_str(" — potential breaking changes");
                }
            }
        }
        lines.push(line);

        for vuln in vulnerabilities.get(&dep.key()).into_iter().flatten() {
            let mut line = format!("  - Vulnerability: {}", vuln.id);
            if let Some(severity) = &vuln.severity {
                line.push_str(&format!(" | Severity: {}", severity));
            }
            if !vuln.fixed_versions.is_empty() {
                line.push_str(&format!(" | Fixed in: {}", vuln.fixed_versions.join(", ")));
            }
            lines.push(line);

            if let Some(summary) = &vuln.summary {
                lines.push(format!("    - {}", summary));
            }
            if !vuln.references.is_empty() {
                let shown: Vec<&str> = vuln
                    .references
                    .iter()
                    .take(MAX_REFERENCES)
                    .map(String::as_str)
                    .collect();
                lines.push(format!("    - Refs: {}", shown.join(", ")));
            }
        }
    }
}

fn render_system_packages(lines: &mut Vec<String>, system_packages: &[String]) {
    lines.push("## Dockerfile apt packages".to_string());
    if system_packages.is_empty() {
        lines.push("- No apt packages installed (or none detected).".to_string());
        return;
    }
    for package in system_packages {
        lines.push(format!("- {}", package));
    }
    lines.push(
        "- Note: apt packages are listed for information only; they are not scanned for vulnerabilities."
            .to_string(),
    );
}

fn render_update_summary(lines: &mut Vec<String>, dependencies: &[Dependency], updates: &UpdateMap) {
    let mut safe = Vec::new();
    let mut breaking = Vec::new();

    for dep in dependencies {
        let Some(update) = updates.get(&dep.lookup_name()) else {
            continue;
        };
        let Some((latest, kind)) = update.available_for(&dep.version) else {
            continue;
        };
        let entry = format!("{} {} -> {} ({})", dep.name, dep.version, latest, kind);
        if kind.is_safe() {
            safe.push(entry);
        } else if kind == UpdateType::Major {
            breaking.push(entry);
        }
    }
    safe.sort();
    breaking.sort();

    lines.push("## Update summary".to_string());
    lines.push("### Patch/Minor (safe to apply after tests)".to_string());
    if safe.is_empty() {
        lines.push("- No patch/minor updates available.".to_string());
    }
    lines.extend(safe.into_iter().map(|e| format!("- {}", e)));

    lines.push(String::new());
    lines.push(
        "### Major updates (potential breaking changes — review before applying)".to_string(),
    );
    if breaking.is_empty() {
        lines.push("- No major updates available.".to_string());
    }
    lines.extend(breaking.into_iter().map(|e| format!("- {}", e)));
}

fn render_next_steps(lines: &mut Vec<String>) {
    lines.push("## Next steps".to_string());
    lines.push("- Apply patch/minor updates where the test suite passes.".to_string());
    lines.push("- For major updates, review changelogs and breaking changes before upgrading.".to_string());
    lines.push(
        "- Upgrade packages with known vulnerabilities to one of the listed fixed versions."
            .to_string(),
    );
}
