// Informational scan of OS packages installed by a Dockerfile.
//
// This is a text heuristic, not a Dockerfile or shell parser. Its output is
// only listed in the report and never feeds vulnerability or update lookups.

use crate::error::AuditResult;
use crate::manifest::read_optional;
use std::collections::BTreeSet;
use std::path::Path;

const INSTALL_COMMANDS: &[&str] = &["apt-get install", "apt install"];

const NOISE_TOKENS: &[&str] = &["\\", "rm", "apt-get", "apt", "clean", "install"];

/// Package names passed to `apt-get install` / `apt install`, deduplicated
/// and sorted.
pub fn parse_system_packages(path: &Path) -> AuditResult<Vec<String>> {
    let Some(content) = read_optional(path)? else {
        return Ok(Vec::new());
    };
    Ok(scan_install_commands(&content))
}

pub fn scan_install_commands(content: &str) -> Vec<String> {
    let joined = content.replace("\\\r\n", " ").replace("\\\n", " ");
    let mut packages = BTreeSet::new();

    for line in joined.lines() {
        let Some(arguments) = INSTALL_COMMANDS
            .iter()
            .find_map(|command| line.split_once(command).map(|(_, rest)| rest))
        else {
            continue;
        };

        let command = arguments
            .split([';', '&', '|'])
            .next()
            .unwrap_or_default();

        packages.extend(
            command
                .split_whitespace()
                .filter(|token| !token.starts_with('-'))
                .filter(|token| !NOISE_TOKENS.contains(token))
                .filter(|token| !token.contains(['/', '=']))
                .map(str::to_string),
        );
    }

    packages.into_iter().collect()
}
