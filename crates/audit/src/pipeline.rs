// Audit orchestration: parse -> query -> classify -> render -> write.

use crate::error::{AuditError, AuditResult};
use crate::manifest::{parse_lockfile, parse_manifest_top_level_names};
use crate::osv::OsvClient;
use crate::pypi::PypiClient;
use crate::report;
use crate::system_packages::parse_system_packages;
use crate::types::{Dependency, UpdateMap, VulnerabilityMap};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use stockwatch_core::AuditSettings;
use tracing::{info, instrument};

/// `<prefix>-YYYY-MM-DD.md`
pub fn report_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.md", prefix, date.format("%Y-%m-%d"))
}

/// Everything gathered for one report.
#[derive(Debug, Clone)]
pub struct AuditData {
    pub dependencies: Vec<Dependency>,
    pub top_level: BTreeSet<String>,
    pub vulnerabilities: VulnerabilityMap,
    pub updates: UpdateMap,
    pub system_packages: Vec<String>,
}

impl AuditData {
    pub fn vulnerable_count(&self) -> usize {
        self.vulnerabilities.values().filter(|v| !v.is_empty()).count()
    }
}

#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub report_path: PathBuf,
    pub dependency_count: usize,
    pub vulnerable_count: usize,
    pub update_count: usize,
}

pub struct Auditor {
    root: PathBuf,
    settings: AuditSettings,
    osv: OsvClient,
    pypi: PypiClient,
}

impl Auditor {
    pub fn new(root: impl Into<PathBuf>, settings: AuditSettings) -> AuditResult<Self> {
        let http = settings.http();
        let osv = OsvClient::new(settings.osv_url.clone(), &http)?;
        let pypi = PypiClient::new(settings.pypi_url.clone(), &http)?;
        Ok(Self {
            root: root.into(),
            settings,
            osv,
            pypi,
        })
    }

    fn input(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Parse the inputs and run every lookup, strictly one after another.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn collect(&self) -> AuditResult<AuditData> {
        let dependencies = parse_lockfile(&self.input(&self.settings.lockfile))?;
        let top_level = parse_manifest_top_level_names(&self.input(&self.settings.manifest))?;
        info!(
            dependencies = dependencies.len(),
            top_level = top_level.len(),
            "Parsed project manifests"
        );

        let vulnerabilities = self.osv.query_vulnerabilities(&dependencies).await?;

        // Transitive packages are listed but not checked for updates.
        let mut updates = UpdateMap::new();
        for dep in &dependencies {
            let name = dep.lookup_name();
            if top_level.contains(&name) {
                let info = self.pypi.query_latest_version(&dep.name, &dep.version).await;
                updates.insert(name, info);
            }
        }

        let system_packages = parse_system_packages(&self.input(&self.settings.dockerfile))?;

        Ok(AuditData {
            dependencies,
            top_level,
            vulnerabilities,
            updates,
            system_packages,
        })
    }

    pub fn render(&self, data: &AuditData, date: NaiveDate) -> String {
        report::render(
            &data.dependencies,
            &data.vulnerabilities,
            &data.updates,
            &data.system_packages,
            date,
        )
    }

    /// Run the full audit and write the report into the project root,
    /// replacing any report from the same day.
    pub async fn run(&self, date: NaiveDate) -> AuditResult<AuditOutcome> {
        let data = self.collect().await?;
        let content = self.render(&data, date);

        let report_path = self.input(&report_file_name(&self.settings.report_prefix, date));
        write_report(&report_path, &content)?;

        let outcome = AuditOutcome {
            report_path,
            dependency_count: data.dependencies.len(),
            vulnerable_count: data.vulnerable_count(),
            update_count: data.updates.values().filter(|u| u.available().is_some()).count(),
        };
        info!(
            report = %outcome.report_path.display(),
            dependencies = outcome.dependency_count,
            vulnerable = outcome.vulnerable_count,
            updates = outcome.update_count,
            "Audit complete"
        );
        Ok(outcome)
    }
}

fn write_report(path: &Path, content: &str) -> AuditResult<()> {
    std::fs::write(path, content).map_err(|source| AuditError::Write {
        path: path.to_path_buf(),
        source,
    })
}
