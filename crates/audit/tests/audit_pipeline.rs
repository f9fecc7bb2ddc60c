// End-to-end audit runs against mocked OSV and PyPI endpoints.

use chrono::NaiveDate;
use std::path::Path;
use stockwatch_audit::{AuditError, Auditor, UpdateType};
use stockwatch_core::AuditSettings;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOCKFILE: &str = r#"
version = 1
requires-python = ">=3.11"

[[package]]
name = "requests"
version = "2.25.0"
source = { registry = "https://pypi.org/simple" }
dependencies = [{ name = "idna" }]

[[package]]
name = "idna"
version = "2.10"
source = { registry = "https://pypi.org/simple" }

[[package]]
name = "flask"
version = "2.0.0"
source = { registry = "https://pypi.org/simple" }

[[package]]
name = "requests"
version = "2.25.0"
source = { registry = "https://pypi.org/simple" }
"#;

const MANIFEST: &str = r#"
[project]
name = "stock-price-server"
version = "0.1.0"
dependencies = [
    "requests>=2.25",
    "Flask[async]>=2.0",
]
"#;

const DOCKERFILE: &str = "FROM python:3.12-slim\nRUN apt-get update && apt-get install -y curl && rm -rf /var/lib/apt/lists/*\n";

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("uv.lock"), LOCKFILE).unwrap();
    std::fs::write(dir.path().join("pyproject.toml"), MANIFEST).unwrap();
    std::fs::write(dir.path().join("Dockerfile"), DOCKERFILE).unwrap();
    dir
}

fn settings(server: &MockServer) -> AuditSettings {
    AuditSettings {
        osv_url: format!("{}/v1/querybatch", server.uri()),
        pypi_url: format!("{}/pypi", server.uri()),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

async fn mount_osv(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .and(body_json(serde_json::json!({
            "queries": [
                {"package": {"ecosystem": "PyPI", "name": "requests"}, "version": "2.25.0"},
                {"package": {"ecosystem": "PyPI", "name": "idna"}, "version": "2.10"},
                {"package": {"ecosystem": "PyPI", "name": "flask"}, "version": "2.0.0"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {
                    "vulns": [{
                        "id": "CVE-2021-33503",
                        "summary": "Catastrophic backtracking in URL authority parser",
                        "severity": [{"type": "CVSS_V3", "score": "7.5"}],
                        "affected": [{
                            "ranges": [{
                                "type": "ECOSYSTEM",
                                "events": [{"introduced": "0"}, {"fixed": "2.26.0"}]
                            }]
                        }],
                        "references": [{"type": "ADVISORY", "url": "https://osv.dev/vulnerability/CVE-2021-33503"}]
                    }]
                },
                {},
                {}
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_pypi(server: &MockServer, name: &str, latest: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/pypi/{}/json", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": {"name": name, "version": latest}
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn read_report(root: &Path) -> String {
    std::fs::read_to_string(root.join("dependency-audit-2026-10-17.md")).unwrap()
}

#[tokio::test]
async fn test_end_to_end_breaking_update() {
    let server = MockServer::start().await;
    mount_osv(&server).await;
    mount_pypi(&server, "requests", "3.0.0").await;
    mount_pypi(&server, "flask", "2.0.0").await;

    // Transitive packages never get an update lookup.
    Mock::given(method("GET"))
        .and(path("/pypi/idna/json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let dir = project();
    let auditor = Auditor::new(dir.path(), settings(&server)).unwrap();
    let outcome = auditor.run(date()).await.unwrap();

    assert_eq!(outcome.report_path, dir.path().join("dependency-audit-2026-10-17.md"));
    assert_eq!(outcome.dependency_count, 3);
    assert_eq!(outcome.vulnerable_count, 1);
    assert_eq!(outcome.update_count, 1);

    let report = read_report(dir.path());
    assert!(report.contains(
        "- requests==2.25.0 | Update available: 3.0.0 (major) — potential breaking changes\n  - Vulnerability: CVE-2021-33503 | Severity: CVSS_V3: 7.5 | Fixed in: 2.26.0\n"
    ));
    assert!(report.contains("- flask==2.0.0\n"));
    assert!(report.contains("- idna==2.10\n"));
    assert!(report.contains(
        "### Major updates (potential breaking changes — review before applying)\n- requests 2.25.0 -> 3.0.0 (major)\n"
    ));
    assert!(report.contains("### Patch/Minor (safe to apply after tests)\n- No patch/minor updates available.\n"));
    assert!(report.contains("## Dockerfile apt packages\n- curl\n"));
}

#[tokio::test]
async fn test_minor_update_lands_in_safe_group() {
    let server = MockServer::start().await;
    mount_osv(&server).await;
    mount_pypi(&server, "requests", "2.31.0").await;
    mount_pypi(&server, "flask", "2.0.0").await;

    let dir = project();
    let auditor = Auditor::new(dir.path(), settings(&server)).unwrap();
    let data = auditor.collect().await.unwrap();

    assert_eq!(data.updates["requests"].update_type, Some(UpdateType::Minor));
    assert!(!data.updates["requests"].is_breaking);
    assert_eq!(data.updates["flask"].latest.as_deref(), Some("2.0.0"));
    assert!(!data.updates.contains_key("idna"));

    let report = auditor.render(&data, date());
    assert!(report.contains(
        "### Patch/Minor (safe to apply after tests)\n- requests 2.25.0 -> 2.31.0 (minor)\n"
    ));
    assert!(report.contains("- No major updates available."));
}

#[tokio::test]
async fn test_pypi_failure_does_not_abort_audit() {
    let server = MockServer::start().await;
    mount_osv(&server).await;
    mount_pypi(&server, "flask", "2.1.0").await;
    Mock::given(method("GET"))
        .and(path("/pypi/requests/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = project();
    let auditor = Auditor::new(dir.path(), settings(&server)).unwrap();
    auditor.run(date()).await.unwrap();

    let report = read_report(dir.path());
    assert!(report.contains("- requests==2.25.0\n  - Vulnerability: CVE-2021-33503"));
    assert!(report.contains("- flask==2.0.0 | Update available: 2.1.0 (minor)\n"));
}

#[tokio::test]
async fn test_osv_failure_is_fatal_and_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let dir = project();
    let auditor = Auditor::new(dir.path(), settings(&server)).unwrap();
    let result = auditor.run(date()).await;

    assert!(matches!(result, Err(AuditError::Vulnerability(_))));
    assert!(!dir.path().join("dependency-audit-2026-10-17.md").exists());
}

#[tokio::test]
async fn test_empty_project_writes_placeholder_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let auditor = Auditor::new(dir.path(), settings(&server)).unwrap();
    let outcome = auditor.run(date()).await.unwrap();

    assert_eq!(outcome.dependency_count, 0);
    let report = read_report(dir.path());
    assert!(report.contains("- No uv.lock found or no packages parsed."));
    assert!(report.contains("- No apt packages installed (or none detected)."));
    assert!(report.contains("## Update summary"));
    assert!(report.contains("## Next steps"));
}

#[tokio::test]
async fn test_existing_report_is_overwritten() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("dependency-audit-2026-10-17.md");
    std::fs::write(&report_path, "stale contents that are longer than nothing").unwrap();

    let auditor = Auditor::new(dir.path(), settings(&server)).unwrap();
    auditor.run(date()).await.unwrap();

    let report = read_report(dir.path());
    assert!(report.starts_with("# Dependency Audit — 2026-10-17"));
    assert!(!report.contains("stale contents"));
}

#[tokio::test]
async fn test_multiple_locked_versions_never_self_update() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{}, {}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pypi/requests/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": {"name": "requests", "version": "2.31.0"}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("uv.lock"),
        "[[package]]\nname = \"requests\"\nversion = \"2.31.0\"\n\n[[package]]\nname = \"requests\"\nversion = \"2.25.0\"\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("pyproject.toml"),
        "[project]\nname = \"app\"\ndependencies = [\"requests\"]\n",
    )
    .unwrap();

    let auditor = Auditor::new(dir.path(), settings(&server)).unwrap();
    auditor.run(date()).await.unwrap();

    let report = read_report(dir.path());
    assert!(report.contains("- requests==2.31.0\n"));
    assert!(report.contains("- requests==2.25.0 | Update available: 2.31.0 (minor)\n"));
    assert!(report.contains("- requests 2.25.0 -> 2.31.0 (minor)\n"));
    assert!(!report.contains("2.31.0 -> 2.31.0"));
}
