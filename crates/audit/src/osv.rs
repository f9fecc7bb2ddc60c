//! OSV.dev batch vulnerability client.
//!
//! All resolved dependencies go out in a single `querybatch` request. The API
//! answers with one result per query, in query order, so results are paired
//! with dependencies by position.

use crate::error::{AuditError, AuditResult};
use crate::types::{Dependency, VulnerabilityMap, VulnerabilityRecord};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use stockwatch_core::{HttpSettings, HttpTransport};
use tracing::{info, warn};

const ECOSYSTEM: &str = "PyPI";

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    queries: Vec<PackageQuery<'a>>,
}

#[derive(Debug, Serialize)]
struct PackageQuery<'a> {
    package: PackageRef<'a>,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct PackageRef<'a> {
    ecosystem: &'static str,
    name: &'a str,
}

/// Treat an explicit JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default, deserialize_with = "nullable")]
    results: Vec<BatchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchResult {
    #[serde(default, deserialize_with = "nullable")]
    vulns: Vec<OsvVulnerability>,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerability {
    #[serde(default, deserialize_with = "nullable")]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    severity: Vec<OsvSeverity>,
    #[serde(default, deserialize_with = "nullable")]
    affected: Vec<OsvAffected>,
    #[serde(default, deserialize_with = "nullable")]
    references: Vec<OsvReference>,
}

#[derive(Debug, Deserialize)]
struct OsvSeverity {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    score: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsvAffected {
    #[serde(default, deserialize_with = "nullable")]
    ranges: Vec<OsvRange>,
}

#[derive(Debug, Deserialize)]
struct OsvRange {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    events: Vec<OsvEvent>,
}

#[derive(Debug, Deserialize)]
struct OsvEvent {
    #[serde(default)]
    introduced: Option<String>,
    #[serde(default)]
    fixed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsvReference {
    #[serde(default)]
    url: Option<String>,
}

impl From<OsvVulnerability> for VulnerabilityRecord {
    fn from(vuln: OsvVulnerability) -> Self {
        let severity = (!vuln.severity.is_empty()).then(|| {
            vuln.severity
                .iter()
                .map(|s| {
                    format!(
                        "{}: {}",
                        s.kind.as_deref().unwrap_or_default(),
                        s.score.as_deref().unwrap_or_default()
                    )
                })
                .collect::<Vec<_>>()
                .join(", ")
        });

        let mut affected_ranges = Vec::new();
        let mut fixed_versions = BTreeSet::new();
        for range in vuln.affected.iter().flat_map(|a| &a.ranges) {
            let mut parts = Vec::new();
            for event in &range.events {
                if let Some(introduced) = &event.introduced {
                    parts.push(format!("introduced {}", introduced));
                }
                if let Some(fixed) = &event.fixed {
                    if !fixed.is_empty() {
                        fixed_versions.insert(fixed.clone());
                    }
                    parts.push(format!("fixed {}", fixed));
                }
            }
            if !parts.is_empty() {
                affected_ranges.push(format!(
                    "{}: {}",
                    range.kind.as_deref().unwrap_or_default(),
                    parts.join(", ")
                ));
            }
        }

        let references = vuln
            .references
            .into_iter()
            .filter_map(|r| r.url)
            .filter(|url| !url.is_empty())
            .collect();

        Self {
            id: vuln.id,
            summary: vuln.summary,
            severity,
            affected_ranges,
            fixed_versions: fixed_versions.into_iter().collect(),
            references,
        }
    }
}

/// Client for the OSV `querybatch` endpoint.
#[derive(Debug, Clone)]
pub struct OsvClient {
    transport: HttpTransport,
    url: String,
}

impl OsvClient {
    pub fn new(url: impl Into<String>, settings: &HttpSettings) -> AuditResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(settings)?,
            url: url.into(),
        })
    }

    /// Look up every dependency in one request.
    ///
    /// An empty slice returns an empty map without touching the network. Any
    /// transport or decoding failure fails the whole batch.
    pub async fn query_vulnerabilities(&self, deps: &[Dependency]) -> AuditResult<VulnerabilityMap> {
        if deps.is_empty() {
            return Ok(VulnerabilityMap::new());
        }

        let request = BatchRequest {
            queries: deps
                .iter()
                .map(|d| PackageQuery {
                    package: PackageRef {
                        ecosystem: ECOSYSTEM,
                        name: &d.name,
                    },
                    version: &d.version,
                })
                .collect(),
        };

        info!(count = deps.len(), "Querying OSV for known vulnerabilities");
        let response: BatchResponse = self
            .transport
            .post(&self.url, &request)
            .await
            .map_err(AuditError::Vulnerability)?;

        if response.results.len() != deps.len() {
            warn!(
                expected = deps.len(),
                received = response.results.len(),
                "OSV returned a different number of results than queries"
            );
        }

        let mut results = VulnerabilityMap::new();
        for (dep, result) in deps.iter().zip(response.results) {
            let records: Vec<VulnerabilityRecord> =
                result.vulns.into_iter().map(VulnerabilityRecord::from).collect();
            if !records.is_empty() {
                info!(package = %dep, count = records.len(), "Vulnerabilities found");
            }
            results.insert(dep.key(), records);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DependencyKey;
    use stockwatch_core::CoreError;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> OsvClient {
        OsvClient::new(
            format!("{}/v1/querybatch", server.uri()),
            &HttpSettings::default(),
        )
        .unwrap()
    }

    fn key(name: &str, version: &str) -> DependencyKey {
        Dependency::new(name, version).key()
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let results = client(&server).await.query_vulnerabilities(&[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_batch_request_and_positional_pairing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/querybatch"))
            .and(body_json(serde_json::json!({
                "queries": [
                    {"package": {"ecosystem": "PyPI", "name": "requests"}, "version": "2.25.0"},
                    {"package": {"ecosystem": "PyPI", "name": "Flask"}, "version": "2.0.0"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {
                        "vulns": [{
                            "id": "GHSA-j8r2-6x86-q33q",
                            "summary": "Unintended leak of Proxy-Authorization header in requests",
                            "severity": [
                                {"type": "CVSS_V3", "score": "CVSS:3.1/AV:N/AC:H/PR:N/UI:R/S:U/C:H/I:N/A:N"},
                                {"type": "CVSS_V4", "score": "CVSS:4.0/AV:N"}
                            ],
                            "affected": [
                                {
                                    "ranges": [{
                                        "type": "ECOSYSTEM",
                                        "events": [{"introduced": "2.3.0"}, {"fixed": "2.31.0"}]
                                    }]
                                },
                                {
                                    "ranges": [{
                                        "type": "GIT",
                                        "events": [{"introduced": "0"}, {"fixed": "2.26.0"}, {"fixed": ""}]
                                    }, {
                                        "type": "ECOSYSTEM",
                                        "events": []
                                    }]
                                }
                            ],
                            "references": [
                                {"type": "ADVISORY", "url": "https://nvd.nist.gov/vuln/detail/CVE-2023-32681"},
                                {"type": "WEB"},
                                {"type": "PACKAGE", "url": "https://github.com/psf/requests"}
                            ]
                        }]
                    },
                    {}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let deps = vec![
            Dependency::new("requests", "2.25.0"),
            Dependency::new("Flask", "2.0.0"),
        ];
        let results = client(&server).await.query_vulnerabilities(&deps).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[&key("flask", "2.0.0")].is_empty());

        let vulns = &results[&key("requests", "2.25.0")];
        assert_eq!(vulns.len(), 1);
        let vuln = &vulns[0];
        assert_eq!(vuln.id, "GHSA-j8r2-6x86-q33q");
        assert_eq!(
            vuln.summary.as_deref(),
            Some("Unintended leak of Proxy-Authorization header in requests")
        );
        assert_eq!(
            vuln.severity.as_deref(),
            Some("CVSS_V3: CVSS:3.1/AV:N/AC:H/PR:N/UI:R/S:U/C:H/I:N/A:N, CVSS_V4: CVSS:4.0/AV:N")
        );
        assert_eq!(
            vuln.affected_ranges,
            vec![
                "ECOSYSTEM: introduced 2.3.0, fixed 2.31.0".to_string(),
                "GIT: introduced 0, fixed 2.26.0, fixed ".to_string(),
            ]
        );
        assert_eq!(vuln.fixed_versions, vec!["2.26.0", "2.31.0"]);
        assert_eq!(
            vuln.references,
            vec![
                "https://nvd.nist.gov/vuln/detail/CVE-2023-32681",
                "https://github.com/psf/requests",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_severity_and_null_lists() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "vulns": [{
                        "id": "PYSEC-2021-1",
                        "severity": null,
                        "affected": null,
                        "references": null
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let deps = vec![Dependency::new("jinja2", "2.11.2")];
        let results = client(&server).await.query_vulnerabilities(&deps).await.unwrap();
        let vuln = &results[&key("jinja2", "2.11.2")][0];

        assert_eq!(vuln.id, "PYSEC-2021-1");
        assert!(vuln.summary.is_none());
        assert!(vuln.severity.is_none());
        assert!(vuln.affected_ranges.is_empty());
        assert!(vuln.fixed_versions.is_empty());
        assert!(vuln.references.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_fails_whole_batch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let deps = vec![Dependency::new("requests", "2.25.0")];
        let result = client(&server).await.query_vulnerabilities(&deps).await;

        match result {
            Err(AuditError::Vulnerability(CoreError::Status { status, .. })) => assert_eq!(status, 502),
            other => panic!("Expected vulnerability status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_response_leaves_trailing_dependencies_unmapped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": [{"vulns": []}]})),
            )
            .mount(&server)
            .await;

        let deps = vec![
            Dependency::new("requests", "2.25.0"),
            Dependency::new("flask", "2.0.0"),
        ];
        let results = client(&server).await.query_vulnerabilities(&deps).await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.contains_key(&key("requests", "2.25.0")));
    }
}
