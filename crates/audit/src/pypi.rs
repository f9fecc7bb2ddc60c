//! PyPI JSON API client for latest-release lookups.

use crate::error::AuditResult;
use crate::types::UpdateInfo;
use serde::Deserialize;
use stockwatch_core::{CoreResult, HttpSettings, HttpTransport};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    #[serde(default)]
    info: Option<ProjectInfo>,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PypiClient {
    transport: HttpTransport,
    base_url: String,
}

impl PypiClient {
    /// `base_url` is the JSON API root, e.g. `https://pypi.org/pypi`.
    pub fn new(base_url: impl Into<String>, settings: &HttpSettings) -> AuditResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(settings)?,
            base_url: base_url.into(),
        })
    }

    fn project_url(&self, name: &str) -> String {
        format!("{}/{}/json", self.base_url.trim_end_matches('/'), name)
    }

    async fn fetch_latest(&self, name: &str) -> CoreResult<Option<String>> {
        let response: ProjectResponse = self.transport.get(&self.project_url(name)).await?;
        Ok(response
            .info
            .and_then(|info| info.version)
            .filter(|version| !version.is_empty()))
    }

    /// Latest published release of `name` compared with `current_version`.
    ///
    /// Never fails: any lookup problem yields [`UpdateInfo::unavailable`] so
    /// one broken package does not abort the audit.
    pub async fn query_latest_version(&self, name: &str, current_version: &str) -> UpdateInfo {
        match self.fetch_latest(name).await {
            Ok(Some(latest)) => {
                let info = UpdateInfo::resolved(current_version, latest);
                debug!(package = name, current = current_version, latest = ?info.latest, "Resolved latest release");
                info
            }
            Ok(None) => {
                warn!(package = name, "PyPI response has no version");
                UpdateInfo::unavailable(current_version)
            }
            Err(e) => {
                warn!(package = name, error = %e, "PyPI lookup failed");
                UpdateInfo::unavailable(current_version)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpdateType;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> PypiClient {
        PypiClient::new(
            format!("{}/pypi", base_url),
            &HttpSettings {
                timeout: Duration::from_secs(2),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_latest_version_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/pypi/requests/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "info": {"name": "requests", "version": "3.0.0"},
                "releases": {}
            })))
            .mount(&server)
            .await;

        let info = client(&server.uri()).query_latest_version("requests", "2.25.0").await;
        assert_eq!(info.current, "2.25.0");
        assert_eq!(info.latest.as_deref(), Some("3.0.0"));
        assert_eq!(info.update_type, Some(UpdateType::Major));
        assert!(info.is_breaking);
    }

    #[tokio::test]
    async fn test_not_found_degrades_to_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let info = client(&server.uri()).query_latest_version("no-such-package", "1.0.0").await;
        assert_eq!(info, UpdateInfo::unavailable("1.0.0"));
    }

    #[tokio::test]
    async fn test_missing_version_field_degrades_to_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"info": {}})))
            .mount(&server)
            .await;

        let info = client(&server.uri()).query_latest_version("flask", "2.0.0").await;
        assert!(info.latest.is_none());
        assert!(info.update_type.is_none());
        assert!(!info.is_breaking);
    }

    #[tokio::test]
    async fn test_network_failure_degrades_to_unavailable() {
        // Nothing listens on port 9 on a test host.
        let info = client("http://127.0.0.1:9").query_latest_version("requests", "2.25.0").await;
        assert_eq!(info.latest, None);
        assert!(!info.is_breaking);
    }

    #[test]
    fn test_project_url_tolerates_trailing_slash() {
        let client = PypiClient::new("https://pypi.org/pypi/", &HttpSettings::default()).unwrap();
        assert_eq!(client.project_url("flask"), "https://pypi.org/pypi/flask/json");
    }
}
