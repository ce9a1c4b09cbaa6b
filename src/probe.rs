//! Monitoring probes checked by `/health`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

/// Upper bound on each probe round trip.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// GETs a fixed URL and reports whether it answered 200.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Never fails: transport errors and timeouts read as `false`.
    pub async fn check(&self) -> bool {
        match self.client.get(self.url()).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(url = %self.url(), "Probe failed: {}", e);
                false
            }
        }
    }
}

/// The monitoring and dashboard endpoints reported by `/health`.
#[derive(Debug, Clone)]
pub struct Monitors {
    pub prometheus: HttpProbe,
    pub grafana: HttpProbe,
}

impl Monitors {
    /// Builds both probes on one client carrying `PROBE_TIMEOUT`.
    pub fn new(prometheus_url: &str, grafana_url: &str) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(PROBE_TIMEOUT).build()?;
        Ok(Self {
            prometheus: HttpProbe::new(client.clone(), prometheus_url),
            grafana: HttpProbe::new(client, grafana_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitors_keep_configured_targets() {
        let monitors = Monitors::new(
            "http://prometheus:9090/-/healthy",
            "http://grafana:3000/api/health",
        )
        .unwrap();

        assert_eq!(monitors.prometheus.url(), "http://prometheus:9090/-/healthy");
        assert_eq!(monitors.grafana.url(), "http://grafana:3000/api/health");
    }

    #[tokio::test]
    async fn test_unreachable_target_reports_false() {
        let monitors = Monitors::new(
            "http://127.0.0.1:9/-/healthy",
            "http://127.0.0.1:9/api/health",
        )
        .unwrap();

        assert!(!monitors.prometheus.check().await);
        assert!(!monitors.grafana.check().await);
    }

    #[tokio::test]
    async fn test_probe_answering_200_reports_true() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route("/-/healthy", axum::routing::get(|| async { "ok" }));
        tokio::spawn(async move { axum::serve(listener, app).await });

        let monitors = Monitors::new(
            &format!("http://{addr}/-/healthy"),
            &format!("http://{addr}/missing"),
        )
        .unwrap();

        assert!(monitors.prometheus.check().await);
        assert!(!monitors.grafana.check().await);
    }
}
