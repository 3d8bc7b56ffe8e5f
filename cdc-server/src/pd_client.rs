//! Liveness probes against the coordination service.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::{select_ok, FutureExt};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::constants::ETCD_HEALTH_PATH;
use crate::error::LivenessError;

/// A cheap, bounded check of whether the coordination service is responsive.
///
/// Implementations must be safe to call concurrently. The health checker
/// enforces its own timeout around every call, so a probe that never returns
/// does not block cancellation.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct EtcdHealth {
    health: String,
}

/// Probes the `/health` endpoint of every configured etcd client URL.
#[derive(Debug, Clone)]
pub struct EtcdHealthClient {
    client: Client,
    endpoints: Vec<Url>,
}

impl EtcdHealthClient {
    pub fn new(endpoints: &[String], probe_timeout: Duration) -> Result<Self, LivenessError> {
        if endpoints.is_empty() {
            return Err(LivenessError::InvalidEndpoint {
                endpoint: String::new(),
                reason: "no endpoints given".to_string(),
            });
        }

        let endpoints = endpoints
            .iter()
            .map(|endpoint| parse_endpoint(endpoint))
            .collect::<Result<Vec<_>, _>>()?;

        let client = Client::builder()
            .timeout(probe_timeout)
            .no_proxy()
            .build()
            .map_err(|e| LivenessError::InvalidEndpoint {
                endpoint: String::new(),
                reason: format!("failed to build http client: {e}"),
            })?;

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    async fn check_endpoint(&self, health_url: Url) -> Result<()> {
        let res = self.client.get(health_url.clone()).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("{health_url} returned HTTP {status}"));
        }
        let body: EtcdHealth = res.json().await?;
        if body.health != "true" {
            return Err(anyhow!("{health_url} reported health {:?}", body.health));
        }
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for EtcdHealthClient {
    /// Succeeds as soon as any endpoint reports healthy.
    async fn probe(&self) -> Result<()> {
        let mut checks = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            let health_url = endpoint.join(ETCD_HEALTH_PATH)?;
            checks.push(self.check_endpoint(health_url).boxed());
        }

        match select_ok(checks).await {
            Ok(((), _pending)) => Ok(()),
            Err(e) => Err(e.context("no coordination service endpoint is healthy")),
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, LivenessError> {
    let url = Url::parse(endpoint).map_err(|e| LivenessError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        scheme => Err(LivenessError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: format!("expected an http or https URL with a host, got scheme {scheme:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints() {
        let timeout = Duration::from_secs(1);
        let client = EtcdHealthClient::new(
            &["http://127.0.0.1:2379".to_string(), "https://pd:2379".to_string()],
            timeout,
        )
        .unwrap();
        assert_eq!(client.endpoints().len(), 2);
        assert_eq!(
            client.endpoints()[0].join(ETCD_HEALTH_PATH).unwrap().as_str(),
            "http://127.0.0.1:2379/health"
        );

        let err = EtcdHealthClient::new(&[], timeout).unwrap_err();
        assert!(matches!(err, LivenessError::InvalidEndpoint { .. }));

        let err = EtcdHealthClient::new(&["pd:2379".to_string()], timeout).unwrap_err();
        assert!(matches!(err, LivenessError::InvalidEndpoint { ref endpoint, .. } if endpoint == "pd:2379"));

        let err = EtcdHealthClient::new(&["127.0.0.1:2379".to_string()], timeout).unwrap_err();
        assert!(matches!(err, LivenessError::InvalidEndpoint { .. }));
    }
}
