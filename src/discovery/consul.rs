//! Consul agent client.
//!
//! Talks to the agent's HTTP API:
//! - `PUT /v1/agent/service/register`
//! - `PUT /v1/agent/service/deregister/{id}`
//! - `GET /v1/health/service/{name}?passing=true`

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RegistryError, RegistryResult, ServiceRegistry};

/// Default agent address when none is configured.
pub const DEFAULT_CONSUL_ADDRESS: &str = "localhost:8500";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceRegistration<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    name: &'a str,
    address: &'a str,
    port: u16,
    check: ServiceCheck,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceCheck {
    #[serde(rename = "HTTP")]
    http: String,
    interval: &'static str,
    timeout: &'static str,
    deregister_critical_service_after: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthEntry {
    node: NodeInfo,
    service: ServiceInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NodeInfo {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceInfo {
    #[serde(default)]
    address: String,
    port: u16,
}

/// Service registry backed by a Consul agent.
#[derive(Debug, Clone)]
pub struct ConsulRegistry {
    base_url: String,
    client: reqwest::Client,
}

impl ConsulRegistry {
    /// Create a client for the agent at `address` (`host:port` or a full URL).
    /// An empty address falls back to [`DEFAULT_CONSUL_ADDRESS`].
    pub fn new(address: &str) -> RegistryResult<Self> {
        let address = address.trim();
        let address = if address.is_empty() {
            tracing::warn!("Consul address is not set, using {DEFAULT_CONSUL_ADDRESS}");
            DEFAULT_CONSUL_ADDRESS
        } else {
            address
        };

        let base_url = if address.contains("://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{address}")
        };
        url::Url::parse(&base_url).map_err(|_| RegistryError::InvalidAddress(address.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ServiceRegistry for ConsulRegistry {
    async fn register(
        &self,
        name: &str,
        address: &str,
        port: u16,
        health_check_path: &str,
    ) -> RegistryResult<String> {
        let id = format!("{name}-{address}");
        let registration = ServiceRegistration {
            id: &id,
            name,
            address,
            port,
            check: ServiceCheck {
                http: format!("http://{address}:{port}{health_check_path}"),
                interval: "10s",
                timeout: "5s",
                deregister_critical_service_after: "1m",
            },
        };

        let response = self
            .client
            .put(self.endpoint("/v1/agent/service/register"))
            .json(&registration)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryError::Status {
                operation: "register",
                status: response.status().as_u16(),
            });
        }

        tracing::info!(service = %name, id = %id, "Registered service with Consul");
        Ok(id)
    }

    async fn deregister(&self, service_id: &str) -> RegistryResult<()> {
        let response = self
            .client
            .put(self.endpoint(&format!("/v1/agent/service/deregister/{service_id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryError::Status {
                operation: "deregister",
                status: response.status().as_u16(),
            });
        }

        tracing::info!(id = %service_id, "Deregistered service from Consul");
        Ok(())
    }

    async fn resolve(&self, name: &str) -> RegistryResult<String> {
        let response = self
            .client
            .get(self.endpoint(&format!("/v1/health/service/{name}")))
            .query(&[("passing", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryError::Status {
                operation: "health lookup",
                status: response.status().as_u16(),
            });
        }

        let entries: Vec<HealthEntry> = response.json().await?;

        // First passing instance; the agent owns ordering.
        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::NoHealthyInstance(name.to_string()))?;

        let address = if entry.service.address.is_empty() {
            entry.node.address
        } else {
            entry.service.address
        };

        let url = format!("http://{}:{}", address, entry.service.port);
        tracing::debug!(service = %name, %url, "Found healthy service");
        Ok(url)
    }
}
