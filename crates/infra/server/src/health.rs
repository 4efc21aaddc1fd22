//! Health and status reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docrelay_events::TriggerRegistry;

use crate::config::AppConfig;

/// Name under which the health endpoint is listed among the functions.
pub const HEALTH_CHECK_FUNCTION: &str = "healthCheck";

/// Active relay configuration, without the secret value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSummary {
    /// Source ids.
    pub databases: Vec<String>,
    /// Collection names.
    pub collections: Vec<String>,
    /// Webhook endpoint.
    pub webhook_url: String,
    /// Whether a usable secret is configured.
    pub has_webhook_secret: bool,
}

impl ConfigurationSummary {
    /// Summarizes an application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            databases: config.relay.sources.clone(),
            collections: config.relay.collection_names(),
            webhook_url: config.webhook.url.clone(),
            has_webhook_secret: config.webhook.has_secret(),
        }
    }
}

/// Process environment details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSummary {
    /// Relay version.
    pub version: String,
    /// `GCP_PROJECT`, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_project: Option<String>,
    /// `GCLOUD_PROJECT`, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcloud_project: Option<String>,
}

impl EnvironmentSummary {
    /// Reads the environment once.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the summary from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            gcp_project: lookup("GCP_PROJECT"),
            gcloud_project: lookup("GCLOUD_PROJECT"),
        }
    }

    /// Hosting project, or "unknown".
    pub fn project(&self) -> String {
        self.gcp_project
            .clone()
            .or_else(|| self.gcloud_project.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Response body of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Always "healthy" when the process can answer.
    pub status: String,
    /// Report time.
    pub timestamp: DateTime<Utc>,
    /// Hosting project, or "unknown".
    pub project: String,
    /// Active configuration.
    pub configuration: ConfigurationSummary,
    /// Process environment.
    pub environment: EnvironmentSummary,
    /// Generated trigger functions plus the health check itself.
    pub functions: Vec<String>,
}

impl HealthReport {
    /// Builds a report for the current moment.
    pub fn new(
        configuration: &ConfigurationSummary,
        environment: &EnvironmentSummary,
        registry: &TriggerRegistry,
    ) -> Self {
        let mut functions: Vec<String> = registry.function_names().into_iter().map(String::from).collect();
        functions.push(HEALTH_CHECK_FUNCTION.to_string());

        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            project: environment.project(),
            configuration: configuration.clone(),
            environment: environment.clone(),
            functions,
        }
    }
}
