use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::auth::Credential;
use crate::config::AzureConfig;
use crate::error::{AzError, Result};

/// Authenticated access to the Azure DevOps REST API. Returns raw response bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String>;
    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<String>;
}

pub async fn get_json<T: DeserializeOwned>(transport: &dyn Transport, url: &str) -> Result<T> {
    let body = transport.get(url).await?;
    Ok(serde_json::from_str(&body)?)
}

pub async fn post_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
    body: &serde_json::Value,
) -> Result<T> {
    let response = transport.post(url, body).await?;
    Ok(serde_json::from_str(&response)?)
}

pub struct DevOps {
    client: Client,
    credential: Credential,
}

impl std::fmt::Debug for DevOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevOps")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl DevOps {
    pub fn new(credential: Credential, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, credential })
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.credential.token()?;
        Ok(request
            .basic_auth("", Some(token))
            .header(CONTENT_TYPE, "application/json"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = self.authorize(request)?.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AzError::Status { status, body });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Transport for DevOps {
    async fn get(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<String> {
        tracing::debug!(url, "POST");
        let payload =
            serde_json::to_vec(body).map_err(|e| AzError::Request(format!("invalid body: {}", e)))?;
        self.send(self.client.post(url).body(payload)).await
    }
}

/// URLs for the endpoints the dashboard reads.
#[derive(Debug, Clone)]
pub struct Endpoints {
    organization_url: String,
    project: String,
    repository: String,
}

impl Endpoints {
    pub fn new(azure: &AzureConfig) -> Self {
        Self {
            organization_url: azure.organization_url.trim_end_matches('/').to_string(),
            project: azure.project.clone(),
            repository: azure.repository.clone(),
        }
    }

    pub fn wiql(&self) -> String {
        format!("{}/_apis/wit/wiql?api-version=5.0", self.organization_url)
    }

    pub fn work_items(&self, ids: &[u64]) -> String {
        let ids = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}/_apis/wit/workItems?ids={}", self.organization_url, ids)
    }

    pub fn pull_requests(&self) -> String {
        format!(
            "{}/{}/_apis/git/repositories/{}/pullRequests?searchCriteria.includeLinks=False",
            self.organization_url,
            urlencoding::encode(&self.project),
            urlencoding::encode(&self.repository)
        )
    }
}
