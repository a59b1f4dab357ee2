use anyhow::{anyhow, bail, Context, Result};
use google_cloud_auth::credentials::{Builder, CacheableResource, Credentials};
use http::{Extensions, HeaderMap};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::constants;
use crate::types::Policy;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Cluster {
    #[serde(default)]
    workload_identity_config: Option<WorkloadIdentityConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkloadIdentityConfig {
    #[serde(default)]
    workload_pool: String,
}

impl Cluster {
    fn workload_pool(self, cluster: &str) -> Result<String> {
        self.workload_identity_config
            .map(|wi| wi.workload_pool)
            .filter(|pool| !pool.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "GKE Cluster {:?} does not have Workload Identity enabled",
                    cluster
                )
            })
    }
}

/// REST client for the GKE, IAM and Resource Manager APIs, authenticated with
/// Application Default Credentials.
pub struct GcpClient {
    http: reqwest::Client,
    credentials: Credentials,
}

impl GcpClient {
    pub fn new() -> Result<Self> {
        let credentials = Builder::default()
            .build()
            .context("loading Google Application Default Credentials")?;
        Ok(Self {
            http: reqwest::Client::new(),
            credentials,
        })
    }

    async fn auth_headers(&self) -> Result<HeaderMap> {
        match self
            .credentials
            .headers(Extensions::new())
            .await
            .context("getting Google credentials")?
        {
            CacheableResource::New { data, .. } => Ok(data),
            CacheableResource::NotModified => bail!("Google credentials returned no headers"),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let request = request.headers(self.auth_headers().await?).build()?;
        let (method, url) = (request.method().clone(), request.url().clone());
        debug!(%method, %url, "calling google api");
        let response = self
            .http
            .execute(request)
            .await
            .with_context(|| format!("{} {}", method, url))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("{} {} returned {}: {}", method, url, status, body.trim());
        }
        response
            .json()
            .await
            .with_context(|| format!("decoding response of {} {}", method, url))
    }

    /// Workload Identity Pool of a GKE cluster, given its API resource name.
    pub async fn workload_pool(&self, cluster: &str) -> Result<String> {
        let url = api_url(constants::CONTAINER_API, cluster, None);
        let resource: Cluster = self
            .send(self.http.get(url))
            .await
            .with_context(|| format!("getting GKE Cluster {:?}", cluster))?;
        resource.workload_pool(cluster)
    }

    /// IAM policy set on a GSA, given its API resource name.
    pub async fn service_account_policy(&self, gsa_resource: &str) -> Result<Policy> {
        let url = api_url(constants::IAM_API, gsa_resource, Some("getIamPolicy"));
        self.send(self.http.post(url).json(&json!({})))
            .await
            .with_context(|| format!("getting GSA {:?} IAMPolicy", gsa_resource))
    }

    /// IAM policy set on a project.
    pub async fn project_policy(&self, project: &str) -> Result<Policy> {
        let url = api_url(
            constants::RESOURCE_MANAGER_API,
            &format!("projects/{}", project),
            Some("getIamPolicy"),
        );
        self.send(self.http.post(url).json(&json!({})))
            .await
            .with_context(|| format!("getting Project {:?} IAMPolicy", project))
    }
}

fn api_url(base: &str, resource: &str, verb: Option<&str>) -> String {
    match verb {
        Some(verb) => format!("{}/{}:{}", base, resource, verb),
        None => format!("{}/{}", base, resource),
    }
}
