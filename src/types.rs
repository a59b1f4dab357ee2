use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// A Kubernetes Service Account, identified by namespace and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KsaRef {
    pub namespace: String,
    pub name: String,
}

impl KsaRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// IAM member string for this KSA inside the given Workload Identity Pool.
    pub fn member(&self, wi_pool: &str) -> String {
        ksa_member(wi_pool, &self.namespace, &self.name)
    }
}

/// Email of a Google Service Account, e.g. `app@my-project.iam.gserviceaccount.com`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GsaEmail(String);

impl GsaEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Project hosting the GSA: the domain label right after the `@`.
    pub fn project_id(&self) -> Result<&str> {
        let domain = self
            .0
            .split_once('@')
            .map(|(_, domain)| domain)
            .ok_or_else(|| anyhow!("GSA {:?} is not an email address", self.0))?;
        match domain.split('.').next() {
            Some(project) if !project.is_empty() => Ok(project),
            _ => Err(anyhow!("GSA {:?} has no project in its domain", self.0)),
        }
    }

    /// IAM API resource name of the GSA.
    pub fn resource_name(&self) -> Result<String> {
        Ok(format!(
            "projects/{}/serviceAccounts/{}",
            self.project_id()?,
            self.0
        ))
    }

    pub fn member(&self) -> String {
        gsa_member(&self.0)
    }
}

impl fmt::Display for GsaEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn ksa_member(wi_pool: &str, namespace: &str, ksa: &str) -> String {
    format!("serviceAccount:{}[{}/{}]", wi_pool, namespace, ksa)
}

pub fn gsa_member(gsa_email: &str) -> String {
    format!("serviceAccount:{}", gsa_email)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Binding {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Snapshot of an IAM policy as returned by `getIamPolicy`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Everything learned by a successful diagnosis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub pod: Option<String>,
    pub ksa: KsaRef,
    pub gsa: GsaEmail,
    pub project: String,
    pub roles: Vec<String>,
}

impl Report {
    /// `Pod "x" uses ` when the KSA was found through a Pod, empty otherwise.
    pub fn prefix(&self) -> String {
        subject_prefix(self.pod.as_deref())
    }
}

pub fn subject_prefix(pod: Option<&str>) -> String {
    pod.map(|p| format!("Pod {:?} uses ", p)).unwrap_or_default()
}
