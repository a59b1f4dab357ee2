use anyhow::{Context, Result};
use kube::Client;
use tracing::debug;

use crate::config::{Config, Subject};
use crate::constants;
use crate::discovery;
use crate::gcloud;
use crate::gcp::GcpClient;
use crate::kubeconfig;
use crate::types::{subject_prefix, GsaEmail, KsaRef, Policy, Report};

/// True when `member` holds one of the Workload Identity roles in `policy`.
pub fn has_access(policy: &Policy, member: &str) -> bool {
    policy
        .bindings
        .iter()
        .filter(|binding| constants::KSA_ROLES.contains(&binding.role.as_str()))
        .any(|binding| binding.members.iter().any(|m| m == member))
}

/// Roles bound to `member`, in policy order.
pub fn roles_for_member(policy: &Policy, member: &str) -> Vec<String> {
    policy
        .bindings
        .iter()
        .filter(|binding| binding.members.iter().any(|m| m == member))
        .map(|binding| binding.role.clone())
        .collect()
}

/// Result of a diagnosis that ran to completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnosis {
    Granted(Report),
    Denied {
        pod: Option<String>,
        ksa: KsaRef,
        gsa: GsaEmail,
    },
}

impl Diagnosis {
    pub fn denial_message(pod: Option<&str>, ksa: &KsaRef, gsa: &GsaEmail) -> String {
        format!(
            "{}KSA {:?}, which links to GSA {:?}, but that GSA does not grant access to the KSA",
            subject_prefix(pod),
            ksa.name,
            gsa.as_str()
        )
    }
}

pub struct Checker {
    pub config: Config,
    pub client: Client,
    pub gcp: GcpClient,
}

impl Checker {
    pub async fn new(config: Config) -> Result<Self> {
        let client = kubeconfig::client(config.server.as_deref(), config.kubeconfig.as_deref())
            .await
            .context("Error building kubeconfig")?;
        let gcp = GcpClient::new()?;
        Ok(Self {
            config,
            client,
            gcp,
        })
    }

    async fn resolve_ksa(&self) -> Result<(Option<String>, KsaRef)> {
        let namespace = &self.config.namespace;
        match &self.config.subject {
            Subject::Ksa(name) => Ok((None, KsaRef::new(namespace.as_str(), name.as_str()))),
            Subject::Pod(pod) => {
                let name = discovery::pod_service_account(&self.client, namespace, pod)
                    .await
                    .context("Error getting the Pod's KSA")?;
                debug!(%pod, ksa = %name, "pod service account");
                Ok((Some(pod.clone()), KsaRef::new(namespace.as_str(), name)))
            }
        }
    }

    async fn ksa_has_access(&self, ksa: &KsaRef, gsa: &GsaEmail) -> Result<bool> {
        let cluster = kubeconfig::resolve_cluster(
            &self.config.cluster,
            self.config.kubeconfig.as_deref(),
        )?;
        let wi_pool = self
            .gcp
            .workload_pool(&cluster.resource_name())
            .await
            .context("Error getting WI Pool")?;
        debug!(%wi_pool, "workload identity pool");

        let policy = self
            .gcp
            .service_account_policy(&gsa.resource_name()?)
            .await
            .context("Error checking the KSAs access on the GSA")?;
        Ok(has_access(&policy, &ksa.member(&wi_pool)))
    }

    pub async fn diagnose(&self) -> Result<Diagnosis> {
        let (pod, ksa) = self.resolve_ksa().await?;
        let gsa = discovery::ksa_gsa_annotation(&self.client, &ksa)
            .await
            .context("Error getting the KSA's WI annotation")?;

        if !self.ksa_has_access(&ksa, &gsa).await? {
            return Ok(Diagnosis::Denied { pod, ksa, gsa });
        }

        let project = gcloud::determine_project(self.config.project.as_deref())
            .context("Error getting project")?;
        let policy = self.gcp.project_policy(&project).await.with_context(|| {
            format!(
                "Error getting the GSA {:?}'s roles on project {:?}",
                gsa.as_str(),
                project
            )
        })?;
        let roles = roles_for_member(&policy, &gsa.member());
        debug!(?roles, %project, "gsa roles on project");

        Ok(Diagnosis::Granted(Report {
            pod,
            ksa,
            gsa,
            project,
            roles,
        }))
    }
}
