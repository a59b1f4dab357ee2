use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::config::ClusterFlags;
use crate::constants;

/// A GKE cluster, as addressed by the GKE API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterRef {
    pub project: String,
    pub location: String,
    pub name: String,
}

impl ClusterRef {
    /// Parses the context names written by `gcloud container clusters get-credentials`:
    /// `gke_<project>_<location>_<name>`.
    pub fn from_context(context: &str) -> Result<Self> {
        let parts: Vec<&str> = context.split('_').collect();
        match parts.as_slice() {
            [prefix, project, location, name]
                if *prefix == constants::GKE_CONTEXT_PREFIX
                    && !project.is_empty()
                    && !location.is_empty()
                    && !name.is_empty() =>
            {
                Ok(Self {
                    project: project.to_string(),
                    location: location.to_string(),
                    name: name.to_string(),
                })
            }
            _ => bail!(
                "context {:?} is not of the form gke_<project>_<location>_<name>",
                context
            ),
        }
    }

    fn from_flags(flags: &ClusterFlags) -> Result<Self> {
        let field = |value: &Option<String>, flag: &str| {
            value
                .clone()
                .ok_or_else(|| anyhow!("cluster unknown, please specify -{}", flag))
        };
        Ok(Self {
            project: field(&flags.project, "clusterProject")?,
            location: field(&flags.location, "clusterLocation")?,
            name: field(&flags.name, "clusterName")?,
        })
    }

    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/clusters/{}",
            self.project, self.location, self.name
        )
    }
}

fn default_kubeconfig_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kube").join("config"))
}

/// Reads the `current-context` of a kubeconfig file.
pub fn current_context(path: &Path) -> Result<String> {
    let kubeconfig = Kubeconfig::read_from(path)
        .with_context(|| format!("reading kubeconfig {}", path.display()))?;
    kubeconfig
        .current_context
        .filter(|c| !c.is_empty())
        .ok_or_else(|| anyhow!("kubeconfig {} has no current-context", path.display()))
}

/// Picks the cluster to inspect: complete cluster flags first, then the current
/// kubeconfig context, then whatever flags were given.
pub fn resolve_cluster(flags: &ClusterFlags, kubeconfig: Option<&Path>) -> Result<ClusterRef> {
    if flags.is_complete() {
        return ClusterRef::from_flags(flags);
    }
    let path = kubeconfig.map(Path::to_path_buf).or_else(default_kubeconfig_path);
    let from_context = path
        .ok_or_else(|| anyhow!("no kubeconfig to read the cluster from"))
        .and_then(|p| current_context(&p))
        .and_then(|ctx| ClusterRef::from_context(&ctx));
    match from_context {
        Ok(cluster) => {
            debug!(cluster = %cluster.resource_name(), "cluster taken from kubeconfig context");
            Ok(cluster)
        }
        Err(e) => {
            debug!(error = %e, "cluster not found in kubeconfig, using flags");
            ClusterRef::from_flags(flags)
        }
    }
}

async fn config_from_path(path: &Path, server: Option<&str>) -> Result<Config> {
    let kubeconfig = Kubeconfig::read_from(path)
        .with_context(|| format!("reading kubeconfig {}", path.display()))?;
    let mut config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .with_context(|| format!("loading kubeconfig {}", path.display()))?;
    if let Some(server) = server {
        config.cluster_url = server
            .parse()
            .with_context(|| format!("invalid server address {:?}", server))?;
    }
    Ok(config)
}

/// Builds the Kubernetes client: explicit kubeconfig, in-cluster config, then `~/.kube/config`.
pub async fn client(server: Option<&str>, kubeconfig: Option<&Path>) -> Result<Client> {
    let config = if let Some(path) = kubeconfig {
        config_from_path(path, server).await?
    } else if let Ok(config) = Config::incluster() {
        debug!("using in-cluster configuration");
        config
    } else {
        let path = default_kubeconfig_path()
            .ok_or_else(|| anyhow!("could not create a valid kubeconfig"))?;
        config_from_path(&path, server)
            .await
            .context("could not create a valid kubeconfig")?
    };
    debug!(url = %config.cluster_url, "kubernetes api server");
    Client::try_from(config).context("creating the kube client")
}
