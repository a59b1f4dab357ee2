use anyhow::{anyhow, Context, Result};
use k8s_openapi::api::core::v1::{Pod, ServiceAccount};
use kube::{Api, Client};
use tracing::debug;

use crate::constants;
use crate::types::{GsaEmail, KsaRef};

/// Name of the KSA a Pod runs as.
pub async fn pod_service_account(client: &Client, namespace: &str, pod: &str) -> Result<String> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pod = pods
        .get(pod)
        .await
        .with_context(|| format!("getting Pod {:?} in namespace {:?}", pod, namespace))?;
    Ok(service_account_of(&pod))
}

fn service_account_of(pod: &Pod) -> String {
    pod.spec
        .as_ref()
        .and_then(|spec| spec.service_account_name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| constants::DEFAULT_SERVICE_ACCOUNT.to_string())
}

/// GSA bound to a KSA through its Workload Identity annotation.
pub async fn ksa_gsa_annotation(client: &Client, ksa: &KsaRef) -> Result<GsaEmail> {
    let accounts: Api<ServiceAccount> = Api::namespaced(client.clone(), &ksa.namespace);
    let account = accounts.get(&ksa.name).await.with_context(|| {
        format!(
            "getting ServiceAccount {:?} in namespace {:?}",
            ksa.name, ksa.namespace
        )
    })?;
    let gsa = wi_annotation(&account)?;
    debug!(ksa = %ksa.name, gsa = %gsa, "found workload identity annotation");
    Ok(gsa)
}

fn wi_annotation(account: &ServiceAccount) -> Result<GsaEmail> {
    account
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(constants::WI_GSA_ANNOTATION))
        .map(GsaEmail::new)
        .ok_or_else(|| {
            anyhow!(
                "ksa does not have the WI annotation, {:?}",
                constants::WI_GSA_ANNOTATION
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn pod_service_account_defaults() -> Result<()> {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": {"name": "web-0"},
            "spec": {"containers": [], "serviceAccountName": "runner"}
        }))?;
        assert_eq!(service_account_of(&pod), "runner");

        let pod: Pod = serde_json::from_value(json!({
            "metadata": {"name": "web-1"},
            "spec": {"containers": []}
        }))?;
        assert_eq!(service_account_of(&pod), "default");
        Ok(())
    }

    #[test]
    fn annotation_is_read() -> Result<()> {
        let account: ServiceAccount = serde_json::from_value(json!({
            "metadata": {
                "name": "runner",
                "annotations": {
                    "iam.gke.io/gcp-service-account": "runner@proj.iam.gserviceaccount.com"
                }
            }
        }))?;
        assert_eq!(
            wi_annotation(&account)?.as_str(),
            "runner@proj.iam.gserviceaccount.com"
        );
        Ok(())
    }

    #[test]
    fn missing_annotation_is_an_error() -> Result<()> {
        let account: ServiceAccount = serde_json::from_value(json!({
            "metadata": {"name": "runner", "annotations": {"other": "x"}}
        }))?;
        let err = wi_annotation(&account).unwrap_err();
        assert!(err
            .to_string()
            .contains("\"iam.gke.io/gcp-service-account\""));
        let bare: ServiceAccount = serde_json::from_value(json!({"metadata": {}}))?;
        assert!(wi_annotation(&bare).is_err());
        Ok(())
    }

    #[ignore]
    #[tokio::test]
    async fn test_missing_pod() -> Result<()> {
        let client = Client::try_default()
            .await
            .expect("Unable to create the kube client");
        let res = pod_service_account(&client, "default", "does-not-exist").await;
        assert!(res.is_err());
        Ok(())
    }
}
