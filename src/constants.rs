pub const WI_GSA_ANNOTATION: &str = "iam.gke.io/gcp-service-account";

/// Roles on a GSA that let a KSA act as it through Workload Identity.
pub const KSA_ROLES: [&str; 4] = [
    WORKLOAD_IDENTITY_USER,
    SERVICE_ACCOUNT_TOKEN_CREATOR,
    EDITOR,
    OWNER,
];

const WORKLOAD_IDENTITY_USER: &str = "roles/iam.workloadIdentityUser";
const SERVICE_ACCOUNT_TOKEN_CREATOR: &str = "roles/iam.serviceAccountTokenCreator";
const EDITOR: &str = "roles/editor";
const OWNER: &str = "roles/owner";

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_SERVICE_ACCOUNT: &str = "default";

pub const GKE_CONTEXT_PREFIX: &str = "gke";

pub const CONTAINER_API: &str = "https://container.googleapis.com/v1";
pub const IAM_API: &str = "https://iam.googleapis.com/v1";
pub const RESOURCE_MANAGER_API: &str = "https://cloudresourcemanager.googleapis.com/v1";
