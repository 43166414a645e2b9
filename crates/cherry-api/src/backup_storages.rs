//! Backup storages: per-server backup space reachable over FTP, SMB, NFS or borg.

use crate::ips::{AttachedServer, IpModel};
use crate::plans::Pricing;
use crate::regions::RegionModel;
use crate::resource::Resource;
use async_trait::async_trait;
use cherry_core::backoff::{self, Deployable, Refresh};
use cherry_core::client::BACKUP_STORAGES_DEFAULT_TIMEOUT;
use cherry_core::ids::{BackupStorageId, PlanId, ProjectId, ServerId};
use cherry_core::query::QueryParams;
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use validator::Validate;

const BACKUP_STORAGE_FIELDS: &[&str] = &[
    "available_addresses",
    "ip",
    "region",
    "project",
    "href",
    "targeted_to",
    "hostname",
    "id",
    "bgp",
    "status",
    "state",
    "private_ip",
    "public_ip",
    "size_gigabytes",
    "used_gigabytes",
    "methods",
    "rules",
    "plan",
    "pricing",
    "name",
    "whitelist",
    "enabled",
    "processing",
];

const BACKUP_PLAN_FIELDS: &[&str] = &["plan", "pricing", "href", "region"];

/// A backup storage plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupStoragePlan {
    /// Plan ID
    pub id: PlanId,
    /// Plan name
    pub name: String,
    /// Plan name slug
    pub slug: String,
    /// Capacity in GB
    pub size_gigabytes: u64,
    /// Prices per billing period
    pub pricing: Vec<Pricing>,
    /// Regions offering the plan
    pub regions: Vec<RegionModel>,
    /// Href URL
    pub href: String,
}

/// An access method of a backup storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMethod {
    /// Method name: `ftp`, `smb`, `nfs` or `borg`
    pub name: String,
    /// Login user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Login password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Service port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Service host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Authorized public key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
    /// Whitelisted addresses
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// Whether the method is enabled
    pub enabled: bool,
    /// Whether a change is being applied
    pub processing: bool,
}

/// Methods enabled by an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMethods {
    /// borg
    pub borg: bool,
    /// FTP
    pub ftp: bool,
    /// NFS
    pub nfs: bool,
    /// SMB
    pub smb: bool,
}

/// An access rule: which methods an address may use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRule {
    /// Allowed address
    pub ip: IpModel,
    /// Allowed methods
    pub methods: RuleMethods,
}

/// A backup storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupStorageModel {
    /// Backup storage ID
    pub id: BackupStorageId,
    /// Provisioning status, `deployed` once ready
    pub status: String,
    /// State
    pub state: String,
    /// Private address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,
    /// Public address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    /// Capacity in GB
    pub size_gigabytes: u64,
    /// Used space in GB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_gigabytes: Option<u64>,
    /// Server the storage belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_to: Option<AttachedServer>,
    /// Access methods
    pub methods: Vec<BackupMethod>,
    /// Addresses that may be granted access
    #[serde(default)]
    pub available_addresses: Vec<IpModel>,
    /// Access rules
    #[serde(default)]
    pub rules: Vec<BackupRule>,
    /// Plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<BackupStoragePlan>,
    /// Current pricing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    /// Region
    pub region: RegionModel,
    /// Href URL
    pub href: String,
}

impl BackupStorageModel {
    /// Look up an access method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&BackupMethod> {
        self.methods.iter().find(|method| method.name == name)
    }
}

/// Backup storage creation payload.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateBackupStorageRequest {
    /// Region slug
    #[validate(length(min = 1))]
    pub region: String,
    /// Backup plan slug
    #[validate(length(min = 1))]
    pub slug: String,
    /// Public key for borg access
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
}

impl CreateBackupStorageRequest {
    /// A backup storage of plan `slug` in `region`.
    #[must_use]
    pub fn new(region: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            slug: slug.into(),
            ssh_key: None,
        }
    }
}

/// Backup storage update payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateBackupStorageRequest {
    /// New plan slug
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub slug: Option<String>,
    /// New access password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New public key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
}

/// Access method update payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateAccessMethodsRequest {
    /// Enable or disable the method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whitelisted addresses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<String>>,
    /// Public key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
}

/// A backup storage resource.
pub type BackupStorage = Resource<BackupStorageClient, BackupStorageModel>;

impl BackupStorage {
    /// Backup storage ID.
    #[must_use]
    pub fn id(&self) -> BackupStorageId {
        self.model().id
    }

    /// Update the storage and refresh the snapshot.
    pub async fn update(&mut self, request: &UpdateBackupStorageRequest) -> Result<()> {
        let fresh = self.client().update(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Update one access method and refresh the snapshot.
    pub async fn update_access_method(
        &mut self,
        method_name: &str,
        request: &UpdateAccessMethodsRequest,
    ) -> Result<()> {
        let fresh = self
            .client()
            .update_access_method(self.id(), method_name, request)
            .await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Poll until the storage reports `deployed`.
    pub async fn wait_until_deployed(&mut self, timeout: Duration) -> Result<()> {
        backoff::wait_until_deployed(self, timeout).await
    }

    /// Delete the storage.
    pub async fn delete(self) -> Result<()> {
        self.client().delete(self.id()).await
    }
}

#[async_trait]
impl Refresh for BackupStorage {
    const KIND: &'static str = "BackupStorage";

    async fn refresh(&mut self) -> Result<()> {
        let fresh = self.client().get_by_id(self.id()).await?;
        self.replace_model(fresh);
        Ok(())
    }
}

impl Deployable for BackupStorage {
    fn status(&self) -> Option<&str> {
        Some(self.model().status.as_str())
    }
}

/// Client for backup storages.
#[derive(Debug, Clone)]
pub struct BackupStorageClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl BackupStorageClient {
    /// Create a backup storage client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(BACKUP_STORAGES_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retrieve a backup storage by ID.
    pub async fn get_by_id(&self, id: BackupStorageId) -> Result<BackupStorage> {
        let response = self
            .api
            .get(
                &format!("backup-storages/{id}"),
                Some(QueryParams::fields(BACKUP_STORAGE_FIELDS)),
                self.request_timeout,
            )
            .await?;
        Ok(BackupStorage::new(self.clone(), response.json()?))
    }

    /// Retrieve all backup storages of a project.
    pub async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<BackupStorage>> {
        let response = self
            .api
            .get(
                &format!("projects/{project_id}/backup-storages"),
                Some(QueryParams::fields(BACKUP_STORAGE_FIELDS)),
                self.request_timeout,
            )
            .await?;
        let models: Vec<BackupStorageModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| BackupStorage::new(self.clone(), model))
            .collect())
    }

    /// Retrieve the available backup storage plans.
    pub async fn list_backup_plans(&self) -> Result<Vec<BackupStoragePlan>> {
        let response = self
            .api
            .get(
                "backup-storage-plans",
                Some(QueryParams::fields(BACKUP_PLAN_FIELDS)),
                self.request_timeout,
            )
            .await?;
        response.json()
    }

    /// Order a backup storage for a server.
    pub async fn create(
        &self,
        server_id: ServerId,
        request: &CreateBackupStorageRequest,
    ) -> Result<BackupStorage> {
        request.validate()?;
        let response = self
            .api
            .post(
                &format!("servers/{server_id}/backup-storages"),
                request,
                None,
                self.request_timeout,
            )
            .await?;
        let id: BackupStorageId = response.resource_id()?;
        info!(backup_storage_id = %id, %server_id, plan = %request.slug, "Created backup storage");
        self.get_by_id(id).await
    }

    /// Update a backup storage.
    pub async fn update(
        &self,
        id: BackupStorageId,
        request: &UpdateBackupStorageRequest,
    ) -> Result<BackupStorage> {
        request.validate()?;
        let response = self
            .api
            .put(
                &format!("backup-storages/{id}"),
                request,
                None,
                self.request_timeout,
            )
            .await?;
        self.get_by_id(response.resource_id()?).await
    }

    /// Update one access method of a backup storage.
    pub async fn update_access_method(
        &self,
        id: BackupStorageId,
        method_name: &str,
        request: &UpdateAccessMethodsRequest,
    ) -> Result<BackupStorage> {
        request.validate()?;
        self.api
            .patch(
                &format!("backup-storages/{id}/methods/{method_name}"),
                request,
                None,
                self.request_timeout,
            )
            .await?;
        info!(backup_storage_id = %id, method = method_name, "Updated backup access method");
        self.get_by_id(id).await
    }

    /// Delete a backup storage.
    pub async fn delete(&self, id: BackupStorageId) -> Result<()> {
        self.api
            .delete(&format!("backup-storages/{id}"), None, self.request_timeout)
            .await?;
        info!(backup_storage_id = %id, "Deleted backup storage");
        Ok(())
    }
}
