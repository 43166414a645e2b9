//! Servers: baremetal machines and virtual private servers.
//!
//! Besides CRUD, servers accept power and maintenance actions. All of them
//! are posted to `servers/{id}/actions`, and the returned server is fetched
//! again so the handle always reflects the API's view.

use crate::block_storages::BlockStorageModel;
use crate::ips::IpModel;
use crate::plans::{PlanModel, Pricing};
use crate::projects::ProjectModel;
use crate::regions::RegionModel;
use crate::resource::Resource;
use crate::sshkeys::SshKeyModel;
use async_trait::async_trait;
use cherry_core::backoff::{self, Deployable, Refresh};
use cherry_core::client::SERVERS_DEFAULT_TIMEOUT;
use cherry_core::ids::{IpId, ProjectId, ServerId, SshKeyId, StorageId};
use cherry_core::{ApiClient, Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use validator::Validate;

/// A BGP route announced for a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpRoute {
    /// Route subnet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    /// Whether the route is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Router address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<String>,
    /// Route age
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Last update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

// The API reports some flags as 0/1 integers.
fn flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    }))
}

/// Server BGP session data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerBgp {
    /// Whether BGP is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whether BGP is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// Session status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Number of routers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routers: Option<u32>,
    /// Connected sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<u32>,
    /// Route limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Whether a session is active
    #[serde(default, deserialize_with = "flag", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Announced routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<BgpRoute>>,
    /// Last update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

/// Image deployed on a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedImage {
    /// Image name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Image slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Baseboard management controller credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bmc {
    /// BMC password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// BMC user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// A server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerModel {
    /// Server ID
    pub id: ServerId,
    /// Server name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Href URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// BMC credentials, baremetal only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmc: Option<Bmc>,
    /// Hostname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Initial root password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Initial user name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Deployed OS image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_image: Option<DeployedImage>,
    /// Whether this is a spot instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_instance: Option<bool>,
    /// Region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionModel>,
    /// Power state, such as `active`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Provisioning status, `deployed` once ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// BGP data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgp: Option<ServerBgp>,
    /// Plan
    pub plan: PlanModel,
    /// Current pricing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    /// Installed SSH keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<SshKeyModel>>,
    /// Assigned IP addresses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<Vec<IpModel>>,
    /// Attached block storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<BlockStorageModel>,
    /// User-defined tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// Scheduled termination date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<String>,
    /// Deployment date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Traffic used in the current period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_used_bytes: Option<u64>,
    /// Owning project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectModel>,
}

/// Server creation payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct CreateServerRequest {
    /// Plan slug
    #[validate(length(min = 1))]
    pub plan: String,
    /// Image slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// OS partition size in GB
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub os_partition_size: Option<u32>,
    /// Region slug
    #[validate(length(min = 1))]
    pub region: String,
    /// Hostname
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// SSH keys to install
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<SshKeyId>>,
    /// Extra IP addresses to assign
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<Vec<IpId>>,
    /// Base64 encoded cloud-init user data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// User-defined tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// Deploy as a spot instance
    pub spot_market: bool,
    /// Block storage to attach
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<StorageId>,
}

impl CreateServerRequest {
    /// A server of `plan` in `region`.
    #[must_use]
    pub fn new(plan: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            plan: plan.into(),
            region: region.into(),
            ..Self::default()
        }
    }
}

/// Server update payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateServerRequest {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New hostname
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub hostname: Option<String>,
    /// New tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// Enable or disable BGP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgp: Option<bool>,
}

/// Rescue mode payload.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct EnterRescueModeRequest {
    /// Root password of the rescue system
    #[validate(length(min = 1))]
    pub password: String,
}

/// Rebuild payload. Rebuilding wipes the server.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RebuildRequest {
    /// Image slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Hostname
    #[validate(length(min = 1))]
    pub hostname: String,
    /// Root password
    #[validate(length(min = 1))]
    pub password: String,
    /// SSH keys to install
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<SshKeyId>>,
    /// Base64 encoded cloud-init user data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// OS partition size in GB
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub os_partition_size: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ServerAction<'a> {
    PowerOff,
    PowerOn,
    Reboot,
    EnterRescueMode(&'a EnterRescueModeRequest),
    ExitRescueMode,
    ResetBmcPassword,
    Rebuild(&'a RebuildRequest),
}

impl ServerAction<'_> {
    const fn name(&self) -> &'static str {
        match self {
            Self::PowerOff => "power-off",
            Self::PowerOn => "power-on",
            Self::Reboot => "reboot",
            Self::EnterRescueMode(_) => "enter-rescue-mode",
            Self::ExitRescueMode => "exit-rescue-mode",
            Self::ResetBmcPassword => "reset-bmc-password",
            Self::Rebuild(_) => "rebuild",
        }
    }
}

/// A server resource.
pub type Server = Resource<ServerClient, ServerModel>;

impl Server {
    /// Server ID.
    #[must_use]
    pub fn id(&self) -> ServerId {
        self.model().id
    }

    /// Update the server and refresh the snapshot.
    pub async fn update(&mut self, request: &UpdateServerRequest) -> Result<()> {
        let fresh = self.client().update(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Power the server off.
    pub async fn power_off(&mut self) -> Result<()> {
        let fresh = self.client().power_off(self.id()).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Power the server on.
    pub async fn power_on(&mut self) -> Result<()> {
        let fresh = self.client().power_on(self.id()).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Reboot the server.
    pub async fn reboot(&mut self) -> Result<()> {
        let fresh = self.client().reboot(self.id()).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Boot into the rescue system. Baremetal only.
    pub async fn enter_rescue_mode(&mut self, request: &EnterRescueModeRequest) -> Result<()> {
        let fresh = self.client().enter_rescue_mode(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Leave the rescue system.
    pub async fn exit_rescue_mode(&mut self) -> Result<()> {
        let fresh = self.client().exit_rescue_mode(self.id()).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Reinstall the server.
    pub async fn rebuild(&mut self, request: &RebuildRequest) -> Result<()> {
        let fresh = self.client().rebuild(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Reset the BMC password. Baremetal only.
    pub async fn reset_bmc_password(&mut self) -> Result<()> {
        let fresh = self.client().reset_bmc_password(self.id()).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Poll until the server reports `deployed`.
    pub async fn wait_until_deployed(&mut self, timeout: Duration) -> Result<()> {
        backoff::wait_until_deployed(self, timeout).await
    }

    /// Delete the server.
    pub async fn delete(self) -> Result<()> {
        self.client().delete(self.id()).await
    }
}

#[async_trait]
impl Refresh for Server {
    const KIND: &'static str = "Server";

    async fn refresh(&mut self) -> Result<()> {
        let fresh = self.client().get_by_id(self.id()).await?;
        self.replace_model(fresh);
        Ok(())
    }
}

impl Deployable for Server {
    fn status(&self) -> Option<&str> {
        self.model().status.as_deref()
    }
}

/// Client for servers.
#[derive(Debug, Clone)]
pub struct ServerClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl ServerClient {
    /// Create a server client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(SERVERS_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retrieve a server by ID.
    pub async fn get_by_id(&self, id: ServerId) -> Result<Server> {
        let response = self
            .api
            .get(&format!("servers/{id}"), None, self.request_timeout)
            .await?;
        Ok(Server::new(self.clone(), response.json()?))
    }

    /// Retrieve all servers of a project.
    pub async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Server>> {
        let response = self
            .api
            .get(
                &format!("projects/{project_id}/servers"),
                None,
                self.request_timeout,
            )
            .await?;
        let models: Vec<ServerModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| Server::new(self.clone(), model))
            .collect())
    }

    /// Deploy a new server in a project.
    ///
    /// The returned server is usually still provisioning; see
    /// [`Server::wait_until_deployed`].
    pub async fn create(&self, project_id: ProjectId, request: &CreateServerRequest) -> Result<Server> {
        request.validate()?;
        let response = self
            .api
            .post(
                &format!("projects/{project_id}/servers"),
                request,
                None,
                self.request_timeout,
            )
            .await?;
        let id: ServerId = response.resource_id()?;
        info!(server_id = %id, %project_id, plan = %request.plan, "Created server");
        self.get_by_id(id).await
    }

    /// Update a server.
    pub async fn update(&self, id: ServerId, request: &UpdateServerRequest) -> Result<Server> {
        request.validate()?;
        let response = self
            .api
            .put(&format!("servers/{id}"), request, None, self.request_timeout)
            .await?;
        self.get_by_id(response.resource_id()?).await
    }

    /// Delete a server.
    pub async fn delete(&self, id: ServerId) -> Result<()> {
        self.api
            .delete(&format!("servers/{id}"), None, self.request_timeout)
            .await?;
        info!(server_id = %id, "Deleted server");
        Ok(())
    }

    async fn act(&self, id: ServerId, action: &ServerAction<'_>) -> Result<Server> {
        let response = self
            .api
            .post(
                &format!("servers/{id}/actions"),
                action,
                None,
                self.request_timeout,
            )
            .await?;
        info!(server_id = %id, action = action.name(), "Server action accepted");
        self.get_by_id(response.resource_id()?).await
    }

    async fn ensure_baremetal(&self, id: ServerId, operation: &str) -> Result<()> {
        let server = self.get_by_id(id).await?;
        if server.model().plan.is_baremetal() {
            return Ok(());
        }
        warn!(
            server_id = %id,
            plan_type = %server.model().plan.plan_type,
            operation,
            "Refusing baremetal-only operation"
        );
        Err(Error::NotBaremetal(operation.to_string()))
    }

    /// Power off a server.
    pub async fn power_off(&self, id: ServerId) -> Result<Server> {
        self.act(id, &ServerAction::PowerOff).await
    }

    /// Power on a server.
    pub async fn power_on(&self, id: ServerId) -> Result<Server> {
        self.act(id, &ServerAction::PowerOn).await
    }

    /// Reboot a server.
    pub async fn reboot(&self, id: ServerId) -> Result<Server> {
        self.act(id, &ServerAction::Reboot).await
    }

    /// Boot a baremetal server into the rescue system.
    pub async fn enter_rescue_mode(
        &self,
        id: ServerId,
        request: &EnterRescueModeRequest,
    ) -> Result<Server> {
        request.validate()?;
        self.ensure_baremetal(id, "rescue mode").await?;
        self.act(id, &ServerAction::EnterRescueMode(request)).await
    }

    /// Leave the rescue system.
    pub async fn exit_rescue_mode(&self, id: ServerId) -> Result<Server> {
        self.act(id, &ServerAction::ExitRescueMode).await
    }

    /// Reinstall a server, wiping its disks.
    pub async fn rebuild(&self, id: ServerId, request: &RebuildRequest) -> Result<Server> {
        request.validate()?;
        self.act(id, &ServerAction::Rebuild(request)).await
    }

    /// Reset the BMC password of a baremetal server.
    pub async fn reset_bmc_password(&self, id: ServerId) -> Result<Server> {
        self.ensure_baremetal(id, "BMC password reset").await?;
        self.act(id, &ServerAction::ResetBmcPassword).await
    }
}
