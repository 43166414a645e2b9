//! Single entry point bundling every resource client.

use crate::backup_storages::BackupStorageClient;
use crate::block_storages::BlockStorageClient;
use crate::images::ImageClient;
use crate::ips::IpClient;
use crate::plans::PlanClient;
use crate::projects::ProjectClient;
use crate::regions::RegionClient;
use crate::servers::ServerClient;
use crate::sshkeys::SshKeyClient;
use crate::teams::TeamClient;
use crate::users::UserClient;
use cherry_core::{ApiClient, ApiClientBuilder, CherryClientConfig, Result};
use std::sync::Arc;
use tracing::debug;

/// All resource clients, sharing one authenticated connection pool.
///
/// ```no_run
/// # async fn run() -> cherry_api::Result<()> {
/// use cherry_api::CherryApi;
/// use cherry_core::ids::ProjectId;
///
/// let cherry = CherryApi::new("my-token")?;
/// for server in cherry.servers.list_by_project(ProjectId::new(123_456)).await? {
///     println!("{:?}", server.model().hostname);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CherryApi {
    /// Users
    pub users: UserClient,
    /// SSH keys
    pub ssh_keys: SshKeyClient,
    /// Teams
    pub teams: TeamClient,
    /// Projects
    pub projects: ProjectClient,
    /// Regions
    pub regions: RegionClient,
    /// Plans
    pub plans: PlanClient,
    /// Images
    pub images: ImageClient,
    /// IP addresses
    pub ips: IpClient,
    /// Servers
    pub servers: ServerClient,
    /// Block storage volumes
    pub block_storages: BlockStorageClient,
    /// Backup storages
    pub backup_storages: BackupStorageClient,
    api: Arc<ApiClient>,
}

impl CherryApi {
    /// Clients for the default endpoint, authenticated with `token`.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::from_config(CherryClientConfig::new(token)?)
    }

    /// Clients configured from `CHERRY_AUTH_TOKEN` and friends.
    pub fn from_env() -> Result<Self> {
        Self::from_config(CherryClientConfig::from_env()?)
    }

    /// Clients built from an explicit configuration.
    pub fn from_config(config: CherryClientConfig) -> Result<Self> {
        let api = ApiClientBuilder::new(config).build()?;
        Ok(Self::from_api_client(Arc::new(api)))
    }

    /// Clients sharing an existing API client.
    #[must_use]
    pub fn from_api_client(api: Arc<ApiClient>) -> Self {
        debug!(base_url = %api.base_url(), user_agent = api.user_agent(), "Initialized Cherry Servers clients");
        Self {
            users: UserClient::new(Arc::clone(&api)),
            ssh_keys: SshKeyClient::new(Arc::clone(&api)),
            teams: TeamClient::new(Arc::clone(&api)),
            projects: ProjectClient::new(Arc::clone(&api)),
            regions: RegionClient::new(Arc::clone(&api)),
            plans: PlanClient::new(Arc::clone(&api)),
            images: ImageClient::new(Arc::clone(&api)),
            ips: IpClient::new(Arc::clone(&api)),
            servers: ServerClient::new(Arc::clone(&api)),
            block_storages: BlockStorageClient::new(Arc::clone(&api)),
            backup_storages: BackupStorageClient::new(Arc::clone(&api)),
            api,
        }
    }

    /// The underlying API client.
    #[must_use]
    pub fn api_client(&self) -> &Arc<ApiClient> {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, mock_api};
    use cherry_core::ids::ProjectId;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[test]
    fn test_new_rejects_empty_token() {
        assert!(CherryApi::new("").is_err());
    }

    #[tokio::test]
    async fn test_clients_share_transport() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/123456"))
            .and(header("authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("project")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/user"))
            .and(header("authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("user")))
            .expect(1)
            .mount(&server)
            .await;

        let cherry = CherryApi::from_api_client(api);
        assert_eq!(Arc::strong_count(cherry.api_client()), 12);

        let project = cherry.projects.get_by_id(ProjectId::new(123_456)).await.unwrap();
        assert_eq!(project.model().name, "test");
        let user = cherry.users.get_current_user().await.unwrap();
        assert_eq!(user.model().email, "example@example.com");
    }
}
