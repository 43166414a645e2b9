//! Elastic block storage volumes.

use crate::ips::AttachedServer;
use crate::regions::RegionModel;
use crate::resource::Resource;
use cherry_core::client::BLOCK_STORAGES_DEFAULT_TIMEOUT;
use cherry_core::ids::{ProjectId, ServerId, StorageId};
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use validator::Validate;

/// A block storage volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStorageModel {
    /// Volume ID
    pub id: StorageId,
    /// Volume name
    pub name: String,
    /// Href URL
    pub href: String,
    /// Size
    pub size: u64,
    /// Whether the size can be changed
    pub allow_edit_size: bool,
    /// Size unit
    pub unit: String,
    /// Server the volume is attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_to: Option<AttachedServer>,
    /// VLAN ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<String>,
    /// VLAN IP address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_ip: Option<String>,
    /// iSCSI initiator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<String>,
    /// iSCSI discovery IP address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_ip: Option<String>,
    /// Region
    pub region: RegionModel,
}

/// Volume creation payload.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateBlockStorageRequest {
    /// Region slug
    #[validate(length(min = 1))]
    pub region: String,
    /// Size in GB
    #[validate(range(min = 1))]
    pub size: u64,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Volume update payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateBlockStorageRequest {
    /// New size in GB; volumes can only grow
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub size: Option<u64>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Volume attachment payload.
#[derive(Debug, Clone, Serialize)]
pub struct AttachRequest {
    /// Server to attach to
    pub attach_to: ServerId,
}

/// A block storage resource.
pub type BlockStorage = Resource<BlockStorageClient, BlockStorageModel>;

impl BlockStorage {
    /// Volume ID.
    #[must_use]
    pub fn id(&self) -> StorageId {
        self.model().id
    }

    /// Update the volume and refresh the snapshot.
    ///
    /// Growing a volume assigns it a new ID; the snapshot follows it.
    pub async fn update(&mut self, request: &UpdateBlockStorageRequest) -> Result<()> {
        let fresh = self.client().update(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Attach the volume to a server.
    pub async fn attach(&mut self, server_id: ServerId) -> Result<()> {
        let fresh = self.client().attach(self.id(), server_id).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Detach the volume from its server.
    pub async fn detach(&mut self) -> Result<()> {
        let fresh = self.client().detach(self.id()).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Delete the volume.
    pub async fn delete(self) -> Result<()> {
        self.client().delete(self.id()).await
    }
}

/// Client for block storage volumes.
#[derive(Debug, Clone)]
pub struct BlockStorageClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl BlockStorageClient {
    /// Create a block storage client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(BLOCK_STORAGES_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retrieve a volume by ID.
    pub async fn get_by_id(&self, id: StorageId) -> Result<BlockStorage> {
        let response = self
            .api
            .get(&format!("storages/{id}"), None, self.request_timeout)
            .await?;
        Ok(BlockStorage::new(self.clone(), response.json()?))
    }

    /// Retrieve all volumes of a project.
    pub async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<BlockStorage>> {
        let response = self
            .api
            .get(
                &format!("projects/{project_id}/storages"),
                None,
                self.request_timeout,
            )
            .await?;
        let models: Vec<BlockStorageModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| BlockStorage::new(self.clone(), model))
            .collect())
    }

    /// Create a volume in a project.
    pub async fn create(
        &self,
        project_id: ProjectId,
        request: &CreateBlockStorageRequest,
    ) -> Result<BlockStorage> {
        request.validate()?;
        let response = self
            .api
            .post(
                &format!("projects/{project_id}/storages"),
                request,
                None,
                self.request_timeout,
            )
            .await?;
        let id: StorageId = response.resource_id()?;
        info!(storage_id = %id, %project_id, size = request.size, "Created block storage");
        self.get_by_id(id).await
    }

    /// Update a volume.
    pub async fn update(
        &self,
        id: StorageId,
        request: &UpdateBlockStorageRequest,
    ) -> Result<BlockStorage> {
        request.validate()?;
        let response = self
            .api
            .put(&format!("storages/{id}"), request, None, self.request_timeout)
            .await?;
        self.get_by_id(response.resource_id()?).await
    }

    /// Attach a volume to a server.
    pub async fn attach(&self, id: StorageId, server_id: ServerId) -> Result<BlockStorage> {
        let response = self
            .api
            .post(
                &format!("storages/{id}/attachments"),
                &AttachRequest {
                    attach_to: server_id,
                },
                None,
                self.request_timeout,
            )
            .await?;
        info!(storage_id = %id, %server_id, "Attached block storage");
        self.get_by_id(response.resource_id()?).await
    }

    /// Detach a volume from its server.
    pub async fn detach(&self, id: StorageId) -> Result<BlockStorage> {
        self.api
            .delete(
                &format!("storages/{id}/attachments"),
                None,
                self.request_timeout,
            )
            .await?;
        info!(storage_id = %id, "Detached block storage");
        self.get_by_id(id).await
    }

    /// Delete a volume.
    pub async fn delete(&self, id: StorageId) -> Result<()> {
        self.api
            .delete(&format!("storages/{id}"), None, self.request_timeout)
            .await?;
        info!(storage_id = %id, "Deleted block storage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, mock_api};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_list_by_project() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/123456/storages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                fixture("block_storage"),
                fixture("attached_block_storage")
            ])))
            .mount(&server)
            .await;

        let volumes = BlockStorageClient::new(api)
            .list_by_project(ProjectId::new(123_456))
            .await
            .unwrap();
        assert_eq!(volumes.len(), 2);
        assert!(volumes[0].model().attached_to.is_none());
        assert_eq!(
            volumes[1].model().attached_to.as_ref().unwrap().id,
            ServerId::new(622_711)
        );
        assert_eq!(volumes[1].model().vlan_id.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_attach_and_detach() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path("/v1/storages/622703"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("block_storage")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/storages/622703/attachments"))
            .and(body_json(json!({"attach_to": 622_711})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(fixture("attached_block_storage")),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/storages/622703"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(fixture("attached_block_storage")),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1/storages/622703/attachments"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/storages/622703"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("block_storage")))
            .mount(&server)
            .await;

        let client = BlockStorageClient::new(api);
        let mut volume = client.get_by_id(StorageId::new(622_703)).await.unwrap();

        volume.attach(ServerId::new(622_711)).await.unwrap();
        assert!(volume.model().attached_to.is_some());

        volume.detach().await.unwrap();
        assert!(volume.model().attached_to.is_none());
    }

    #[tokio::test]
    async fn test_update_follows_new_id() {
        let (server, api) = mock_api().await;
        let mut grown = fixture("block_storage");
        grown["id"] = json!(622_704);
        grown["size"] = json!(2);

        Mock::given(method("PUT"))
            .and(path("/v1/storages/622703"))
            .and(body_json(json!({"size": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&grown))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/storages/622704"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&grown))
            .expect(1)
            .mount(&server)
            .await;

        let request = UpdateBlockStorageRequest {
            size: Some(2),
            description: None,
        };
        let volume = BlockStorageClient::new(api)
            .update(StorageId::new(622_703), &request)
            .await
            .unwrap();
        assert_eq!(volume.id(), StorageId::new(622_704));
        assert_eq!(volume.model().size, 2);
    }
}
