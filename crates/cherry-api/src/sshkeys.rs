//! SSH keys.

use crate::resource::Resource;
use crate::users::UserModel;
use cherry_core::client::SSH_KEYS_DEFAULT_TIMEOUT;
use cherry_core::ids::SshKeyId;
use cherry_core::query::QueryParams;
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use validator::Validate;

const SSH_KEY_FIELDS: &[&str] = &["ssh_key", "user"];

/// A public SSH key registered with the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshKeyModel {
    /// SSH key ID
    pub id: SshKeyId,
    /// Label
    pub label: String,
    /// Public key
    pub key: String,
    /// Key fingerprint
    pub fingerprint: String,
    /// Owner
    pub user: UserModel,
    /// Timestamp of the last update
    pub updated: String,
    /// Timestamp of creation
    pub created: String,
    /// Href URL
    pub href: String,
}

/// SSH key creation payload.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateSshKeyRequest {
    /// Label
    #[validate(length(min = 1))]
    pub label: String,
    /// Public key
    #[validate(length(min = 1))]
    pub key: String,
}

/// SSH key update payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateSshKeyRequest {
    /// New label
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub label: Option<String>,
    /// New public key
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub key: Option<String>,
}

/// An SSH key resource.
pub type SshKey = Resource<SshKeyClient, SshKeyModel>;

impl SshKey {
    /// SSH key ID.
    #[must_use]
    pub fn id(&self) -> SshKeyId {
        self.model().id
    }

    /// Update the key and refresh the snapshot.
    pub async fn update(&mut self, request: &UpdateSshKeyRequest) -> Result<()> {
        let fresh = self.client().update(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Delete the key.
    pub async fn delete(self) -> Result<()> {
        self.client().delete(self.id()).await
    }
}

/// Client for SSH keys.
#[derive(Debug, Clone)]
pub struct SshKeyClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl SshKeyClient {
    /// Create an SSH key client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(SSH_KEYS_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Timeout applied to every request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Retrieve an SSH key by ID.
    pub async fn get_by_id(&self, id: SshKeyId) -> Result<SshKey> {
        let response = self
            .api
            .get(
                &format!("ssh-keys/{id}"),
                Some(QueryParams::fields(SSH_KEY_FIELDS)),
                self.request_timeout,
            )
            .await?;
        Ok(SshKey::new(self.clone(), response.json()?))
    }

    /// Retrieve every SSH key available to the token.
    pub async fn get_all(&self) -> Result<Vec<SshKey>> {
        let response = self
            .api
            .get(
                "ssh-keys",
                Some(QueryParams::fields(SSH_KEY_FIELDS)),
                self.request_timeout,
            )
            .await?;
        let models: Vec<SshKeyModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| SshKey::new(self.clone(), model))
            .collect())
    }

    /// Register a new SSH key.
    pub async fn create(&self, request: &CreateSshKeyRequest) -> Result<SshKey> {
        request.validate()?;
        let response = self
            .api
            .post("ssh-keys", request, None, self.request_timeout)
            .await?;
        let id: SshKeyId = response.resource_id()?;
        info!(ssh_key_id = %id, label = %request.label, "Created SSH key");
        self.get_by_id(id).await
    }

    /// Update an SSH key.
    pub async fn update(&self, id: SshKeyId, request: &UpdateSshKeyRequest) -> Result<SshKey> {
        request.validate()?;
        let response = self
            .api
            .put(&format!("ssh-keys/{id}"), request, None, self.request_timeout)
            .await?;
        self.get_by_id(response.resource_id()?).await
    }

    /// Delete an SSH key.
    pub async fn delete(&self, id: SshKeyId) -> Result<()> {
        self.api
            .delete(&format!("ssh-keys/{id}"), None, self.request_timeout)
            .await?;
        info!(ssh_key_id = %id, "Deleted SSH key");
        Ok(())
    }
}
