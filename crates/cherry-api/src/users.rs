//! Users.

use crate::resource::Resource;
use cherry_core::client::USERS_DEFAULT_TIMEOUT;
use cherry_core::ids::UserId;
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Account of a Cherry Servers user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    /// User ID
    pub id: UserId,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Whether the email address is verified
    pub email_verified: bool,
    /// Phone number
    pub phone: String,
    /// Security phone number
    pub security_phone: String,
    /// Whether the security phone number is verified
    pub security_phone_verified: bool,
    /// Href URL
    pub href: String,
}

/// A user resource.
pub type User = Resource<UserClient, UserModel>;

impl User {
    /// User ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.model().id
    }
}

/// Client for user accounts.
#[derive(Debug, Clone)]
pub struct UserClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl UserClient {
    /// Create a user client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(USERS_DEFAULT_TIMEOUT),
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

    /// Retrieve a user by ID.
    pub async fn get_by_id(&self, id: UserId) -> Result<User> {
        let response = self
            .api
            .get(&format!("users/{id}"), None, self.request_timeout)
            .await?;
        Ok(User::new(self.clone(), response.json()?))
    }

    /// Retrieve the user owning the API token.
    pub async fn get_current_user(&self) -> Result<User> {
        let response = self.api.get("user", None, self.request_timeout).await?;
        Ok(User::new(self.clone(), response.json()?))
    }
}
