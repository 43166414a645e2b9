//! Operating system images.

use crate::plans::Pricing;
use crate::resource::Resource;
use cherry_core::client::IMAGES_DEFAULT_TIMEOUT;
use cherry_core::ids::ImageId;
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// An OS image that can be installed on a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageModel {
    /// Image ID
    pub id: ImageId,
    /// Full name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name slug, used when creating servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Licensing prices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Vec<Pricing>>,
}

/// An image resource.
pub type Image = Resource<ImageClient, ImageModel>;

impl Image {
    /// Image ID.
    #[must_use]
    pub fn id(&self) -> ImageId {
        self.model().id
    }
}

/// Client for images.
#[derive(Debug, Clone)]
pub struct ImageClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl ImageClient {
    /// Create an image client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(IMAGES_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retrieve the images available for a plan.
    pub async fn list_by_plan(&self, plan_slug: &str) -> Result<Vec<Image>> {
        let response = self
            .api
            .get(&format!("plans/{plan_slug}/images"), None, self.request_timeout)
            .await?;
        let models: Vec<ImageModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| Image::new(self.clone(), model))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, mock_api};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_list_by_plan() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path("/v1/plans/cloud_vps_1/images"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([fixture("image"), {"id": 1}])),
            )
            .mount(&server)
            .await;

        let images = ImageClient::new(api)
            .list_by_plan("cloud_vps_1")
            .await
            .unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].model().slug.as_deref(), Some("debian_12_64bit"));
        assert_eq!(images[1].id(), ImageId::new(1));
        assert_eq!(images[1].model().name, None);
    }
}
