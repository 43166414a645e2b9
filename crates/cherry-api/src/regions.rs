//! Regions.

use crate::resource::Resource;
use cherry_core::client::REGIONS_DEFAULT_TIMEOUT;
use cherry_core::ids::RegionId;
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// BGP settings of a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBgp {
    /// Host IP addresses
    pub hosts: Vec<String>,
    /// Region ASN
    pub asn: u32,
}

/// A datacenter region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionModel {
    /// Region ID
    pub id: RegionId,
    /// Region name
    pub name: String,
    /// Region name slug
    pub slug: String,
    /// ISO 3166-1 alpha-2 country code
    pub region_iso_2: String,
    /// BGP settings
    pub bgp: RegionBgp,
    /// Server location
    pub location: String,
    /// Href URL
    pub href: String,
}

/// A region resource.
pub type Region = Resource<RegionClient, RegionModel>;

impl Region {
    /// Region ID.
    #[must_use]
    pub fn id(&self) -> RegionId {
        self.model().id
    }
}

/// Client for regions.
#[derive(Debug, Clone)]
pub struct RegionClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl RegionClient {
    /// Create a region client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(REGIONS_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retrieve a region by ID.
    pub async fn get_by_id(&self, id: RegionId) -> Result<Region> {
        let response = self
            .api
            .get(&format!("regions/{id}"), None, self.request_timeout)
            .await?;
        Ok(Region::new(self.clone(), response.json()?))
    }

    /// Retrieve all regions.
    pub async fn get_all(&self) -> Result<Vec<Region>> {
        let response = self.api.get("regions", None, self.request_timeout).await?;
        let models: Vec<RegionModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| Region::new(self.clone(), model))
            .collect())
    }
}
