//! Plans: server hardware offerings and their pricing.

use crate::regions::RegionModel;
use crate::resource::Resource;
use cherry_core::client::PLANS_DEFAULT_TIMEOUT;
use cherry_core::ids::{PlanId, TeamId};
use cherry_core::query::QueryParams;
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const PLAN_FIELDS: &[&str] = &["plan", "specs", "pricing", "region", "href"];

/// Plan type of dedicated hardware; the only one with rescue mode and BMC.
pub const BAREMETAL_PLAN_TYPE: &str = "baremetal";

/// A price point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Price
    pub price: f64,
    /// Whether tax is applied
    pub taxed: bool,
    /// Currency
    pub currency: String,
    /// Billing period unit, such as `Hourly`
    pub unit: String,
}

/// CPU specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cpus {
    /// CPU name
    pub name: String,
    /// Number of CPUs
    pub count: u32,
    /// Cores per CPU
    pub cores: u32,
    /// Core frequency
    pub frequency: f64,
    /// Frequency unit
    pub unit: String,
}

/// Memory specs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// Memory name
    pub name: String,
    /// Number of modules
    pub count: u32,
    /// Total capacity
    pub total: u64,
    /// Capacity unit
    pub unit: String,
}

/// Storage device specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDevice {
    /// Device name
    pub name: String,
    /// Number of devices
    pub count: u32,
    /// Device size
    pub size: f64,
    /// Size unit
    pub unit: String,
}

/// A named spec, used for RAID, NICs and bandwidth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSpec {
    /// Name
    pub name: String,
}

/// Hardware specs of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specs {
    /// CPUs
    pub cpus: Cpus,
    /// Memory
    pub memory: Memory,
    /// Storage devices
    pub storage: Vec<StorageDevice>,
    /// RAID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raid: Option<NamedSpec>,
    /// Network interfaces
    pub nics: NamedSpec,
    /// Bandwidth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<NamedSpec>,
}

/// A region offering a plan, with stock levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableRegion {
    /// Region
    #[serde(flatten)]
    pub region: RegionModel,
    /// Servers in stock
    pub stock_qty: u32,
    /// Spot servers in stock
    pub spot_qty: u32,
}

/// A server plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanModel {
    /// Plan ID
    pub id: PlanId,
    /// Plan name
    pub name: String,
    /// Plan name slug
    pub slug: String,
    /// Plan type, such as `baremetal` or `vps`
    #[serde(rename = "type")]
    pub plan_type: String,
    /// Hardware specs
    pub specs: Specs,
    /// Prices per billing period
    pub pricing: Vec<Pricing>,
    /// Regions offering the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_regions: Option<Vec<AvailableRegion>>,
}

impl PlanModel {
    /// Whether the plan is dedicated hardware.
    #[must_use]
    pub fn is_baremetal(&self) -> bool {
        self.plan_type == BAREMETAL_PLAN_TYPE
    }
}

/// A plan resource.
pub type Plan = Resource<PlanClient, PlanModel>;

impl Plan {
    /// Plan ID.
    #[must_use]
    pub fn id(&self) -> PlanId {
        self.model().id
    }
}

/// Plan lookup key: plans can be addressed by ID or slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanRef {
    /// Numeric ID
    Id(PlanId),
    /// Slug, such as `e3_1240v3`
    Slug(String),
}

impl fmt::Display for PlanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Slug(slug) => f.write_str(slug),
        }
    }
}

impl From<PlanId> for PlanRef {
    fn from(id: PlanId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for PlanRef {
    fn from(slug: &str) -> Self {
        Self::Slug(slug.to_string())
    }
}

/// Client for plans.
#[derive(Debug, Clone)]
pub struct PlanClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl PlanClient {
    /// Create a plan client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(PLANS_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    async fn get(&self, plan: &PlanRef) -> Result<Plan> {
        let response = self
            .api
            .get(
                &format!("plans/{plan}"),
                Some(QueryParams::fields(PLAN_FIELDS)),
                self.request_timeout,
            )
            .await?;
        Ok(Plan::new(self.clone(), response.json()?))
    }

    /// Retrieve a plan by ID.
    pub async fn get_by_id(&self, id: PlanId) -> Result<Plan> {
        self.get(&PlanRef::Id(id)).await
    }

    /// Retrieve a plan by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Plan> {
        self.get(&PlanRef::from(slug)).await
    }

    /// Retrieve a plan by ID or slug.
    pub async fn get_by_id_or_slug(&self, plan: impl Into<PlanRef>) -> Result<Plan> {
        self.get(&plan.into()).await
    }

    /// Retrieve the plans available to a team.
    pub async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<Plan>> {
        let response = self
            .api
            .get(
                &format!("teams/{team_id}/plans"),
                Some(QueryParams::fields(PLAN_FIELDS)),
                self.request_timeout,
            )
            .await?;
        let models: Vec<PlanModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| Plan::new(self.clone(), model))
            .collect())
    }
}
