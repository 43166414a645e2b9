//! IP addresses.

use crate::projects::ProjectModel;
use crate::regions::RegionModel;
use crate::resource::Resource;
use cherry_core::client::IPS_DEFAULT_TIMEOUT;
use cherry_core::ids::{IpId, ProjectId, ServerId};
use cherry_core::query::QueryParams;
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use validator::{Validate, ValidationError};

const IP_FIELDS: &[&str] = &["ip", "project", "routed_to", "region", "href", "bgp"];

/// Short reference to the server a resource is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedServer {
    /// Server ID
    pub id: ServerId,
    /// Server href
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Server hostname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// An IP address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpModel {
    /// IP address ID
    pub id: IpId,
    /// Address
    pub address: String,
    /// Address family, 4 or 6
    pub address_family: u8,
    /// CIDR notation
    pub cidr: String,
    /// Gateway address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// Type, such as `floating-ip` or `primary-ip`
    #[serde(rename = "type")]
    pub ip_type: String,
    /// Region
    pub region: RegionModel,
    /// Address this one is routed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routed_to: Option<Box<IpModel>>,
    /// Server this address is targeted to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeted_to: Option<AttachedServer>,
    /// Owning project
    pub project: ProjectModel,
    /// PTR record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptr_record: Option<String>,
    /// A record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a_record: Option<String>,
    /// User-defined tags
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Whether DDoS scrubbing is enabled
    pub ddos_scrubbing: bool,
    /// Href URL
    pub href: String,
}

fn routed_or_targeted(
    routed_to: Option<&IpId>,
    targeted_to: Option<ServerId>,
) -> std::result::Result<(), ValidationError> {
    if routed_to.is_some() && targeted_to.is_some() {
        return Err(ValidationError::new("routed_to and targeted_to are mutually exclusive"));
    }
    Ok(())
}

fn validate_create_target(request: &CreateIpRequest) -> std::result::Result<(), ValidationError> {
    routed_or_targeted(request.routed_to.as_ref(), request.targeted_to)
}

fn validate_update_target(request: &UpdateIpRequest) -> std::result::Result<(), ValidationError> {
    routed_or_targeted(request.routed_to.as_ref(), request.targeted_to)
}

/// Floating IP creation payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[validate(schema(function = "validate_create_target"))]
pub struct CreateIpRequest {
    /// Region slug
    #[validate(length(min = 1))]
    pub region: String,
    /// Address to route the new one to; excludes `targeted_to`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routed_to: Option<IpId>,
    /// Server to target the new address to; excludes `routed_to`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targeted_to: Option<ServerId>,
    /// PTR record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptr_record: Option<String>,
    /// A record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a_record: Option<String>,
    /// Enable DDoS scrubbing
    pub ddos_scrubbing: bool,
    /// User-defined tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl CreateIpRequest {
    /// A floating IP in `region`.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }
}

/// IP address update payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[validate(schema(function = "validate_update_target"))]
pub struct UpdateIpRequest {
    /// PTR record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptr_record: Option<String>,
    /// A record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a_record: Option<String>,
    /// Address to route to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routed_to: Option<IpId>,
    /// Server to target; ID 0 unassigns the address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targeted_to: Option<ServerId>,
    /// User-defined tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl UpdateIpRequest {
    /// Detach the address from whatever it is routed or targeted to.
    #[must_use]
    pub fn unassign() -> Self {
        Self {
            targeted_to: Some(ServerId::new(0)),
            ..Self::default()
        }
    }
}

/// An IP address resource.
pub type Ip = Resource<IpClient, IpModel>;

impl Ip {
    /// IP address ID.
    #[must_use]
    pub fn id(&self) -> &IpId {
        &self.model().id
    }

    /// Whether the address is routed or targeted somewhere.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.model().routed_to.is_some() || self.model().targeted_to.is_some()
    }

    /// Update the address and refresh the snapshot.
    pub async fn update(&mut self, request: &UpdateIpRequest) -> Result<()> {
        let fresh = self.client().update(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Delete the address. A routed address is unassigned first.
    pub async fn delete(mut self) -> Result<()> {
        if self.model().routed_to.is_some() {
            self.update(&UpdateIpRequest::unassign()).await?;
        }
        self.client().delete(self.id()).await
    }
}

/// Client for IP addresses.
#[derive(Debug, Clone)]
pub struct IpClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl IpClient {
    /// Create an IP client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(IPS_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retrieve an IP address by ID.
    pub async fn get_by_id(&self, id: &IpId) -> Result<Ip> {
        let response = self
            .api
            .get(
                &format!("ips/{id}"),
                Some(QueryParams::fields(IP_FIELDS)),
                self.request_timeout,
            )
            .await?;
        Ok(Ip::new(self.clone(), response.json()?))
    }

    /// Retrieve all IP addresses of a project.
    pub async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Ip>> {
        let response = self
            .api
            .get(
                &format!("projects/{project_id}/ips"),
                Some(QueryParams::fields(IP_FIELDS)),
                self.request_timeout,
            )
            .await?;
        let models: Vec<IpModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| Ip::new(self.clone(), model))
            .collect())
    }

    /// Create a floating IP in a project.
    pub async fn create(&self, project_id: ProjectId, request: &CreateIpRequest) -> Result<Ip> {
        request.validate()?;
        let response = self
            .api
            .post(
                &format!("projects/{project_id}/ips"),
                request,
                None,
                self.request_timeout,
            )
            .await?;
        let id: IpId = response.resource_id()?;
        info!(ip_id = %id, %project_id, "Created IP address");
        self.get_by_id(&id).await
    }

    /// Update an IP address.
    pub async fn update(&self, id: &IpId, request: &UpdateIpRequest) -> Result<Ip> {
        request.validate()?;
        let response = self
            .api
            .put(&format!("ips/{id}"), request, None, self.request_timeout)
            .await?;
        let id: IpId = response.resource_id()?;
        self.get_by_id(&id).await
    }

    /// Delete an IP address.
    pub async fn delete(&self, id: &IpId) -> Result<()> {
        self.api
            .delete(&format!("ips/{id}"), None, self.request_timeout)
            .await?;
        info!(ip_id = %id, "Deleted IP address");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, mock_api};
    use cherry_core::Error;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    const IP_ID: &str = "bab8f4a1-07...0dfdc87ba";

    fn ip_path() -> String {
        format!("/v1/ips/{IP_ID}")
    }

    #[tokio::test]
    async fn test_get_attached() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path(ip_path()))
            .and(query_param("fields", "ip,project,routed_to,region,href,bgp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("attached_ip")))
            .mount(&server)
            .await;

        let ip = IpClient::new(api).get_by_id(&IpId::from(IP_ID)).await.unwrap();
        let model = ip.model();
        assert!(ip.is_assigned());
        assert_eq!(model.routed_to.as_ref().unwrap().ip_type, "primary-ip");
        assert_eq!(
            model.targeted_to.as_ref().unwrap().hostname.as_deref(),
            Some("trusted-panda")
        );
        assert_eq!(model.tags.get("env").map(String::as_str), Some("test"));
    }

    #[tokio::test]
    async fn test_create() {
        let (server, api) = mock_api().await;
        let ip = fixture("ip");

        Mock::given(method("POST"))
            .and(path("/v1/projects/123456/ips"))
            .and(body_json(json!({
                "region": "eu_nord_1",
                "targeted_to": 622_690,
                "ddos_scrubbing": false
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(&ip))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ip_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(&ip))
            .mount(&server)
            .await;

        let request = CreateIpRequest {
            targeted_to: Some(ServerId::new(622_690)),
            ..CreateIpRequest::new("eu_nord_1")
        };
        let created = IpClient::new(api)
            .create(ProjectId::new(123_456), &request)
            .await
            .unwrap();
        assert_eq!(created.id().as_str(), IP_ID);
        assert!(!created.is_assigned());
    }

    #[tokio::test]
    async fn test_create_rejects_routed_and_targeted() {
        let (_server, api) = mock_api().await;

        let request = CreateIpRequest {
            routed_to: Some(IpId::from("other")),
            targeted_to: Some(ServerId::new(1)),
            ..CreateIpRequest::new("eu_nord_1")
        };
        let err = IpClient::new(api)
            .create(ProjectId::new(123_456), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_unassigns_first() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path(ip_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("attached_ip")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(ip_path()))
            .and(body_json(json!({"targeted_to": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("ip")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ip_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("ip")))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(ip_path()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let ip = IpClient::new(api).get_by_id(&IpId::from(IP_ID)).await.unwrap();
        ip.delete().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unassigned_skips_update() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path(ip_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("ip")))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(ip_path()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let ip = IpClient::new(api).get_by_id(&IpId::from(IP_ID)).await.unwrap();
        ip.delete().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_targeted_only_skips_update() {
        let (server, api) = mock_api().await;
        let mut body = fixture("ip");
        body["targeted_to"] = json!({"id": 622_690, "hostname": "trusted-panda"});

        Mock::given(method("GET"))
            .and(path(ip_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(ip_path()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let ip = IpClient::new(api).get_by_id(&IpId::from(IP_ID)).await.unwrap();
        assert!(ip.is_assigned());
        ip.delete().await.unwrap();
    }
}
