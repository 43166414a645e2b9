//! Teams and their billing data.

use crate::plans::Pricing;
use crate::resource::Resource;
use cherry_core::client::TEAMS_DEFAULT_TIMEOUT;
use cherry_core::ids::TeamId;
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use validator::Validate;

/// Remaining time the credit covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    /// Amount of time
    pub time: i64,
    /// Time unit
    pub unit: String,
}

/// Resource spending figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditResources {
    /// Current resource pricing
    pub pricing: Pricing,
    /// Time left at the current rate
    pub remaining: RemainingTime,
}

/// Credit balance details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditDetails {
    /// Remaining credit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
    /// Credit usage rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<f64>,
    /// Currency
    pub currency: String,
}

/// Team credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    /// Account credit
    pub account: CreditDetails,
    /// Promotional credit
    pub promo: CreditDetails,
    /// Resource spending
    pub resources: CreditResources,
}

/// VAT data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vat {
    /// VAT rate
    pub amount: i64,
    /// VAT number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Whether VAT applies
    pub valid: bool,
}

/// Team billing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    /// `personal` or `business`
    #[serde(rename = "type")]
    pub billing_type: String,
    /// Company name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Company code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_code: Option<String>,
    /// First name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Address line 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_1: Option<String>,
    /// Address line 2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    /// Country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_iso_2: Option<String>,
    /// City
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// VAT data
    pub vat: Vat,
    /// Billing currency
    pub currency: String,
}

/// A team: the billing unit that owns projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamModel {
    /// Team ID
    pub id: TeamId,
    /// Team name
    pub name: String,
    /// Credit data
    pub credit: Credit,
    /// Billing data
    pub billing: Billing,
    /// Href URL
    pub href: String,
}

fn default_team_type() -> String {
    "personal".to_string()
}

/// Team creation payload.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1))]
    pub name: String,
    /// `personal` or `business`
    #[serde(rename = "type")]
    pub team_type: String,
    /// Currency, such as `EUR`
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

impl CreateTeamRequest {
    /// A personal team named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team_type: default_team_type(),
            currency: None,
        }
    }
}

/// Team update payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateTeamRequest {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    /// New type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub team_type: Option<String>,
    /// New currency
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

/// A team resource.
pub type Team = Resource<TeamClient, TeamModel>;

impl Team {
    /// Team ID.
    #[must_use]
    pub fn id(&self) -> TeamId {
        self.model().id
    }

    /// Update the team and refresh the snapshot.
    pub async fn update(&mut self, request: &UpdateTeamRequest) -> Result<()> {
        let fresh = self.client().update(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Delete the team.
    pub async fn delete(self) -> Result<()> {
        self.client().delete(self.id()).await
    }
}

/// Client for teams.
#[derive(Debug, Clone)]
pub struct TeamClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl TeamClient {
    /// Create a team client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(TEAMS_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retrieve a team by ID.
    pub async fn get_by_id(&self, id: TeamId) -> Result<Team> {
        let response = self
            .api
            .get(&format!("teams/{id}"), None, self.request_timeout)
            .await?;
        Ok(Team::new(self.clone(), response.json()?))
    }

    /// Retrieve all teams.
    pub async fn get_all(&self) -> Result<Vec<Team>> {
        let response = self.api.get("teams", None, self.request_timeout).await?;
        let models: Vec<TeamModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| Team::new(self.clone(), model))
            .collect())
    }

    /// Create a team.
    pub async fn create(&self, request: &CreateTeamRequest) -> Result<Team> {
        request.validate()?;
        let response = self
            .api
            .post("teams", request, None, self.request_timeout)
            .await?;
        let id: TeamId = response.resource_id()?;
        info!(team_id = %id, name = %request.name, "Created team");
        self.get_by_id(id).await
    }

    /// Update a team.
    pub async fn update(&self, id: TeamId, request: &UpdateTeamRequest) -> Result<Team> {
        request.validate()?;
        let response = self
            .api
            .put(&format!("teams/{id}"), request, None, self.request_timeout)
            .await?;
        self.get_by_id(response.resource_id()?).await
    }

    /// Delete a team.
    pub async fn delete(&self, id: TeamId) -> Result<()> {
        self.api
            .delete(&format!("teams/{id}"), None, self.request_timeout)
            .await?;
        info!(team_id = %id, "Deleted team");
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

    #[test]
    fn test_create_request_defaults_to_personal() {
        let body = serde_json::to_value(CreateTeamRequest::new("team")).unwrap();
        assert_eq!(body, json!({"name": "team", "type": "personal"}));
    }

    #[tokio::test]
    async fn test_get_by_id_partial_credit() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path("/v1/teams/123456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("team")))
            .mount(&server)
            .await;

        let team = TeamClient::new(api)
            .get_by_id(TeamId::new(123_456))
            .await
            .unwrap();
        let model = team.model();
        assert_eq!(model.credit.account.remaining, None);
        assert_eq!(model.credit.promo.remaining, Some(669.15));
        assert_eq!(model.billing.billing_type, "personal");
        assert_eq!(model.billing.vat.number, None);
    }

    #[tokio::test]
    async fn test_create_business_team() {
        let (server, api) = mock_api().await;
        let team = fixture("team");

        Mock::given(method("POST"))
            .and(path("/v1/teams"))
            .and(body_json(json!({"name": "team", "type": "business", "currency": "EUR"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(&team))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/teams/123456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&team))
            .mount(&server)
            .await;

        let request = CreateTeamRequest {
            team_type: "business".to_string(),
            currency: Some("EUR".to_string()),
            ..CreateTeamRequest::new("team")
        };
        let created = TeamClient::new(api).create(&request).await.unwrap();
        assert_eq!(created.id(), TeamId::new(123_456));
    }

    #[tokio::test]
    async fn test_invalid_currency_is_rejected_locally() {
        let (server, api) = mock_api().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let request = UpdateTeamRequest {
            currency: Some("EURO".to_string()),
            ..UpdateTeamRequest::default()
        };
        let err = TeamClient::new(api)
            .update(TeamId::new(1), &request)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
