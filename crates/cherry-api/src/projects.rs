//! Projects.

use crate::resource::Resource;
use cherry_core::client::PROJECTS_DEFAULT_TIMEOUT;
use cherry_core::ids::{ProjectId, TeamId};
use cherry_core::{ApiClient, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use validator::Validate;

/// BGP settings of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBgp {
    /// Whether BGP is enabled
    pub enabled: bool,
    /// Local ASN
    pub local_asn: u32,
}

/// A project: the container servers, IPs and storages live in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectModel {
    /// Project ID
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// BGP settings
    pub bgp: ProjectBgp,
    /// Href URL
    pub href: String,
}

/// Project creation payload.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1))]
    pub name: String,
    /// Enable BGP
    pub bgp: bool,
}

impl CreateProjectRequest {
    /// A project named `name`, BGP disabled.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bgp: false,
        }
    }
}

/// Project update payload.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    /// Enable or disable BGP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgp: Option<bool>,
}

/// A project resource.
pub type Project = Resource<ProjectClient, ProjectModel>;

impl Project {
    /// Project ID.
    #[must_use]
    pub fn id(&self) -> ProjectId {
        self.model().id
    }

    /// Update the project and refresh the snapshot.
    pub async fn update(&mut self, request: &UpdateProjectRequest) -> Result<()> {
        let fresh = self.client().update(self.id(), request).await?;
        self.replace_model(fresh);
        Ok(())
    }

    /// Delete the project.
    pub async fn delete(self) -> Result<()> {
        self.client().delete(self.id()).await
    }
}

/// Client for projects.
#[derive(Debug, Clone)]
pub struct ProjectClient {
    api: Arc<ApiClient>,
    request_timeout: Duration,
}

impl ProjectClient {
    /// Create a project client on top of a shared API client.
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            request_timeout: Duration::from_secs(PROJECTS_DEFAULT_TIMEOUT),
        }
    }

    /// Override the timeout applied to every request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retrieve a project by ID.
    pub async fn get_by_id(&self, id: ProjectId) -> Result<Project> {
        let response = self
            .api
            .get(&format!("projects/{id}"), None, self.request_timeout)
            .await?;
        Ok(Project::new(self.clone(), response.json()?))
    }

    /// Retrieve all projects of a team.
    pub async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<Project>> {
        let response = self
            .api
            .get(&format!("teams/{team_id}/projects"), None, self.request_timeout)
            .await?;
        let models: Vec<ProjectModel> = response.json()?;
        Ok(models
            .into_iter()
            .map(|model| Project::new(self.clone(), model))
            .collect())
    }

    /// Create a project in a team.
    pub async fn create(&self, team_id: TeamId, request: &CreateProjectRequest) -> Result<Project> {
        request.validate()?;
        let response = self
            .api
            .post(
                &format!("teams/{team_id}/projects"),
                request,
                None,
                self.request_timeout,
            )
            .await?;
        let id: ProjectId = response.resource_id()?;
        info!(project_id = %id, %team_id, "Created project");
        self.get_by_id(id).await
    }

    /// Update a project.
    pub async fn update(&self, id: ProjectId, request: &UpdateProjectRequest) -> Result<Project> {
        request.validate()?;
        let response = self
            .api
            .put(&format!("projects/{id}"), request, None, self.request_timeout)
            .await?;
        self.get_by_id(response.resource_id()?).await
    }

    /// Delete a project.
    pub async fn delete(&self, id: ProjectId) -> Result<()> {
        self.api
            .delete(&format!("projects/{id}"), None, self.request_timeout)
            .await?;
        info!(project_id = %id, "Deleted project");
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
    async fn test_list_by_team() {
        let (server, api) = mock_api().await;

        Mock::given(method("GET"))
            .and(path("/v1/teams/123456/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([fixture("project")])))
            .mount(&server)
            .await;

        let projects = ProjectClient::new(api)
            .list_by_team(TeamId::new(123_456))
            .await
            .unwrap();
        assert_eq!(projects.len(), 1);
        assert!(projects[0].model().bgp.enabled);
    }

    #[tokio::test]
    async fn test_create() {
        let (server, api) = mock_api().await;
        let project = fixture("project");

        Mock::given(method("POST"))
            .and(path("/v1/teams/123456/projects"))
            .and(body_json(json!({"name": "test", "bgp": false})))
            .respond_with(ResponseTemplate::new(201).set_body_json(&project))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/projects/123456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&project))
            .expect(1)
            .mount(&server)
            .await;

        let created = ProjectClient::new(api)
            .create(TeamId::new(123_456), &CreateProjectRequest::new("test"))
            .await
            .unwrap();
        assert_eq!(created.id(), ProjectId::new(123_456));
        assert_eq!(created.model().name, "test");
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let (server, api) = mock_api().await;
        let project = fixture("project");

        Mock::given(method("PUT"))
            .and(path("/v1/projects/123456"))
            .and(body_json(json!({"bgp": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&project))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/projects/123456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&project))
            .mount(&server)
            .await;

        let request = UpdateProjectRequest {
            bgp: Some(true),
            ..UpdateProjectRequest::default()
        };
        ProjectClient::new(api)
            .update(ProjectId::new(123_456), &request)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_server_error() {
        let (server, api) = mock_api().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/projects/123456"))
            .respond_with(ResponseTemplate::new(409).set_body_string("project has servers"))
            .mount(&server)
            .await;

        let err = ProjectClient::new(api)
            .delete(ProjectId::new(123_456))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(409));
    }
}
