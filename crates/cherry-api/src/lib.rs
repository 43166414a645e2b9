//! Typed clients for the Cherry Servers API.
//!
//! Each resource module exposes a model, request payloads, a client and a
//! handle type. Handles keep the last fetched snapshot together with their
//! client, so mutations update the snapshot in place:
//!
//! ```no_run
//! # async fn run() -> cherry_api::Result<()> {
//! use cherry_api::servers::CreateServerRequest;
//! use cherry_api::CherryApi;
//! use cherry_core::ids::ProjectId;
//! use std::time::Duration;
//!
//! let cherry = CherryApi::from_env()?;
//! let request = CreateServerRequest {
//!     image: Some("debian_12_64bit".to_string()),
//!     ..CreateServerRequest::new("cloud_vps_1", "eu_nord_1")
//! };
//! let mut server = cherry.servers.create(ProjectId::new(123_456), &request).await?;
//! server.wait_until_deployed(Duration::from_secs(1800)).await?;
//! server.reboot().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod backup_storages;
pub mod block_storages;
pub mod facade;
pub mod images;
pub mod ips;
pub mod plans;
pub mod projects;
pub mod regions;
pub mod resource;
pub mod servers;
pub mod sshkeys;
pub mod teams;
pub mod users;

#[cfg(test)]
mod test_support;

pub use backup_storages::{BackupStorage, BackupStorageClient, BackupStorageModel};
pub use block_storages::{BlockStorage, BlockStorageClient, BlockStorageModel};
pub use facade::CherryApi;
pub use images::{Image, ImageClient, ImageModel};
pub use ips::{Ip, IpClient, IpModel};
pub use plans::{Plan, PlanClient, PlanModel};
pub use projects::{Project, ProjectClient, ProjectModel};
pub use regions::{Region, RegionClient, RegionModel};
pub use resource::Resource;
pub use servers::{Server, ServerClient, ServerModel};
pub use sshkeys::{SshKey, SshKeyClient, SshKeyModel};
pub use teams::{Team, TeamClient, TeamModel};
pub use users::{User, UserClient, UserModel};

/// Convenient result alias that reuses the shared Cherry Servers error type.
pub type Result<T> = cherry_core::Result<T>;
