//! # cherry-core
//!
//! Core types and utilities for working with the Cherry Servers API.
//!
//! This crate provides the error taxonomy, the authenticated HTTP transport
//! and the polling primitive that resource clients are built on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and helpers
//! - [`ids`] - Strongly-typed resource identifiers
//! - [`query`] - Query parameter builder
//! - [`config`] - Client configuration
//! - [`client`] - HTTP transport: requests, responses and the API client
//! - [`backoff`] - Waiting for resources with randomized exponential backoff

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod query;

// Re-export commonly used types
pub use backoff::{Backoff, Deployable, Refresh};
pub use client::{ApiClient, ApiClientBuilder, ApiRequest, ApiResponse, ClientConfig};
pub use config::CherryClientConfig;
pub use error::{Error, Result};
