//! # API Shared
//!
//! Shared definitions for the guardia APIs.
//!
//! Contains:
//! - Request/response DTOs (`dto` module) with OpenAPI schemas
//! - Conversions between DTOs and `guardia-core` aggregates
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `guardia` CLI.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
