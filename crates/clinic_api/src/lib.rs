//! Use-case API surface over the clinic resolver set.
//!
//! # Responsibility
//! - Decode named operations with JSON variables into typed resolver calls.
//! - Encode results and failures into stable response envelopes.
//! - Expose the plain patients surface and process configuration.
//!
//! # Invariants
//! - API entry points never panic; every failure becomes an `ApiError`.
//! - A response carries either `data` or `errors`, never both.

pub mod config;
pub mod operation;
pub mod plain;

pub use config::{ClinicConfig, ConfigError, StoreLocation};
pub use operation::{ApiError, ClinicApi, Operation, OperationRequest, OperationResponse};
pub use plain::PlainPatientsApi;
