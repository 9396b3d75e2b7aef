//! Core domain logic for the clinic records service.
//! This crate is the single source of truth for record invariants and the
//! patient/doctor resolver set.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::doctor::{Doctor, DoctorId, DoctorInput, DoctorPatch};
pub use model::patient::{Patient, PatientId, PatientInput, PatientPatch};
pub use model::ValidationError;
pub use repo::doctor_repo::{DoctorFilter, DoctorRepository, SqliteDoctorRepository};
pub use repo::patient_repo::{PatientRepository, PatientSearch, SqlitePatientRepository};
pub use repo::{RepoError, RepoResult};
pub use service::resolver_set::{
    ErrorKind, PatientView, ResolverError, ResolverResult, ResolverSet, DOCTOR_DELETED_MESSAGE,
    PATIENT_DELETED_MESSAGE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
