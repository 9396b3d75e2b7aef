//! Resolver set for patient and doctor operations.
//!
//! # Responsibility
//! - Map each named query/mutation to one or two repository calls.
//! - Embed the referenced doctor into patient responses.
//! - Raise explicit not-found and domain errors; pass store errors through.
//!
//! # Invariants
//! - A supplied doctor reference is looked up before the patient write. The
//!   check and the write are not atomic.
//! - A dangling doctor reference embeds as `None`, never as an error.
//! - `search_patients` without criteria is empty; `search_doctors` without
//!   filters returns every doctor.

use crate::model::doctor::{Doctor, DoctorId, DoctorInput, DoctorPatch};
use crate::model::patient::{Patient, PatientId, PatientInput, PatientPatch};
use crate::repo::doctor_repo::{DoctorFilter, DoctorRepository};
use crate::repo::patient_repo::{PatientRepository, PatientSearch};
use crate::repo::RepoError;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const PATIENT_DELETED_MESSAGE: &str = "Patient successfully deleted.";
pub const DOCTOR_DELETED_MESSAGE: &str = "Doctor successfully deleted.";

pub type ResolverResult<T> = Result<T, ResolverError>;

/// Caller-facing classification of resolver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required field missing or malformed.
    Validation,
    /// Requested id has no matching record.
    NotFound,
    /// Referenced doctor does not exist at patient write time.
    DomainInvariant,
    /// Store unreachable, query failure or corrupt persisted state.
    Infrastructure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::DomainInvariant => "domain_invariant",
            Self::Infrastructure => "infrastructure",
        }
    }
}

/// Resolver error for patient/doctor operations.
#[derive(Debug)]
pub enum ResolverError {
    PatientNotFound(PatientId),
    DoctorNotFound(DoctorId),
    /// Patient input references a doctor id with no record.
    DoctorReferenceMissing(DoctorId),
    /// Store-level failure, passed through unchanged.
    Store(RepoError),
}

impl ResolverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PatientNotFound(_) | Self::DoctorNotFound(_) => ErrorKind::NotFound,
            Self::DoctorReferenceMissing(_) => ErrorKind::DomainInvariant,
            Self::Store(RepoError::Validation(_)) => ErrorKind::Validation,
            Self::Store(RepoError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Infrastructure,
        }
    }
}

impl Display for ResolverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PatientNotFound(id) => write!(f, "No patient found: {id}"),
            Self::DoctorNotFound(id) => write!(f, "No doctor found: {id}"),
            Self::DoctorReferenceMissing(_) => write!(f, "Doctor not found"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ResolverError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "patient",
                id,
            } => Self::PatientNotFound(id),
            RepoError::NotFound {
                entity: "doctor",
                id,
            } => Self::DoctorNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Patient response with the referenced doctor embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
    #[serde(rename = "_id")]
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub height: String,
    pub weight: String,
    pub blood_pressure: String,
    pub temperature: f64,
    pub vaccination_status: Option<String>,
    pub cold: bool,
    pub cough: bool,
    pub phone_number: i64,
    pub description: Option<String>,
    pub doctor_feedback: Option<String>,
    /// `None` when no doctor is referenced or the reference dangles.
    pub doctor: Option<Doctor>,
}

impl PatientView {
    pub fn new(patient: Patient, doctor: Option<Doctor>) -> Self {
        Self {
            id: patient.id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            height: patient.height,
            weight: patient.weight,
            blood_pressure: patient.blood_pressure,
            temperature: patient.temperature,
            vaccination_status: patient.vaccination_status,
            cold: patient.cold,
            cough: patient.cough,
            phone_number: patient.phone_number,
            description: patient.description,
            doctor_feedback: patient.doctor_feedback,
            doctor,
        }
    }
}

/// Resolver facade over injected patient and doctor repositories.
pub struct ResolverSet<P: PatientRepository, D: DoctorRepository> {
    patients: P,
    doctors: D,
}

impl<P: PatientRepository, D: DoctorRepository> ResolverSet<P, D> {
    /// Creates a resolver set over the provided repository implementations.
    pub fn new(patients: P, doctors: D) -> Self {
        Self { patients, doctors }
    }

    /// Lists every patient with its doctor embedded.
    pub fn patients(&self) -> ResolverResult<Vec<PatientView>> {
        let started_at = Instant::now();
        let result = self
            .patients
            .list_patients()
            .map_err(ResolverError::from)
            .and_then(|patients| {
                patients
                    .into_iter()
                    .map(|patient| self.embed_doctor(patient))
                    .collect::<ResolverResult<Vec<_>>>()
            });
        finish_list("patients_list", started_at, result)
    }

    /// Gets one patient with its doctor embedded.
    pub fn patient(&self, id: PatientId) -> ResolverResult<PatientView> {
        let started_at = Instant::now();
        let result = self
            .patients
            .get_patient(id)
            .map_err(ResolverError::from)
            .and_then(|patient| patient.ok_or(ResolverError::PatientNotFound(id)))
            .and_then(|patient| self.embed_doctor(patient));
        finish("patient_get", started_at, result)
    }

    /// Creates a patient after checking its doctor reference.
    ///
    /// # Errors
    /// - `DoctorReferenceMissing` when `input.doctor_id` names no doctor;
    ///   nothing is written in that case.
    /// - Store validation/transport errors unchanged.
    pub fn create_patient(&self, input: &PatientInput) -> ResolverResult<PatientView> {
        let started_at = Instant::now();
        let result = self
            .ensure_doctor_exists(input.doctor_id)
            .and_then(|()| {
                self.patients
                    .create_patient(input)
                    .map_err(ResolverError::from)
            })
            .and_then(|patient| self.embed_doctor(patient));
        finish("patient_create", started_at, result)
    }

    /// Applies a partial patient update after checking a supplied doctor
    /// reference.
    pub fn update_patient(
        &self,
        id: PatientId,
        patch: &PatientPatch,
    ) -> ResolverResult<PatientView> {
        let started_at = Instant::now();
        let result = self
            .ensure_doctor_exists(patch.doctor_id)
            .and_then(|()| {
                self.patients
                    .update_patient(id, patch)
                    .map_err(ResolverError::from)
            })
            .and_then(|patient| self.embed_doctor(patient));
        finish("patient_update", started_at, result)
    }

    pub fn delete_patient(&self, id: PatientId) -> ResolverResult<&'static str> {
        let started_at = Instant::now();
        let result = self
            .patients
            .delete_patient(id)
            .map(|()| PATIENT_DELETED_MESSAGE)
            .map_err(ResolverError::from);
        finish("patient_delete", started_at, result)
    }

    /// Returns patients matching any supplied criterion, without embedding.
    pub fn search_patients(&self, search: &PatientSearch) -> ResolverResult<Vec<Patient>> {
        let started_at = Instant::now();
        let result = self
            .patients
            .search_patients(search)
            .map_err(ResolverError::from);
        finish_list("patients_search", started_at, result)
    }

    /// Returns patients referencing `doctor_id`. The doctor itself is not
    /// looked up.
    pub fn patients_by_doctor(&self, doctor_id: DoctorId) -> ResolverResult<Vec<Patient>> {
        let started_at = Instant::now();
        let result = self
            .patients
            .list_patients_by_doctor(doctor_id)
            .map_err(ResolverError::from);
        finish_list("patients_by_doctor", started_at, result)
    }

    pub fn doctors(&self) -> ResolverResult<Vec<Doctor>> {
        let started_at = Instant::now();
        let result = self.doctors.list_doctors().map_err(ResolverError::from);
        finish_list("doctors_list", started_at, result)
    }

    pub fn doctor(&self, id: DoctorId) -> ResolverResult<Doctor> {
        let started_at = Instant::now();
        let result = self
            .doctors
            .get_doctor(id)
            .map_err(ResolverError::from)
            .and_then(|doctor| doctor.ok_or(ResolverError::DoctorNotFound(id)));
        finish("doctor_get", started_at, result)
    }

    pub fn create_doctor(&self, input: &DoctorInput) -> ResolverResult<Doctor> {
        let started_at = Instant::now();
        let result = self
            .doctors
            .create_doctor(input)
            .map_err(ResolverError::from);
        finish("doctor_create", started_at, result)
    }

    pub fn update_doctor(&self, id: DoctorId, patch: &DoctorPatch) -> ResolverResult<Doctor> {
        let started_at = Instant::now();
        let result = self
            .doctors
            .update_doctor(id, patch)
            .map_err(ResolverError::from);
        finish("doctor_update", started_at, result)
    }

    /// Deletes a doctor. Patients referencing it keep the dangling id.
    pub fn delete_doctor(&self, id: DoctorId) -> ResolverResult<&'static str> {
        let started_at = Instant::now();
        let result = self
            .doctors
            .delete_doctor(id)
            .map(|()| DOCTOR_DELETED_MESSAGE)
            .map_err(ResolverError::from);
        finish("doctor_delete", started_at, result)
    }

    /// AND-combines supplied filters; no filters returns every doctor.
    pub fn search_doctors(&self, filter: &DoctorFilter) -> ResolverResult<Vec<Doctor>> {
        let started_at = Instant::now();
        let result = self
            .doctors
            .search_doctors(filter)
            .map_err(ResolverError::from);
        finish_list("doctors_search", started_at, result)
    }

    fn ensure_doctor_exists(&self, doctor_id: Option<DoctorId>) -> ResolverResult<()> {
        let Some(doctor_id) = doctor_id else {
            return Ok(());
        };
        match self.doctors.get_doctor(doctor_id)? {
            Some(_) => Ok(()),
            None => Err(ResolverError::DoctorReferenceMissing(doctor_id)),
        }
    }

    fn embed_doctor(&self, patient: Patient) -> ResolverResult<PatientView> {
        let doctor = match patient.doctor_id {
            Some(doctor_id) => self.doctors.get_doctor(doctor_id)?,
            None => None,
        };
        if doctor.is_none() && patient.doctor_id.is_some() {
            debug!(
                "event=doctor_embed module=resolver status=dangling patient_id={}",
                patient.id
            );
        }
        Ok(PatientView::new(patient, doctor))
    }
}

fn finish<T>(event: &str, started_at: Instant, result: ResolverResult<T>) -> ResolverResult<T> {
    match &result {
        Ok(_) => info!(
            "event={event} module=resolver status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => log_failure(event, started_at, err),
    }
    result
}

fn finish_list<T>(
    event: &str,
    started_at: Instant,
    result: ResolverResult<Vec<T>>,
) -> ResolverResult<Vec<T>> {
    match &result {
        Ok(items) => info!(
            "event={event} module=resolver status=ok count={} duration_ms={}",
            items.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => log_failure(event, started_at, err),
    }
    result
}

fn log_failure(event: &str, started_at: Instant, err: &ResolverError) {
    let kind = err.kind();
    // Store messages can echo record values; only infrastructure failures
    // carry the raw error text.
    if kind == ErrorKind::Infrastructure {
        error!(
            "event={event} module=resolver status=error error_kind={} duration_ms={} error={}",
            kind.as_str(),
            started_at.elapsed().as_millis(),
            err
        );
    } else {
        warn!(
            "event={event} module=resolver status=error error_kind={} duration_ms={}",
            kind.as_str(),
            started_at.elapsed().as_millis()
        );
    }
}
