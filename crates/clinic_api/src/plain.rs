//! Plain patients surface.
//!
//! Lists and creates patients straight through the patient store: no doctor
//! embedding and no doctor existence check. Shares the store with
//! [`crate::ClinicApi`].

use crate::operation::{decode, encode, encode_response, ApiError, OperationResponse};
use clinic_core::{Patient, PatientInput, PatientRepository, SqlitePatientRepository};
use log::{info, warn};
use rusqlite::Connection;
use serde_json::Value;

pub struct PlainPatientsApi<P: PatientRepository> {
    patients: P,
}

impl<'conn> PlainPatientsApi<SqlitePatientRepository<'conn>> {
    pub fn try_new(conn: &'conn Connection) -> Result<Self, ApiError> {
        Ok(Self::new(SqlitePatientRepository::try_new(conn)?))
    }
}

impl<P: PatientRepository> PlainPatientsApi<P> {
    pub fn new(patients: P) -> Self {
        Self { patients }
    }

    /// Lists every patient with the doctor as a bare id.
    pub fn list(&self) -> Result<Vec<Patient>, ApiError> {
        let patients = self.patients.list_patients().map_err(|err| {
            warn!("event=plain_patients_list module=api status=error");
            ApiError::from(err)
        })?;
        info!(
            "event=plain_patients_list module=api status=ok count={}",
            patients.len()
        );
        Ok(patients)
    }

    /// Persists a patient as given; the doctor reference is not checked.
    pub fn create(&self, input: &PatientInput) -> Result<Patient, ApiError> {
        let patient = self.patients.create_patient(input).map_err(|err| {
            warn!("event=plain_patient_create module=api status=error");
            ApiError::from(err)
        })?;
        info!(
            "event=plain_patient_create module=api status=ok patient_id={}",
            patient.id
        );
        Ok(patient)
    }

    /// Creates a patient from a raw JSON body and returns the encoded
    /// response envelope (`{"data": <patient>}`).
    pub fn create_json(&self, body: &str) -> String {
        let result = serde_json::from_str::<Value>(body)
            .map_err(|err| ApiError::validation(format!("invalid request body: {err}")))
            .and_then(|value| decode::<PatientInput>(&value))
            .and_then(|input| self.create(&input))
            .and_then(encode);

        let response = match result {
            Ok(data) => OperationResponse {
                data: Some(data),
                errors: Vec::new(),
            },
            Err(err) => OperationResponse {
                data: None,
                errors: vec![err],
            },
        };
        encode_response(&response)
    }
}
