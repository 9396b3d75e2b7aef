//! Named operation dispatch for the patient/doctor query and mutation API.
//!
//! # Responsibility
//! - Map operation names and JSON variables onto resolver calls.
//! - Wrap results under the operation name, GraphQL-style:
//!   `{"data": {"<operation>": ...}}`.
//!
//! # Invariants
//! - Unknown operations and undecodable variables are `validation` errors.
//! - No partial results: `data` is `None` whenever `errors` is non-empty.

use clinic_core::{
    DoctorFilter, DoctorId, DoctorInput, DoctorPatch, DoctorRepository, ErrorKind, PatientId,
    PatientInput, PatientPatch, PatientRepository, PatientSearch, RepoError, ResolverError,
    ResolverSet, SqliteDoctorRepository, SqlitePatientRepository,
};
use log::{info, warn};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Operation document accepted by [`ClinicApi::execute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub variables: Value,
}

impl OperationRequest {
    pub fn new(operation: impl Into<String>, variables: Value) -> Self {
        Self {
            operation: operation.into(),
            variables,
        }
    }
}

/// Operation-level failure paired with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    fn infrastructure(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Infrastructure,
            message: message.into(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ResolverError> for ApiError {
    fn from(value: ResolverError) -> Self {
        Self {
            kind: value.kind(),
            message: value.to_string(),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        ResolverError::from(value).into()
    }
}

/// Response envelope for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiError>,
}

impl OperationResponse {
    fn success(operation: &str, value: Value) -> Self {
        let mut data = Map::new();
        data.insert(operation.to_string(), value);
        Self {
            data: Some(Value::Object(data)),
            errors: Vec::new(),
        }
    }

    fn failure(error: ApiError) -> Self {
        Self {
            data: None,
            errors: vec![error],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Every operation the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Patients,
    Patient,
    SearchPatients,
    Doctors,
    Doctor,
    SearchDoctors,
    PatientsByDoctor,
    CreatePatient,
    UpdatePatient,
    DeletePatient,
    CreateDoctor,
    UpdateDoctor,
    DeleteDoctor,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Self::Patients,
        Self::Patient,
        Self::SearchPatients,
        Self::Doctors,
        Self::Doctor,
        Self::SearchDoctors,
        Self::PatientsByDoctor,
        Self::CreatePatient,
        Self::UpdatePatient,
        Self::DeletePatient,
        Self::CreateDoctor,
        Self::UpdateDoctor,
        Self::DeleteDoctor,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Patient => "patient",
            Self::SearchPatients => "searchPatients",
            Self::Doctors => "doctors",
            Self::Doctor => "doctor",
            Self::SearchDoctors => "searchDoctors",
            Self::PatientsByDoctor => "patientsByDoctor",
            Self::CreatePatient => "createPatient",
            Self::UpdatePatient => "updatePatient",
            Self::DeletePatient => "deletePatient",
            Self::CreateDoctor => "createDoctor",
            Self::UpdateDoctor => "updateDoctor",
            Self::DeleteDoctor => "deleteDoctor",
        }
    }

    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::CreatePatient
                | Self::UpdatePatient
                | Self::DeletePatient
                | Self::CreateDoctor
                | Self::UpdateDoctor
                | Self::DeleteDoctor
        )
    }
}

#[derive(Debug, Deserialize)]
struct IdArgs {
    #[serde(rename = "_id")]
    id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatientsByDoctorArgs {
    doctor_id: DoctorId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePatientArgs {
    patient_input: PatientInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePatientArgs {
    #[serde(rename = "_id")]
    id: PatientId,
    #[serde(default)]
    patient_input: PatientPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDoctorArgs {
    doctor_input: DoctorInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDoctorArgs {
    #[serde(rename = "_id")]
    id: DoctorId,
    #[serde(default)]
    doctor_input: DoctorPatch,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatientsArgs {
    #[serde(default)]
    cold: Option<bool>,
    #[serde(default)]
    cough: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchDoctorsArgs {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    specialisation: Option<String>,
    #[serde(default)]
    hospital: Option<String>,
}

/// Query/mutation API over an injected resolver set.
pub struct ClinicApi<P: PatientRepository, D: DoctorRepository> {
    resolvers: ResolverSet<P, D>,
}

impl<'conn> ClinicApi<SqlitePatientRepository<'conn>, SqliteDoctorRepository<'conn>> {
    /// Builds the API over SQLite stores sharing one connection.
    pub fn try_new(conn: &'conn Connection) -> Result<Self, RepoError> {
        Ok(Self::from_resolvers(ResolverSet::new(
            SqlitePatientRepository::try_new(conn)?,
            SqliteDoctorRepository::try_new(conn)?,
        )))
    }
}

impl<P: PatientRepository, D: DoctorRepository> ClinicApi<P, D> {
    pub fn from_resolvers(resolvers: ResolverSet<P, D>) -> Self {
        Self { resolvers }
    }

    /// Executes one operation and returns its response envelope.
    pub fn execute(&self, request: &OperationRequest) -> OperationResponse {
        let started_at = Instant::now();
        let Some(operation) = Operation::parse(request.operation.trim()) else {
            warn!("event=operation_execute module=api status=error error_kind=validation reason=unknown_operation");
            return OperationResponse::failure(ApiError::validation(format!(
                "unknown operation `{}`",
                request.operation
            )));
        };

        match self.dispatch(operation, &request.variables) {
            Ok(value) => {
                info!(
                    "event=operation_execute module=api status=ok operation={} mutation={} duration_ms={}",
                    operation.as_str(),
                    operation.is_mutation(),
                    started_at.elapsed().as_millis()
                );
                OperationResponse::success(operation.as_str(), value)
            }
            Err(err) => {
                warn!(
                    "event=operation_execute module=api status=error operation={} error_kind={} duration_ms={}",
                    operation.as_str(),
                    err.kind.as_str(),
                    started_at.elapsed().as_millis()
                );
                OperationResponse::failure(err)
            }
        }
    }

    /// Executes an operation document given as JSON text and returns the
    /// encoded response.
    pub fn execute_json(&self, document: &str) -> String {
        let response = match serde_json::from_str::<OperationRequest>(document) {
            Ok(request) => self.execute(&request),
            Err(err) => OperationResponse::failure(ApiError::validation(format!(
                "invalid operation document: {err}"
            ))),
        };
        encode_response(&response)
    }

    fn dispatch(&self, operation: Operation, variables: &Value) -> Result<Value, ApiError> {
        let resolvers = &self.resolvers;
        match operation {
            Operation::Patients => encode(resolvers.patients()?),
            Operation::Patient => {
                let args: IdArgs = decode(variables)?;
                encode(resolvers.patient(args.id)?)
            }
            Operation::SearchPatients => {
                let args: SearchPatientsArgs = decode(variables)?;
                encode(resolvers.search_patients(&PatientSearch {
                    cold: args.cold,
                    cough: args.cough,
                })?)
            }
            Operation::Doctors => encode(resolvers.doctors()?),
            Operation::Doctor => {
                let args: IdArgs = decode(variables)?;
                encode(resolvers.doctor(args.id)?)
            }
            Operation::SearchDoctors => {
                let args: SearchDoctorsArgs = decode(variables)?;
                encode(resolvers.search_doctors(&DoctorFilter {
                    name: args.name,
                    specialisation: args.specialisation,
                    hospital: args.hospital,
                })?)
            }
            Operation::PatientsByDoctor => {
                let args: PatientsByDoctorArgs = decode(variables)?;
                encode(resolvers.patients_by_doctor(args.doctor_id)?)
            }
            Operation::CreatePatient => {
                let args: CreatePatientArgs = decode(variables)?;
                encode(resolvers.create_patient(&args.patient_input)?)
            }
            Operation::UpdatePatient => {
                let args: UpdatePatientArgs = decode(variables)?;
                encode(resolvers.update_patient(args.id, &args.patient_input)?)
            }
            Operation::DeletePatient => {
                let args: IdArgs = decode(variables)?;
                encode(resolvers.delete_patient(args.id)?)
            }
            Operation::CreateDoctor => {
                let args: CreateDoctorArgs = decode(variables)?;
                encode(resolvers.create_doctor(&args.doctor_input)?)
            }
            Operation::UpdateDoctor => {
                let args: UpdateDoctorArgs = decode(variables)?;
                encode(resolvers.update_doctor(args.id, &args.doctor_input)?)
            }
            Operation::DeleteDoctor => {
                let args: IdArgs = decode(variables)?;
                encode(resolvers.delete_doctor(args.id)?)
            }
        }
    }
}

/// Encodes a response envelope, falling back to a fixed infrastructure error.
pub(crate) fn encode_response(response: &OperationResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| {
        r#"{"data":null,"errors":[{"kind":"infrastructure","message":"response encoding failed"}]}"#
            .to_string()
    })
}

pub(crate) fn decode<T: DeserializeOwned>(variables: &Value) -> Result<T, ApiError> {
    // Operations without variables may send `null` or omit them entirely.
    let variables = match variables {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(variables)
        .map_err(|err| ApiError::validation(format!("invalid variables: {err}")))
}

pub(crate) fn encode<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|err| ApiError::infrastructure(format!("cannot encode result: {err}")))
}
