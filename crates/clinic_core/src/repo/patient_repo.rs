//! Patient repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered lookups over the `patients` collection.
//!
//! # Invariants
//! - Create and update paths call `Patient::validate()` before SQL writes.
//! - `search_patients` ORs supplied criteria and returns nothing when no
//!   criterion is supplied.
//! - `doctor_uuid` is stored as given; the repository never checks it.

use super::{bool_to_int, ensure_schema_ready, parse_flag, parse_uuid, RepoError, RepoResult};
use crate::model::doctor::DoctorId;
use crate::model::patient::{Patient, PatientId, PatientInput, PatientPatch};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ENTITY: &str = "patient";

const PATIENT_SELECT_SQL: &str = "SELECT
    uuid,
    first_name,
    last_name,
    height,
    weight,
    blood_pressure,
    temperature,
    vaccination_status,
    cold,
    cough,
    phone_number,
    description,
    doctor_feedback,
    doctor_uuid
FROM patients";

/// Boolean criteria for `search_patients`; supplied fields are OR-combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatientSearch {
    pub cold: Option<bool>,
    pub cough: Option<bool>,
}

impl PatientSearch {
    /// Returns whether no criterion was supplied.
    pub fn is_empty(&self) -> bool {
        self.cold.is_none() && self.cough.is_none()
    }
}

/// Repository interface for patient records.
pub trait PatientRepository {
    /// Persists a new patient under a store-assigned id.
    fn create_patient(&self, input: &PatientInput) -> RepoResult<Patient>;
    fn get_patient(&self, id: PatientId) -> RepoResult<Option<Patient>>;
    /// Lists every patient in store insertion order.
    fn list_patients(&self) -> RepoResult<Vec<Patient>>;
    fn search_patients(&self, search: &PatientSearch) -> RepoResult<Vec<Patient>>;
    fn list_patients_by_doctor(&self, doctor_id: DoctorId) -> RepoResult<Vec<Patient>>;
    /// Replaces supplied fields and returns the stored result.
    fn update_patient(&self, id: PatientId, patch: &PatientPatch) -> RepoResult<Patient>;
    fn delete_patient(&self, id: PatientId) -> RepoResult<()>;
}

/// SQLite-backed patient repository.
pub struct SqlitePatientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePatientRepository<'conn> {
    /// Constructs a repository from a connection with the schema applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn write_row(&self, patient: &Patient) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE patients
             SET
                first_name = ?2,
                last_name = ?3,
                height = ?4,
                weight = ?5,
                blood_pressure = ?6,
                temperature = ?7,
                vaccination_status = ?8,
                cold = ?9,
                cough = ?10,
                phone_number = ?11,
                description = ?12,
                doctor_feedback = ?13,
                doctor_uuid = ?14,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                patient.id.to_string(),
                patient.first_name.as_str(),
                patient.last_name.as_str(),
                patient.height.as_str(),
                patient.weight.as_str(),
                patient.blood_pressure.as_str(),
                patient.temperature,
                patient.vaccination_status.as_deref(),
                bool_to_int(patient.cold),
                bool_to_int(patient.cough),
                patient.phone_number,
                patient.description.as_deref(),
                patient.doctor_feedback.as_deref(),
                patient.doctor_id.map(|id| id.to_string()),
            ],
        )?;
        Ok(changed)
    }

    fn query_patients(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut patients = Vec::new();
        while let Some(row) = rows.next()? {
            patients.push(parse_patient_row(row)?);
        }
        Ok(patients)
    }
}

impl PatientRepository for SqlitePatientRepository<'_> {
    fn create_patient(&self, input: &PatientInput) -> RepoResult<Patient> {
        let patient = Patient::from_input(input);
        patient.validate()?;

        self.conn.execute(
            "INSERT INTO patients (
                uuid,
                first_name,
                last_name,
                height,
                weight,
                blood_pressure,
                temperature,
                vaccination_status,
                cold,
                cough,
                phone_number,
                description,
                doctor_feedback,
                doctor_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                patient.id.to_string(),
                patient.first_name.as_str(),
                patient.last_name.as_str(),
                patient.height.as_str(),
                patient.weight.as_str(),
                patient.blood_pressure.as_str(),
                patient.temperature,
                patient.vaccination_status.as_deref(),
                bool_to_int(patient.cold),
                bool_to_int(patient.cough),
                patient.phone_number,
                patient.description.as_deref(),
                patient.doctor_feedback.as_deref(),
                patient.doctor_id.map(|id| id.to_string()),
            ],
        )?;

        Ok(patient)
    }

    fn get_patient(&self, id: PatientId) -> RepoResult<Option<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PATIENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_patient_row(row)?));
        }

        Ok(None)
    }

    fn list_patients(&self) -> RepoResult<Vec<Patient>> {
        self.query_patients(&format!("{PATIENT_SELECT_SQL} ORDER BY rowid ASC;"), Vec::new())
    }

    fn search_patients(&self, search: &PatientSearch) -> RepoResult<Vec<Patient>> {
        if search.is_empty() {
            return Ok(Vec::new());
        }

        let mut conditions: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(cold) = search.cold {
            conditions.push("cold = ?");
            bind_values.push(Value::Integer(bool_to_int(cold)));
        }
        if let Some(cough) = search.cough {
            conditions.push("cough = ?");
            bind_values.push(Value::Integer(bool_to_int(cough)));
        }

        let sql = format!(
            "{PATIENT_SELECT_SQL} WHERE {} ORDER BY rowid ASC;",
            conditions.join(" OR ")
        );
        self.query_patients(&sql, bind_values)
    }

    fn list_patients_by_doctor(&self, doctor_id: DoctorId) -> RepoResult<Vec<Patient>> {
        self.query_patients(
            &format!("{PATIENT_SELECT_SQL} WHERE doctor_uuid = ? ORDER BY rowid ASC;"),
            vec![Value::Text(doctor_id.to_string())],
        )
    }

    fn update_patient(&self, id: PatientId, patch: &PatientPatch) -> RepoResult<Patient> {
        let tx = self.conn.unchecked_transaction()?;

        let mut patient = self.get_patient(id)?.ok_or(RepoError::NotFound {
            entity: ENTITY,
            id,
        })?;
        patient.apply_patch(patch);
        patient.validate()?;

        if self.write_row(&patient)? == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        tx.commit()?;

        Ok(patient)
    }

    fn delete_patient(&self, id: PatientId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM patients WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        Ok(())
    }
}

fn parse_patient_row(row: &Row<'_>) -> RepoResult<Patient> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "patients.uuid")?;

    let doctor_id = match row.get::<_, Option<String>>("doctor_uuid")? {
        Some(value) => Some(parse_uuid(&value, "patients.doctor_uuid")?),
        None => None,
    };

    let patient = Patient {
        id,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        height: row.get("height")?,
        weight: row.get("weight")?,
        blood_pressure: row.get("blood_pressure")?,
        temperature: row.get("temperature")?,
        vaccination_status: row.get("vaccination_status")?,
        cold: parse_flag(row.get("cold")?, "patients.cold")?,
        cough: parse_flag(row.get("cough")?, "patients.cough")?,
        phone_number: row.get("phone_number")?,
        description: row.get("description")?,
        doctor_feedback: row.get("doctor_feedback")?,
        doctor_id,
    };
    patient
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("{err} (patients.uuid={uuid_text})")))?;
    Ok(patient)
}
