//! Doctor repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered lookups over the `doctors` collection.
//!
//! # Invariants
//! - Create and update paths call `Doctor::validate()` before SQL writes.
//! - Filters are case-insensitive substring matches combined with AND. Case
//!   folding is Unicode-aware and text is matched literally, never as a pattern.
//! - Deleting a doctor leaves referencing patients untouched.

use super::{ensure_schema_ready, parse_uuid, RepoError, RepoResult};
use crate::model::doctor::{Doctor, DoctorId, DoctorInput, DoctorPatch};
use rusqlite::{params, Connection, Row};

const ENTITY: &str = "doctor";

const DOCTOR_SELECT_SQL: &str = "SELECT
    uuid,
    first_name,
    last_name,
    qualification,
    description,
    hospital,
    department,
    specialisation,
    languages_spoken,
    research,
    doctor_feedback
FROM doctors";

/// Optional doctor filters; blank values count as not supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorFilter {
    /// Matches first name OR last name.
    pub name: Option<String>,
    pub specialisation: Option<String>,
    pub hospital: Option<String>,
}

impl DoctorFilter {
    fn normalized(value: &Option<String>) -> Option<&str> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
    }
}

/// Repository interface for doctor records.
pub trait DoctorRepository {
    /// Persists a new doctor under a store-assigned id.
    fn create_doctor(&self, input: &DoctorInput) -> RepoResult<Doctor>;
    fn get_doctor(&self, id: DoctorId) -> RepoResult<Option<Doctor>>;
    /// Lists every doctor in store insertion order.
    fn list_doctors(&self) -> RepoResult<Vec<Doctor>>;
    fn search_doctors(&self, filter: &DoctorFilter) -> RepoResult<Vec<Doctor>>;
    /// Replaces supplied fields and returns the stored result.
    fn update_doctor(&self, id: DoctorId, patch: &DoctorPatch) -> RepoResult<Doctor>;
    fn delete_doctor(&self, id: DoctorId) -> RepoResult<()>;
}

/// SQLite-backed doctor repository.
pub struct SqliteDoctorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDoctorRepository<'conn> {
    /// Constructs a repository from a connection with the schema applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

}

impl DoctorRepository for SqliteDoctorRepository<'_> {
    fn create_doctor(&self, input: &DoctorInput) -> RepoResult<Doctor> {
        let doctor = Doctor::from_input(input);
        doctor.validate()?;

        self.conn.execute(
            "INSERT INTO doctors (
                uuid,
                first_name,
                last_name,
                qualification,
                description,
                hospital,
                department,
                specialisation,
                languages_spoken,
                research,
                doctor_feedback
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                doctor.id.to_string(),
                doctor.first_name.as_str(),
                doctor.last_name.as_str(),
                doctor.qualification.as_str(),
                doctor.description.as_deref(),
                doctor.hospital.as_deref(),
                doctor.department.as_deref(),
                doctor.specialisation.as_deref(),
                encode_languages(&doctor.languages_spoken)?,
                doctor.research.as_deref(),
                doctor.doctor_feedback.as_deref(),
            ],
        )?;

        Ok(doctor)
    }

    fn get_doctor(&self, id: DoctorId) -> RepoResult<Option<Doctor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCTOR_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_doctor_row(row)?));
        }

        Ok(None)
    }

    fn list_doctors(&self) -> RepoResult<Vec<Doctor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCTOR_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut doctors = Vec::new();
        while let Some(row) = rows.next()? {
            doctors.push(parse_doctor_row(row)?);
        }
        Ok(doctors)
    }

    fn search_doctors(&self, filter: &DoctorFilter) -> RepoResult<Vec<Doctor>> {
        let name = DoctorFilter::normalized(&filter.name).map(str::to_lowercase);
        let specialisation =
            DoctorFilter::normalized(&filter.specialisation).map(str::to_lowercase);
        let hospital = DoctorFilter::normalized(&filter.hospital).map(str::to_lowercase);

        // SQLite lower() folds ASCII only, so matching runs on Unicode-lowered
        // strings here. Needles are plain substrings, never patterns.
        let mut doctors = self.list_doctors()?;
        doctors.retain(|doctor| {
            name.as_deref().map_or(true, |needle| {
                contains_folded(&doctor.first_name, needle)
                    || contains_folded(&doctor.last_name, needle)
            }) && specialisation.as_deref().map_or(true, |needle| {
                optional_contains_folded(doctor.specialisation.as_deref(), needle)
            }) && hospital.as_deref().map_or(true, |needle| {
                optional_contains_folded(doctor.hospital.as_deref(), needle)
            })
        });
        Ok(doctors)
    }

    fn update_doctor(&self, id: DoctorId, patch: &DoctorPatch) -> RepoResult<Doctor> {
        let tx = self.conn.unchecked_transaction()?;

        let mut doctor = self.get_doctor(id)?.ok_or(RepoError::NotFound {
            entity: ENTITY,
            id,
        })?;
        doctor.apply_patch(patch);
        doctor.validate()?;

        let changed = self.conn.execute(
            "UPDATE doctors
             SET
                first_name = ?2,
                last_name = ?3,
                qualification = ?4,
                description = ?5,
                hospital = ?6,
                department = ?7,
                specialisation = ?8,
                languages_spoken = ?9,
                research = ?10,
                doctor_feedback = ?11,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                doctor.id.to_string(),
                doctor.first_name.as_str(),
                doctor.last_name.as_str(),
                doctor.qualification.as_str(),
                doctor.description.as_deref(),
                doctor.hospital.as_deref(),
                doctor.department.as_deref(),
                doctor.specialisation.as_deref(),
                encode_languages(&doctor.languages_spoken)?,
                doctor.research.as_deref(),
                doctor.doctor_feedback.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        tx.commit()?;

        Ok(doctor)
    }

    fn delete_doctor(&self, id: DoctorId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM doctors WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        Ok(())
    }
}

fn parse_doctor_row(row: &Row<'_>) -> RepoResult<Doctor> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "doctors.uuid")?;

    let languages_text: String = row.get("languages_spoken")?;
    let languages_spoken = serde_json::from_str::<Vec<String>>(&languages_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid languages_spoken value in doctors.languages_spoken: {err}"
        ))
    })?;

    let doctor = Doctor {
        id,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        qualification: row.get("qualification")?,
        description: row.get("description")?,
        hospital: row.get("hospital")?,
        department: row.get("department")?,
        specialisation: row.get("specialisation")?,
        languages_spoken,
        research: row.get("research")?,
        doctor_feedback: row.get("doctor_feedback")?,
    };
    doctor
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("{err} (doctors.uuid={uuid_text})")))?;
    Ok(doctor)
}

/// `needle` must already be lowercased.
fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn optional_contains_folded(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|value| contains_folded(value, needle))
}

fn encode_languages(languages: &[String]) -> RepoResult<String> {
    serde_json::to_string(languages)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode languages_spoken: {err}")))
}
