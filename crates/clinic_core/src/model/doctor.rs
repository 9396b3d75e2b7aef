//! Doctor record model.
//!
//! # Invariants
//! - `first_name`, `last_name` and `qualification` are non-blank.
//! - `languages_spoken` keeps caller order; duplicates are allowed.

use super::{replace_if_some, replace_optional_if_some, require_text};
use super::ValidationError;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ENTITY: &str = "doctor";

/// Stable store-assigned doctor identifier.
pub type DoctorId = Uuid;

/// One practitioner profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: DoctorId,
    pub first_name: String,
    pub last_name: String,
    pub qualification: String,
    pub description: Option<String>,
    pub hospital: Option<String>,
    pub department: Option<String>,
    pub specialisation: Option<String>,
    pub languages_spoken: Vec<String>,
    pub research: Option<String>,
    pub doctor_feedback: Option<String>,
}

/// Creation input for a doctor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DoctorInputFields")]
pub struct DoctorInput {
    pub first_name: String,
    pub last_name: String,
    pub qualification: String,
    pub description: Option<String>,
    pub hospital: Option<String>,
    pub department: Option<String>,
    pub specialisation: Option<String>,
    pub languages_spoken: Vec<String>,
    pub research: Option<String>,
    pub doctor_feedback: Option<String>,
}

// Decoding shape for `DoctorInput`. Older clients still send `doctorId`,
// which carries no meaning for a doctor and is dropped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DoctorInputFields {
    first_name: String,
    last_name: String,
    qualification: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    hospital: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    specialisation: Option<String>,
    #[serde(default)]
    languages_spoken: Vec<String>,
    #[serde(default)]
    research: Option<String>,
    #[serde(default)]
    doctor_feedback: Option<String>,
    #[serde(default, rename = "doctorId")]
    _doctor_id: Option<IgnoredAny>,
}

impl From<DoctorInputFields> for DoctorInput {
    fn from(fields: DoctorInputFields) -> Self {
        Self {
            first_name: fields.first_name,
            last_name: fields.last_name,
            qualification: fields.qualification,
            description: fields.description,
            hospital: fields.hospital,
            department: fields.department,
            specialisation: fields.specialisation,
            languages_spoken: fields.languages_spoken,
            research: fields.research,
            doctor_feedback: fields.doctor_feedback,
        }
    }
}

/// Partial-update input. Only `Some` fields replace stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DoctorPatch {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub specialisation: Option<String>,
    #[serde(default)]
    pub languages_spoken: Option<Vec<String>>,
    #[serde(default)]
    pub research: Option<String>,
    #[serde(default)]
    pub doctor_feedback: Option<String>,
}

impl Doctor {
    /// Builds a record from creation input with a freshly generated id.
    pub fn from_input(input: &DoctorInput) -> Self {
        Self::with_id(Uuid::new_v4(), input)
    }

    /// Builds a record from creation input with a caller-provided id.
    pub fn with_id(id: DoctorId, input: &DoctorInput) -> Self {
        Self {
            id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            qualification: input.qualification.clone(),
            description: input.description.clone(),
            hospital: input.hospital.clone(),
            department: input.department.clone(),
            specialisation: input.specialisation.clone(),
            languages_spoken: input.languages_spoken.clone(),
            research: input.research.clone(),
            doctor_feedback: input.doctor_feedback.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(ENTITY, "firstName", &self.first_name)?;
        require_text(ENTITY, "lastName", &self.last_name)?;
        require_text(ENTITY, "qualification", &self.qualification)?;
        Ok(())
    }

    /// Applies supplied patch fields in place; omitted fields are untouched.
    pub fn apply_patch(&mut self, patch: &DoctorPatch) {
        replace_if_some(&mut self.first_name, &patch.first_name);
        replace_if_some(&mut self.last_name, &patch.last_name);
        replace_if_some(&mut self.qualification, &patch.qualification);
        replace_optional_if_some(&mut self.description, &patch.description);
        replace_optional_if_some(&mut self.hospital, &patch.hospital);
        replace_optional_if_some(&mut self.department, &patch.department);
        replace_optional_if_some(&mut self.specialisation, &patch.specialisation);
        replace_if_some(&mut self.languages_spoken, &patch.languages_spoken);
        replace_optional_if_some(&mut self.research, &patch.research);
        replace_optional_if_some(&mut self.doctor_feedback, &patch.doctor_feedback);
    }
}
