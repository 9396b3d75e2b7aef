//! Patient record model.
//!
//! # Invariants
//! - `first_name`, `last_name`, `height`, `weight` and `blood_pressure` are
//!   non-blank.
//! - `temperature` is finite.
//! - `doctor_id` is a non-owning reference and may point at a doctor that no
//!   longer exists.

use super::doctor::DoctorId;
use super::{
    deserialize_optional_whole_number, deserialize_whole_number, replace_if_some,
    replace_optional_if_some, require_finite, require_text,
};
use super::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ENTITY: &str = "patient";

/// Stable store-assigned patient identifier.
pub type PatientId = Uuid;

/// One clinical intake record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Serialized as `_id` to match external record naming.
    #[serde(rename = "_id")]
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    /// Free text, e.g. `170cm`.
    pub height: String,
    /// Free text, e.g. `70kg`.
    pub weight: String,
    /// Free text, e.g. `120/80`.
    pub blood_pressure: String,
    pub temperature: f64,
    pub vaccination_status: Option<String>,
    pub cold: bool,
    pub cough: bool,
    pub phone_number: i64,
    pub description: Option<String>,
    pub doctor_feedback: Option<String>,
    pub doctor_id: Option<DoctorId>,
}

/// Creation input for a patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientInput {
    pub first_name: String,
    pub last_name: String,
    pub height: String,
    pub weight: String,
    pub blood_pressure: String,
    pub temperature: f64,
    #[serde(default)]
    pub vaccination_status: Option<String>,
    pub cold: bool,
    pub cough: bool,
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub phone_number: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub doctor_feedback: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<DoctorId>,
}

/// Partial-update input. Only `Some` fields replace stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientPatch {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub blood_pressure: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub vaccination_status: Option<String>,
    #[serde(default)]
    pub cold: Option<bool>,
    #[serde(default)]
    pub cough: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_whole_number")]
    pub phone_number: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub doctor_feedback: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<DoctorId>,
}

impl Patient {
    /// Builds a record from creation input with a freshly generated id.
    pub fn from_input(input: &PatientInput) -> Self {
        Self::with_id(Uuid::new_v4(), input)
    }

    /// Builds a record from creation input with a caller-provided id.
    pub fn with_id(id: PatientId, input: &PatientInput) -> Self {
        Self {
            id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            height: input.height.clone(),
            weight: input.weight.clone(),
            blood_pressure: input.blood_pressure.clone(),
            temperature: input.temperature,
            vaccination_status: input.vaccination_status.clone(),
            cold: input.cold,
            cough: input.cough,
            phone_number: input.phone_number,
            description: input.description.clone(),
            doctor_feedback: input.doctor_feedback.clone(),
            doctor_id: input.doctor_id,
        }
    }

    /// Checks required-field invariants.
    ///
    /// # Errors
    /// - `MissingField` for the first blank required text field.
    /// - `NonFiniteNumber` when `temperature` is NaN or infinite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(ENTITY, "firstName", &self.first_name)?;
        require_text(ENTITY, "lastName", &self.last_name)?;
        require_text(ENTITY, "height", &self.height)?;
        require_text(ENTITY, "weight", &self.weight)?;
        require_text(ENTITY, "bloodPressure", &self.blood_pressure)?;
        require_finite(ENTITY, "temperature", self.temperature)?;
        Ok(())
    }

    /// Applies supplied patch fields in place; omitted fields are untouched.
    pub fn apply_patch(&mut self, patch: &PatientPatch) {
        replace_if_some(&mut self.first_name, &patch.first_name);
        replace_if_some(&mut self.last_name, &patch.last_name);
        replace_if_some(&mut self.height, &patch.height);
        replace_if_some(&mut self.weight, &patch.weight);
        replace_if_some(&mut self.blood_pressure, &patch.blood_pressure);
        replace_if_some(&mut self.temperature, &patch.temperature);
        replace_optional_if_some(&mut self.vaccination_status, &patch.vaccination_status);
        replace_if_some(&mut self.cold, &patch.cold);
        replace_if_some(&mut self.cough, &patch.cough);
        replace_if_some(&mut self.phone_number, &patch.phone_number);
        replace_optional_if_some(&mut self.description, &patch.description);
        replace_optional_if_some(&mut self.doctor_feedback, &patch.doctor_feedback);
        replace_optional_if_some(&mut self.doctor_id, &patch.doctor_id);
    }
}

#[cfg(test)]
mod tests {
    use super::{Patient, PatientInput, PatientPatch};
    use crate::model::ValidationError;

    fn input() -> PatientInput {
        PatientInput {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            height: "170cm".to_string(),
            weight: "70kg".to_string(),
            blood_pressure: "120/80".to_string(),
            temperature: 36.6,
            vaccination_status: None,
            cold: false,
            cough: true,
            phone_number: 5_551_234,
            description: None,
            doctor_feedback: None,
            doctor_id: None,
        }
    }

    #[test]
    fn blank_required_text_is_rejected() {
        let mut patient = Patient::from_input(&input());
        patient.blood_pressure = "   ".to_string();

        let err = patient.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                entity: "patient",
                field: "bloodPressure",
            }
        );
    }

    #[test]
    fn non_finite_temperature_is_rejected() {
        let mut patient = Patient::from_input(&input());
        patient.temperature = f64::NAN;

        assert!(matches!(
            patient.validate(),
            Err(ValidationError::NonFiniteNumber { field: "temperature", .. })
        ));
    }

    #[test]
    fn patch_replaces_only_supplied_fields() {
        let mut patient = Patient::from_input(&input());
        let id = patient.id;

        patient.apply_patch(&PatientPatch {
            weight: Some("72kg".to_string()),
            cold: Some(true),
            doctor_feedback: Some("rest".to_string()),
            ..PatientPatch::default()
        });

        assert_eq!(patient.id, id);
        assert_eq!(patient.weight, "72kg");
        assert!(patient.cold);
        assert!(patient.cough);
        assert_eq!(patient.first_name, "Ada");
        assert_eq!(patient.doctor_feedback.as_deref(), Some("rest"));
        assert_eq!(patient.vaccination_status, None);
    }

    #[test]
    fn input_decodes_camel_case_and_rejects_missing_required_fields() {
        let decoded: PatientInput = serde_json::from_value(serde_json::json!({
            "firstName": "A",
            "lastName": "B",
            "height": "170cm",
            "weight": "70kg",
            "bloodPressure": "120/80",
            "temperature": 36.6,
            "cold": false,
            "cough": true,
            "phoneNumber": 5551234
        }))
        .unwrap();
        assert_eq!(decoded.phone_number, 5_551_234);
        assert_eq!(decoded.doctor_id, None);

        let missing = serde_json::from_value::<PatientInput>(serde_json::json!({
            "firstName": "A"
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn phone_number_accepts_whole_floats_only() {
        let mut document = serde_json::json!({
            "firstName": "A",
            "lastName": "B",
            "height": "170cm",
            "weight": "70kg",
            "bloodPressure": "120/80",
            "temperature": 36.6,
            "cold": false,
            "cough": false,
            "phoneNumber": 5551234.0
        });
        let decoded: PatientInput = serde_json::from_value(document.clone()).unwrap();
        assert_eq!(decoded.phone_number, 5_551_234);

        document["phoneNumber"] = serde_json::json!(5551234.5);
        let err = serde_json::from_value::<PatientInput>(document).unwrap_err();
        assert!(err.to_string().contains("expected a whole number"));

        let patch: PatientPatch =
            serde_json::from_value(serde_json::json!({ "phoneNumber": 42.0 })).unwrap();
        assert_eq!(patch.phone_number, Some(42));
        let empty: PatientPatch = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.phone_number, None);
    }
}
