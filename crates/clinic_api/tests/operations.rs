use clinic_api::{ClinicApi, OperationRequest, OperationResponse, PlainPatientsApi};
use clinic_core::db::open_db_in_memory;
use clinic_core::ErrorKind;
use serde_json::{json, Value};

fn run<P, D>(api: &ClinicApi<P, D>, operation: &str, variables: Value) -> OperationResponse
where
    P: clinic_core::PatientRepository,
    D: clinic_core::DoctorRepository,
{
    api.execute(&OperationRequest::new(operation, variables))
}

fn data(response: &OperationResponse, operation: &str) -> Value {
    assert!(response.is_ok(), "unexpected errors: {:?}", response.errors);
    response.data.as_ref().unwrap()[operation].clone()
}

fn patient_input(doctor_id: Option<&str>) -> Value {
    let mut input = json!({
        "firstName": "A",
        "lastName": "B",
        "height": "170cm",
        "weight": "70kg",
        "bloodPressure": "120/80",
        "temperature": 36.6,
        "cold": false,
        "cough": true,
        "phoneNumber": 5551234
    });
    if let Some(doctor_id) = doctor_id {
        input["doctorId"] = json!(doctor_id);
    }
    input
}

#[test]
fn end_to_end_doctor_deletion_leaves_null_embedding() {
    let conn = open_db_in_memory().unwrap();
    let api = ClinicApi::try_new(&conn).unwrap();

    let doctor = data(
        &run(
            &api,
            "createDoctor",
            json!({ "doctorInput": { "firstName": "Jane", "lastName": "Doe", "qualification": "MD" } }),
        ),
        "createDoctor",
    );
    let d1 = doctor["_id"].as_str().unwrap().to_string();

    let created = data(
        &run(
            &api,
            "createPatient",
            json!({ "patientInput": patient_input(Some(&d1)) }),
        ),
        "createPatient",
    );
    assert_eq!(created["doctor"], doctor);
    let patient_id = created["_id"].as_str().unwrap().to_string();

    let fetched = data(&run(&api, "patient", json!({ "_id": patient_id })), "patient");
    assert_eq!(fetched["doctor"], doctor);

    let deleted = data(&run(&api, "deleteDoctor", json!({ "_id": d1 })), "deleteDoctor");
    assert_eq!(deleted, json!("Doctor successfully deleted."));

    let after = data(&run(&api, "patient", json!({ "_id": patient_id })), "patient");
    assert_eq!(after["_id"], json!(patient_id));
    assert_eq!(after["doctor"], Value::Null);
}

#[test]
fn create_patient_with_unknown_doctor_reports_domain_error() {
    let conn = open_db_in_memory().unwrap();
    let api = ClinicApi::try_new(&conn).unwrap();

    let response = run(
        &api,
        "createPatient",
        json!({ "patientInput": patient_input(Some("6f1c1f0e-8a55-4c1b-9d6f-0d9a4f3c2b10")) }),
    );
    assert_eq!(response.data, None);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].kind, ErrorKind::DomainInvariant);
    assert_eq!(response.errors[0].message, "Doctor not found");

    let listed = data(&run(&api, "patients", Value::Null), "patients");
    assert_eq!(listed, json!([]));
}

#[test]
fn search_asymmetry_is_preserved() {
    let conn = open_db_in_memory().unwrap();
    let api = ClinicApi::try_new(&conn).unwrap();
    run(&api, "createPatient", json!({ "patientInput": patient_input(None) }));
    run(
        &api,
        "createDoctor",
        json!({ "doctorInput": { "firstName": "John", "lastName": "Smith", "qualification": "MBBS" } }),
    );

    let patients = data(&run(&api, "searchPatients", json!({})), "searchPatients");
    assert_eq!(patients, json!([]));

    let doctors = data(&run(&api, "searchDoctors", json!({})), "searchDoctors");
    assert_eq!(doctors.as_array().unwrap().len(), 1);

    let coughing = data(
        &run(&api, "searchPatients", json!({ "cough": true })),
        "searchPatients",
    );
    assert_eq!(coughing.as_array().unwrap().len(), 1);
}

#[test]
fn update_patient_keeps_omitted_fields() {
    let conn = open_db_in_memory().unwrap();
    let api = ClinicApi::try_new(&conn).unwrap();
    let created = data(
        &run(&api, "createPatient", json!({ "patientInput": patient_input(None) })),
        "createPatient",
    );

    let updated = data(
        &run(
            &api,
            "updatePatient",
            json!({ "_id": created["_id"], "patientInput": { "doctorFeedback": "hydrate" } }),
        ),
        "updatePatient",
    );
    assert_eq!(updated["doctorFeedback"], json!("hydrate"));
    assert_eq!(updated["bloodPressure"], json!("120/80"));
    assert_eq!(updated["temperature"], json!(36.6));
}

#[test]
fn not_found_and_decode_failures_are_classified() {
    let conn = open_db_in_memory().unwrap();
    let api = ClinicApi::try_new(&conn).unwrap();

    let missing = run(
        &api,
        "deletePatient",
        json!({ "_id": "0b6f6a8e-3f1d-4a3e-9d3c-5f2e1a7b9c44" }),
    );
    assert_eq!(missing.errors[0].kind, ErrorKind::NotFound);

    let malformed = run(&api, "patient", json!({ "_id": "abc" }));
    assert_eq!(malformed.errors[0].kind, ErrorKind::Validation);

    let missing_field = run(
        &api,
        "createDoctor",
        json!({ "doctorInput": { "firstName": "Jane", "lastName": "Doe" } }),
    );
    assert_eq!(missing_field.errors[0].kind, ErrorKind::Validation);

    let unknown = run(&api, "dropAll", Value::Null);
    assert_eq!(unknown.errors[0].kind, ErrorKind::Validation);
    assert!(unknown.errors[0].message.contains("dropAll"));
}

#[test]
fn patients_by_doctor_returns_bare_references() {
    let conn = open_db_in_memory().unwrap();
    let api = ClinicApi::try_new(&conn).unwrap();
    let doctor = data(
        &run(
            &api,
            "createDoctor",
            json!({ "doctorInput": { "firstName": "Jane", "lastName": "Doe", "qualification": "MD" } }),
        ),
        "createDoctor",
    );
    let doctor_id = doctor["_id"].as_str().unwrap();
    run(
        &api,
        "createPatient",
        json!({ "patientInput": patient_input(Some(doctor_id)) }),
    );

    let linked = data(
        &run(&api, "patientsByDoctor", json!({ "doctorId": doctor_id })),
        "patientsByDoctor",
    );
    assert_eq!(linked[0]["doctorId"], json!(doctor_id));

    let none = data(
        &run(
            &api,
            "patientsByDoctor",
            json!({ "doctorId": "9a1e2c3d-4b5f-4a6e-8d7c-1b2a3c4d5e6f" }),
        ),
        "patientsByDoctor",
    );
    assert_eq!(none, json!([]));
}

#[test]
fn execute_json_handles_documents_and_garbage() {
    let conn = open_db_in_memory().unwrap();
    let api = ClinicApi::try_new(&conn).unwrap();

    let ok: Value = serde_json::from_str(&api.execute_json(r#"{"operation":"doctors"}"#)).unwrap();
    assert_eq!(ok, json!({ "data": { "doctors": [] } }));

    let bad: Value = serde_json::from_str(&api.execute_json("{not json")).unwrap();
    assert_eq!(bad["data"], Value::Null);
    assert_eq!(bad["errors"][0]["kind"], json!("validation"));
}

#[test]
fn plain_surface_shares_the_patient_store() {
    let conn = open_db_in_memory().unwrap();
    let api = ClinicApi::try_new(&conn).unwrap();
    let plain = PlainPatientsApi::try_new(&conn).unwrap();

    let created = data(
        &run(&api, "createPatient", json!({ "patientInput": patient_input(None) })),
        "createPatient",
    );

    let listed = plain.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(json!(listed[0].id.to_string()), created["_id"]);
}
