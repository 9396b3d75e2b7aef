use clinic_core::db::open_db_in_memory;
use clinic_core::{
    DoctorFilter, DoctorInput, DoctorPatch, DoctorRepository, RepoError, SqliteDoctorRepository,
};
use uuid::Uuid;

fn doctor_input(first_name: &str, last_name: &str) -> DoctorInput {
    DoctorInput {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        qualification: "MD".to_string(),
        description: None,
        hospital: None,
        department: None,
        specialisation: None,
        languages_spoken: Vec::new(),
        research: None,
        doctor_feedback: None,
    }
}

fn filter(name: Option<&str>, specialisation: Option<&str>, hospital: Option<&str>) -> DoctorFilter {
    DoctorFilter {
        name: name.map(str::to_string),
        specialisation: specialisation.map(str::to_string),
        hospital: hospital.map(str::to_string),
    }
}

#[test]
fn create_and_get_roundtrip_preserves_languages() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();

    let mut input = doctor_input("Jane", "Doe");
    input.languages_spoken = vec!["en".to_string(), "hi".to_string(), "en".to_string()];
    input.research = Some("sepsis markers".to_string());
    let created = repo.create_doctor(&input).unwrap();

    let loaded = repo.get_doctor(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.languages_spoken, vec!["en", "hi", "en"]);
}

#[test]
fn create_requires_qualification() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();

    let mut input = doctor_input("Jane", "Doe");
    input.qualification = "  ".to_string();

    assert!(matches!(
        repo.create_doctor(&input),
        Err(RepoError::Validation(_))
    ));
    assert!(repo.list_doctors().unwrap().is_empty());
}

#[test]
fn search_without_filters_returns_all() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();
    repo.create_doctor(&doctor_input("Jane", "Doe")).unwrap();
    repo.create_doctor(&doctor_input("John", "Smith")).unwrap();

    assert_eq!(repo.search_doctors(&DoctorFilter::default()).unwrap().len(), 2);
    assert_eq!(
        repo.search_doctors(&filter(Some("  "), Some(""), None))
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn name_filter_matches_first_or_last_name_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();
    let smith = repo.create_doctor(&doctor_input("John", "Smith")).unwrap();
    let smita = repo.create_doctor(&doctor_input("Smita", "Rao")).unwrap();
    repo.create_doctor(&doctor_input("Jane", "Doe")).unwrap();

    let found = repo.search_doctors(&filter(Some("Sm"), None, None)).unwrap();
    let ids = found.iter().map(|doctor| doctor.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![smith.id, smita.id]);

    let lower = repo.search_doctors(&filter(Some("mit"), None, None)).unwrap();
    assert_eq!(lower.len(), 2);
}

#[test]
fn filters_are_and_combined() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();

    let mut cardio_general = doctor_input("John", "Smith");
    cardio_general.specialisation = Some("Cardiology".to_string());
    cardio_general.hospital = Some("St Mary General".to_string());
    let expected = repo.create_doctor(&cardio_general).unwrap();

    let mut cardio_other = doctor_input("Jill", "Smithers");
    cardio_other.specialisation = Some("Interventional Cardiology".to_string());
    cardio_other.hospital = Some("City Clinic".to_string());
    repo.create_doctor(&cardio_other).unwrap();

    let mut no_hospital = doctor_input("Jack", "Smith");
    no_hospital.specialisation = Some("cardiology".to_string());
    repo.create_doctor(&no_hospital).unwrap();

    let found = repo
        .search_doctors(&filter(Some("smith"), Some("CARDIO"), Some("general")))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, expected.id);
}

#[test]
fn filter_text_is_matched_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();
    repo.create_doctor(&doctor_input("Jane", "Doe")).unwrap();
    let literal = repo.create_doctor(&doctor_input("Ann", "O%Neil")).unwrap();

    for needle in ["%", ".*", "_", "J.ne"] {
        let found = repo.search_doctors(&filter(Some(needle), None, None)).unwrap();
        assert!(
            found.iter().all(|doctor| doctor.id == literal.id),
            "needle `{needle}` must not behave as a pattern"
        );
    }
    let percent = repo.search_doctors(&filter(Some("%"), None, None)).unwrap();
    assert_eq!(percent.len(), 1);
}

#[test]
fn filters_fold_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();
    repo.create_doctor(&doctor_input("Jane", "Doe")).unwrap();
    let mut input = doctor_input("Élodie", "Müller");
    input.hospital = Some("Hôpital Général".to_string());
    input.specialisation = Some("Kardiologie Ärzte".to_string());
    let expected = repo.create_doctor(&input).unwrap();

    let count = |filter: DoctorFilter| {
        let found = repo.search_doctors(&filter).unwrap();
        assert!(found.iter().all(|doctor| doctor.id == expected.id));
        found.len()
    };

    assert_eq!(
        (
            count(filter(Some("MÜLLER"), None, None)),
            count(filter(Some("élodie"), None, None)),
            count(filter(None, None, Some("HÔPITAL"))),
            count(filter(None, Some("ärzte"), Some("général"))),
        ),
        (1, 1, 1, 1)
    );
    assert_eq!(count(filter(Some("MULLER"), None, None)), 0);
}

#[test]
fn update_replaces_only_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();
    let mut input = doctor_input("Jane", "Doe");
    input.hospital = Some("General".to_string());
    input.languages_spoken = vec!["en".to_string()];
    let created = repo.create_doctor(&input).unwrap();

    let updated = repo
        .update_doctor(
            created.id,
            &DoctorPatch {
                department: Some("Emergency".to_string()),
                languages_spoken: Some(vec!["en".to_string(), "es".to_string()]),
                ..DoctorPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.department.as_deref(), Some("Emergency"));
    assert_eq!(updated.languages_spoken, vec!["en", "es"]);
    assert_eq!(updated.hospital.as_deref(), Some("General"));
    assert_eq!(updated.qualification, "MD");
    assert_eq!(repo.get_doctor(created.id).unwrap().unwrap(), updated);
}

#[test]
fn update_and_delete_unknown_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        repo.update_doctor(missing, &DoctorPatch::default()),
        Err(RepoError::NotFound { entity: "doctor", .. })
    ));
    assert!(matches!(
        repo.delete_doctor(missing),
        Err(RepoError::NotFound { entity: "doctor", .. })
    ));
}
