use chrono::{Duration, Utc};

use super::common::*;
use crate::workflows::recruitment::domain::{ApplicationId, UserId, VacancyId};
use crate::workflows::recruitment::dto::{ApplicationDto, VacancyDto};
use crate::workflows::recruitment::patch::VacancyPatch;
use crate::workflows::recruitment::repository::ApplicationRepository;
use crate::workflows::recruitment::service::ServiceError;

fn new_vacancy(applications: Vec<ApplicationDto>) -> VacancyDto {
    VacancyDto {
        id: None,
        title: "Rust Developer".to_string(),
        company_name: "Ferris BV".to_string(),
        description: "Build services".to_string(),
        location: "Eindhoven".to_string(),
        posted_at: None,
        applications,
    }
}

#[test]
fn create_defaults_posted_at_to_now() {
    let store = seeded_store();
    let service = vacancy_service(&store);

    let created = service.create(new_vacancy(Vec::new())).expect("created");

    assert_eq!(created.id, Some(VacancyId(4)));
    let posted_at = created.posted_at.expect("defaulted");
    assert!((Utc::now() - posted_at) < Duration::seconds(5));
    assert!(created.applications.is_empty());
}

#[test]
fn create_links_nested_applications_to_new_vacancy() {
    let store = seeded_store();
    let service = vacancy_service(&store);

    let created = service
        .create(new_vacancy(vec![
            ApplicationDto {
                user_id: Some(UserId(2)),
                motivation: Some("Ferris fan".to_string()),
                applied_at: Some(at(11)),
                ..ApplicationDto::default()
            },
            ApplicationDto {
                user_id: Some(UserId(1)),
                motivation: Some("Borrow checker whisperer".to_string()),
                applied_at: Some(at(10)),
                ..ApplicationDto::default()
            },
        ]))
        .expect("created");

    let id = created.id.expect("id assigned");
    let users: Vec<_> = created
        .applications
        .iter()
        .map(|application| application.user_id)
        .collect();
    assert_eq!(users, vec![Some(UserId(1)), Some(UserId(2))]);
    assert!(created
        .applications
        .iter()
        .all(|application| application.vacancy_id == Some(id)));
}

#[test]
fn create_with_unknown_nested_user_is_not_found() {
    let store = seeded_store();
    let service = vacancy_service(&store);

    let result = service.create(new_vacancy(vec![ApplicationDto {
        user_id: Some(UserId(8)),
        motivation: Some("Ghost candidate".to_string()),
        ..ApplicationDto::default()
    }]));

    match result {
        Err(ServiceError::NotFound(message)) => {
            assert_eq!(message, "Could not find User with Id: 8");
        }
        other => panic!("expected missing user, got {other:?}"),
    }
    assert_eq!(service.list().expect("list").len(), 3);
}

#[test]
fn create_rejects_blank_nested_motivation() {
    let store = seeded_store();
    let service = vacancy_service(&store);

    let result = service.create(new_vacancy(vec![ApplicationDto {
        user_id: Some(UserId(1)),
        motivation: Some("   ".to_string()),
        ..ApplicationDto::default()
    }]));

    match result {
        Err(ServiceError::InvalidArgument(message)) => assert_eq!(message, "Invalid motivation"),
        other => panic!("expected invalid motivation, got {other:?}"),
    }
    assert_eq!(service.list().expect("list").len(), 3);
    assert_eq!(store.list_applications().expect("list").len(), 3);
}

#[test]
fn create_requires_non_empty_fields() {
    let store = seeded_store();
    let service = vacancy_service(&store);
    let mut dto = new_vacancy(Vec::new());
    dto.title = String::new();
    dto.location = String::new();

    match service.create(dto) {
        Err(ServiceError::Validation(errors)) => {
            let fields = errors.field_errors();
            assert!(fields.contains_key("title"));
            assert!(fields.contains_key("location"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn create_rejects_client_supplied_id() {
    let store = seeded_store();
    let service = vacancy_service(&store);
    let mut dto = new_vacancy(Vec::new());
    dto.id = Some(VacancyId(1));

    assert!(matches!(
        service.create(dto),
        Err(ServiceError::InvalidArgument(_))
    ));
}

#[test]
fn get_renders_applications_of_the_vacancy() {
    let store = seeded_store();
    let service = vacancy_service(&store);

    let found = service.get(VacancyId(3)).expect("seeded");
    assert_eq!(found.title, "C# Developer");
    assert_eq!(found.applications.len(), 1);
    assert_eq!(found.applications[0].status.as_deref(), Some("REJECTED"));

    match service.get(VacancyId(30)) {
        Err(ServiceError::NotFound(message)) => {
            assert_eq!(message, "Could not find Vacancy with Id: 30");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn update_applies_only_present_fields() {
    let store = seeded_store();
    let service = vacancy_service(&store);
    let before = service.get(VacancyId(1)).expect("seeded");

    let updated = service
        .update(
            VacancyId(1),
            VacancyPatch {
                location: Some("Den Haag".to_string()),
                ..VacancyPatch::default()
            },
        )
        .expect("updated");

    assert_eq!(updated.location, "Den Haag");
    assert_eq!(updated.title, before.title);
    assert_eq!(updated.posted_at, before.posted_at);
}

#[test]
fn delete_detaches_applications() {
    let store = seeded_store();
    let service = vacancy_service(&store);

    service.delete(VacancyId(2)).expect("deleted");

    let orphan = store
        .fetch_application(ApplicationId(2))
        .expect("lookup")
        .expect("application kept");
    assert_eq!(orphan.vacancy_id, None);
    assert_eq!(orphan.user_id, Some(UserId(2)));
    assert!(matches!(
        service.get(VacancyId(2)),
        Err(ServiceError::NotFound(_))
    ));
}
