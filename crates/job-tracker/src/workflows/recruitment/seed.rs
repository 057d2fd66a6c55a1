//! Demo records: three candidates, three vacancies and one application per status.

use chrono::Utc;

use super::domain::{Application, ApplicationStatus, User, Vacancy};
use super::repository::{RecruitmentStore, RepositoryError};

const SEED_MOTIVATION: &str = "We will contact you soon.";

/// What [`seed_demo_data`] stored, with ids assigned.
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub users: Vec<User>,
    pub vacancies: Vec<Vacancy>,
    pub applications: Vec<Application>,
}

pub fn seed_demo_data<S>(store: &S) -> Result<SeedSummary, RepositoryError>
where
    S: RecruitmentStore + ?Sized,
{
    let users = [
        candidate("Andre", "Dabski", "12345", 25, "leeuw.jpeg", "Cv_One.pdf", "admin"),
        candidate("John", "Johnson", "54321", 25, "natuur.jpeg", "Cv_Two.pdf", "admin user"),
        candidate("Sonny", "Andarabski", "12345", 21, "vlinder.jpeg", "Cv_Three.pdf", "user"),
    ]
    .into_iter()
    .map(|user| store.insert_user(user))
    .collect::<Result<Vec<_>, _>>()?;

    let vacancies = [
        opening("Java Developer", "IBM", "Amsterdam"),
        opening("Python Developer", "Microsoft", "Rotterdam"),
        opening("C# Developer", "Oracle", "Utrecht"),
    ]
    .into_iter()
    .map(|vacancy| store.insert_vacancy(vacancy))
    .collect::<Result<Vec<_>, _>>()?;

    let statuses = [
        ApplicationStatus::Applied,
        ApplicationStatus::Pending,
        ApplicationStatus::Rejected,
    ];
    let applications = users
        .iter()
        .zip(&vacancies)
        .zip(statuses)
        .map(|((user, vacancy), status)| {
            store.insert_application(Application {
                id: None,
                user_id: user.id,
                vacancy_id: vacancy.id,
                motivation: SEED_MOTIVATION.to_string(),
                status,
                applied_at: Some(Utc::now()),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        users = users.len(),
        vacancies = vacancies.len(),
        applications = applications.len(),
        "seeded demo data"
    );

    Ok(SeedSummary {
        users,
        vacancies,
        applications,
    })
}

fn candidate(
    first_name: &str,
    last_name: &str,
    password: &str,
    age: i32,
    photo: &str,
    cv: &str,
    role: &str,
) -> User {
    User {
        id: None,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: "test@gmail.com".to_string(),
        password: password.to_string(),
        age,
        photo: Some(format!("mock/{photo}")),
        cv: Some(format!("mock/{cv}")),
        role: role.to_string(),
        enabled: true,
    }
}

fn opening(title: &str, company_name: &str, location: &str) -> Vacancy {
    Vacancy {
        id: None,
        title: title.to_string(),
        company_name: company_name.to_string(),
        description: title.to_string(),
        location: location.to_string(),
        posted_at: Some(Utc::now()),
    }
}
