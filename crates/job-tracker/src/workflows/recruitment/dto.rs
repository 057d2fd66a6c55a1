//! Transport representations and the conversions to and from stored records.
//!
//! Foreign keys always travel as plain ids. Nested application lists on users and
//! vacancies are rendered in [`applied_order`] and ignored when converting back.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, UnknownStatus, User, UserId, Vacancy,
    VacancyId,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDto {
    #[serde(default)]
    pub id: Option<ApplicationId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub vacancy_id: Option<VacancyId>,
    #[serde(default)]
    pub motivation: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(default)]
    pub id: Option<UserId>,
    #[validate(length(min = 1, message = "firstname is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "lastname is required."))]
    pub last_name: String,
    #[validate(email(message = "email must be a valid address."))]
    pub email: String,
    #[serde(default, skip_serializing)]
    #[validate(length(min = 5, message = "password must be at least 5 characters."))]
    pub password: String,
    #[validate(range(min = 0, max = 150, message = "age must be between 0 and 150."))]
    pub age: i32,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub cv: Option<String>,
    #[validate(length(min = 1, message = "role is required."))]
    pub role: String,
    pub enabled: bool,
    #[serde(default)]
    pub applications: Vec<ApplicationDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VacancyDto {
    #[serde(default)]
    pub id: Option<VacancyId>,
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "Company name is required."))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    #[validate(length(min = 1, message = "Location is required."))]
    pub location: String,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub applications: Vec<ApplicationDto>,
}

/// Body of the path-addressed apply endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotivationRequest {
    #[serde(default)]
    pub motivation: Option<String>,
}

/// Body of the body-addressed apply endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub user_id: UserId,
    pub vacancy_id: VacancyId,
    #[serde(default)]
    pub motivation: Option<String>,
}

/// Deterministic order for nested application lists: `applied_at` ascending, then `id`
/// ascending, with missing values sorted last for both keys.
pub fn applied_order(left: &Application, right: &Application) -> Ordering {
    nulls_last(left.applied_at.as_ref(), right.applied_at.as_ref())
        .then_with(|| nulls_last(left.id.as_ref(), right.id.as_ref()))
}

fn nulls_last<T: Ord>(left: Option<&T>, right: Option<&T>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn ordered_dtos(mut applications: Vec<Application>) -> Vec<ApplicationDto> {
    applications.sort_by(applied_order);
    applications.iter().map(ApplicationDto::from).collect()
}

impl From<&Application> for ApplicationDto {
    fn from(application: &Application) -> Self {
        Self {
            id: application.id,
            user_id: application.user_id,
            vacancy_id: application.vacancy_id,
            motivation: Some(application.motivation.clone()),
            status: Some(application.status.label().to_string()),
            applied_at: application.applied_at,
        }
    }
}

impl ApplicationDto {
    /// Builds an entity holding id-only references. A missing status means `PENDING`.
    pub fn into_entity(self) -> Result<Application, UnknownStatus> {
        let status = match self.status {
            Some(raw) => raw.parse()?,
            None => ApplicationStatus::Pending,
        };

        Ok(Application {
            id: self.id,
            user_id: self.user_id,
            vacancy_id: self.vacancy_id,
            motivation: self.motivation.unwrap_or_default(),
            status,
            applied_at: self.applied_at,
        })
    }
}

impl UserDto {
    /// Renders a user together with the applications owned by it.
    pub fn from_entity(user: &User, applications: Vec<Application>) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            age: user.age,
            photo: user.photo.clone(),
            cv: user.cv.clone(),
            role: user.role.clone(),
            enabled: user.enabled,
            applications: ordered_dtos(applications),
        }
    }

    /// Scalar fields only; the nested application list is left to the caller.
    pub fn into_entity(self) -> User {
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            age: self.age,
            photo: self.photo,
            cv: self.cv,
            role: self.role,
            enabled: self.enabled,
        }
    }
}

impl VacancyDto {
    pub fn from_entity(vacancy: &Vacancy, applications: Vec<Application>) -> Self {
        Self {
            id: vacancy.id,
            title: vacancy.title.clone(),
            company_name: vacancy.company_name.clone(),
            description: vacancy.description.clone(),
            location: vacancy.location.clone(),
            posted_at: vacancy.posted_at,
            applications: ordered_dtos(applications),
        }
    }

    /// Scalar fields only; the nested application list is left to the caller.
    pub fn into_entity(self) -> Vacancy {
        Vacancy {
            id: self.id,
            title: self.title,
            company_name: self.company_name,
            description: self.description,
            location: self.location,
            posted_at: self.posted_at,
        }
    }
}
