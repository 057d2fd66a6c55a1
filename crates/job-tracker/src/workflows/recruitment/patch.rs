//! Sparse updates. Every field is optional and only present fields overwrite the stored
//! record.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use super::domain::{
    Application, ApplicationStatus, UnknownStatus, User, UserId, Vacancy, VacancyId,
};

fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[validate(length(min = 1, message = "firstname must not be empty."))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "lastname must not be empty."))]
    pub last_name: Option<String>,
    #[validate(email(message = "email must be a valid address."))]
    pub email: Option<String>,
    #[validate(length(min = 5, message = "password must be at least 5 characters."))]
    pub password: Option<String>,
    #[validate(range(min = 0, max = 150, message = "age must be between 0 and 150."))]
    pub age: Option<i32>,
    pub photo: Option<String>,
    pub cv: Option<String>,
    #[validate(length(min = 1, message = "role must not be empty."))]
    pub role: Option<String>,
    pub enabled: Option<bool>,
}

impl UserPatch {
    pub fn apply_to(self, user: &mut User) {
        merge(&mut user.first_name, self.first_name);
        merge(&mut user.last_name, self.last_name);
        merge(&mut user.email, self.email);
        merge(&mut user.password, self.password);
        merge(&mut user.age, self.age);
        merge(&mut user.role, self.role);
        merge(&mut user.enabled, self.enabled);
        if self.photo.is_some() {
            user.photo = self.photo;
        }
        if self.cv.is_some() {
            user.cv = self.cv;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VacancyPatch {
    #[validate(length(min = 1, message = "Title must not be empty."))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Company name must not be empty."))]
    pub company_name: Option<String>,
    #[validate(length(min = 1, message = "Description must not be empty."))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Location must not be empty."))]
    pub location: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl VacancyPatch {
    pub fn apply_to(self, vacancy: &mut Vacancy) {
        merge(&mut vacancy.title, self.title);
        merge(&mut vacancy.company_name, self.company_name);
        merge(&mut vacancy.description, self.description);
        merge(&mut vacancy.location, self.location);
        if self.posted_at.is_some() {
            vacancy.posted_at = self.posted_at;
        }
    }
}

/// Application update. User and vacancy are rewired by id without loading the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPatch {
    pub user_id: Option<UserId>,
    pub vacancy_id: Option<VacancyId>,
    pub motivation: Option<String>,
    pub status: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
}

impl ApplicationPatch {
    /// Fails without touching `application` when the status string is unknown.
    pub fn apply_to(self, application: &mut Application) -> Result<(), UnknownStatus> {
        let status = self
            .status
            .map(|raw| raw.parse::<ApplicationStatus>())
            .transpose()?;

        if self.user_id.is_some() {
            application.user_id = self.user_id;
        }
        if self.vacancy_id.is_some() {
            application.vacancy_id = self.vacancy_id;
        }
        merge(&mut application.motivation, self.motivation);
        merge(&mut application.status, status);
        if self.applied_at.is_some() {
            application.applied_at = self.applied_at;
        }
        Ok(())
    }
}
