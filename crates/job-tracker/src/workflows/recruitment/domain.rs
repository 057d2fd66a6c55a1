use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Identifier wrapper for stored vacancies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VacancyId(pub i64);

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VacancyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Candidate account. Applications are looked up by `user_id`, never embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub age: i32,
    pub photo: Option<String>,
    pub cv: Option<String>,
    pub role: String,
    pub enabled: bool,
}

/// Job posting that candidates apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vacancy {
    pub id: Option<VacancyId>,
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub location: String,
    pub posted_at: Option<DateTime<Utc>>,
}

/// Link between one user and one vacancy.
///
/// `user_id`/`vacancy_id` are id-only references; they become `None` when the owning
/// record is deleted and the application is detached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: Option<ApplicationId>,
    pub user_id: Option<UserId>,
    pub vacancy_id: Option<VacancyId>,
    pub motivation: String,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
}

impl Application {
    /// The (user, vacancy) pair guarded by the one-application-per-pair constraint.
    pub fn pair(&self) -> Option<(UserId, VacancyId)> {
        Some((self.user_id?, self.vacancy_id?))
    }
}

/// Status carried by an application. Any value may be set at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Applied,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [Self::Pending, Self::Applied, Self::Rejected];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Raised when a status string does not name an [`ApplicationStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status: {0}")]
pub struct UnknownStatus(pub String);
