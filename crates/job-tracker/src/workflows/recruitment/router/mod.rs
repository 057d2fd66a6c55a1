mod applications;
mod users;
mod vacancies;

pub use applications::application_router;
pub use users::user_router;
pub use vacancies::vacancy_router;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::{Json, Router};

use super::repository::RecruitmentStore;
use super::service::{ApplicationService, ServiceError, UserService, VacancyService};
use super::uploads::FileStore;

/// Builds the complete `/api/v1` recruitment surface over one shared store.
pub fn recruitment_router<S, F>(store: Arc<S>, files: Arc<F>, max_upload_bytes: u64) -> Router
where
    S: RecruitmentStore + 'static,
    F: FileStore + 'static,
{
    let users = Arc::new(UserService::new(Arc::clone(&store), files));
    let vacancies = Arc::new(VacancyService::new(Arc::clone(&store)));
    let applications = Arc::new(ApplicationService::new(store));

    Router::new()
        .merge(user_router(users, max_upload_bytes))
        .merge(vacancy_router(vacancies))
        .merge(application_router(applications))
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected request body");
            Err(ServiceError::invalid(format!(
                "Invalid request payload: {}",
                rejection.body_text()
            )))
        }
    }
}

pub(crate) fn path_value<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ServiceError> {
    match path {
        Ok(Path(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected path parameter");
            Err(ServiceError::invalid(format!(
                "Invalid path parameter: {}",
                rejection.body_text()
            )))
        }
    }
}
