use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{json_body, path_value};
use crate::workflows::recruitment::domain::{ApplicationId, UserId, VacancyId};
use crate::workflows::recruitment::dto::{ApplicationDto, ApplyRequest, MotivationRequest};
use crate::workflows::recruitment::envelope::ApiResponse;
use crate::workflows::recruitment::patch::ApplicationPatch;
use crate::workflows::recruitment::repository::RecruitmentStore;
use crate::workflows::recruitment::service::{ApplicationService, ServiceError};

type Service<S> = State<Arc<ApplicationService<S>>>;

const SUBMITTED: &str = "Application submitted successfully";

pub fn application_router<S>(service: Arc<ApplicationService<S>>) -> Router
where
    S: RecruitmentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route("/api/v1/applications/apply", post(apply_handler::<S>))
        .route(
            "/api/v1/applications/users/:user_id/vacancies/:vacancy_id/apply",
            post(apply_by_path_handler::<S>),
        )
        .route(
            "/api/v1/applications/:id",
            get(get_handler::<S>)
                .put(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(service)
}

async fn list_handler<S>(
    State(service): Service<S>,
) -> Result<ApiResponse<Vec<ApplicationDto>>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    Ok(ApiResponse::ok("Find All Success", service.list()?))
}

async fn get_handler<S>(
    State(service): Service<S>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<ApplicationDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    let id = ApplicationId(path_value(id)?);
    Ok(ApiResponse::ok("Find One Success", service.get(id)?))
}

async fn create_handler<S>(
    State(service): Service<S>,
    payload: Result<Json<ApplicationDto>, JsonRejection>,
) -> Result<ApiResponse<ApplicationDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    let created = service.create(json_body(payload)?)?;
    Ok(ApiResponse::created("Application created successfully", created))
}

async fn update_handler<S>(
    State(service): Service<S>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ApplicationPatch>, JsonRejection>,
) -> Result<ApiResponse<ApplicationDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    let id = ApplicationId(path_value(id)?);
    let updated = service.update(id, json_body(payload)?)?;
    Ok(ApiResponse::ok("Update Success", updated))
}

async fn delete_handler<S>(
    State(service): Service<S>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<()>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    service.delete(ApplicationId(path_value(id)?))?;
    Ok(ApiResponse::message("Delete Success"))
}

async fn apply_by_path_handler<S>(
    State(service): Service<S>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<MotivationRequest>, JsonRejection>,
) -> Result<ApiResponse<ApplicationDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    let (user_id, vacancy_id) = path_value(ids)?;
    let motivation = json_body(payload)?.motivation.unwrap_or_default();
    let application = service.apply(UserId(user_id), VacancyId(vacancy_id), &motivation)?;
    Ok(ApiResponse::created(SUBMITTED, ApplicationDto::from(&application)))
}

async fn apply_handler<S>(
    State(service): Service<S>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<ApiResponse<ApplicationDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    let request = json_body(payload)?;
    let motivation = request.motivation.unwrap_or_default();
    let application = service.apply(request.user_id, request.vacancy_id, &motivation)?;
    Ok(ApiResponse::created(SUBMITTED, ApplicationDto::from(&application)))
}
