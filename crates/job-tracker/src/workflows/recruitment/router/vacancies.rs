use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use super::{json_body, path_value};
use crate::workflows::recruitment::domain::VacancyId;
use crate::workflows::recruitment::dto::VacancyDto;
use crate::workflows::recruitment::envelope::ApiResponse;
use crate::workflows::recruitment::patch::VacancyPatch;
use crate::workflows::recruitment::repository::RecruitmentStore;
use crate::workflows::recruitment::service::{ServiceError, VacancyService};

type Service<S> = State<Arc<VacancyService<S>>>;

pub fn vacancy_router<S>(service: Arc<VacancyService<S>>) -> Router
where
    S: RecruitmentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/vacancies",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/vacancies/:id",
            get(get_handler::<S>)
                .put(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(service)
}

async fn list_handler<S>(
    State(service): Service<S>,
) -> Result<ApiResponse<Vec<VacancyDto>>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    Ok(ApiResponse::ok("Find All Success", service.list()?))
}

async fn get_handler<S>(
    State(service): Service<S>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<VacancyDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    let id = VacancyId(path_value(id)?);
    Ok(ApiResponse::ok("Find One Success", service.get(id)?))
}

async fn create_handler<S>(
    State(service): Service<S>,
    payload: Result<Json<VacancyDto>, JsonRejection>,
) -> Result<ApiResponse<VacancyDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    let created = service.create(json_body(payload)?)?;
    Ok(ApiResponse::created("Vacancy created successfully", created))
}

async fn update_handler<S>(
    State(service): Service<S>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<VacancyPatch>, JsonRejection>,
) -> Result<ApiResponse<VacancyDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
{
    let id = VacancyId(path_value(id)?);
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
    service.delete(VacancyId(path_value(id)?))?;
    Ok(ApiResponse::message("Delete Success"))
}
