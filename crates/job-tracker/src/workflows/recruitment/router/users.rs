use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::rejection::PathRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::routing::get;
use axum::Router;

use super::path_value;
use crate::workflows::recruitment::domain::UserId;
use crate::workflows::recruitment::dto::{ApplicationDto, UserDto};
use crate::workflows::recruitment::envelope::ApiResponse;
use crate::workflows::recruitment::patch::UserPatch;
use crate::workflows::recruitment::repository::RecruitmentStore;
use crate::workflows::recruitment::service::{ServiceError, UserService, UserUploads};
use crate::workflows::recruitment::uploads::{FileStore, UploadedFile};

type Service<S, F> = State<Arc<UserService<S, F>>>;

/// Headroom for the text fields sent next to the two files.
const FORM_FIELD_ALLOWANCE: u64 = 64 * 1024;

/// User endpoints. Create and update take `multipart/form-data` so photo and CV can ride
/// along with the scalar fields.
pub fn user_router<S, F>(service: Arc<UserService<S, F>>, max_upload_bytes: u64) -> Router
where
    S: RecruitmentStore + 'static,
    F: FileStore + 'static,
{
    let body_limit = max_upload_bytes
        .saturating_mul(2)
        .saturating_add(FORM_FIELD_ALLOWANCE);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/api/v1/users",
            get(list_handler::<S, F>).post(create_handler::<S, F>),
        )
        .route(
            "/api/v1/users/:id",
            get(get_handler::<S, F>)
                .put(update_handler::<S, F>)
                .delete(delete_handler::<S, F>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

async fn list_handler<S, F>(
    State(service): Service<S, F>,
) -> Result<ApiResponse<Vec<UserDto>>, ServiceError>
where
    S: RecruitmentStore + 'static,
    F: FileStore + 'static,
{
    Ok(ApiResponse::ok("Find All Success", service.list()?))
}

async fn get_handler<S, F>(
    State(service): Service<S, F>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<UserDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
    F: FileStore + 'static,
{
    let id = UserId(path_value(id)?);
    Ok(ApiResponse::ok("Find One Success", service.get(id)?))
}

async fn create_handler<S, F>(
    State(service): Service<S, F>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<UserDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
    F: FileStore + 'static,
{
    let form = UserForm::read(multipart).await?;
    let dto = form.new_user()?;
    let created = service.create(dto, form.uploads)?;
    Ok(ApiResponse::created("User created successfully", created))
}

async fn update_handler<S, F>(
    State(service): Service<S, F>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<UserDto>, ServiceError>
where
    S: RecruitmentStore + 'static,
    F: FileStore + 'static,
{
    let id = UserId(path_value(id)?);
    let form = UserForm::read(multipart).await?;
    let patch = form.patch()?;
    let updated = service.update(id, patch, form.uploads)?;
    Ok(ApiResponse::ok("Update Success", updated))
}

async fn delete_handler<S, F>(
    State(service): Service<S, F>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<()>, ServiceError>
where
    S: RecruitmentStore + 'static,
    F: FileStore + 'static,
{
    service.delete(UserId(path_value(id)?))?;
    Ok(ApiResponse::message("Delete Success"))
}

/// Text fields and files collected from a user form.
#[derive(Debug, Default)]
struct UserForm {
    fields: HashMap<String, String>,
    uploads: UserUploads,
}

impl UserForm {
    async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ServiceError> {
        let mut multipart = multipart.map_err(|rejection| {
            ServiceError::invalid(format!("Invalid upload: {}", rejection.body_text()))
        })?;

        let mut form = UserForm::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "photo" | "cv" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    // Browsers submit an empty part when no file was chosen.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    let file = UploadedFile::new(file_name, bytes.to_vec());
                    if name == "photo" {
                        form.uploads.photo = Some(file);
                    } else {
                        form.uploads.cv = Some(file);
                    }
                }
                _ => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    fn new_user(&self) -> Result<UserDto, ServiceError> {
        let applications = match self.fields.get("applications") {
            Some(raw) if !raw.trim().is_empty() => parse_applications(raw)?,
            _ => Vec::new(),
        };

        Ok(UserDto {
            id: None,
            first_name: self.required("firstName")?.to_string(),
            last_name: self.required("lastName")?.to_string(),
            email: self.required("email")?.to_string(),
            password: self.required("password")?.to_string(),
            age: parse_field("age", self.required("age")?)?,
            photo: None,
            cv: None,
            role: self.required("role")?.to_string(),
            enabled: parse_field("enabled", self.required("enabled")?)?,
            applications,
        })
    }

    fn patch(&self) -> Result<UserPatch, ServiceError> {
        Ok(UserPatch {
            first_name: self.optional("firstName"),
            last_name: self.optional("lastName"),
            email: self.optional("email"),
            password: self.optional("password"),
            age: self
                .fields
                .get("age")
                .map(|raw| parse_field("age", raw))
                .transpose()?,
            photo: None,
            cv: None,
            role: self.optional("role"),
            enabled: self
                .fields
                .get("enabled")
                .map(|raw| parse_field("enabled", raw))
                .transpose()?,
        })
    }

    fn required(&self, name: &str) -> Result<&str, ServiceError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ServiceError::invalid(format!("Missing request parameter: {name}")))
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> Result<T, ServiceError> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::invalid(format!("Invalid value for {name}: {raw}")))
}

fn parse_applications(raw: &str) -> Result<Vec<ApplicationDto>, ServiceError> {
    serde_json::from_str(raw).map_err(|err| {
        tracing::debug!(error = %err, "rejected nested applications");
        ServiceError::invalid("Invalid applications payload")
    })
}

fn multipart_error(err: MultipartError) -> ServiceError {
    ServiceError::invalid(format!("Invalid upload: {}", err.body_text()))
}
