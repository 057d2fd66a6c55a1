use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::recruitment::domain::{
    Application, ApplicationId, ApplicationStatus, User, UserId, Vacancy, VacancyId,
};
use crate::workflows::recruitment::memory::InMemoryRecruitmentStore;
use crate::workflows::recruitment::repository::{
    ApplicationRepository, AtomicWrites, RecruitmentStore, RepositoryError, UserRepository,
    VacancyRepository,
};
use crate::workflows::recruitment::router::recruitment_router;
use crate::workflows::recruitment::seed::seed_demo_data;
use crate::workflows::recruitment::service::{ApplicationService, UserService, VacancyService};
use crate::workflows::recruitment::uploads::{
    FileStore, UploadError, UploadKind, UploadPolicy, UploadedFile,
};

pub(super) const UPLOAD_LIMIT: u64 = 1024;
pub(super) const BOUNDARY: &str = "job-tracker-test-boundary";

pub(super) fn seeded_store() -> Arc<InMemoryRecruitmentStore> {
    let store = Arc::new(InMemoryRecruitmentStore::default());
    seed_demo_data(store.as_ref()).expect("demo data seeds");
    store
}

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn user(first_name: &str) -> User {
    User {
        id: None,
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        password: "secret".to_string(),
        age: 30,
        photo: None,
        cv: None,
        role: "user".to_string(),
        enabled: true,
    }
}

pub(super) fn vacancy(title: &str) -> Vacancy {
    Vacancy {
        id: None,
        title: title.to_string(),
        company_name: "Acme".to_string(),
        description: format!("{title} role"),
        location: "Utrecht".to_string(),
        posted_at: Some(at(8)),
    }
}

pub(super) fn application(
    id: Option<i64>,
    applied_at: Option<DateTime<Utc>>,
    status: ApplicationStatus,
) -> Application {
    Application {
        id: id.map(ApplicationId),
        user_id: Some(UserId(1)),
        vacancy_id: Some(VacancyId(1)),
        motivation: "Keen to join".to_string(),
        status,
        applied_at,
    }
}

pub(super) fn application_service<S>(store: &Arc<S>) -> ApplicationService<S>
where
    S: RecruitmentStore + 'static,
{
    ApplicationService::new(Arc::clone(store))
}

pub(super) fn vacancy_service<S>(store: &Arc<S>) -> VacancyService<S>
where
    S: RecruitmentStore + 'static,
{
    VacancyService::new(Arc::clone(store))
}

pub(super) fn user_service(
    store: &Arc<InMemoryRecruitmentStore>,
) -> (
    UserService<InMemoryRecruitmentStore, MemoryFiles>,
    Arc<MemoryFiles>,
) {
    let files = Arc::new(MemoryFiles::default());
    (UserService::new(Arc::clone(store), Arc::clone(&files)), files)
}

pub(super) fn test_router<S>(store: Arc<S>) -> Router
where
    S: RecruitmentStore + 'static,
{
    recruitment_router(store, Arc::new(MemoryFiles::default()), UPLOAD_LIMIT)
}

/// File store that keeps uploads in memory and hands out predictable locations.
pub(super) struct MemoryFiles {
    policy: UploadPolicy,
    stored: Mutex<Vec<(UploadKind, String)>>,
}

impl Default for MemoryFiles {
    fn default() -> Self {
        Self {
            policy: UploadPolicy::new(UPLOAD_LIMIT),
            stored: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryFiles {
    pub(super) fn stored(&self) -> Vec<(UploadKind, String)> {
        self.stored.lock().expect("files mutex poisoned").clone()
    }
}

impl FileStore for MemoryFiles {
    fn check(&self, kind: UploadKind, file: &UploadedFile) -> Result<(), UploadError> {
        self.policy.check(kind, file)
    }

    fn store(&self, kind: UploadKind, file: &UploadedFile) -> Result<String, UploadError> {
        self.policy.check(kind, file)?;
        let location = format!("memory/{kind}/{}", file.file_name);
        self.stored
            .lock()
            .expect("files mutex poisoned")
            .push((kind, location.clone()));
        Ok(location)
    }

    fn discard(&self, location: &str) {
        self.stored
            .lock()
            .expect("files mutex poisoned")
            .retain(|(_, stored)| stored != location);
    }
}

/// Store whose every call fails as if the backing database were down.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl UserRepository for UnavailableStore {
    fn insert_user(&self, _user: User) -> Result<User, RepositoryError> {
        offline()
    }
    fn update_user(&self, _user: User) -> Result<User, RepositoryError> {
        offline()
    }
    fn fetch_user(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
        offline()
    }
    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        offline()
    }
    fn delete_user(&self, _id: UserId) -> Result<(), RepositoryError> {
        offline()
    }
}

impl VacancyRepository for UnavailableStore {
    fn insert_vacancy(&self, _vacancy: Vacancy) -> Result<Vacancy, RepositoryError> {
        offline()
    }
    fn update_vacancy(&self, _vacancy: Vacancy) -> Result<Vacancy, RepositoryError> {
        offline()
    }
    fn fetch_vacancy(&self, _id: VacancyId) -> Result<Option<Vacancy>, RepositoryError> {
        offline()
    }
    fn list_vacancies(&self) -> Result<Vec<Vacancy>, RepositoryError> {
        offline()
    }
    fn delete_vacancy(&self, _id: VacancyId) -> Result<(), RepositoryError> {
        offline()
    }
}

impl ApplicationRepository for UnavailableStore {
    fn insert_application(&self, _a: Application) -> Result<Application, RepositoryError> {
        offline()
    }
    fn update_application(&self, _a: Application) -> Result<Application, RepositoryError> {
        offline()
    }
    fn fetch_application(&self, _id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        offline()
    }
    fn list_applications(&self) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }
    fn applications_for_user(&self, _id: UserId) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }
    fn applications_for_vacancy(
        &self,
        _id: VacancyId,
    ) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }
    fn find_application(
        &self,
        _user: UserId,
        _vacancy: VacancyId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }
    fn delete_application(&self, _id: ApplicationId) -> Result<(), RepositoryError> {
        offline()
    }
}

impl AtomicWrites for UnavailableStore {
    fn insert_user_with_applications(
        &self,
        _user: User,
        _applications: Vec<Application>,
    ) -> Result<(User, Vec<Application>), RepositoryError> {
        offline()
    }
    fn insert_vacancy_with_applications(
        &self,
        _vacancy: Vacancy,
        _applications: Vec<Application>,
    ) -> Result<(Vacancy, Vec<Application>), RepositoryError> {
        offline()
    }
}

/// Seeded store where the duplicate lookup misses but the insert loses the race.
pub(super) struct RacingStore {
    pub(super) inner: InMemoryRecruitmentStore,
}

impl RacingStore {
    pub(super) fn seeded() -> Self {
        let inner = InMemoryRecruitmentStore::default();
        seed_demo_data(&inner).expect("demo data seeds");
        Self { inner }
    }
}

impl UserRepository for RacingStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        self.inner.insert_user(user)
    }
    fn update_user(&self, user: User) -> Result<User, RepositoryError> {
        self.inner.update_user(user)
    }
    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.fetch_user(id)
    }
    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.inner.list_users()
    }
    fn delete_user(&self, id: UserId) -> Result<(), RepositoryError> {
        self.inner.delete_user(id)
    }
}

impl VacancyRepository for RacingStore {
    fn insert_vacancy(&self, vacancy: Vacancy) -> Result<Vacancy, RepositoryError> {
        self.inner.insert_vacancy(vacancy)
    }
    fn update_vacancy(&self, vacancy: Vacancy) -> Result<Vacancy, RepositoryError> {
        self.inner.update_vacancy(vacancy)
    }
    fn fetch_vacancy(&self, id: VacancyId) -> Result<Option<Vacancy>, RepositoryError> {
        self.inner.fetch_vacancy(id)
    }
    fn list_vacancies(&self) -> Result<Vec<Vacancy>, RepositoryError> {
        self.inner.list_vacancies()
    }
    fn delete_vacancy(&self, id: VacancyId) -> Result<(), RepositoryError> {
        self.inner.delete_vacancy(id)
    }
}

impl ApplicationRepository for RacingStore {
    fn insert_application(&self, _a: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Conflict)
    }
    fn update_application(&self, a: Application) -> Result<Application, RepositoryError> {
        self.inner.update_application(a)
    }
    fn fetch_application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch_application(id)
    }
    fn list_applications(&self) -> Result<Vec<Application>, RepositoryError> {
        self.inner.list_applications()
    }
    fn applications_for_user(&self, id: UserId) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications_for_user(id)
    }
    fn applications_for_vacancy(&self, id: VacancyId) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications_for_vacancy(id)
    }
    fn find_application(
        &self,
        _user: UserId,
        _vacancy: VacancyId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }
    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.inner.delete_application(id)
    }
}

impl AtomicWrites for RacingStore {
    fn insert_user_with_applications(
        &self,
        user: User,
        applications: Vec<Application>,
    ) -> Result<(User, Vec<Application>), RepositoryError> {
        self.inner.insert_user_with_applications(user, applications)
    }
    fn insert_vacancy_with_applications(
        &self,
        vacancy: Vacancy,
        applications: Vec<Application>,
    ) -> Result<(Vacancy, Vec<Application>), RepositoryError> {
        self.inner
            .insert_vacancy_with_applications(vacancy, applications)
    }
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serializable body")))
        .expect("request builds")
}

pub(super) fn raw_json_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request builds")
}

pub(super) fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

/// Encodes text fields and `(field, file name, bytes)` files as `multipart/form-data`.
pub(super) fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

pub(super) fn candidate_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("firstName", "Ada"),
        ("lastName", "Lovelace"),
        ("email", "ada@example.com"),
        ("password", "engine"),
        ("age", "36"),
        ("role", "user"),
        ("enabled", "true"),
    ]
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
