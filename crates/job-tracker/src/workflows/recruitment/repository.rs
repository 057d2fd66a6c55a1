use super::domain::{Application, ApplicationId, User, UserId, Vacancy, VacancyId};

/// Storage abstraction for user records.
pub trait UserRepository: Send + Sync {
    /// Stores a new user and assigns its id. Fails with `Conflict` if an id is already set.
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<User, RepositoryError>;
    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
    /// Detaches the user's applications and removes the user in one step.
    fn delete_user(&self, id: UserId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for vacancy records.
pub trait VacancyRepository: Send + Sync {
    fn insert_vacancy(&self, vacancy: Vacancy) -> Result<Vacancy, RepositoryError>;
    fn update_vacancy(&self, vacancy: Vacancy) -> Result<Vacancy, RepositoryError>;
    fn fetch_vacancy(&self, id: VacancyId) -> Result<Option<Vacancy>, RepositoryError>;
    fn list_vacancies(&self) -> Result<Vec<Vacancy>, RepositoryError>;
    /// Detaches the vacancy's applications and removes the vacancy in one step.
    fn delete_vacancy(&self, id: VacancyId) -> Result<(), RepositoryError>;
}

/// Single authoritative table of applications.
///
/// Implementations enforce at most one application per (user, vacancy) pair on both
/// insert and update and report violations as [`RepositoryError::Conflict`]. References
/// to users or vacancies that do not exist fail with [`RepositoryError::MissingReference`].
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn update_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn list_applications(&self) -> Result<Vec<Application>, RepositoryError>;
    fn applications_for_user(&self, id: UserId) -> Result<Vec<Application>, RepositoryError>;
    fn applications_for_vacancy(&self, id: VacancyId)
        -> Result<Vec<Application>, RepositoryError>;
    fn find_application(
        &self,
        user: UserId,
        vacancy: VacancyId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError>;
}

/// Writes that must land together or not at all.
pub trait AtomicWrites: Send + Sync {
    /// Inserts the user, then each application linked to the new user id.
    fn insert_user_with_applications(
        &self,
        user: User,
        applications: Vec<Application>,
    ) -> Result<(User, Vec<Application>), RepositoryError>;

    /// Inserts the vacancy, then each application linked to the new vacancy id.
    fn insert_vacancy_with_applications(
        &self,
        vacancy: Vacancy,
        applications: Vec<Application>,
    ) -> Result<(Vacancy, Vec<Application>), RepositoryError>;
}

/// Everything the recruitment services need from a backing store.
pub trait RecruitmentStore:
    UserRepository + VacancyRepository + ApplicationRepository + AtomicWrites
{
}

impl<T> RecruitmentStore for T where
    T: UserRepository + VacancyRepository + ApplicationRepository + AtomicWrites
{
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("referenced record does not exist")]
    MissingReference,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
