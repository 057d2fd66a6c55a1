//! Candidates, vacancies and the applications linking them.
//!
//! Applications are kept in a single table; users and vacancies look theirs up by id.
//! The store guarantees at most one application per (user, vacancy) pair, and the
//! services layer the friendly checks and messages on top of it.

pub mod domain;
pub mod dto;
pub mod envelope;
pub mod memory;
pub mod patch;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;
pub mod uploads;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, UnknownStatus, User, UserId, Vacancy,
    VacancyId,
};
pub use dto::{applied_order, ApplicationDto, ApplyRequest, MotivationRequest, UserDto, VacancyDto};
pub use envelope::ApiResponse;
pub use memory::InMemoryRecruitmentStore;
pub use patch::{ApplicationPatch, UserPatch, VacancyPatch};
pub use repository::{
    ApplicationRepository, AtomicWrites, RecruitmentStore, RepositoryError, UserRepository,
    VacancyRepository,
};
pub use router::{application_router, recruitment_router, user_router, vacancy_router};
pub use seed::{seed_demo_data, SeedSummary};
pub use service::{ApplicationService, ServiceError, UserService, UserUploads, VacancyService};
pub use uploads::{DiskFileStore, FileStore, UploadError, UploadKind, UploadPolicy, UploadedFile};
