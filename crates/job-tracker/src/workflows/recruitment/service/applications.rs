use std::sync::Arc;

use chrono::Utc;

use super::{is_blank, ServiceError, ALREADY_APPLIED};
use crate::workflows::recruitment::domain::{
    Application, ApplicationId, ApplicationStatus, User, UserId, Vacancy, VacancyId,
};
use crate::workflows::recruitment::dto::ApplicationDto;
use crate::workflows::recruitment::patch::ApplicationPatch;
use crate::workflows::recruitment::repository::RecruitmentStore;

/// CRUD over the application table plus the apply workflow.
pub struct ApplicationService<S> {
    store: Arc<S>,
}

impl<S> ApplicationService<S>
where
    S: RecruitmentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<ApplicationDto>, ServiceError> {
        let applications = self.store.list_applications()?;
        Ok(applications.iter().map(ApplicationDto::from).collect())
    }

    pub fn get(&self, id: ApplicationId) -> Result<ApplicationDto, ServiceError> {
        let application = self.require_application(id)?;
        Ok(ApplicationDto::from(&application))
    }

    /// Stores an application submitted as a full record. Both referenced records must exist.
    pub fn create(&self, dto: ApplicationDto) -> Result<ApplicationDto, ServiceError> {
        if dto.id.is_some() {
            return Err(ServiceError::invalid("New applications must not carry an id"));
        }
        let (Some(user_id), Some(vacancy_id)) = (dto.user_id, dto.vacancy_id) else {
            return Err(ServiceError::invalid(
                "An application needs both a userId and a vacancyId",
            ));
        };
        if dto.motivation.as_deref().map_or(true, is_blank) {
            return Err(ServiceError::invalid("Invalid motivation"));
        }

        self.require_user(user_id)?;
        self.require_vacancy(vacancy_id)?;

        let mut application = dto.into_entity()?;
        if application.applied_at.is_none() {
            application.applied_at = Some(Utc::now());
        }

        let stored = self.store.insert_application(application)?;
        tracing::info!(
            application = ?stored.id,
            user = %user_id,
            vacancy = %vacancy_id,
            "application created"
        );
        Ok(ApplicationDto::from(&stored))
    }

    pub fn update(
        &self,
        id: ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<ApplicationDto, ServiceError> {
        if patch.motivation.as_deref().is_some_and(is_blank) {
            return Err(ServiceError::invalid("Invalid motivation"));
        }

        let mut application = self.require_application(id)?;
        patch.apply_to(&mut application)?;

        let stored = self
            .store
            .update_application(application)
            .map_err(|err| ServiceError::from_store(err, "Application", id))?;
        tracing::info!(application = %id, "application updated");
        Ok(ApplicationDto::from(&stored))
    }

    pub fn delete(&self, id: ApplicationId) -> Result<(), ServiceError> {
        self.store
            .delete_application(id)
            .map_err(|err| ServiceError::from_store(err, "Application", id))?;
        tracing::info!(application = %id, "application deleted");
        Ok(())
    }

    /// Registers a `PENDING` application of `user_id` for `vacancy_id`, stamped with the
    /// current time. A user may apply to a given vacancy once.
    pub fn apply(
        &self,
        user_id: UserId,
        vacancy_id: VacancyId,
        motivation: &str,
    ) -> Result<Application, ServiceError> {
        if is_blank(motivation) {
            return Err(ServiceError::invalid("Invalid motivation"));
        }

        let user = self.require_user(user_id)?;
        let vacancy = self.require_vacancy(vacancy_id)?;

        if self.store.find_application(user_id, vacancy_id)?.is_some() {
            tracing::warn!(user = %user_id, vacancy = %vacancy_id, "duplicate application rejected");
            return Err(ServiceError::Conflict(ALREADY_APPLIED.to_string()));
        }

        let application = Application {
            id: None,
            user_id: user.id,
            vacancy_id: vacancy.id,
            motivation: motivation.to_string(),
            status: ApplicationStatus::Pending,
            applied_at: Some(Utc::now()),
        };

        let stored = self.store.insert_application(application)?;
        tracing::info!(
            application = ?stored.id,
            user = %user_id,
            vacancy = %vacancy_id,
            "application submitted"
        );
        Ok(stored)
    }

    fn require_application(&self, id: ApplicationId) -> Result<Application, ServiceError> {
        self.store
            .fetch_application(id)?
            .ok_or_else(|| ServiceError::not_found("Application", id))
    }

    fn require_user(&self, id: UserId) -> Result<User, ServiceError> {
        self.store
            .fetch_user(id)?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    fn require_vacancy(&self, id: VacancyId) -> Result<Vacancy, ServiceError> {
        self.store
            .fetch_vacancy(id)?
            .ok_or_else(|| ServiceError::not_found("Vacancy", id))
    }
}
