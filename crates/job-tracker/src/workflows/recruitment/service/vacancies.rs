use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use super::{is_blank, ServiceError, ALREADY_APPLIED};
use crate::workflows::recruitment::domain::{Application, Vacancy, VacancyId};
use crate::workflows::recruitment::dto::{ApplicationDto, VacancyDto};
use crate::workflows::recruitment::patch::VacancyPatch;
use crate::workflows::recruitment::repository::RecruitmentStore;

pub struct VacancyService<S> {
    store: Arc<S>,
}

impl<S> VacancyService<S>
where
    S: RecruitmentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<VacancyDto>, ServiceError> {
        self.store
            .list_vacancies()?
            .iter()
            .map(|vacancy| self.render(vacancy))
            .collect()
    }

    pub fn get(&self, id: VacancyId) -> Result<VacancyDto, ServiceError> {
        let vacancy = self.require_vacancy(id)?;
        self.render(&vacancy)
    }

    /// Stores a vacancy together with any nested applications. `postedAt` defaults to now.
    pub fn create(&self, mut dto: VacancyDto) -> Result<VacancyDto, ServiceError> {
        if dto.id.is_some() {
            return Err(ServiceError::invalid("New vacancies must not carry an id"));
        }
        dto.validate()?;

        let nested = std::mem::take(&mut dto.applications);
        let applications = self.nested_applications(nested)?;

        let mut vacancy = dto.into_entity();
        if vacancy.posted_at.is_none() {
            vacancy.posted_at = Some(Utc::now());
        }

        let (stored, applications) = self
            .store
            .insert_vacancy_with_applications(vacancy, applications)?;
        tracing::info!(
            vacancy = ?stored.id,
            title = %stored.title,
            applications = applications.len(),
            "vacancy created"
        );
        Ok(VacancyDto::from_entity(&stored, applications))
    }

    pub fn update(&self, id: VacancyId, patch: VacancyPatch) -> Result<VacancyDto, ServiceError> {
        patch.validate()?;
        let mut vacancy = self.require_vacancy(id)?;
        patch.apply_to(&mut vacancy);

        let stored = self
            .store
            .update_vacancy(vacancy)
            .map_err(|err| ServiceError::from_store(err, "Vacancy", id))?;
        tracing::info!(vacancy = %id, "vacancy updated");
        self.render(&stored)
    }

    /// Removes the vacancy. Its applications stay in place without a vacancy.
    pub fn delete(&self, id: VacancyId) -> Result<(), ServiceError> {
        self.store
            .delete_vacancy(id)
            .map_err(|err| ServiceError::from_store(err, "Vacancy", id))?;
        tracing::info!(vacancy = %id, "vacancy deleted");
        Ok(())
    }

    fn render(&self, vacancy: &Vacancy) -> Result<VacancyDto, ServiceError> {
        let applications = match vacancy.id {
            Some(id) => self.store.applications_for_vacancy(id)?,
            None => Vec::new(),
        };
        Ok(VacancyDto::from_entity(vacancy, applications))
    }

    fn require_vacancy(&self, id: VacancyId) -> Result<Vacancy, ServiceError> {
        self.store
            .fetch_vacancy(id)?
            .ok_or_else(|| ServiceError::not_found("Vacancy", id))
    }

    fn nested_applications(
        &self,
        nested: Vec<ApplicationDto>,
    ) -> Result<Vec<Application>, ServiceError> {
        let mut seen = BTreeSet::new();
        let mut applications = Vec::with_capacity(nested.len());

        for dto in nested {
            let Some(user_id) = dto.user_id else {
                return Err(ServiceError::invalid("Nested applications need a userId"));
            };
            if dto.motivation.as_deref().map_or(true, is_blank) {
                return Err(ServiceError::invalid("Invalid motivation"));
            }
            if self.store.fetch_user(user_id)?.is_none() {
                return Err(ServiceError::not_found("User", user_id));
            }
            if !seen.insert(user_id) {
                return Err(ServiceError::Conflict(ALREADY_APPLIED.to_string()));
            }

            let mut application = dto.into_entity()?;
            application.id = None;
            application.vacancy_id = None;
            if application.applied_at.is_none() {
                application.applied_at = Some(Utc::now());
            }
            applications.push(application);
        }

        Ok(applications)
    }
}
