use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use super::{is_blank, ServiceError, ALREADY_APPLIED};
use crate::workflows::recruitment::domain::{Application, User, UserId};
use crate::workflows::recruitment::dto::{ApplicationDto, UserDto};
use crate::workflows::recruitment::patch::UserPatch;
use crate::workflows::recruitment::repository::RecruitmentStore;
use crate::workflows::recruitment::uploads::{FileStore, UploadKind, UploadedFile};

/// Attachments that accompany a user form.
#[derive(Debug, Clone, Default)]
pub struct UserUploads {
    pub photo: Option<UploadedFile>,
    pub cv: Option<UploadedFile>,
}

/// Locations written for one request.
#[derive(Debug, Default)]
struct StoredFiles {
    photo: Option<String>,
    cv: Option<String>,
}

/// User CRUD. Photo and CV uploads go through the configured [`FileStore`].
pub struct UserService<S, F> {
    store: Arc<S>,
    files: Arc<F>,
}

impl<S, F> UserService<S, F>
where
    S: RecruitmentStore + 'static,
    F: FileStore + 'static,
{
    pub fn new(store: Arc<S>, files: Arc<F>) -> Self {
        Self { store, files }
    }

    pub fn list(&self) -> Result<Vec<UserDto>, ServiceError> {
        self.store
            .list_users()?
            .iter()
            .map(|user| self.render(user))
            .collect()
    }

    pub fn get(&self, id: UserId) -> Result<UserDto, ServiceError> {
        let user = self.require_user(id)?;
        self.render(&user)
    }

    /// Creates a user with a mandatory photo, an optional CV and optional nested
    /// applications. The user and its applications are stored together or not at all.
    pub fn create(&self, mut dto: UserDto, uploads: UserUploads) -> Result<UserDto, ServiceError> {
        if dto.id.is_some() {
            return Err(ServiceError::invalid("New users must not carry an id"));
        }
        if uploads.photo.is_none() {
            return Err(ServiceError::invalid("Photo is required"));
        }
        dto.validate()?;

        let nested = std::mem::take(&mut dto.applications);
        let applications = self.nested_applications(nested)?;
        self.check_uploads(&uploads)?;

        let stored_files = self.store_uploads(&uploads)?;
        let mut user = dto.into_entity();
        user.photo = stored_files.photo.clone();
        user.cv = stored_files.cv.clone();

        let (stored, applications) = match self
            .store
            .insert_user_with_applications(user, applications)
        {
            Ok(inserted) => inserted,
            Err(err) => {
                self.discard(stored_files);
                return Err(err.into());
            }
        };
        tracing::info!(
            user = ?stored.id,
            applications = applications.len(),
            "user created"
        );
        Ok(UserDto::from_entity(&stored, applications))
    }

    /// Overwrites the fields present in `patch`. New files replace the stored locations.
    pub fn update(
        &self,
        id: UserId,
        mut patch: UserPatch,
        uploads: UserUploads,
    ) -> Result<UserDto, ServiceError> {
        patch.validate()?;
        let mut user = self.require_user(id)?;
        self.check_uploads(&uploads)?;

        let stored_files = self.store_uploads(&uploads)?;
        if stored_files.photo.is_some() {
            patch.photo = stored_files.photo.clone();
        }
        if stored_files.cv.is_some() {
            patch.cv = stored_files.cv.clone();
        }
        patch.apply_to(&mut user);

        let stored = match self.store.update_user(user) {
            Ok(stored) => stored,
            Err(err) => {
                self.discard(stored_files);
                return Err(ServiceError::from_store(err, "User", id));
            }
        };
        tracing::info!(user = %id, "user updated");
        self.render(&stored)
    }

    /// Removes the user. Its applications stay in place without an owner.
    pub fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        self.store
            .delete_user(id)
            .map_err(|err| ServiceError::from_store(err, "User", id))?;
        tracing::info!(user = %id, "user deleted");
        Ok(())
    }

    fn render(&self, user: &User) -> Result<UserDto, ServiceError> {
        let applications = match user.id {
            Some(id) => self.store.applications_for_user(id)?,
            None => Vec::new(),
        };
        Ok(UserDto::from_entity(user, applications))
    }

    fn check_uploads(&self, uploads: &UserUploads) -> Result<(), ServiceError> {
        if let Some(photo) = &uploads.photo {
            self.files.check(UploadKind::Photo, photo)?;
        }
        if let Some(cv) = &uploads.cv {
            self.files.check(UploadKind::Cv, cv)?;
        }
        Ok(())
    }

    /// Writes both attachments, or neither when the second write fails.
    fn store_uploads(&self, uploads: &UserUploads) -> Result<StoredFiles, ServiceError> {
        let mut stored_files = StoredFiles::default();
        if let Some(photo) = &uploads.photo {
            stored_files.photo = Some(self.files.store(UploadKind::Photo, photo)?);
        }
        if let Some(cv) = &uploads.cv {
            match self.files.store(UploadKind::Cv, cv) {
                Ok(location) => stored_files.cv = Some(location),
                Err(err) => {
                    self.discard(stored_files);
                    return Err(err.into());
                }
            }
        }
        Ok(stored_files)
    }

    fn discard(&self, stored_files: StoredFiles) {
        for location in stored_files.photo.iter().chain(stored_files.cv.iter()) {
            self.files.discard(location);
        }
    }

    fn require_user(&self, id: UserId) -> Result<User, ServiceError> {
        self.store
            .fetch_user(id)?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Checks nested applications before anything is written: each one names an existing
    /// vacancy once, carries a motivation, and has a known status.
    fn nested_applications(
        &self,
        nested: Vec<ApplicationDto>,
    ) -> Result<Vec<Application>, ServiceError> {
        let mut seen = BTreeSet::new();
        let mut applications = Vec::with_capacity(nested.len());

        for dto in nested {
            let Some(vacancy_id) = dto.vacancy_id else {
                return Err(ServiceError::invalid(
                    "Nested applications need a vacancyId",
                ));
            };
            if dto.motivation.as_deref().map_or(true, is_blank) {
                return Err(ServiceError::invalid("Invalid motivation"));
            }
            if self.store.fetch_vacancy(vacancy_id)?.is_none() {
                return Err(ServiceError::not_found("Vacancy", vacancy_id));
            }
            if !seen.insert(vacancy_id) {
                return Err(ServiceError::Conflict(ALREADY_APPLIED.to_string()));
            }

            let mut application = dto.into_entity()?;
            application.id = None;
            application.user_id = None;
            if application.applied_at.is_none() {
                application.applied_at = Some(Utc::now());
            }
            applications.push(application);
        }

        Ok(applications)
    }
}
