use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Application, ApplicationId, User, UserId, Vacancy, VacancyId};
use super::repository::{
    ApplicationRepository, AtomicWrites, RepositoryError, UserRepository, VacancyRepository,
};

/// Process-local store keeping every table behind one lock.
///
/// Holding a single lock makes the duplicate check and the insert for an application
/// one step, and the same for detach-then-delete of users and vacancies.
#[derive(Default, Clone)]
pub struct InMemoryRecruitmentStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    vacancies: BTreeMap<VacancyId, Vacancy>,
    applications: BTreeMap<ApplicationId, Application>,
    last_user_id: i64,
    last_vacancy_id: i64,
    last_application_id: i64,
}

impl InMemoryRecruitmentStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl Tables {
    fn insert_user(&mut self, mut user: User) -> Result<User, RepositoryError> {
        if user.id.is_some() {
            return Err(RepositoryError::Conflict);
        }
        self.last_user_id += 1;
        let id = UserId(self.last_user_id);
        user.id = Some(id);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    fn insert_vacancy(&mut self, mut vacancy: Vacancy) -> Result<Vacancy, RepositoryError> {
        if vacancy.id.is_some() {
            return Err(RepositoryError::Conflict);
        }
        self.last_vacancy_id += 1;
        let id = VacancyId(self.last_vacancy_id);
        vacancy.id = Some(id);
        self.vacancies.insert(id, vacancy.clone());
        Ok(vacancy)
    }

    /// Foreign key and uniqueness checks shared by insert and update.
    fn check_constraints(&self, application: &Application) -> Result<(), RepositoryError> {
        if let Some(user) = application.user_id {
            if !self.users.contains_key(&user) {
                return Err(RepositoryError::MissingReference);
            }
        }
        if let Some(vacancy) = application.vacancy_id {
            if !self.vacancies.contains_key(&vacancy) {
                return Err(RepositoryError::MissingReference);
            }
        }
        if let Some(pair) = application.pair() {
            let taken = self
                .applications
                .values()
                .any(|existing| existing.id != application.id && existing.pair() == Some(pair));
            if taken {
                return Err(RepositoryError::Conflict);
            }
        }
        Ok(())
    }

    fn insert_application(
        &mut self,
        mut application: Application,
    ) -> Result<Application, RepositoryError> {
        if application.id.is_some() {
            return Err(RepositoryError::Conflict);
        }
        self.check_constraints(&application)?;
        self.last_application_id += 1;
        let id = ApplicationId(self.last_application_id);
        application.id = Some(id);
        self.applications.insert(id, application.clone());
        Ok(application)
    }

    fn collect_applications<F>(&self, keep: F) -> Vec<Application>
    where
        F: Fn(&Application) -> bool,
    {
        self.applications
            .values()
            .filter(|application| keep(application))
            .cloned()
            .collect()
    }
}

impl UserRepository for InMemoryRecruitmentStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        self.lock()?.insert_user(user)
    }

    fn update_user(&self, user: User) -> Result<User, RepositoryError> {
        let id = user.id.ok_or(RepositoryError::NotFound)?;
        let mut tables = self.lock()?;
        match tables.users.get_mut(&id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    fn delete_user(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if tables.users.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        for application in tables.applications.values_mut() {
            if application.user_id == Some(id) {
                application.user_id = None;
            }
        }
        Ok(())
    }
}

impl VacancyRepository for InMemoryRecruitmentStore {
    fn insert_vacancy(&self, vacancy: Vacancy) -> Result<Vacancy, RepositoryError> {
        self.lock()?.insert_vacancy(vacancy)
    }

    fn update_vacancy(&self, vacancy: Vacancy) -> Result<Vacancy, RepositoryError> {
        let id = vacancy.id.ok_or(RepositoryError::NotFound)?;
        let mut tables = self.lock()?;
        match tables.vacancies.get_mut(&id) {
            Some(stored) => {
                *stored = vacancy.clone();
                Ok(vacancy)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_vacancy(&self, id: VacancyId) -> Result<Option<Vacancy>, RepositoryError> {
        Ok(self.lock()?.vacancies.get(&id).cloned())
    }

    fn list_vacancies(&self) -> Result<Vec<Vacancy>, RepositoryError> {
        Ok(self.lock()?.vacancies.values().cloned().collect())
    }

    fn delete_vacancy(&self, id: VacancyId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if tables.vacancies.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        for application in tables.applications.values_mut() {
            if application.vacancy_id == Some(id) {
                application.vacancy_id = None;
            }
        }
        Ok(())
    }
}

impl ApplicationRepository for InMemoryRecruitmentStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        self.lock()?.insert_application(application)
    }

    fn update_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let id = application.id.ok_or(RepositoryError::NotFound)?;
        let mut tables = self.lock()?;
        if !tables.applications.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        tables.check_constraints(&application)?;
        tables.applications.insert(id, application.clone());
        Ok(application)
    }

    fn fetch_application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    fn list_applications(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.lock()?.applications.values().cloned().collect())
    }

    fn applications_for_user(&self, id: UserId) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .lock()?
            .collect_applications(|application| application.user_id == Some(id)))
    }

    fn applications_for_vacancy(
        &self,
        id: VacancyId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .lock()?
            .collect_applications(|application| application.vacancy_id == Some(id)))
    }

    fn find_application(
        &self,
        user: UserId,
        vacancy: VacancyId,
    ) -> Result<Option<Application>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .values()
            .find(|application| application.pair() == Some((user, vacancy)))
            .cloned())
    }

    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        match self.lock()?.applications.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl AtomicWrites for InMemoryRecruitmentStore {
    fn insert_user_with_applications(
        &self,
        user: User,
        applications: Vec<Application>,
    ) -> Result<(User, Vec<Application>), RepositoryError> {
        let mut tables = self.lock()?;
        let snapshot = (tables.last_user_id, tables.last_application_id);
        let user = tables.insert_user(user)?;

        let mut stored = Vec::with_capacity(applications.len());
        for mut application in applications {
            application.user_id = user.id;
            match tables.insert_application(application) {
                Ok(application) => stored.push(application),
                Err(err) => {
                    rollback_user(&mut tables, &user, &stored, snapshot);
                    return Err(err);
                }
            }
        }
        Ok((user, stored))
    }

    fn insert_vacancy_with_applications(
        &self,
        vacancy: Vacancy,
        applications: Vec<Application>,
    ) -> Result<(Vacancy, Vec<Application>), RepositoryError> {
        let mut tables = self.lock()?;
        let snapshot = (tables.last_vacancy_id, tables.last_application_id);
        let vacancy = tables.insert_vacancy(vacancy)?;

        let mut stored = Vec::with_capacity(applications.len());
        for mut application in applications {
            application.vacancy_id = vacancy.id;
            match tables.insert_application(application) {
                Ok(application) => stored.push(application),
                Err(err) => {
                    rollback_vacancy(&mut tables, &vacancy, &stored, snapshot);
                    return Err(err);
                }
            }
        }
        Ok((vacancy, stored))
    }
}

fn rollback_user(tables: &mut Tables, user: &User, stored: &[Application], snapshot: (i64, i64)) {
    for application in stored.iter().filter_map(|application| application.id) {
        tables.applications.remove(&application);
    }
    if let Some(id) = user.id {
        tables.users.remove(&id);
    }
    (tables.last_user_id, tables.last_application_id) = snapshot;
}

fn rollback_vacancy(
    tables: &mut Tables,
    vacancy: &Vacancy,
    stored: &[Application],
    snapshot: (i64, i64),
) {
    for application in stored.iter().filter_map(|application| application.id) {
        tables.applications.remove(&application);
    }
    if let Some(id) = vacancy.id {
        tables.vacancies.remove(&id);
    }
    (tables.last_vacancy_id, tables.last_application_id) = snapshot;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::recruitment::domain::ApplicationStatus;

    fn user(name: &str) -> User {
        User {
            id: None,
            first_name: name.to_string(),
            last_name: "Tester".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "secret".to_string(),
            age: 30,
            photo: None,
            cv: None,
            role: "user".to_string(),
            enabled: true,
        }
    }

    fn vacancy(title: &str) -> Vacancy {
        Vacancy {
            id: None,
            title: title.to_string(),
            company_name: "IBM".to_string(),
            description: "Build things".to_string(),
            location: "Amsterdam".to_string(),
            posted_at: None,
        }
    }

    fn application(user: Option<UserId>, vacancy: Option<VacancyId>) -> Application {
        Application {
            id: None,
            user_id: user,
            vacancy_id: vacancy,
            motivation: "Hire me".to_string(),
            status: ApplicationStatus::Pending,
            applied_at: None,
        }
    }

    #[test]
    fn assigns_increasing_ids_per_table() {
        let store = InMemoryRecruitmentStore::default();
        let first = store.insert_user(user("Andre")).expect("insert");
        let second = store.insert_user(user("John")).expect("insert");
        let posting = store.insert_vacancy(vacancy("Java Developer")).expect("insert");

        assert_eq!(first.id, Some(UserId(1)));
        assert_eq!(second.id, Some(UserId(2)));
        assert_eq!(posting.id, Some(VacancyId(1)));
    }

    #[test]
    fn rejects_second_application_for_same_pair() {
        let store = InMemoryRecruitmentStore::default();
        let user = store.insert_user(user("Andre")).expect("insert").id;
        let vacancy = store.insert_vacancy(vacancy("Java")).expect("insert").id;

        store
            .insert_application(application(user, vacancy))
            .expect("first application");
        let err = store
            .insert_application(application(user, vacancy))
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict));
        assert_eq!(store.list_applications().expect("list").len(), 1);
    }

    #[test]
    fn update_cannot_move_application_onto_taken_pair() {
        let store = InMemoryRecruitmentStore::default();
        let user = store.insert_user(user("Andre")).expect("insert").id;
        let java = store.insert_vacancy(vacancy("Java")).expect("insert").id;
        let rust = store.insert_vacancy(vacancy("Rust")).expect("insert").id;
        store
            .insert_application(application(user, java))
            .expect("java application");
        let mut moved = store
            .insert_application(application(user, rust))
            .expect("rust application");

        moved.vacancy_id = java;
        assert!(matches!(
            store.update_application(moved.clone()),
            Err(RepositoryError::Conflict)
        ));

        moved.motivation = "Still keen".to_string();
        moved.vacancy_id = rust;
        let saved = store.update_application(moved).expect("self update allowed");
        assert_eq!(saved.motivation, "Still keen");
    }

    #[test]
    fn rejects_references_to_missing_records() {
        let store = InMemoryRecruitmentStore::default();
        let err = store
            .insert_application(application(Some(UserId(9)), Some(VacancyId(9))))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingReference));
    }

    #[test]
    fn deleting_user_detaches_applications() {
        let store = InMemoryRecruitmentStore::default();
        let user = store.insert_user(user("Andre")).expect("insert").id;
        let vacancy = store.insert_vacancy(vacancy("Java")).expect("insert").id;
        let stored = store
            .insert_application(application(user, vacancy))
            .expect("application");

        store.delete_user(user.expect("id")).expect("delete");

        let detached = store
            .fetch_application(stored.id.expect("id"))
            .expect("fetch")
            .expect("still present");
        assert_eq!(detached.user_id, None);
        assert_eq!(detached.vacancy_id, vacancy);
        assert!(matches!(
            store.delete_user(UserId(1)),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn deleting_vacancy_detaches_applications() {
        let store = InMemoryRecruitmentStore::default();
        let user = store.insert_user(user("Andre")).expect("insert").id;
        let vacancy = store.insert_vacancy(vacancy("Java")).expect("insert").id;
        store
            .insert_application(application(user, vacancy))
            .expect("application");

        store.delete_vacancy(vacancy.expect("id")).expect("delete");

        let remaining = store
            .applications_for_user(user.expect("id"))
            .expect("lookup");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].vacancy_id, None);
    }

    #[test]
    fn failed_nested_insert_leaves_no_trace() {
        let store = InMemoryRecruitmentStore::default();
        let java = store.insert_vacancy(vacancy("Java")).expect("insert").id;

        let err = store
            .insert_user_with_applications(
                user("Andre"),
                vec![application(None, java), application(None, java)],
            )
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict));
        assert!(store.list_users().expect("list").is_empty());
        assert!(store.list_applications().expect("list").is_empty());

        let (user, applications) = store
            .insert_user_with_applications(user("Andre"), vec![application(None, java)])
            .expect("retry succeeds");
        assert_eq!(user.id, Some(UserId(1)));
        assert_eq!(applications[0].id, Some(ApplicationId(1)));
        assert_eq!(applications[0].user_id, Some(UserId(1)));
    }
}
