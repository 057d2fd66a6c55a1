use crate::infra::recruitment_store;
use chrono::SecondsFormat;
use clap::Args;
use job_tracker::error::AppError;
use job_tracker::workflows::recruitment::{
    ApplicationDto, ApplicationService, UserRepository, UserId, VacancyId, VacancyService,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// User that applies (seeded ids are 1 to 3)
    #[arg(long, default_value_t = 1)]
    pub(crate) user: i64,
    /// Vacancy applied to (seeded ids are 1 to 3)
    #[arg(long, default_value_t = 3)]
    pub(crate) vacancy: i64,
    /// Motivation sent with the application
    #[arg(long, default_value = "I would love to build this with your team.")]
    pub(crate) motivation: String,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = recruitment_store(true)?;
    let applications = ApplicationService::new(Arc::clone(&store));
    let vacancies = VacancyService::new(Arc::clone(&store));
    let user_id = UserId(args.user);
    let vacancy_id = VacancyId(args.vacancy);

    println!("Job tracker demo");
    println!("Seeded candidates:");
    for user in store.list_users()? {
        println!(
            "  #{} {} {} ({})",
            user.id.map(|id| id.0).unwrap_or_default(),
            user.first_name,
            user.last_name,
            user.role
        );
    }
    match vacancies.list() {
        Ok(listed) => {
            println!("Seeded vacancies:");
            for vacancy in listed {
                println!(
                    "  #{} {} at {} in {} ({} application(s))",
                    vacancy.id.map(|id| id.0).unwrap_or_default(),
                    vacancy.title,
                    vacancy.company_name,
                    vacancy.location,
                    vacancy.applications.len()
                );
            }
        }
        Err(err) => println!("  Vacancies unavailable: {err}"),
    }

    println!("\nUser {user_id} applies to vacancy {vacancy_id}");
    match applications.apply(user_id, vacancy_id, &args.motivation) {
        Ok(application) => {
            let applied_at = application
                .applied_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  Accepted as application #{} with status {} at {}",
                application.id.map(|id| id.0).unwrap_or_default(),
                application.status,
                applied_at
            );
        }
        Err(err) => println!("  Application rejected: {err}"),
    }

    println!("Same user applies again");
    match applications.apply(user_id, vacancy_id, &args.motivation) {
        Ok(_) => println!("  Second application was accepted"),
        Err(err) => println!("  Second application rejected: {err}"),
    }

    match vacancies.get(vacancy_id) {
        Ok(vacancy) => {
            println!("\nApplications for {}:", vacancy.title);
            for application in &vacancy.applications {
                print_application(application);
            }
        }
        Err(err) => println!("\nVacancy lookup failed: {err}"),
    }

    Ok(())
}

fn print_application(application: &ApplicationDto) {
    let user = application
        .user_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "detached".to_string());
    println!(
        "  user {user}: {} ({})",
        application.status.as_deref().unwrap_or("PENDING"),
        application.motivation.as_deref().unwrap_or_default()
    );
}
