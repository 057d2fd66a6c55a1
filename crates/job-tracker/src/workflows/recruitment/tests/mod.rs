mod common;
mod vacancies;
