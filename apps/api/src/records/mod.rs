// Persistence for profiles, vacancies and candidates, plus the HTTP handlers
// that expose them. All queries run against the single SQLite file.

pub mod candidates;
pub mod handlers;
pub mod profiles;
pub mod stats;
pub mod vacancies;
