pub mod candidate;
pub mod profile;
pub mod vacancy;
