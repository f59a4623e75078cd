pub mod auth;
pub mod generation;
pub mod project;
pub mod task;
