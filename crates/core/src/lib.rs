//! Domain layer for taskforge: identifiers, errors, task enumerations,
//! form validation, the task-generation prompt/response contract and the
//! Kanban board view model.
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod generation;
pub mod kanban;
pub mod task;
pub mod types;
pub mod validation;
