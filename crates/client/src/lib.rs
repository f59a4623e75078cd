//! Client-side application layer for taskforge.
//!
//! Views talk to the server through the service traits in [`services`],
//! implemented over HTTP by [`api::ApiClient`]. Shared state lives in
//! explicit containers passed to whoever needs them:
//!
//! - [`store::ProjectStore`] -- the selected project, one value for every view.
//! - [`notice::NoticeBus`] -- transient success/error notices.
//! - [`session::SessionBootstrapper`] -- resolves a session before any data loads.
//!
//! [`board::BoardController`] drives one project's Kanban board with
//! optimistic updates; [`dashboard`] and [`workflow`] compose the services
//! for the project grid and project creation.

pub mod api;
pub mod board;
pub mod config;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod notice;
pub mod services;
pub mod session;
pub mod store;
pub mod workflow;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
