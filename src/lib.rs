//! Asynchronous render-job service: submission, lifecycle tracking and signed
//! webhook notification.

pub mod app;
pub mod common;
pub mod config;
pub mod docs;
pub mod infrastructure;
pub mod modules;
pub mod routes;
pub mod state;
pub mod workers;

pub use app::create_app;
pub use state::AppState;
