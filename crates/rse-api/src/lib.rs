//! Thin axum boundary over job admission/termination, ruleset CRUD, and
//! scheduled-job CRUD — this crate exists so `rse-cli run` has something to
//! serve.

mod app;
mod error;
mod handlers;
mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
