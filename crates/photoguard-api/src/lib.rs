//! Photoguard API Library
//!
//! HTTP surface of the upload guard: routes, multipart extraction, error rendering
//! and application setup.

pub mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
