//! Data models shared between the guard, the HTTP service and the CLI.

mod upload;

pub use upload::*;
