//! pirouter daemon: configuration, logging and wiring for the control
//! panel server.

pub mod config;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
