pub mod api;
pub mod auth;
pub mod codec;
pub mod config;
pub mod console;
pub mod error;
pub mod format;
pub mod logging;
pub mod views;

pub use error::AppError;
