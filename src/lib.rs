//! Blood test report analysis service
//!
//! Accepts an uploaded PDF report, extracts its text (with an OCR fallback
//! for scanned documents), asks a locally hosted language model for a
//! summary of abnormalities and emails the result to the requester.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
