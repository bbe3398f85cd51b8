//! Utility modules - common helpers and types
//!
//! # Contents
//!
//! - [`AppError`] / [`AppResult`] - application error type and alias
//! - [`logger`] - tracing setup

pub mod error;
pub mod logger;
pub mod result;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
