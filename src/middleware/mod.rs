//! HTTP middleware for request identification, logging and error responses

pub mod error;
pub mod logging;
