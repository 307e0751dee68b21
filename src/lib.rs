//! Hosted checkout session orchestration for the SSLCommerz gateway.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod services;
pub mod store;
