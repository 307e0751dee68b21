//! HTTP API handlers

pub mod callbacks;
pub mod checkout;
