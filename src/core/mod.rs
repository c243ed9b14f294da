//! Configuration, credentials, domain types and capability seams

pub mod capabilities;
pub mod config;
pub mod credentials;
pub mod models;
