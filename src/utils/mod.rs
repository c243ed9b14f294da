//! Shared helpers: message filtering and the retry combinator

pub mod filters;
pub mod retry;
