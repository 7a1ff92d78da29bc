// Request middleware and extractors shared by the handlers

pub mod auth;
pub mod rate_limit;
pub mod sanitize;
