// Business logic services module
// Storage contract, the share-link and sanitizer cores, and account plumbing

pub mod collection_service;
pub mod content_service;
pub mod follow_service;
pub mod password;
pub mod rate_limiter;
pub mod sanitizer;
pub mod session_manager;
pub mod share_token;
pub mod store;
pub mod user_service;
