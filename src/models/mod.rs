// Domain models and the error taxonomy shared across the service

pub mod collection;
pub mod content;
pub mod errors;
pub mod follow;
pub mod share_link;
pub mod user;
