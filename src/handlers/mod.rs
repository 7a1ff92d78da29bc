// HTTP request handlers module

pub mod auth;
pub mod collections;
pub mod content;
pub mod follows;
pub mod health;
pub mod profile;
pub mod share;
