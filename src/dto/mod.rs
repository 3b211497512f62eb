pub mod admin;
pub mod auth;
pub mod ratings;
pub mod stores;
