pub mod admin_service;
pub mod auth_service;
pub mod rating_service;
pub mod store_service;
