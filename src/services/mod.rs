pub mod access_guard;
pub mod auth;
