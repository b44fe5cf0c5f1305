pub mod auth;
pub mod companies;
pub mod permissions;
pub mod roles;
pub mod users;
