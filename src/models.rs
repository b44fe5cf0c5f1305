pub mod auth;
pub mod company;
pub mod membership;
pub mod permission;
pub mod role;
pub mod user;
