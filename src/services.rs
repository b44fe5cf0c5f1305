pub mod auth_service;
pub use auth_service::AuthService;
pub mod company_service;
pub use company_service::CompanyService;
pub mod permission_service;
pub use permission_service::PermissionService;
pub mod role_service;
pub use role_service::RoleService;
pub mod user_service;
pub use user_service::UserService;
