pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod membership_repo;
pub use membership_repo::MembershipRepository;
pub mod permission_repo;
pub use permission_repo::PermissionRepository;
pub mod role_repo;
pub use role_repo::RoleRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
