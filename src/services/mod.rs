pub mod auth;
pub mod deployment;
pub mod hierarchy;
pub mod membership;
pub mod user;

pub use auth::{AuthService, Claims};
pub use deployment::DeploymentService;
pub use hierarchy::HierarchyService;
pub use membership::MembershipService;
pub use user::{Session, UserService};
