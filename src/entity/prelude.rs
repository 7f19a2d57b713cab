pub use super::deployment::Entity as Deployment;
pub use super::domain::Entity as Domain;
pub use super::environment::Entity as Environment;
pub use super::group::Entity as Group;
pub use super::membership::Entity as Membership;
pub use super::project::Entity as Project;
pub use super::user::Entity as User;
