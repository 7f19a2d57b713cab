pub mod deployment;
pub mod domain;
pub mod environment;
pub mod group;
pub mod membership;
pub mod ordinal;
pub mod page;
pub mod patch;
pub mod project;
pub mod status;
pub mod user;

pub use deployment::*;
pub use domain::*;
pub use environment::*;
pub use group::*;
pub use membership::*;
pub use ordinal::*;
pub use page::*;
pub use patch::*;
pub use project::*;
pub use status::*;
pub use user::*;
