pub mod deployment;
pub mod domain;
pub mod environment;
pub mod group;
pub mod membership;
pub mod project;
pub mod user;

pub mod prelude;

pub use prelude::*;
