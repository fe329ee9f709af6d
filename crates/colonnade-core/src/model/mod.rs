pub mod entity;
pub mod property;
pub mod registry;
