pub mod error;
pub mod expense;
pub mod group;
pub mod member;
pub mod money;
pub mod settlement;
