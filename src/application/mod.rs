//! Application services orchestrating the store and the cache.

pub mod cache;
pub mod error;
pub mod repos;
pub mod todos;
