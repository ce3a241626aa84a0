//! Todo record service: a MongoDB store of record behind a read-through cache,
//! served as JSON over HTTP.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
