//! Application services layer.

pub mod cache_buster;
pub mod error;
pub mod hooks;
pub mod policy;
