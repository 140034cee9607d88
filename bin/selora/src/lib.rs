//! Shared pieces of the `deploy-core` and `deploy-integrations` binaries.

pub mod cli;
pub mod config;
pub mod summary;
