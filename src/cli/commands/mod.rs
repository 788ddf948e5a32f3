//! CLI command implementations

pub mod utils;

pub mod add;
pub mod categories;
pub mod completions;
pub mod config;
pub mod edit;
pub mod init;
pub mod list;
pub mod remove;
pub mod show;
pub mod status;
