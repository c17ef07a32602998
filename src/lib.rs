pub mod analyzer;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod git;
pub mod hooks;
pub mod manifest;
pub mod plugins;
pub mod publish;
pub mod template;
pub mod ui;
pub mod workflow;

pub use error::{ReleaseError, Result};
