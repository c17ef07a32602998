//! Analysis engine for suggesting version bumps from commits

pub mod bump_analyzer;

pub use bump_analyzer::{suggest_bump, BumpAnalyzer};
