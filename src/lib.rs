//! # changed_files
//!
//! Lists the files changed by a pull request or push, filters them with
//! full-path globs and reports them to the GitHub Actions runner.
//!
//! - [`actions`]: workflow commands, runner file channels and the step summary
//! - [`domain`]: change categories and glob filters
//! - [`services`] / [`infra`]: where changes come from (GitHub API or local git)
//! - [`workflow`]: the summary and output driver

pub mod actions;
pub mod cmd;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod services;
pub mod workflow;
