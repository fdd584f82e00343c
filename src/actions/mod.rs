//! Workflow-command plumbing for the GitHub Actions runner: inline `::cmd::`
//! lines on stdout, delimiter-bounded blocks in the runner's channel files,
//! and the step summary.

pub mod command;
pub mod file_command;
pub mod runner;
pub mod summary;

pub use command::AnnotationProperties;
pub use runner::Runner;
pub use summary::Summary;

pub const STEP_SUMMARY_VAR: &str = "GITHUB_STEP_SUMMARY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Runner file channels, each named by an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Output,
    Env,
    State,
    Path,
}

impl Channel {
    pub fn variable(self) -> &'static str {
        match self {
            Channel::Output => "GITHUB_OUTPUT",
            Channel::Env => "GITHUB_ENV",
            Channel::State => "GITHUB_STATE",
            Channel::Path => "GITHUB_PATH",
        }
    }
}
