pub mod git;
pub mod github;
