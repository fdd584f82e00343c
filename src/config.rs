use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Snapshot of the process environment, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn from_process() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str, options: &EnvOptions) -> AppResult<String> {
        let mut value = self.vars.get(name).cloned().unwrap_or_default();

        if value.is_empty() {
            if options.required {
                return Err(AppError::Configuration(format!(
                    "environment variable required and not supplied: {name}"
                )));
            }
            if let Some(default) = &options.default {
                value = default.clone();
            }
        }

        if options.trim_whitespace {
            value = value.trim().to_string();
        }
        Ok(value)
    }

    /// Trimmed value of `name`, treating empty as unset.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

#[derive(Debug, Clone)]
pub struct EnvOptions {
    pub required: bool,
    pub trim_whitespace: bool,
    pub default: Option<String>,
}

impl EnvOptions {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            required: false,
            trim_whitespace: true,
            default: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputOptions {
    pub required: bool,
    pub trim_whitespace: bool,
}

impl InputOptions {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            required: false,
            trim_whitespace: true,
        }
    }
}

/// `INPUT_<NAME>` with spaces and dashes folded to underscores.
pub fn input_variable_name(name: &str) -> String {
    format!(
        "INPUT_{}",
        name.replace(' ', "_").replace('-', "_").to_uppercase()
    )
}

/// The runner itself only folds spaces, so `base-sha` arrives as `INPUT_BASE-SHA`.
pub fn runner_input_variable_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    Push,
    Other(String),
}

impl EventKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "pull_request" | "pull_request_target" => EventKind::PullRequest,
            "push" => EventKind::Push,
            other => EventKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub event_name: String,
    pub event: EventKind,
    pub event_path: Option<PathBuf>,
    pub repository: Option<String>,
    pub api_url: String,
    pub before_sha: Option<String>,
    pub after_sha: Option<String>,
    pub workspace_root: PathBuf,
}

impl AppConfig {
    pub fn load(env: &Environment, repo_path: Option<&Path>) -> AppResult<Self> {
        let event_name = env.var("GITHUB_EVENT_NAME").unwrap_or_default().to_string();
        let workspace_root = match repo_path {
            Some(path) => path.to_path_buf(),
            None => match env.var("GITHUB_WORKSPACE") {
                Some(workspace) => PathBuf::from(workspace),
                None => env::current_dir()?,
            },
        };

        Ok(Self {
            event: EventKind::from_name(&event_name),
            event_name,
            event_path: env.var("GITHUB_EVENT_PATH").map(PathBuf::from),
            repository: env.var("GITHUB_REPOSITORY").map(str::to_string),
            api_url: env
                .var("GITHUB_API_URL")
                .unwrap_or(DEFAULT_API_URL)
                .to_string(),
            before_sha: env.var("GITHUB_BEFORE").map(str::to_string),
            after_sha: env.var("GITHUB_AFTER").map(str::to_string),
            workspace_root,
        })
    }
}
