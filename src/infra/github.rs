use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, LINK, USER_AGENT},
};
use serde::Deserialize;

use crate::domain::change::{ChangedFileSet, FileStatus};
use crate::error::{AppError, AppResult};
use crate::services::ChangeSource;

const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: u32 = 100;

pub struct GitHubClient {
    http: Client,
    api_url: String,
    repository: Option<String>,
    token: Option<String>,
    pull_number: Option<u64>,
    event_path: Option<PathBuf>,
}

impl GitHubClient {
    pub fn new(
        api_url: String,
        repository: Option<String>,
        token: Option<String>,
        pull_number: Option<u64>,
        event_path: Option<PathBuf>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_url,
            repository,
            token,
            pull_number,
            event_path,
        }
    }

    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Explicit number first, then `pull_request.number` from the event payload.
    pub fn pull_number(&self) -> Option<u64> {
        self.pull_number
            .or_else(|| self.event_path.as_deref().and_then(pull_number_from_event))
    }

    fn files_endpoint(&self, repository: &str, number: u64) -> String {
        format!(
            "{}/repos/{repository}/pulls/{number}/files?per_page={PAGE_SIZE}",
            self.api_url.trim_end_matches('/')
        )
    }

    pub async fn list_files(&self, number: u64) -> AppResult<Vec<PullRequestFile>> {
        let repository = self
            .repository
            .as_deref()
            .filter(|repository| !repository.is_empty())
            .ok_or_else(|| {
                AppError::Configuration("GITHUB_REPOSITORY is not set".to_string())
            })?;

        let mut files = Vec::new();
        let mut next = Some(self.files_endpoint(repository, number));

        while let Some(url) = next.take() {
            let mut request = self
                .http
                .get(&url)
                .header(ACCEPT, "application/vnd.github+json")
                .header(USER_AGENT, concat!("changed-files/", env!("CARGO_PKG_VERSION")))
                .header("X-GitHub-Api-Version", API_VERSION);
            if let Some(token) = &self.token {
                request = request.header(AUTHORIZATION, format!("Bearer {token}"));
            }

            let response = request.send().await.map_err(|err| {
                AppError::external("GitHub API", format!("failed to call GitHub: {err}"))
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unable to read response>".to_string());
                return Err(AppError::ExternalTool {
                    tool: "GitHub API",
                    message: format!("GET {url} responded with {status}"),
                    stdout: String::new(),
                    stderr: body,
                });
            }

            next = next_page(response.headers());
            let page: Vec<PullRequestFile> = response.json().await.map_err(|err| {
                AppError::external(
                    "GitHub API",
                    format!("failed to parse GitHub response: {err}"),
                )
            })?;
            files.extend(page);
        }

        Ok(files)
    }
}

#[async_trait]
impl ChangeSource for GitHubClient {
    fn describe(&self) -> String {
        match &self.repository {
            Some(repository) => format!("pull request files for {repository}"),
            None => "pull request files".to_string(),
        }
    }

    async fn fetch_changes(&self) -> AppResult<ChangedFileSet> {
        let number = self.pull_number().ok_or_else(|| {
            AppError::Configuration("unable to determine PR number".to_string())
        })?;

        let files = self.list_files(number).await?;
        tracing::info!("Retrieved {} changed files from PR #{number}", files.len());
        Ok(categorize_files(files))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub previous_filename: Option<String>,
}

pub fn categorize_files(files: Vec<PullRequestFile>) -> ChangedFileSet {
    let mut categorized = ChangedFileSet::empty();
    for file in files {
        categorized.record(file.status, file.filename, file.previous_filename);
    }
    categorized
}

#[derive(Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestRef>,
}

#[derive(Deserialize)]
struct PullRequestRef {
    number: u64,
}

fn pull_number_from_event(path: &Path) -> Option<u64> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "unable to read event payload");
            return None;
        }
    };
    match serde_json::from_str::<EventPayload>(&contents) {
        Ok(payload) => payload.pull_request.map(|pull_request| pull_request.number),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "unable to parse event payload");
            None
        }
    }
}

/// Target of the `rel="next"` entry in a `Link` header.
fn next_page(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|param| param.trim() == "rel=\"next\"");
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}
