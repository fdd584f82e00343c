use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::change::{ChangedFileSet, FileStatus};
use crate::error::{AppError, AppResult};
use crate::services::ChangeSource;

/// `before` revision reported for the first push of a new branch.
pub const NULL_SHA: &str = "0000000000000000000000000000000000000000";
/// Git's well-known empty tree object.
pub const EMPTY_TREE_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionRange {
    pub base: Option<String>,
    pub head: Option<String>,
}

pub struct GitCli {
    workspace_root: PathBuf,
    requested: RevisionRange,
    event: RevisionRange,
}

impl GitCli {
    /// `requested` comes from explicit inputs, `event` from the push payload.
    pub fn new(workspace_root: PathBuf, requested: RevisionRange, event: RevisionRange) -> Self {
        Self {
            workspace_root,
            requested,
            event,
        }
    }

    pub async fn resolve_range(&self) -> AppResult<(String, String)> {
        let base = match &self.requested.base {
            Some(base) => base.clone(),
            None => self.base_from_event().await,
        };
        let head = match self.requested.head.as_ref().or(self.event.head.as_ref()) {
            Some(head) => head.clone(),
            None => self.rev_parse("HEAD").await.map_err(|err| {
                AppError::Configuration(format!("failed to determine HEAD SHA: {err}"))
            })?,
        };
        Ok((base, head))
    }

    async fn base_from_event(&self) -> String {
        match self.event.base.as_deref() {
            Some(sha) if sha != NULL_SHA => sha.to_string(),
            _ => match self.rev_parse("HEAD~1").await {
                Ok(sha) => sha,
                Err(err) => {
                    tracing::debug!(error = %err, "no parent commit, diffing against the empty tree");
                    EMPTY_TREE_SHA.to_string()
                }
            },
        }
    }

    async fn rev_parse(&self, revision: &str) -> AppResult<String> {
        let output = self.git(&["rev-parse", "--verify", revision]).await?;
        Ok(output.trim().to_string())
    }

    pub async fn diff_name_status(&self, base: &str, head: &str) -> AppResult<String> {
        let range;
        let mut args = vec![
            "-c",
            "core.quotePath=false",
            "diff",
            "--name-status",
            "-M",
            "-z",
        ];
        if base == EMPTY_TREE_SHA {
            // A tree has no merge base, so compare the two endpoints directly.
            args.extend([base, head]);
        } else {
            range = format!("{base}...{head}");
            args.push(&range);
        }
        self.git(&args).await
    }

    async fn git(&self, args: &[&str]) -> AppResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workspace_root)
            .output()
            .await
            .map_err(|err| AppError::external("git", format!("failed to run git: {err}")))?;

        if !output.status.success() {
            return Err(AppError::ExternalTool {
                tool: "git",
                message: format!("git {} exited with {}", args.join(" "), output.status),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ChangeSource for GitCli {
    fn describe(&self) -> String {
        format!("git diff in {}", self.workspace_root.display())
    }

    async fn fetch_changes(&self) -> AppResult<ChangedFileSet> {
        let (base, head) = self.resolve_range().await?;
        tracing::info!("Comparing changes between {base} and {head}");

        let output = self.diff_name_status(&base, &head).await?;
        Ok(parse_name_status(&output))
    }
}

/// Reduces `git diff --name-status -z` output into categorized paths.
///
/// Records are NUL-separated: a status field followed by one path, or by the
/// old and new paths for renames and copies.
pub fn parse_name_status(output: &str) -> ChangedFileSet {
    let mut files = ChangedFileSet::empty();
    let mut fields = output.split('\0').filter(|field| !field.is_empty());

    while let Some(code) = fields.next() {
        let code = code.trim();
        let Some(status) = FileStatus::from_git_code(code) else {
            let skipped = fields.next();
            tracing::debug!(code, path = ?skipped, "skipping unrecognised name-status record");
            continue;
        };

        match status {
            FileStatus::Renamed | FileStatus::Copied => match (fields.next(), fields.next()) {
                (Some(old), Some(new)) => {
                    files.record(status, new.to_string(), Some(old.to_string()))
                }
                _ => tracing::warn!(code, "truncated rename record"),
            },
            _ => match fields.next() {
                Some(path) => files.record(status, path.to_string(), None),
                None => tracing::warn!(code, "name-status record without a path"),
            },
        }
    }

    files
}
