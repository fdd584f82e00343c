use serde::{Deserialize, Serialize};

use crate::domain::pattern::PathFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

impl FileStatus {
    /// Maps a `git diff --name-status` code; rename and copy codes carry a score suffix.
    pub fn from_git_code(code: &str) -> Option<Self> {
        match code.chars().next()? {
            'A' => Some(FileStatus::Added),
            'M' => Some(FileStatus::Modified),
            'D' => Some(FileStatus::Removed),
            'R' => Some(FileStatus::Renamed),
            'C' => Some(FileStatus::Copied),
            'T' => Some(FileStatus::Changed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFile {
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFileSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    pub renamed: Vec<RenamedFile>,
}

impl ChangedFileSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn record(&mut self, status: FileStatus, path: String, previous: Option<String>) {
        match status {
            FileStatus::Added | FileStatus::Copied => self.added.push(path),
            FileStatus::Modified | FileStatus::Changed => self.modified.push(path),
            FileStatus::Removed => self.removed.push(path),
            FileStatus::Renamed => {
                if let Some(old) = previous.filter(|old| !old.is_empty()) {
                    self.renamed.push(RenamedFile { old, new: path });
                }
            }
            FileStatus::Unchanged | FileStatus::Unknown => {}
        }
    }

    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty())
    }

    /// Appends each rename's new path to `added` and old path to `removed`.
    ///
    /// Not idempotent: folding an already folded set appends the renames a
    /// second time. Nothing is deduplicated.
    pub fn fold_renames(mut self) -> Self {
        for rename in &self.renamed {
            self.added.push(rename.new.clone());
            self.removed.push(rename.old.clone());
        }
        self
    }

    /// Keeps paths matching `filter`; a rename survives if either side matches.
    pub fn apply_filters(self, filter: &PathFilter) -> Self {
        if filter.matches_everything() {
            return self;
        }

        let retain = |paths: Vec<String>| -> Vec<String> {
            paths
                .into_iter()
                .filter(|path| filter.is_match(path))
                .collect()
        };

        Self {
            added: retain(self.added),
            modified: retain(self.modified),
            removed: retain(self.removed),
            renamed: self
                .renamed
                .into_iter()
                .filter(|rename| filter.is_match(&rename.old) || filter.is_match(&rename.new))
                .collect(),
        }
    }

    pub fn to_output(&self) -> ChangedFilesOutput {
        ChangedFilesOutput {
            added: self.added.clone(),
            modified: self.modified.clone(),
            deleted: self.removed.clone(),
        }
    }
}

/// Shape of the `changed-files` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFilesOutput {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}
