use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{AppError, AppResult};

pub const MATCH_ALL: &str = "**/*";

/// Compiled list of full-path glob patterns.
///
/// `*` stops at `/`, `**` spans any number of directories, and matching is
/// anchored at both ends of the path. An empty list, or exactly `["**/*"]`,
/// matches everything without compiling anything.
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> AppResult<Self> {
        let patterns: Vec<String> = patterns
            .iter()
            .map(|pattern| pattern.as_ref().to_string())
            .collect();

        if is_match_all(&patterns) {
            return Ok(Self {
                patterns,
                set: None,
            });
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(compile(pattern)?);
        }
        let set = builder.build().map_err(|source| AppError::Pattern {
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self {
            patterns,
            set: Some(set),
        })
    }

    pub fn match_all() -> Self {
        Self {
            patterns: vec![MATCH_ALL.to_string()],
            set: None,
        }
    }

    pub fn matches_everything(&self) -> bool {
        self.set.is_none()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_match(&self, path: &str) -> bool {
        match &self.set {
            Some(set) => set.is_match(normalize(path)),
            None => true,
        }
    }
}

pub fn matches(path: &str, pattern: &str) -> AppResult<bool> {
    Ok(compile(pattern)?.compile_matcher().is_match(normalize(path)))
}

pub fn matches_any<S: AsRef<str>>(path: &str, patterns: &[S]) -> AppResult<bool> {
    Ok(PathFilter::new(patterns)?.is_match(path))
}

fn is_match_all(patterns: &[String]) -> bool {
    patterns.is_empty() || (patterns.len() == 1 && patterns[0] == MATCH_ALL)
}

fn compile(pattern: &str) -> AppResult<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|source| AppError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(paths: &[&str], patterns: &[&str]) -> Vec<String> {
        let filter = PathFilter::new(patterns).unwrap();
        paths
            .iter()
            .filter(|path| filter.is_match(path))
            .map(|path| path.to_string())
            .collect()
    }

    #[test]
    fn empty_and_catch_all_skip_compilation() {
        assert!(PathFilter::new::<&str>(&[]).unwrap().matches_everything());
        assert!(PathFilter::new(&["**/*"]).unwrap().matches_everything());
        assert!(PathFilter::match_all().matches_everything());
        assert!(!PathFilter::new(&["**/*", "*.md"]).unwrap().matches_everything());
    }

    #[test]
    fn filters_by_extension_at_any_depth() {
        let paths = ["file1.txt", "file2.py", "dir/file3.md", "dir/file4.txt"];
        assert_eq!(
            filter(&paths, &["**/*.txt"]),
            vec!["file1.txt", "dir/file4.txt"]
        );

        for path in ["a.ext", "x/y/z/b.ext", "x/.ext", "a.ext.bak", "ext", "a/b.txt"] {
            assert_eq!(
                matches(path, "**/*.ext").unwrap(),
                path.ends_with(".ext"),
                "{path}"
            );
        }
    }

    #[test]
    fn filters_by_directory() {
        let paths = ["file1.txt", "file2.py", "dir/file3.md", "dir/sub/file4.txt"];
        assert_eq!(
            filter(&paths, &["dir/**"]),
            vec!["dir/file3.md", "dir/sub/file4.txt"]
        );
    }

    #[test]
    fn combines_multiple_patterns() {
        let paths = ["file1.txt", "file2.py", "dir/file3.md", "dir/file4.txt"];
        assert_eq!(
            filter(&paths, &["**/*.py", "**/*.md"]),
            vec!["file2.py", "dir/file3.md"]
        );
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        assert!(matches("main.rs", "*.rs").unwrap());
        assert!(!matches("src/main.rs", "*.rs").unwrap());
        assert!(matches("src/main.rs", "src/*.rs").unwrap());
        assert!(!matches("src/bin/main.rs", "src/*.rs").unwrap());
        assert!(matches("src/bin/main.rs", "src/**/*.rs").unwrap());
    }

    #[test]
    fn matching_is_anchored_and_case_sensitive() {
        assert!(!matches("docs/README.md", "README.md").unwrap());
        assert!(!matches("readme.md", "README.md").unwrap());
        assert!(matches("README.md", "README.md").unwrap());
    }

    #[test]
    fn normalizes_backslash_separators() {
        assert!(matches_any("dir\\nested\\file.txt", &["dir/**/*.txt"]).unwrap());
    }

    #[test]
    fn rejects_malformed_patterns() {
        let err = matches("file.txt", "src/[abc").unwrap_err();
        assert!(matches!(err, AppError::Pattern { .. }));
        assert!(PathFilter::new(&["**/*.rs", "{unclosed"]).is_err());
    }
}
