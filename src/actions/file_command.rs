use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use uuid::Uuid;

use crate::error::{AppError, AppResult, ChannelError};

pub const DELIMITER_PREFIX: &str = "ghadelimiter_";

pub const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

pub fn generate_delimiter() -> String {
    format!("{DELIMITER_PREFIX}{}", Uuid::new_v4())
}

/// Builds a `key<<DELIMITER` block with a freshly generated delimiter.
///
/// A collision between the delimiter and the key or value is reported as an
/// error rather than retried.
pub fn prepare_key_value_message(key: &str, value: &str) -> AppResult<String> {
    format_key_value(key, value, &generate_delimiter())
}

pub(crate) fn format_key_value(key: &str, value: &str, delimiter: &str) -> AppResult<String> {
    if key.contains(delimiter) {
        return Err(AppError::DelimiterCollision {
            field: "name",
            delimiter: delimiter.to_string(),
        });
    }
    if value.contains(delimiter) {
        return Err(AppError::DelimiterCollision {
            field: "value",
            delimiter: delimiter.to_string(),
        });
    }

    Ok(format!("{key}<<{delimiter}{EOL}{value}{EOL}{delimiter}"))
}

/// Appends `message` plus a line ending to an existing channel file.
pub fn issue_file_command(path: &Path, message: &str) -> AppResult<()> {
    if !path.exists() {
        return Err(ChannelError::NotFound(path.to_path_buf()).into());
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    write!(file, "{message}{EOL}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use super::*;

    #[test]
    fn formats_delimited_block() {
        let message = format_key_value("changed-files", "line1\nline2", "ghadelimiter_x").unwrap();
        assert_eq!(
            message,
            format!("changed-files<<ghadelimiter_x{EOL}line1\nline2{EOL}ghadelimiter_x")
        );
    }

    #[test]
    fn rejects_delimiter_in_key_or_value() {
        let err = format_key_value("a ghadelimiter_x", "v", "ghadelimiter_x").unwrap_err();
        assert!(matches!(err, AppError::DelimiterCollision { field: "name", .. }));

        let err = format_key_value("k", "ghadelimiter_x\n", "ghadelimiter_x").unwrap_err();
        assert!(matches!(err, AppError::DelimiterCollision { field: "value", .. }));
    }

    #[test]
    fn generates_unique_delimiters() {
        let delimiters: HashSet<String> = (0..10_000).map(|_| generate_delimiter()).collect();
        assert_eq!(delimiters.len(), 10_000);
        assert!(delimiters.iter().all(|d| d.starts_with(DELIMITER_PREFIX)));
    }

    #[test]
    fn appends_blocks_to_channel_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        fs::write(&path, "").unwrap();

        issue_file_command(&path, &prepare_key_value_message("first", "1").unwrap()).unwrap();
        issue_file_command(&path, &prepare_key_value_message("second", "2").unwrap()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("first<<ghadelimiter_"));
        assert_eq!(lines[1], "1");
        assert_eq!(lines[2], lines[0].trim_start_matches("first<<"));
        assert!(lines[3].starts_with("second<<ghadelimiter_"));
        assert_ne!(lines[2], lines[5]);
    }

    #[test]
    fn missing_channel_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let err = issue_file_command(&path, "x").unwrap_err();
        assert!(matches!(err, AppError::Channel(ChannelError::NotFound(_))));
        assert!(!path.exists());
    }
}
