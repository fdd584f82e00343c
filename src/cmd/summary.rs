use crate::actions::Runner;
use crate::error::AppResult;

pub fn run(runner: &mut Runner) -> AppResult<()> {
    runner.summary().clear()?;
    runner.info("Step summary cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::actions::testing::CapturedOutput;
    use crate::config::Environment;
    use crate::error::{AppError, ChannelError};

    #[test]
    fn truncates_the_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("step_summary");
        fs::write(&path, "<h2>stale</h2>\n").unwrap();

        let out = CapturedOutput::default();
        let env = Environment::from_pairs([("GITHUB_STEP_SUMMARY", path.to_str().unwrap())]);
        let mut runner = Runner::new(env, Box::new(out.clone()));

        run(&mut runner).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(out.contents(), "Step summary cleared\n");
    }

    #[test]
    fn missing_channel_is_an_error() {
        let mut runner = Runner::new(Environment::default(), Box::new(CapturedOutput::default()));
        let err = run(&mut runner).unwrap_err();
        assert!(matches!(err, AppError::Channel(ChannelError::Missing(_))));
    }
}
