use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::actions::command::{
    AnnotationProperties, Command, CommandProperties, to_command_value,
};
use crate::actions::file_command::{issue_file_command, prepare_key_value_message};
use crate::actions::summary::Summary;
use crate::actions::{Channel, ExitCode, STEP_SUMMARY_VAR};
use crate::config::{
    EnvOptions, Environment, InputOptions, input_variable_name, runner_input_variable_name,
};
use crate::error::{AppError, AppResult, ChannelError};

const TRUE_VALUES: [&str; 3] = ["true", "True", "TRUE"];
const FALSE_VALUES: [&str; 3] = ["false", "False", "FALSE"];

/// Handle on the Actions runner: reads inputs from the environment snapshot
/// and issues workflow commands to stdout or the channel files.
pub struct Runner {
    env: Environment,
    out: Box<dyn Write + Send>,
    summary: Summary,
}

impl Runner {
    pub fn new(env: Environment, out: Box<dyn Write + Send>) -> Self {
        let summary = Summary::new(env.var(STEP_SUMMARY_VAR).map(PathBuf::from));
        Self { env, out, summary }
    }

    pub fn stdout(env: Environment) -> Self {
        Self::new(env, Box::new(io::stdout()))
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn summary(&mut self) -> &mut Summary {
        &mut self.summary
    }

    pub fn get_env(&self, name: &str, options: &EnvOptions) -> AppResult<String> {
        self.env.get(name, options)
    }

    pub fn get_input(&self, name: &str, options: &InputOptions) -> AppResult<String> {
        let env_options = EnvOptions {
            required: false,
            trim_whitespace: options.trim_whitespace,
            default: None,
        };

        let mut value = self.env.get(&input_variable_name(name), &env_options)?;
        if value.is_empty() {
            value = self.env.get(&runner_input_variable_name(name), &env_options)?;
        }

        if value.is_empty() && options.required {
            return Err(AppError::Configuration(format!(
                "input required and not supplied: {name}"
            )));
        }
        Ok(value)
    }

    pub fn get_multiline_input(&self, name: &str, options: &InputOptions) -> AppResult<Vec<String>> {
        let value = self.get_input(name, options)?;
        Ok(value
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(|line| {
                if options.trim_whitespace {
                    line.trim().to_string()
                } else {
                    line.to_string()
                }
            })
            .collect())
    }

    /// Parses an input as a YAML 1.2 core-schema boolean.
    pub fn get_boolean_input(&self, name: &str, options: &InputOptions) -> AppResult<bool> {
        let value = self.get_input(name, options)?;
        if TRUE_VALUES.contains(&value.as_str()) {
            return Ok(true);
        }
        if FALSE_VALUES.contains(&value.as_str()) {
            return Ok(false);
        }

        Err(AppError::Configuration(format!(
            "input does not meet YAML 1.2 \"Core Schema\" specification: {name}\n\
             Support boolean input list: `true | True | TRUE | false | False | FALSE`"
        )))
    }

    pub fn set_output<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> AppResult<()> {
        let converted = to_command_value(value)?;
        if self.channel_path(Channel::Output).is_some() {
            let message = prepare_key_value_message(name, &converted)?;
            return self.issue_file_command(Channel::Output, &message);
        }

        self.emit("");
        self.issue_command("set-output", CommandProperties::named(name), &converted);
        Ok(())
    }

    /// Exports a variable to later steps; the local snapshot sees it immediately.
    pub fn export_variable<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> AppResult<()> {
        let converted = to_command_value(value)?;
        self.env.set(name, converted.clone());

        if self.channel_path(Channel::Env).is_some() {
            let message = prepare_key_value_message(name, &converted)?;
            return self.issue_file_command(Channel::Env, &message);
        }
        self.issue_command("set-env", CommandProperties::named(name), &converted);
        Ok(())
    }

    pub fn set_secret(&mut self, secret: &str) {
        self.issue_command("add-mask", CommandProperties::new(), secret);
    }

    pub fn add_path(&mut self, input_path: &str) -> AppResult<()> {
        if self.channel_path(Channel::Path).is_some() {
            self.issue_file_command(Channel::Path, input_path)?;
        } else {
            self.issue_command("add-path", CommandProperties::new(), input_path);
        }

        let separator = if cfg!(windows) { ";" } else { ":" };
        let current = self.env.var("PATH").unwrap_or_default().to_string();
        self.env.set("PATH", format!("{input_path}{separator}{current}"));
        Ok(())
    }

    pub fn save_state<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> AppResult<()> {
        let converted = to_command_value(value)?;
        if self.channel_path(Channel::State).is_some() {
            let message = prepare_key_value_message(name, &converted)?;
            return self.issue_file_command(Channel::State, &message);
        }
        self.issue_command("save-state", CommandProperties::named(name), &converted);
        Ok(())
    }

    pub fn get_state(&self, name: &str) -> String {
        self.env
            .var(&format!("STATE_{name}"))
            .unwrap_or_default()
            .to_string()
    }

    pub fn set_command_echo(&mut self, enabled: bool) {
        let state = if enabled { "on" } else { "off" };
        self.issue_command("echo", CommandProperties::new(), state);
    }

    pub fn is_debug(&self) -> bool {
        self.env.var("RUNNER_DEBUG") == Some("1")
    }

    pub fn info(&mut self, message: &str) {
        self.emit(message);
    }

    pub fn debug(&mut self, message: &str) {
        self.issue_command("debug", CommandProperties::new(), message);
    }

    pub fn notice(&mut self, message: &str, properties: Option<&AnnotationProperties>) {
        self.annotate("notice", message, properties);
    }

    pub fn warning(&mut self, message: &str, properties: Option<&AnnotationProperties>) {
        self.annotate("warning", message, properties);
    }

    pub fn error(&mut self, message: &str, properties: Option<&AnnotationProperties>) {
        self.annotate("error", message, properties);
    }

    /// Reports `message` as an error annotation; the caller exits with the returned code.
    pub fn set_failed(&mut self, message: impl Display) -> ExitCode {
        self.error(&message.to_string(), None);
        ExitCode::Failure
    }

    pub fn start_group(&mut self, name: &str) {
        self.issue_command("group", CommandProperties::new(), name);
    }

    pub fn end_group(&mut self) {
        self.issue_command("endgroup", CommandProperties::new(), "");
    }

    pub fn group<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.start_group(name);
        let result = f(self);
        self.end_group();
        result
    }

    fn annotate(&mut self, kind: &str, message: &str, properties: Option<&AnnotationProperties>) {
        let properties = properties
            .map(AnnotationProperties::to_command_properties)
            .unwrap_or_default();
        self.issue_command(kind, properties, message);
    }

    fn channel_path(&self, channel: Channel) -> Option<PathBuf> {
        self.env.var(channel.variable()).map(PathBuf::from)
    }

    fn issue_file_command(&mut self, channel: Channel, message: &str) -> AppResult<()> {
        let path = self
            .channel_path(channel)
            .ok_or_else(|| ChannelError::Missing(channel.variable().to_string()))?;
        issue_file_command(&path, message)
    }

    fn issue_command(&mut self, name: &str, properties: CommandProperties, message: &str) {
        let command = Command::new(name, properties, message);
        self.emit(&command.to_string());
    }

    fn emit(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            tracing::warn!(error = %err, "failed to write workflow command");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::actions::testing::CapturedOutput;

    fn runner(pairs: &[(&str, &str)]) -> (Runner, CapturedOutput) {
        let out = CapturedOutput::default();
        let env = Environment::from_pairs(pairs.iter().copied());
        (Runner::new(env, Box::new(out.clone())), out)
    }

    #[test]
    fn set_output_falls_back_to_inline_command() {
        let (mut runner, out) = runner(&[]);
        runner.set_output("any-changed", "true").unwrap();
        assert_eq!(out.contents(), "\n::set-output name=any-changed::true\n");
    }

    #[test]
    fn set_output_appends_to_output_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        fs::write(&path, "").unwrap();
        let path_str = path.to_str().unwrap();

        let (mut runner, out) = runner(&[("GITHUB_OUTPUT", path_str)]);
        runner.set_output("count", &3).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("count<<ghadelimiter_"));
        assert_eq!(lines[1], "3");
        assert_eq!(format!("count<<{}", lines[2]), lines[0]);
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn set_output_reports_missing_channel_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone");
        let (mut runner, _) = runner(&[("GITHUB_OUTPUT", path.to_str().unwrap())]);
        let err = runner.set_output("x", "y").unwrap_err();
        assert!(matches!(err, AppError::Channel(ChannelError::NotFound(_))));
    }

    #[test]
    fn reads_inputs_by_normalized_name() {
        let (runner, _) = runner(&[
            ("INPUT_BASE_SHA", " abc123 "),
            ("INPUT_HEAD-SHA", "def456"),
            ("INPUT_FILTERS", "**/*.rs\n\n  docs/**  \n"),
        ]);

        assert_eq!(
            runner.get_input("base-sha", &InputOptions::default()).unwrap(),
            "abc123"
        );
        assert_eq!(
            runner.get_input("head-sha", &InputOptions::default()).unwrap(),
            "def456"
        );
        assert_eq!(
            runner
                .get_multiline_input("filters", &InputOptions::default())
                .unwrap(),
            vec!["**/*.rs", "docs/**"]
        );
        assert_eq!(runner.get_input("missing", &InputOptions::default()).unwrap(), "");
    }

    #[test]
    fn required_input_names_the_input() {
        let (runner, _) = runner(&[]);
        let err = runner.get_input("token", &InputOptions::required()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: input required and not supplied: token"
        );
    }

    #[test]
    fn parses_boolean_inputs() {
        let (runner, _) = runner(&[("INPUT_A", "True"), ("INPUT_B", "FALSE"), ("INPUT_C", "yes")]);
        assert!(runner.get_boolean_input("a", &InputOptions::default()).unwrap());
        assert!(!runner.get_boolean_input("b", &InputOptions::default()).unwrap());
        assert!(runner.get_boolean_input("c", &InputOptions::default()).is_err());
    }

    #[test]
    fn exports_variables_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join("github_env");
        fs::write(&env_file, "").unwrap();

        let (mut runner, out) = runner(&[
            ("GITHUB_ENV", env_file.to_str().unwrap()),
            ("PATH", "/usr/bin"),
        ]);
        runner.export_variable("FEATURE", &true).unwrap();
        runner.add_path("/opt/tool/bin").unwrap();

        assert_eq!(runner.env().var("FEATURE"), Some("true"));
        assert!(runner.env().var("PATH").unwrap().starts_with("/opt/tool/bin"));
        assert!(fs::read_to_string(&env_file).unwrap().starts_with("FEATURE<<ghadelimiter_"));
        assert_eq!(out.contents(), "::add-path::/opt/tool/bin\n");
    }

    #[test]
    fn saves_and_reads_state() {
        let (mut runner, out) = runner(&[("STATE_cleanup", "pending")]);
        runner.save_state("cleanup", "done").unwrap();
        assert_eq!(out.contents(), "::save-state name=cleanup::done\n");
        assert_eq!(runner.get_state("cleanup"), "pending");
        assert_eq!(runner.get_state("other"), "");
    }

    #[test]
    fn issues_log_commands() {
        let (mut runner, out) = runner(&[("RUNNER_DEBUG", "1")]);
        assert!(runner.is_debug());

        runner.set_secret("s3cr3t");
        runner.debug("50% done\n");
        runner.info("plain line");
        let value = runner.group("Inputs", |runner| {
            runner.notice("inside", None);
            7
        });
        runner.warning(
            "careful",
            Some(&AnnotationProperties {
                file: Some("a.rs".to_string()),
                start_line: Some(3),
                ..AnnotationProperties::default()
            }),
        );
        runner.set_command_echo(false);
        let code = runner.set_failed("boom");

        assert_eq!(value, 7);
        assert_eq!(code, ExitCode::Failure);
        assert_eq!(
            out.contents(),
            "::add-mask::s3cr3t\n\
             ::debug::50%25 done%0A\n\
             plain line\n\
             ::group::Inputs\n\
             ::notice::inside\n\
             ::endgroup::\n\
             ::warning file=a.rs,line=3::careful\n\
             ::echo::off\n\
             ::error::boom\n"
        );
    }
}
