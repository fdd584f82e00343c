use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use changed_files::actions::{AnnotationProperties, ExitCode, Runner};
use changed_files::config::{Environment, InputOptions};
use changed_files::domain::pattern::{PathFilter, matches, matches_any};

#[derive(Clone, Default)]
struct Sink(Arc<Mutex<Vec<u8>>>);

impl Sink {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn glob_helpers_match_full_paths() {
    assert!(matches("src/lib.rs", "**/*.rs").unwrap());
    assert!(!matches("src/lib.rs", "*.rs").unwrap());
    assert!(matches_any("docs/guide.md", &["**/*.rs", "docs/*.md"]).unwrap());
    assert!(matches_any("anything/at/all", &[] as &[&str]).unwrap());
    assert!(PathFilter::match_all().matches_everything());
}

#[test]
fn runner_toolkit_is_usable_from_outside_the_crate() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join("env");
    fs::write(&env_file, "").unwrap();

    let sink = Sink::default();
    let env = Environment::from_pairs([
        ("GITHUB_ENV", env_file.to_str().unwrap()),
        ("INPUT_VERBOSE", "True"),
        ("STATE_phase", "cleanup"),
    ]);
    let mut runner = Runner::new(env, Box::new(sink.clone()));

    assert!(runner.get_boolean_input("verbose", &InputOptions::default()).unwrap());
    assert_eq!(runner.get_state("phase"), "cleanup");

    runner.export_variable("MODE", "ci").unwrap();
    assert_eq!(runner.env().var("MODE"), Some("ci"));
    assert!(fs::read_to_string(&env_file).unwrap().starts_with("MODE<<ghadelimiter_"));

    let properties = AnnotationProperties {
        file: Some("src/main.rs".to_string()),
        start_line: Some(3),
        ..AnnotationProperties::default()
    };
    let grouped = runner.group("checks", |runner| {
        runner.warning("looks odd", Some(&properties));
        7
    });
    assert_eq!(grouped, 7);
    assert_eq!(runner.set_failed("boom"), ExitCode::Failure);

    assert_eq!(
        sink.text(),
        "::group::checks\n\
         ::warning file=src/main.rs,line=3::looks odd\n\
         ::endgroup::\n\
         ::error::boom\n"
    );
}
