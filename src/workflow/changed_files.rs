use crate::actions::Runner;
use crate::context::AppContext;
use crate::domain::change::ChangedFileSet;
use crate::domain::pattern::PathFilter;
use crate::error::AppResult;
use crate::services::ChangeSource;

pub const SUMMARY_HEADING: &str = "Changed Files Summary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Reported(ChangedFileSet),
    Unavailable,
    UnsupportedEvent(String),
}

/// Collects changes from `source`, writes the summary and sets the outputs.
///
/// A missing source means the event is unsupported. Both that and an adapter
/// returning nothing are reported as error annotations without failing the run.
pub async fn detect_changed_files(
    ctx: &mut AppContext<'_>,
    source: Option<&dyn ChangeSource>,
    filter: &PathFilter,
) -> AppResult<DiffOutcome> {
    let Some(source) = source else {
        let event = ctx.config.event_name.clone();
        ctx.runner
            .error(&format!("Unsupported event type: {event}"), None);
        return Ok(DiffOutcome::UnsupportedEvent(event));
    };

    tracing::debug!(source = %source.describe(), "collecting changed files");
    let Some(files) = source.changed_files(Some(filter)).await else {
        ctx.runner.error("Failed to retrieve changed files", None);
        return Ok(DiffOutcome::Unavailable);
    };

    create_summary_lists(ctx.runner, &files);
    set_action_outputs(ctx.runner, &files)?;
    Ok(DiffOutcome::Reported(files))
}

pub fn create_summary_lists(runner: &mut Runner, files: &ChangedFileSet) {
    let sections = [
        ("Added Files", &files.added),
        ("Modified Files", &files.modified),
        ("Deleted Files", &files.removed),
    ];

    let summary = runner.summary();
    summary.add_heading(SUMMARY_HEADING, 2);
    for (title, paths) in sections {
        if paths.is_empty() {
            continue;
        }
        summary.add_heading(title, 3).add_list(paths, false);
    }

    let written = summary.write();
    match written {
        Ok(()) => runner.info("Summary written successfully"),
        Err(error) => {
            runner.info(&format!("Could not write summary: {error}"));
            runner.info("This is expected if running locally or in a testing environment");
        }
    }
}

pub fn set_action_outputs(runner: &mut Runner, files: &ChangedFileSet) -> AppResult<()> {
    let any_changed = if files.has_changes() { "true" } else { "false" };
    runner.set_output("any-changed", any_changed)?;

    let changed = serde_json::to_string(&files.to_output())?;
    runner.set_output("changed-files", &changed)
}
