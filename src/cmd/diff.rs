use clap::Args;

use crate::actions::Runner;
use crate::config::{AppConfig, EventKind, InputOptions};
use crate::context::AppContext;
use crate::domain::pattern::{MATCH_ALL, PathFilter};
use crate::error::{AppError, AppResult};
use crate::infra::git::{GitCli, RevisionRange};
use crate::infra::github::GitHubClient;
use crate::services::ChangeSource;
use crate::workflow::changed_files::{DiffOutcome, detect_changed_files};

#[derive(Args, Debug, Clone, Default)]
pub struct DiffArgs {
    /// Base revision to compare from. Overrides the `base-sha` input.
    #[arg(long)]
    pub base_sha: Option<String>,
    /// Head revision to compare to. Overrides the `head-sha` input.
    #[arg(long)]
    pub head_sha: Option<String>,
    /// Pull request to list files for. Overrides the `pr-number` input.
    #[arg(long)]
    pub pr_number: Option<u64>,
    /// Glob a changed path must match; repeatable. Overrides the `filters` input.
    #[arg(long = "filter", value_name = "GLOB")]
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    pub token: Option<String>,
    pub filters: Vec<String>,
    pub base_sha: Option<String>,
    pub head_sha: Option<String>,
    pub pr_number: Option<u64>,
}

impl ActionInputs {
    /// Action inputs, with any command-line flag taking precedence.
    pub fn read(runner: &Runner, args: &DiffArgs) -> AppResult<Self> {
        let options = InputOptions::default();
        let optional = |name: &str| -> AppResult<Option<String>> {
            let value = runner.get_input(name, &options)?;
            Ok(Some(value).filter(|value| !value.is_empty()))
        };

        let mut filters = if args.filters.is_empty() {
            runner.get_multiline_input("filters", &options)?
        } else {
            args.filters.clone()
        };
        if filters.is_empty() {
            filters.push(MATCH_ALL.to_string());
        }

        let pr_number = match args.pr_number {
            Some(number) => Some(number),
            None => optional("pr-number")?
                .map(|value| {
                    value.parse::<u64>().map_err(|_| {
                        AppError::Configuration(format!("invalid pr-number input: {value}"))
                    })
                })
                .transpose()?,
        };

        Ok(Self {
            token: optional("token")?,
            filters,
            base_sha: args.base_sha.clone().map_or_else(|| optional("base-sha"), |sha| Ok(Some(sha)))?,
            head_sha: args.head_sha.clone().map_or_else(|| optional("head-sha"), |sha| Ok(Some(sha)))?,
            pr_number,
        })
    }
}

pub async fn run(ctx: &mut AppContext<'_>, args: DiffArgs) -> AppResult<DiffOutcome> {
    let inputs = ActionInputs::read(ctx.runner, &args)?;
    if let Some(token) = &inputs.token {
        ctx.runner.set_secret(token);
    }

    ctx.runner
        .info(&format!("filters: {}", inputs.filters.join(", ")));
    match &inputs.base_sha {
        Some(sha) => ctx.runner.info(&format!("Base SHA: {sha}")),
        None => ctx
            .runner
            .info("No base SHA provided, will use default comparison"),
    }
    match &inputs.head_sha {
        Some(sha) => ctx.runner.info(&format!("Head SHA: {sha}")),
        None => ctx
            .runner
            .info("No head SHA provided, will use default comparison"),
    }

    let filter = PathFilter::new(&inputs.filters)?;
    let source = select_change_source(&ctx.config, &inputs);
    detect_changed_files(ctx, source.as_deref(), &filter).await
}

/// Pull requests are listed through the API, pushes through local git.
pub fn select_change_source(
    config: &AppConfig,
    inputs: &ActionInputs,
) -> Option<Box<dyn ChangeSource>> {
    match config.event {
        EventKind::PullRequest => Some(Box::new(GitHubClient::new(
            config.api_url.clone(),
            config.repository.clone(),
            inputs.token.clone(),
            inputs.pr_number,
            config.event_path.clone(),
        ))),
        EventKind::Push => Some(Box::new(GitCli::new(
            config.workspace_root.clone(),
            RevisionRange {
                base: inputs.base_sha.clone(),
                head: inputs.head_sha.clone(),
            },
            RevisionRange {
                base: config.before_sha.clone(),
                head: config.after_sha.clone(),
            },
        ))),
        EventKind::Other(_) => None,
    }
}
