use std::path::PathBuf;

use clap::{Parser, Subcommand};

use changed_files::actions::Runner;
use changed_files::cmd::diff::{self, DiffArgs};
use changed_files::cmd::summary;
use changed_files::config::{AppConfig, Environment};
use changed_files::context::AppContext;
use changed_files::error::AppResult;
use changed_files::logging;

#[derive(Parser)]
#[command(
    name = "changed-files",
    author,
    version,
    about = "Report the files changed by a pull request or push"
)]
struct Cli {
    /// Repository to diff. Defaults to GITHUB_WORKSPACE, then the current directory.
    #[arg(long, global = true, value_name = "PATH")]
    repo_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List changed files, write the step summary and set outputs (default).
    Diff(DiffArgs),
    /// Truncate the step summary file.
    ClearSummary,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mut runner = Runner::stdout(Environment::from_process());
    logging::init(runner.is_debug());

    if let Err(error) = run(cli, &mut runner).await {
        tracing::debug!(?error, "run failed");
        let code = runner.set_failed(&error);
        std::process::exit(code.code());
    }
}

async fn run(cli: Cli, runner: &mut Runner) -> AppResult<()> {
    match cli.command.unwrap_or_else(|| Commands::Diff(DiffArgs::default())) {
        Commands::Diff(args) => {
            let config = AppConfig::load(runner.env(), cli.repo_path.as_deref())?;
            let mut ctx = AppContext::new(config, runner);
            let outcome = diff::run(&mut ctx, args).await?;
            tracing::debug!(?outcome, "diff finished");
            Ok(())
        }
        Commands::ClearSummary => summary::run(runner),
    }
}
