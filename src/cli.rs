use std::path::PathBuf;

mod add;
mod browse;
mod config;
mod delete;
mod edit;
mod form;
mod list;
mod terminal;

use add::Add;
use anyhow::Context as _;
use browse::Browse;
use clap::ArgAction;
use config::Config;
use delete::Delete;
use edit::Edit;
use jobboard::{Board, HttpJobsApi, JobBoardView, JobId, LoadStatus};
use list::List;
use tracing::instrument;
use url::Url;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, default_value = "jobs.toml", global = true)]
    config: PathBuf,

    /// Root URL of the jobs service, overriding the configuration file
    #[arg(long, env = "JOBS_BASE_URL", global = true)]
    base_url: Option<Url>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let context = Context {
            config_path: self.config,
            base_url: self.base_url,
        };

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(&context)
            .await
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List one page of jobs (default)
    List(List),

    /// Post a new job
    Add(Add),

    /// Edit an existing job
    Edit(Edit),

    /// Delete a job
    Delete(Delete),

    /// Browse jobs interactively
    Browse(Browse),

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    async fn run(self, context: &Context) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(context).await?,
            Self::Add(command) => command.run(context).await?,
            Self::Edit(command) => command.run(context).await?,
            Self::Delete(command) => command.run(context).await?,
            Self::Browse(command) => command.run(context).await?,
            Self::Config(command) => command.run(context)?,
        }
        Ok(())
    }
}

/// Global options shared by every subcommand.
#[derive(Debug)]
pub struct Context {
    config_path: PathBuf,
    base_url: Option<Url>,
}

impl Context {
    /// The configuration file, with `--base-url` applied.
    fn config(&self) -> anyhow::Result<jobboard::Config> {
        let mut config = jobboard::Config::load_or_default(&self.config_path)
            .with_context(|| format!("failed to load {}", self.config_path.display()))?;
        if let Some(url) = &self.base_url {
            config.set_base_url(url.clone());
        }
        Ok(config)
    }

    /// A board over the configured service, requesting `page_limit` jobs per
    /// page if given.
    fn board(&self, page_limit: Option<u32>) -> anyhow::Result<Board<HttpJobsApi>> {
        let config = self.config()?;
        let api = HttpJobsApi::new(&config).context("failed to set up HTTP client")?;
        let view = JobBoardView::new(
            page_limit.unwrap_or_else(|| config.page_limit()),
            config.default_sort,
        );
        Ok(Board::new(api, view))
    }
}

/// Loads the current page, failing if the service could not be reached.
async fn load(board: &mut Board<HttpJobsApi>) -> anyhow::Result<()> {
    match board.load().await {
        LoadStatus::Loaded | LoadStatus::Superseded => Ok(()),
        LoadStatus::Failed => {
            anyhow::bail!("could not load jobs from {}", board.api().base_url())
        }
    }
}

/// Pages through the listing until job `id` is held.
#[instrument(level = "debug", skip(board))]
async fn find_job(board: &mut Board<HttpJobsApi>, id: &JobId) -> anyhow::Result<()> {
    let mut page = 1;
    loop {
        board.view_mut().start_at_page(page);
        load(board).await?;

        if board.view().job(id).is_some() {
            return Ok(());
        }
        if page >= board.view().total_pages() {
            anyhow::bail!("job {id} not found");
        }
        page += 1;
    }
}
