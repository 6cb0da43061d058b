//! Interactive browsing session over a single board.

use std::fmt;

use clap::Parser;
use dialoguer::{Confirm, Input, Select};
use jobboard::{Board, HttpJobsApi, JobBoardView, JobId, LoadStatus, SortField, SubmitOutcome};
use tracing::instrument;

use super::{
    Context, delete,
    form,
    list::print_page,
    terminal::{Colorize, is_interactive, with_spinner},
};

const LOADING: &str = "Loading jobs...";

/// Command arguments for `jobs browse`.
#[derive(Debug, Parser)]
#[command(about = "Browse jobs interactively")]
pub struct Browse {
    /// Page to start on.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    NextPage,
    PreviousPage,
    GoToPage,
    Search,
    FilterJobType,
    FilterLocation,
    FilterTag,
    ClearFilters,
    Sort,
    Post,
    Edit,
    Delete,
    Refresh,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NextPage => "Next page",
            Self::PreviousPage => "Previous page",
            Self::GoToPage => "Go to page...",
            Self::Search => "Search...",
            Self::FilterJobType => "Filter by job type...",
            Self::FilterLocation => "Filter by location...",
            Self::FilterTag => "Filter by tag...",
            Self::ClearFilters => "Clear search and filters",
            Self::Sort => "Sort by...",
            Self::Post => "Post a job",
            Self::Edit => "Edit a job...",
            Self::Delete => "Delete a job...",
            Self::Refresh => "Refresh",
            Self::Quit => "Quit",
        })
    }
}

impl Action {
    /// The actions that make sense for the current view, in menu order.
    fn available(view: &JobBoardView) -> Vec<Self> {
        let mut actions = Vec::new();
        if view.current_page() < view.total_pages() {
            actions.push(Self::NextPage);
        }
        if view.current_page() > 1 {
            actions.push(Self::PreviousPage);
        }
        if view.total_pages() > 1 {
            actions.push(Self::GoToPage);
        }
        actions.extend([
            Self::Search,
            Self::FilterJobType,
            Self::FilterLocation,
            Self::FilterTag,
        ]);
        if !view.filters().is_empty() {
            actions.push(Self::ClearFilters);
        }
        actions.extend([Self::Sort, Self::Post]);
        if !view.jobs().is_empty() {
            actions.extend([Self::Edit, Self::Delete]);
        }
        actions.extend([Self::Refresh, Self::Quit]);
        actions
    }
}

/// Which filter a facet menu edits.
#[derive(Debug, Clone, Copy)]
enum Facet {
    JobType,
    Location,
    Tag,
}

impl Browse {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        if !is_interactive() {
            anyhow::bail!("browse needs an interactive terminal; use `jobs list` instead");
        }

        let mut board = context.board(None)?;
        board.view_mut().start_at_page(self.page);
        report_load(with_spinner(LOADING, board.load()).await);

        loop {
            show(board.view());

            let actions = Action::available(board.view());
            let choice = Select::new()
                .with_prompt("What next?")
                .items(actions.as_slice())
                .default(0)
                .interact()?;

            match actions[choice] {
                Action::NextPage => {
                    if let Some(status) = with_spinner(LOADING, board.next_page()).await {
                        report_load(status);
                    }
                }
                Action::PreviousPage => {
                    if let Some(status) = with_spinner(LOADING, board.previous_page()).await {
                        report_load(status);
                    }
                }
                Action::GoToPage => go_to_page(&mut board).await?,
                Action::Search => {
                    let term: String = Input::new()
                        .with_prompt("Search")
                        .with_initial_text(board.view().filters().search().unwrap_or_default())
                        .allow_empty(true)
                        .interact_text()?;
                    with_spinner(LOADING, board.search(term)).await;
                }
                Action::FilterJobType => pick_facet(&mut board, Facet::JobType).await?,
                Action::FilterLocation => pick_facet(&mut board, Facet::Location).await?,
                Action::FilterTag => pick_facet(&mut board, Facet::Tag).await?,
                Action::ClearFilters => {
                    with_spinner(LOADING, board.clear_filters()).await;
                }
                Action::Sort => pick_sort(&mut board)?,
                Action::Post => {
                    board.open_create();
                    edit_form(&mut board).await?;
                }
                Action::Edit => {
                    if let Some(id) = pick_job(board.view(), "Edit which job?")? {
                        board.open_edit(&id);
                        edit_form(&mut board).await?;
                    }
                }
                Action::Delete => {
                    if let Some(id) = pick_job(board.view(), "Delete which job?")? {
                        delete::delete(&mut board, &id, false).await?;
                    }
                }
                Action::Refresh => report_load(with_spinner(LOADING, board.load()).await),
                Action::Quit => return Ok(()),
            }
        }
    }
}

fn report_load(status: LoadStatus) {
    if status == LoadStatus::Failed {
        eprintln!(
            "{}",
            "Could not load jobs; showing the previous results.".warning()
        );
    }
}

fn show(view: &JobBoardView) {
    println!();
    let mut heading = format!("Jobs, sorted by {}", view.sort_by());
    let filters = view.filters();
    for (label, value) in [
        ("search", filters.search()),
        ("type", filters.job_type()),
        ("location", filters.location()),
        ("tag", filters.tag()),
    ] {
        if let Some(value) = value {
            heading.push_str(&format!(" · {label}: {value}"));
        }
    }
    println!("{}", heading.info());
    println!();
    print_page(view, false);
    println!();
}

async fn go_to_page(board: &mut Board<HttpJobsApi>) -> anyhow::Result<()> {
    let total = board.view().total_pages();
    let page: u32 = Input::new()
        .with_prompt(format!("Page (1-{total})"))
        .interact_text()?;

    let Some(status) = with_spinner(LOADING, board.change_page(page)).await else {
        eprintln!("{}", format!("No page {page}").warning());
        return Ok(());
    };
    report_load(status);
    Ok(())
}

/// Offers "any" plus the values present on the current page.
async fn pick_facet(board: &mut Board<HttpJobsApi>, facet: Facet) -> anyhow::Result<()> {
    let facets = board.view().facets();
    let filters = board.view().filters();
    let (prompt, values, current) = match facet {
        Facet::JobType => ("Job type", facets.job_types, filters.job_type()),
        Facet::Location => ("Location", facets.locations, filters.location()),
        Facet::Tag => ("Tag", facets.tags, filters.tag()),
    };

    let mut items = vec!["any".to_string()];
    items.extend(values);
    let default = current
        .and_then(|current| items.iter().position(|item| item == current))
        .unwrap_or(0);

    let choice = Select::new()
        .with_prompt(prompt)
        .items(items.as_slice())
        .default(default)
        .interact()?;
    let value = if choice == 0 {
        String::new()
    } else {
        items.swap_remove(choice)
    };

    match facet {
        Facet::JobType => with_spinner(LOADING, board.filter_job_type(value)).await,
        Facet::Location => with_spinner(LOADING, board.filter_location(value)).await,
        Facet::Tag => with_spinner(LOADING, board.filter_tag(value)).await,
    };
    Ok(())
}

fn pick_sort(board: &mut Board<HttpJobsApi>) -> anyhow::Result<()> {
    let current = board.view().sort_by();
    let default = SortField::ALL
        .iter()
        .position(|field| *field == current)
        .unwrap_or(0);

    let choice = Select::new()
        .with_prompt("Sort by")
        .items(SortField::ALL.as_slice())
        .default(default)
        .interact()?;
    board.sort_by(SortField::ALL[choice]);
    Ok(())
}

fn pick_job(view: &JobBoardView, prompt: &str) -> anyhow::Result<Option<JobId>> {
    let jobs = view.visible_jobs();
    let mut items: Vec<String> = jobs
        .iter()
        .map(|job| format!("{} at {} ({})", job.title, job.company, job.location))
        .collect();
    items.push("Back".to_string());

    let choice = Select::new()
        .with_prompt(prompt)
        .items(items.as_slice())
        .default(0)
        .interact()?;
    Ok(jobs.get(choice).map(|job| job.id.clone()))
}

/// Prompts for every field of the open form and submits it until it is
/// saved or the user gives up.
async fn edit_form(board: &mut Board<HttpJobsApi>) -> anyhow::Result<()> {
    loop {
        if let Some(draft) = board.draft_mut() {
            form::prompt_all(draft)?;
        }

        let retry = match form::submit(board).await {
            SubmitOutcome::Saved | SubmitOutcome::NoForm => return Ok(()),
            SubmitOutcome::Invalid(_) => "Fix the job and try again?",
            SubmitOutcome::Failed => "Try again?",
        };
        if !Confirm::new().with_prompt(retry).default(true).interact()? {
            board.cancel_form();
            return Ok(());
        }
    }
}
