use clap::Parser;
use dialoguer::Confirm;
use jobboard::{Board, DeleteOutcome, HttpJobsApi, Job, JobId};
use tracing::instrument;

use super::{
    Context, find_job,
    terminal::{Colorize, is_interactive},
};

/// Command arguments for `jobs delete`.
#[derive(Debug, Parser)]
#[command(about = "Delete a job")]
pub struct Delete {
    /// The id of the job to delete
    id: JobId,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument(level = "debug", skip_all, fields(id = %self.id))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        if !self.yes && !is_interactive() {
            anyhow::bail!("refusing to delete without confirmation; pass --yes");
        }

        let mut board = context.board(None)?;
        find_job(&mut board, &self.id).await?;

        match delete(&mut board, &self.id, self.yes).await? {
            DeleteOutcome::Deleted | DeleteOutcome::Cancelled => Ok(()),
            DeleteOutcome::Failed => anyhow::bail!("failed to delete job {}", self.id),
        }
    }
}

/// Deletes job `id`, asking first unless `skip_prompt` is set, and prints
/// the result.
pub async fn delete(
    board: &mut Board<HttpJobsApi>,
    id: &JobId,
    skip_prompt: bool,
) -> anyhow::Result<DeleteOutcome> {
    let mut prompt_error = None;
    let confirm = |id: &JobId, job: Option<&Job>| {
        if skip_prompt {
            return true;
        }
        confirm_delete(id, job).unwrap_or_else(|error| {
            prompt_error = Some(error);
            false
        })
    };

    let outcome = board.delete(id, confirm).await;
    if let Some(error) = prompt_error {
        return Err(error);
    }

    match outcome {
        DeleteOutcome::Deleted => println!("{}", format!("✅ Deleted job {id}").success()),
        DeleteOutcome::Cancelled => println!("Cancelled"),
        DeleteOutcome::Failed => eprintln!("{}", format!("Failed to delete job {id}").error()),
    }
    Ok(outcome)
}

fn confirm_delete(id: &JobId, job: Option<&Job>) -> anyhow::Result<bool> {
    let prompt = job.map_or_else(
        || format!("Delete job {id}?"),
        |job| format!("Delete \"{}\" at {} (id {id})?", job.title, job.company),
    );
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
