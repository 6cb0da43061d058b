use anyhow::Context as _;
use clap::Parser;
use jobboard::JobId;
use tracing::instrument;

use super::{
    Context, find_job,
    form::{self, DraftArgs},
};

/// Command arguments for `jobs edit`.
#[derive(Debug, Parser)]
#[command(about = "Edit an existing job")]
pub struct Edit {
    /// The id of the job to edit
    id: JobId,

    /// New values; fields not given keep their current value.
    #[command(flatten)]
    fields: DraftArgs,
}

impl Edit {
    #[instrument(level = "debug", skip_all, fields(id = %self.id))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let mut board = context.board(None)?;
        find_job(&mut board, &self.id).await?;

        if !board.open_edit(&self.id) {
            anyhow::bail!("job {} not found", self.id);
        }
        let draft = board.draft_mut().context("job form did not open")?;
        self.fields.apply(draft);
        if self.fields.is_empty() && self.fields.interactive() {
            form::prompt_all(draft)?;
        }

        let outcome = form::submit(&mut board).await;
        form::finish(&outcome)
    }
}
