use anyhow::Context as _;
use clap::Parser;
use tracing::instrument;

use super::{
    Context,
    form::{self, DraftArgs},
};

/// Command arguments for `jobs add`.
#[derive(Debug, Parser)]
#[command(about = "Post a new job")]
pub struct Add {
    #[command(flatten)]
    fields: DraftArgs,
}

impl Add {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let mut board = context.board(None)?;

        board.open_create();
        let draft = board.draft_mut().context("job form did not open")?;
        self.fields.apply(draft);
        if self.fields.interactive() {
            form::prompt_missing(draft)?;
        }

        let outcome = form::submit(&mut board).await;
        form::finish(&outcome)
    }
}
