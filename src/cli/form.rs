//! Filling in and submitting the job form from the command line.

use chrono::Local;
use dialoguer::Input;
use jobboard::{
    Board, Field, HttpJobsApi, JobDraft, SubmitOutcome, domain::job::DATE_FORMAT,
};

use super::terminal::{Colorize, is_interactive, with_spinner};

/// Job fields given as flags.
#[derive(Debug, Default, clap::Args)]
pub struct DraftArgs {
    /// Position title
    #[arg(long)]
    title: Option<String>,

    /// Hiring company
    #[arg(long)]
    company: Option<String>,

    /// Location
    #[arg(long)]
    location: Option<String>,

    /// Posting date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    posting_date: Option<String>,

    /// Job type, e.g. "Full-time"
    #[arg(long, value_name = "TYPE")]
    job_type: Option<String>,

    /// Comma-separated tags, e.g. "life, pricing"
    #[arg(long)]
    tags: Option<String>,

    /// Never prompt for missing fields
    #[arg(long)]
    no_input: bool,
}

impl DraftArgs {
    const fn values(&self) -> [(Field, Option<&String>); 6] {
        [
            (Field::Title, self.title.as_ref()),
            (Field::Company, self.company.as_ref()),
            (Field::Location, self.location.as_ref()),
            (Field::PostingDate, self.posting_date.as_ref()),
            (Field::JobType, self.job_type.as_ref()),
            (Field::Tags, self.tags.as_ref()),
        ]
    }

    /// Copies the given fields into `draft`; the rest are left alone.
    pub fn apply(&self, draft: &mut JobDraft) {
        for (field, value) in self.values() {
            if let Some(value) = value {
                draft.set(field, value.clone());
            }
        }
    }

    /// Whether no field was given.
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|(_, value)| value.is_none())
    }

    /// Whether prompting is allowed.
    pub fn interactive(&self) -> bool {
        !self.no_input && is_interactive()
    }
}

fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

fn prompt(field: Field, initial: &str) -> anyhow::Result<String> {
    let mut input = Input::<String>::new()
        .with_prompt(field.label())
        .allow_empty(!field.is_required());
    if initial.is_empty() {
        if field == Field::PostingDate {
            input = input.default(today());
        }
    } else {
        input = input.with_initial_text(initial);
    }
    Ok(input.interact_text()?)
}

/// Prompts for each required field that is still empty.
pub fn prompt_missing(draft: &mut JobDraft) -> anyhow::Result<()> {
    for field in Field::ALL {
        if field.is_required() && draft.get(field).trim().is_empty() {
            let value = prompt(field, "")?;
            draft.set(field, value);
        }
    }
    Ok(())
}

/// Prompts for every field, starting from the draft's current values.
pub fn prompt_all(draft: &mut JobDraft) -> anyhow::Result<()> {
    for field in Field::ALL {
        let value = prompt(field, draft.get(field))?;
        draft.set(field, value);
    }
    Ok(())
}

/// Submits the open form and prints the result.
///
/// Returns the outcome so the caller can decide whether to retry; the form
/// stays open unless the job was saved.
pub async fn submit(board: &mut Board<HttpJobsApi>) -> SubmitOutcome {
    let outcome = with_spinner("Saving job...", board.submit()).await;

    match &outcome {
        SubmitOutcome::Saved | SubmitOutcome::Failed => {
            if let Some(notice) = board.view().notice() {
                for line in notice.lines() {
                    let line = if outcome == SubmitOutcome::Saved {
                        format!("✅ {line}").success()
                    } else {
                        line.error()
                    };
                    eprintln!("{line}");
                }
            }
            board.view_mut().dismiss_notice();
        }
        SubmitOutcome::Invalid(errors) => {
            for message in errors.messages() {
                eprintln!("  • {}", message.error());
            }
        }
        SubmitOutcome::NoForm => {}
    }
    outcome
}

/// Turns a final outcome into the command's result.
pub fn finish(outcome: &SubmitOutcome) -> anyhow::Result<()> {
    match outcome {
        SubmitOutcome::Saved => Ok(()),
        SubmitOutcome::Invalid(errors) => {
            let count = errors.len();
            let noun = if count == 1 { "field" } else { "fields" };
            anyhow::bail!("job not saved: {count} invalid {noun}")
        }
        SubmitOutcome::Failed => anyhow::bail!("job not saved"),
        SubmitOutcome::NoForm => anyhow::bail!("no job form is open"),
    }
}
