use tracing::{debug, info, instrument, warn};

use crate::{
    api::JobsApi,
    domain::{
        FormMode, Job, JobBoardView, JobDraft, JobId, LoadOutcome, SortField, SortOrder,
        SubmitRejected, ValidationErrors,
    },
};

/// Drives a [`JobBoardView`] against a [`JobsApi`].
///
/// Every user action maps to one method. Reads never fail loudly: a failed
/// load is logged and the previous page stays on screen. Writes report their
/// outcome so the caller can show it.
#[derive(Debug)]
pub struct Board<A> {
    api: A,
    view: JobBoardView,
}

/// Result of [`Board::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// A fresh page is shown.
    Loaded,
    /// The request failed; the previous page is still shown.
    Failed,
    /// The response was superseded by a newer load.
    Superseded,
}

/// Result of [`Board::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The job was saved, the form closed and the list reloaded.
    Saved,
    /// The draft is invalid; nothing was sent.
    Invalid(ValidationErrors),
    /// The request failed; the form is still open.
    Failed,
    /// No form was open.
    NoForm,
}

/// Result of [`Board::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The job was deleted and the list reloaded.
    Deleted,
    /// The user declined; nothing was sent.
    Cancelled,
    /// The request failed.
    Failed,
}

impl<A: JobsApi> Board<A> {
    /// Creates a board; nothing is loaded until [`Board::load`] is called.
    pub const fn new(api: A, view: JobBoardView) -> Self {
        Self { api, view }
    }

    /// The current view state.
    pub const fn view(&self) -> &JobBoardView {
        &self.view
    }

    /// Mutable access to the view state.
    ///
    /// Changes made here take effect on the next [`Board::load`]; nothing is
    /// fetched.
    pub const fn view_mut(&mut self) -> &mut JobBoardView {
        &mut self.view
    }

    /// The underlying API client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Mutable access to the open form's draft.
    pub const fn draft_mut(&mut self) -> Option<&mut JobDraft> {
        self.view.draft_mut()
    }

    /// Fetches the current page with the current filters.
    ///
    /// If the server reports fewer pages than the current page (for example
    /// after the last job on the last page was deleted), the last page is
    /// fetched instead.
    #[instrument(level = "debug", skip(self))]
    pub async fn load(&mut self) -> LoadStatus {
        let status = self.fetch().await;

        let (current, total) = (self.view.current_page(), self.view.total_pages());
        if status == LoadStatus::Loaded && self.view.jobs().is_empty() && current > total {
            debug!(current, total, "page out of range, moving to last page");
            self.view.start_at_page(total);
            return self.fetch().await;
        }
        status
    }

    async fn fetch(&mut self) -> LoadStatus {
        let ticket = self.view.begin_load();
        let result = self.api.list(ticket.query()).await;

        match self.view.finish_load(&ticket, result) {
            LoadOutcome::Applied => {
                debug!(
                    page = self.view.current_page(),
                    total_pages = self.view.total_pages(),
                    jobs = self.view.jobs().len(),
                    "jobs loaded"
                );
                LoadStatus::Loaded
            }
            LoadOutcome::Failed(error) => {
                warn!(%error, "error fetching jobs");
                LoadStatus::Failed
            }
            LoadOutcome::Stale => {
                debug!(seq = ticket.seq(), "discarding superseded response");
                LoadStatus::Superseded
            }
        }
    }

    /// Sets the search term and reloads page 1 if it changed.
    pub async fn search(&mut self, term: impl Into<String>) -> bool {
        let changed = self.view.set_search(term);
        self.reload_if(changed).await
    }

    /// Sets the job type filter and reloads page 1 if it changed.
    pub async fn filter_job_type(&mut self, value: impl Into<String>) -> bool {
        let changed = self.view.set_job_type_filter(value);
        self.reload_if(changed).await
    }

    /// Sets the location filter and reloads page 1 if it changed.
    pub async fn filter_location(&mut self, value: impl Into<String>) -> bool {
        let changed = self.view.set_location_filter(value);
        self.reload_if(changed).await
    }

    /// Sets the tag filter and reloads page 1 if it changed.
    pub async fn filter_tag(&mut self, value: impl Into<String>) -> bool {
        let changed = self.view.set_tag_filter(value);
        self.reload_if(changed).await
    }

    /// Clears the search term and all filters, reloading if any were set.
    pub async fn clear_filters(&mut self) -> bool {
        let changed = self.view.clear_filters();
        self.reload_if(changed).await
    }

    async fn reload_if(&mut self, changed: bool) -> bool {
        if changed {
            self.load().await;
        }
        changed
    }

    /// Changes the client-side sort. No request is made.
    pub const fn sort_by(&mut self, field: SortField) {
        self.view.set_sort(field);
    }

    /// Also asks the server to order by the sort field from the next load.
    pub const fn server_order(&mut self, order: Option<SortOrder>) {
        self.view.set_server_order(order);
    }

    /// Moves to `page` and loads it.
    ///
    /// Returns `None` without making a request if the page is out of range
    /// or already current. A failed load leaves the new page number in
    /// place over the previous page's jobs.
    #[instrument(level = "debug", skip(self))]
    pub async fn change_page(&mut self, page: u32) -> Option<LoadStatus> {
        if !self.view.change_page(page) {
            debug!("page change ignored");
            return None;
        }
        Some(self.load().await)
    }

    /// Loads the next page, if there is one.
    pub async fn next_page(&mut self) -> Option<LoadStatus> {
        let page = self.view.current_page().saturating_add(1);
        self.change_page(page).await
    }

    /// Loads the previous page, if there is one.
    pub async fn previous_page(&mut self) -> Option<LoadStatus> {
        let page = self.view.current_page().saturating_sub(1);
        self.change_page(page).await
    }

    /// Opens an empty form for posting a job.
    pub fn open_create(&mut self) {
        self.view.open_create();
    }

    /// Opens the form prefilled from the held job `id`.
    ///
    /// Returns `false` if no such job is on the current page.
    pub fn open_edit(&mut self, id: &JobId) -> bool {
        let Some(job) = self.view.job(id).cloned() else {
            return false;
        };
        self.view.open_edit(&job);
        true
    }

    /// Closes the form, discarding the draft.
    pub fn cancel_form(&mut self) {
        self.view.close_form();
    }

    /// Validates and sends the open form.
    ///
    /// An invalid draft is never sent. A successful save closes the form and
    /// triggers exactly one reload; a failed one leaves the form open.
    #[instrument(level = "debug", skip(self))]
    pub async fn submit(&mut self) -> SubmitOutcome {
        let submission = match self.view.begin_submit() {
            Ok(submission) => submission,
            Err(SubmitRejected::NoForm) => return SubmitOutcome::NoForm,
            Err(SubmitRejected::Invalid(errors)) => {
                debug!(fields = ?errors.fields(), "draft failed validation");
                return SubmitOutcome::Invalid(errors);
            }
        };

        let result = match &submission.target {
            FormMode::Create => self.api.create(&submission.payload).await,
            FormMode::Edit(id) => self.api.update(id, &submission.payload).await,
        };

        match self.view.finish_submit(&submission.target, result) {
            Ok(()) => {
                info!(mode = ?submission.target, "job saved");
                self.load().await;
                SubmitOutcome::Saved
            }
            Err(error) => {
                warn!(%error, "error saving job");
                SubmitOutcome::Failed
            }
        }
    }

    /// Deletes job `id` after `confirm` approves it.
    ///
    /// `confirm` receives the job if it is on the current page. Declining
    /// sends nothing; a failed request is only logged.
    #[instrument(level = "debug", skip(self, confirm))]
    pub async fn delete<F>(&mut self, id: &JobId, confirm: F) -> DeleteOutcome
    where
        F: FnOnce(&JobId, Option<&Job>) -> bool,
    {
        if !confirm(id, self.view.job(id)) {
            debug!("deletion cancelled");
            return DeleteOutcome::Cancelled;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                info!("job deleted");
                self.load().await;
                DeleteOutcome::Deleted
            }
            Err(error) => {
                warn!(%error, "error deleting job");
                DeleteOutcome::Failed
            }
        }
    }
}
