//! The state of one job board session.
//!
//! [`JobBoardView`] is a plain state container. It performs no I/O: loads and
//! submissions are split into a `begin_*` step that produces the request to
//! make and a `finish_*` step that applies the response.

use super::{
    draft::{JobDraft, JobPayload, ValidationErrors},
    job::{Job, JobId, JobPage, Paging},
    query::{Facets, Filters, JobQuery, SortField, SortOrder, filter_jobs, sort_jobs},
};

/// Message shown after a successful create.
pub const CREATED_MESSAGE: &str = "Job posted successfully!";
/// Message shown after a successful update.
pub const UPDATED_MESSAGE: &str = "Job updated successfully!";
/// Message shown when a create or update request fails.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save job. Please try again.";

/// Session-local state of the job board.
#[derive(Debug, Clone)]
pub struct JobBoardView {
    jobs: Vec<Job>,
    loading: bool,
    filters: Filters,
    sort_by: SortField,
    server_order: Option<SortOrder>,
    current_page: u32,
    total_pages: u32,
    total_jobs: Option<u64>,
    limit: u32,
    paging: Option<Paging>,
    form: FormState,
    notice: Option<Notice>,
    last_issued: u64,
}

/// Handle for one in-flight load.
///
/// Tickets are numbered in issue order; only the most recently issued ticket
/// may change the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    query: JobQuery,
}

impl LoadTicket {
    /// The query to send for this load.
    #[must_use]
    pub const fn query(&self) -> &JobQuery {
        &self.query
    }

    /// The ticket's sequence number.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// What [`JobBoardView::finish_load`] did with a response.
#[derive(Debug)]
pub enum LoadOutcome<E> {
    /// The page replaced the held jobs.
    Applied,
    /// A newer load was issued; the response was discarded.
    Stale,
    /// The load failed; prior state was kept.
    Failed(E),
}

/// Whether the job form is shown, and what it is editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    /// No form is shown.
    #[default]
    Hidden,
    /// The form is open with a draft.
    Open {
        /// Whether the form creates a new job or edits an existing one.
        mode: FormMode,
        /// The draft being edited.
        draft: JobDraft,
    },
}

/// What an open form will submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// Post a new job.
    Create,
    /// Update the job with this id.
    Edit(JobId),
}

/// A user-facing message about the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The action succeeded.
    Success(String),
    /// The action failed.
    Error(String),
    /// The draft failed validation; one message per field.
    Invalid(ValidationErrors),
}

impl Notice {
    /// The lines to display for this notice.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Success(message) | Self::Error(message) => vec![message.clone()],
            Self::Invalid(errors) => errors.messages(),
        }
    }
}

/// A validated submission, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Where the payload goes.
    pub target: FormMode,
    /// The normalized job.
    pub payload: JobPayload,
}

/// Why a submission was not produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    /// There is no open form to submit.
    #[error("no job form is open")]
    NoForm,
    /// The draft failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

impl JobBoardView {
    /// An empty view that loads pages of `limit` jobs.
    #[must_use]
    pub fn new(limit: u32, sort_by: SortField) -> Self {
        Self {
            jobs: Vec::new(),
            loading: false,
            filters: Filters::default(),
            sort_by,
            server_order: None,
            current_page: 1,
            total_pages: 1,
            total_jobs: None,
            limit: limit.max(1),
            paging: None,
            form: FormState::Hidden,
            notice: None,
            last_issued: 0,
        }
    }

    /// The jobs of the current page, in server order.
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Looks up a held job by id.
    #[must_use]
    pub fn job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| &job.id == id)
    }

    /// Whether a load is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The active filters.
    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    /// The client-side sort field.
    #[must_use]
    pub const fn sort_by(&self) -> SortField {
        self.sort_by
    }

    /// The current page (1-based).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// The number of pages reported by the last load.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Total matching jobs, if the server reported it.
    #[must_use]
    pub const fn total_jobs(&self) -> Option<u64> {
        self.total_jobs
    }

    /// The page size requested from the server.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// How the last applied page was produced, if any page was loaded.
    #[must_use]
    pub const fn paging(&self) -> Option<Paging> {
        self.paging
    }

    /// The form state.
    #[must_use]
    pub const fn form(&self) -> &FormState {
        &self.form
    }

    /// The last notice, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Clears the notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The jobs to display.
    ///
    /// A bare (unpaginated) response is searched and filtered here. A
    /// server-paginated page has already been filtered. Either way the
    /// client-side sort is applied.
    #[must_use]
    pub fn visible_jobs(&self) -> Vec<Job> {
        let mut jobs = match self.paging {
            Some(Paging::Server(_)) => self.jobs.clone(),
            Some(Paging::Unpaginated) | None => filter_jobs(&self.jobs, &self.filters),
        };
        sort_jobs(&mut jobs, self.sort_by);
        jobs
    }

    /// Distinct filter values in the held jobs.
    #[must_use]
    pub fn facets(&self) -> Facets {
        Facets::collect(&self.jobs)
    }

    /// Starts a load of the current page with the current filters.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        self.last_issued += 1;
        LoadTicket {
            seq: self.last_issued,
            query: self.query(),
        }
    }

    /// The query the next load would send.
    #[must_use]
    pub fn query(&self) -> JobQuery {
        JobQuery {
            page: self.current_page,
            limit: self.limit,
            filters: self.filters.clone(),
            ordering: self.server_order.map(|order| (self.sort_by, order)),
        }
    }

    /// Applies the response to a load.
    ///
    /// Responses to anything but the latest ticket are discarded without
    /// touching the view. For the latest ticket, `loading` is cleared whether
    /// the load succeeded or not, and a failure leaves prior jobs and
    /// pagination in place.
    pub fn finish_load<E>(&mut self, ticket: &LoadTicket, result: Result<JobPage, E>) -> LoadOutcome<E> {
        if ticket.seq != self.last_issued {
            return LoadOutcome::Stale;
        }
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(error) => return LoadOutcome::Failed(error),
        };

        match page.paging {
            Paging::Server(pagination) => {
                self.current_page = pagination.current_page.max(1);
                self.total_pages = pagination.total_pages.max(1);
                self.total_jobs = pagination.total_jobs;
            }
            Paging::Unpaginated => {
                self.current_page = 1;
                self.total_pages = 1;
                self.total_jobs = u64::try_from(page.jobs.len()).ok();
            }
        }
        self.paging = Some(page.paging);
        self.jobs = page.jobs;

        LoadOutcome::Applied
    }

    /// Sets the search term; resets to page 1 on change.
    pub fn set_search(&mut self, term: impl Into<String>) -> bool {
        let changed = self.filters.set_search(term);
        self.reset_page_if(changed)
    }

    /// Sets the job type filter; resets to page 1 on change.
    pub fn set_job_type_filter(&mut self, value: impl Into<String>) -> bool {
        let changed = self.filters.set_job_type(value);
        self.reset_page_if(changed)
    }

    /// Sets the location filter; resets to page 1 on change.
    pub fn set_location_filter(&mut self, value: impl Into<String>) -> bool {
        let changed = self.filters.set_location(value);
        self.reset_page_if(changed)
    }

    /// Sets the tag filter; resets to page 1 on change.
    pub fn set_tag_filter(&mut self, value: impl Into<String>) -> bool {
        let changed = self.filters.set_tag(value);
        self.reset_page_if(changed)
    }

    /// Clears the search term and all filters; resets to page 1 on change.
    pub fn clear_filters(&mut self) -> bool {
        let changed = !self.filters.is_empty();
        self.filters = Filters::default();
        self.reset_page_if(changed)
    }

    const fn reset_page_if(&mut self, changed: bool) -> bool {
        if changed {
            self.current_page = 1;
        }
        changed
    }

    /// Sets the client-side sort field.
    pub const fn set_sort(&mut self, field: SortField) {
        self.sort_by = field;
    }

    /// Also asks the server to order results by the sort field.
    pub const fn set_server_order(&mut self, order: Option<SortOrder>) {
        self.server_order = order;
    }

    /// Moves to page `page`.
    ///
    /// Returns `false` without changing anything if `page` is outside
    /// `1..=total_pages` or is already the current page.
    pub const fn change_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.total_pages || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Sets the page for the next load without bounds checks.
    ///
    /// Used before the first load, when the number of pages is not yet
    /// known.
    pub fn start_at_page(&mut self, page: u32) {
        self.current_page = page.max(1);
    }

    /// Opens an empty form for posting a job.
    pub fn open_create(&mut self) {
        self.notice = None;
        self.form = FormState::Open {
            mode: FormMode::Create,
            draft: JobDraft::default(),
        };
    }

    /// Opens a form prefilled from `job`.
    pub fn open_edit(&mut self, job: &Job) {
        self.notice = None;
        self.form = FormState::Open {
            mode: FormMode::Edit(job.id.clone()),
            draft: JobDraft::from_job(job),
        };
    }

    /// Hides the form and discards the draft.
    pub fn close_form(&mut self) {
        self.form = FormState::Hidden;
    }

    /// Mutable access to the draft while the form is open.
    pub const fn draft_mut(&mut self) -> Option<&mut JobDraft> {
        match &mut self.form {
            FormState::Open { draft, .. } => Some(draft),
            FormState::Hidden => None,
        }
    }

    /// The draft, while the form is open.
    #[must_use]
    pub const fn draft(&self) -> Option<&JobDraft> {
        match &self.form {
            FormState::Open { draft, .. } => Some(draft),
            FormState::Hidden => None,
        }
    }

    /// Validates the open draft and produces the request to send.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitRejected::NoForm`] if the form is hidden, or
    /// [`SubmitRejected::Invalid`] if validation fails. In the latter case
    /// the per-field messages are also set as the notice.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitRejected> {
        let FormState::Open { mode, draft } = &self.form else {
            return Err(SubmitRejected::NoForm);
        };

        match draft.validate() {
            Ok(payload) => {
                let submission = Submission {
                    target: mode.clone(),
                    payload,
                };
                self.notice = None;
                Ok(submission)
            }
            Err(errors) => {
                self.notice = Some(Notice::Invalid(errors.clone()));
                Err(errors.into())
            }
        }
    }

    /// Applies the result of a submission.
    ///
    /// On success the form closes and the draft is discarded. On failure the
    /// form stays open with its draft so the user can retry.
    ///
    /// # Errors
    ///
    /// Passes a failed `result` through unchanged, after setting the
    /// save-failed notice.
    pub fn finish_submit<E>(&mut self, target: &FormMode, result: Result<(), E>) -> Result<(), E> {
        match result {
            Ok(()) => {
                let message = match target {
                    FormMode::Create => CREATED_MESSAGE,
                    FormMode::Edit(_) => UPDATED_MESSAGE,
                };
                self.notice = Some(Notice::Success(message.to_string()));
                self.form = FormState::Hidden;
                Ok(())
            }
            Err(error) => {
                self.notice = Some(Notice::Error(SAVE_FAILED_MESSAGE.to_string()));
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{Field, job::Pagination, job::tests::job};

    const fn server_page(jobs: Vec<Job>, current_page: u32, total_pages: u32) -> JobPage {
        JobPage {
            jobs,
            paging: Paging::Server(Pagination {
                current_page,
                total_pages,
                total_jobs: Some(42),
                limit: Some(20),
            }),
        }
    }

    fn loaded_view(current_page: u32, total_pages: u32) -> JobBoardView {
        let mut view = JobBoardView::new(20, SortField::Title);
        let ticket = view.begin_load();
        let outcome = view.finish_load::<()>(
            &ticket,
            Ok(server_page(
                vec![job("1", "Actuary", "Acme", "London")],
                current_page,
                total_pages,
            )),
        );
        assert!(matches!(outcome, LoadOutcome::Applied));
        view
    }

    #[test_case(0, false; "below first page")]
    #[test_case(1, true; "first page")]
    #[test_case(2, false; "current page")]
    #[test_case(3, true; "last page")]
    #[test_case(4, false; "past last page")]
    fn change_page_bounds(page: u32, accepted: bool) {
        let mut view = loaded_view(2, 3);

        assert_eq!(view.change_page(page), accepted);
        let expected = if accepted { page } else { 2 };
        assert_eq!(view.current_page(), expected);
    }

    #[test]
    fn filter_change_resets_page() {
        let mut view = loaded_view(3, 5);

        assert!(view.set_location_filter("London"));
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.query().filters.location(), Some("London"));
    }

    #[test]
    fn unchanged_filter_keeps_page() {
        let mut view = loaded_view(3, 5);
        view.set_tag_filter("");

        assert!(!view.set_tag_filter("  "));
        assert_eq!(view.current_page(), 3);
    }

    #[test]
    fn successful_load_adopts_server_pagination() {
        let view = loaded_view(2, 4);

        assert!(!view.is_loading());
        assert_eq!(view.current_page(), 2);
        assert_eq!(view.total_pages(), 4);
        assert_eq!(view.total_jobs(), Some(42));
        assert_eq!(view.jobs().len(), 1);
    }

    #[test]
    fn paging_reflects_last_applied_response() {
        let mut view = JobBoardView::new(20, SortField::Title);
        assert_eq!(view.paging(), None);

        let ticket = view.begin_load();
        view.finish_load::<()>(&ticket, Ok(server_page(Vec::new(), 1, 1)));
        assert!(matches!(view.paging(), Some(Paging::Server(_))));

        let ticket = view.begin_load();
        view.finish_load::<()>(
            &ticket,
            Ok(JobPage {
                jobs: Vec::new(),
                paging: Paging::Unpaginated,
            }),
        );
        assert_eq!(view.paging(), Some(Paging::Unpaginated));

        let ticket = view.begin_load();
        view.finish_load::<&str>(&ticket, Err("timeout"));
        assert_eq!(view.paging(), Some(Paging::Unpaginated));
    }

    #[test]
    fn unpaginated_load_is_a_single_page() {
        let mut view = JobBoardView::new(20, SortField::Title);
        view.start_at_page(3);
        let ticket = view.begin_load();
        assert_eq!(ticket.query().page, 3);

        view.finish_load::<()>(
            &ticket,
            Ok(JobPage {
                jobs: vec![job("1", "a", "b", "c"), job("2", "d", "e", "f")],
                paging: Paging::Unpaginated,
            }),
        );

        assert_eq!(view.current_page(), 1);
        assert_eq!(view.total_pages(), 1);
        assert_eq!(view.total_jobs(), Some(2));
    }

    #[test]
    fn failed_load_keeps_prior_state_and_clears_loading() {
        let mut view = loaded_view(2, 4);
        let ticket = view.begin_load();
        assert!(view.is_loading());

        let outcome = view.finish_load(&ticket, Err("connection refused"));

        assert!(matches!(outcome, LoadOutcome::Failed("connection refused")));
        assert!(!view.is_loading());
        assert_eq!(view.jobs().len(), 1);
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut view = JobBoardView::new(20, SortField::Title);
        let first = view.begin_load();
        let second = view.begin_load();
        assert!(second.seq() > first.seq());

        let fresh = server_page(vec![job("2", "Fresh", "Acme", "Remote")], 1, 1);
        assert!(matches!(
            view.finish_load::<()>(&second, Ok(fresh)),
            LoadOutcome::Applied
        ));

        let stale = server_page(vec![job("1", "Stale", "Acme", "Remote")], 1, 1);
        assert!(matches!(
            view.finish_load::<()>(&first, Ok(stale)),
            LoadOutcome::Stale
        ));
        assert_eq!(view.jobs()[0].title, "Fresh");
    }

    #[test]
    fn stale_response_does_not_clear_loading() {
        let mut view = JobBoardView::new(20, SortField::Title);
        let first = view.begin_load();
        let _second = view.begin_load();

        view.finish_load::<()>(&first, Ok(server_page(Vec::new(), 1, 1)));

        assert!(view.is_loading());
    }

    #[test]
    fn visible_jobs_filters_unpaginated_results_client_side() {
        let mut view = JobBoardView::new(20, SortField::Title);
        view.set_search("eng");
        let ticket = view.begin_load();
        view.finish_load::<()>(
            &ticket,
            Ok(JobPage {
                jobs: vec![
                    job("1", "Manager", "Acme", "Paris"),
                    job("2", "Engineer", "Acme", "Paris"),
                ],
                paging: Paging::Unpaginated,
            }),
        );

        let visible = view.visible_jobs();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Engineer");
    }

    #[test]
    fn visible_jobs_trusts_server_filtering_but_sorts() {
        let mut view = JobBoardView::new(20, SortField::Title);
        view.set_location_filter("London");
        let ticket = view.begin_load();
        view.finish_load::<()>(
            &ticket,
            Ok(server_page(
                vec![
                    job("1", "b", "Acme", "London, UK"),
                    job("2", "A", "Acme", "Greater London"),
                ],
                1,
                1,
            )),
        );

        let titles: Vec<String> = view.visible_jobs().into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["A", "b"]);
    }

    #[test]
    fn form_opens_for_create_and_edit() {
        let mut view = JobBoardView::new(20, SortField::Title);
        assert_eq!(view.form(), &FormState::Hidden);
        assert!(view.draft_mut().is_none());

        view.open_create();
        assert_eq!(view.draft(), Some(&JobDraft::default()));

        let existing = job("7", "Actuary", "Acme", "London");
        view.open_edit(&existing);
        assert!(matches!(
            view.form(),
            FormState::Open { mode: FormMode::Edit(id), draft } if id.as_str() == "7" && draft.title == "Actuary"
        ));

        view.close_form();
        assert_eq!(view.form(), &FormState::Hidden);
    }

    #[test]
    fn submit_without_form_is_rejected() {
        let mut view = JobBoardView::new(20, SortField::Title);
        assert_eq!(view.begin_submit(), Err(SubmitRejected::NoForm));
    }

    #[test]
    fn invalid_submit_sets_per_field_notice() {
        let mut view = JobBoardView::new(20, SortField::Title);
        view.open_create();
        view.draft_mut().unwrap().title = "Actuary".to_string();

        let Err(SubmitRejected::Invalid(errors)) = view.begin_submit() else {
            panic!("expected validation failure");
        };

        assert_eq!(
            errors.fields(),
            vec![
                Field::Company,
                Field::Location,
                Field::PostingDate,
                Field::JobType
            ]
        );
        assert_eq!(view.notice().unwrap().lines().len(), 4);
        assert!(matches!(view.form(), FormState::Open { .. }));
    }

    #[test]
    fn successful_submit_closes_form() {
        let mut view = JobBoardView::new(20, SortField::Title);
        view.open_edit(&job("3", "Actuary", "Acme", "London"));

        let submission = view.begin_submit().unwrap();
        assert_eq!(submission.target, FormMode::Edit("3".parse().unwrap()));

        view.finish_submit::<()>(&submission.target, Ok(())).unwrap();

        assert_eq!(view.form(), &FormState::Hidden);
        assert_eq!(
            view.notice(),
            Some(&Notice::Success(UPDATED_MESSAGE.to_string()))
        );
    }

    #[test]
    fn failed_submit_keeps_draft() {
        let mut view = JobBoardView::new(20, SortField::Title);
        view.open_create();
        *view.draft_mut().unwrap() = JobDraft {
            title: "Actuary".to_string(),
            company: "Acme".to_string(),
            location: "London".to_string(),
            posting_date: "2024-01-02".to_string(),
            job_type: "Full-time".to_string(),
            tags: String::new(),
        };

        let submission = view.begin_submit().unwrap();
        let result = view.finish_submit(&submission.target, Err("timeout"));

        assert_eq!(result, Err("timeout"));
        assert_eq!(view.draft().unwrap().title, "Actuary");
        assert_eq!(
            view.notice(),
            Some(&Notice::Error(SAVE_FAILED_MESSAGE.to_string()))
        );
    }

    #[test]
    fn dismissed_notice_is_gone_but_form_stays() {
        let mut view = JobBoardView::new(20, SortField::Title);
        view.open_create();
        assert!(view.begin_submit().is_err());
        assert!(view.notice().is_some());

        view.dismiss_notice();

        assert_eq!(view.notice(), None);
        assert!(matches!(view.form(), FormState::Open { .. }));
    }
}
