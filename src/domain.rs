//! Domain models for the job board.
//!
//! This module contains the job record, the editable draft and its
//! validation, search/filter/sort rules, client configuration, and the
//! session state of the board view.

/// Job records and list responses.
pub mod job;
pub use job::{InvalidJobIdError, Job, JobId, JobPage, Pagination, Paging};

/// Editable drafts and their validation.
pub mod draft;
pub use draft::{Field, FieldError, JobDraft, JobPayload, ValidationErrors, split_tags};

/// Searching, filtering and sorting.
pub mod query;
pub use query::{
    Facets, Filters, JobQuery, SortField, SortOrder, UnknownSortFieldError, filter_jobs,
    matches_search, sort_jobs,
};

mod config;
pub use config::{Config, ConfigError};

pub mod view;
pub use view::{
    FormMode, FormState, JobBoardView, LoadOutcome, LoadTicket, Notice, Submission,
    SubmitRejected,
};
