//! Job Board Client
//!
//! A client for a REST service that lists job postings. The board view keeps
//! one page of jobs together with the search, filter, sort and pagination
//! state, and refreshes it from the service after every change.

pub mod domain;
pub use domain::{Config, Field, Job, JobBoardView, JobDraft, JobId, SortField, SortOrder};

/// Access to the remote jobs resource.
pub mod api;
pub use api::{ApiError, HttpJobsApi, JobsApi};

/// The controller tying the board view to the jobs resource.
pub mod board;
pub use board::{Board, DeleteOutcome, LoadStatus, SubmitOutcome};
