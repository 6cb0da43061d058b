use std::future::Future;

use serde::Deserialize;

use crate::domain::{Job, JobId, JobPage, JobPayload, JobQuery, Pagination, Paging};

mod http;
pub use http::{HttpJobsApi, USER_AGENT, job_url, list_url};

/// The remote jobs resource.
///
/// Implementations perform one HTTP exchange per call and never retry.
#[cfg_attr(test, mockall::automock)]
pub trait JobsApi {
    /// Fetches one page of jobs (`GET /jobs`).
    fn list(&self, query: &JobQuery) -> impl Future<Output = Result<JobPage, ApiError>>;

    /// Creates a job (`POST /jobs`).
    fn create(&self, payload: &JobPayload) -> impl Future<Output = Result<(), ApiError>>;

    /// Replaces the editable fields of a job (`PUT /jobs/{id}`).
    fn update(&self, id: &JobId, payload: &JobPayload)
    -> impl Future<Output = Result<(), ApiError>>;

    /// Removes a job (`DELETE /jobs/{id}`).
    fn delete(&self, id: &JobId) -> impl Future<Output = Result<(), ApiError>>;
}

/// Failure talking to the jobs resource.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL cannot have paths appended to it.
    #[error("base URL '{0}' cannot be used for requests")]
    BaseUrl(url::Url),
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server responded with {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The server's explanation, if it gave one.
        message: String,
    },
    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The two shapes a list response can take.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Paginated {
        jobs: Vec<Job>,
        pagination: Pagination,
    },
    Bare(Vec<Job>),
}

/// Parses the body of a `GET /jobs` response.
///
/// # Errors
///
/// Returns an error if the body is neither a paginated object nor a bare
/// array of jobs.
pub fn parse_list_body(body: &str) -> Result<JobPage, serde_json::Error> {
    Ok(match serde_json::from_str(body)? {
        ListResponse::Paginated { jobs, pagination } => JobPage {
            jobs,
            paging: Paging::Server(pagination),
        },
        ListResponse::Bare(jobs) => JobPage {
            jobs,
            paging: Paging::Unpaginated,
        },
    })
}

/// Extracts a human-readable message from an error response body.
///
/// The service reports errors as `{"error": "..."}` or `{"message": "..."}`;
/// anything else is passed through, shortened.
#[must_use]
pub fn error_message(body: &str) -> String {
    const MAX_LEN: usize = 200;

    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        message: Option<String>,
    }

    if let Ok(ErrorBody { error, message }) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(text) = error.or(message) {
            return text;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no details given".to_string()
    } else if trimmed.chars().count() > MAX_LEN {
        let shortened: String = trimmed.chars().take(MAX_LEN).collect();
        format!("{shortened}…")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paginated_response() {
        let page = parse_list_body(
            r#"{
                "jobs": [{"id": 1, "title": "Actuary", "company": "Acme", "location": "London",
                          "posting_date": "2024-02-01", "job_type": "Full-time", "tags": ["life"]}],
                "pagination": {"total_jobs": 41, "total_pages": 3, "current_page": 2, "limit": 20}
            }"#,
        )
        .unwrap();

        assert_eq!(page.jobs.len(), 1);
        assert_eq!(
            page.paging,
            Paging::Server(Pagination {
                current_page: 2,
                total_pages: 3,
                total_jobs: Some(41),
                limit: Some(20),
            })
        );
    }

    #[test]
    fn parses_bare_array_response() {
        let page = parse_list_body(
            r#"[{"id": "a", "title": "Actuary", "company": "Acme", "location": "London",
                 "posting_date": "2024-02-01", "job_type": "Full-time"}]"#,
        )
        .unwrap();

        assert_eq!(page.jobs[0].id.as_str(), "a");
        assert_eq!(page.paging, Paging::Unpaginated);
    }

    #[test]
    fn parses_empty_paginated_response() {
        let page = parse_list_body(
            r#"{"jobs": [], "pagination": {"current_page": 1, "total_pages": 0}}"#,
        )
        .unwrap();

        assert!(page.jobs.is_empty());
    }

    #[test]
    fn rejects_unexpected_shape() {
        assert!(parse_list_body(r#"{"message": "hello"}"#).is_err());
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"error": "title is required."}"#), "title is required.");
        assert_eq!(error_message(r#"{"message": "Not found"}"#), "Not found");
    }

    #[test]
    fn error_message_falls_back_to_body() {
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_message(""), "no details given");
        assert_eq!(error_message(&"x".repeat(500)).chars().count(), 201);
    }
}
