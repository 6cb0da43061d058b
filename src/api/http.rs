use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, JobsApi, error_message, parse_list_body};
use crate::domain::{Config, JobId, JobPage, JobPayload, JobQuery};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// [`JobsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpJobsApi {
    client: Client,
    base_url: Url,
}

impl HttpJobsApi {
    /// Builds a client for the service configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
        })
    }

    /// The service root URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Transport)?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::Status {
                status,
                message: error_message(&body),
            })
        }
    }
}

impl JobsApi for HttpJobsApi {
    #[instrument(level = "debug", skip(self))]
    async fn list(&self, query: &JobQuery) -> Result<JobPage, ApiError> {
        let url = list_url(&self.base_url, query)?;
        debug!(%url, "fetching jobs");

        let body = self.send(self.client.get(url)).await?;
        let page = parse_list_body(&body)?;
        debug!(count = page.jobs.len(), "fetched jobs");
        Ok(page)
    }

    #[instrument(level = "debug", skip_all)]
    async fn create(&self, payload: &JobPayload) -> Result<(), ApiError> {
        let url = jobs_url(&self.base_url)?;
        debug!(%url, title = %payload.title, "creating job");

        self.send(self.client.post(url).json(payload)).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, payload))]
    async fn update(&self, id: &JobId, payload: &JobPayload) -> Result<(), ApiError> {
        let url = job_url(&self.base_url, id)?;
        debug!(%url, "updating job");

        self.send(self.client.put(url).json(payload)).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, id: &JobId) -> Result<(), ApiError> {
        let url = job_url(&self.base_url, id)?;
        debug!(%url, "deleting job");

        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

/// Appends path segments to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::BaseUrl(base.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn jobs_url(base: &Url) -> Result<Url, ApiError> {
    endpoint(base, &["jobs"])
}

/// URL of the list request for `query`.
///
/// # Errors
///
/// Returns an error if `base` cannot have paths appended.
pub fn list_url(base: &Url, query: &JobQuery) -> Result<Url, ApiError> {
    let mut url = jobs_url(base)?;
    let pairs = query.query_pairs();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}

/// URL of a single job.
///
/// # Errors
///
/// Returns an error if `base` cannot have paths appended.
pub fn job_url(base: &Url, id: &JobId) -> Result<Url, ApiError> {
    endpoint(base, &["jobs", id.as_str()])
}
