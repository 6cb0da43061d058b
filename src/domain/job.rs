use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

/// A job listing as returned by the jobs resource.
///
/// Jobs are owned by the server. The client only reads them, and changes them
/// through an explicit edit that is submitted as a [`JobPayload`].
///
/// [`JobPayload`]: super::JobPayload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Server-assigned identifier.
    pub id: JobId,
    /// Position title.
    pub title: String,
    /// Hiring company.
    pub company: String,
    /// Where the position is based.
    pub location: String,
    /// Date the job was posted.
    #[serde(deserialize_with = "deserialize_date")]
    pub posting_date: NaiveDate,
    /// Free-text category, e.g. "Full-time".
    pub job_type: String,
    /// Short labels attached to the job, in server order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Job {
    /// Whether the job carries the given tag (exact match).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Opaque identifier of a [`Job`].
///
/// The server may encode ids as JSON numbers or strings; both are accepted
/// and kept in their textual form. Ids are never generated client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Returns the id as it appears in request paths.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = InvalidJobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(InvalidJobIdError(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n.to_string())),
            Raw::Text(s) => s.parse().map_err(D::Error::custom),
        }
    }
}

/// Error returned when a string cannot be used as a [`JobId`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid job id '{0}': must be non-empty and must not contain '/'")]
pub struct InvalidJobIdError(String);

/// The `YYYY-MM-DD` format used for posting dates on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepts a plain date, or an ISO datetime whose date part is used.
fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.split_once('T').map_or(raw.as_str(), |(date, _)| date);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(D::Error::custom)
}

/// Server-side pagination totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// The page the server actually returned (1-based).
    pub current_page: u32,
    /// Number of pages available for the current filters.
    pub total_pages: u32,
    /// Number of jobs matching the current filters, if reported.
    #[serde(default)]
    pub total_jobs: Option<u64>,
    /// Page size the server applied, if reported.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// How a page of results was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// The server paginated (and filtered) the results.
    Server(Pagination),
    /// The server returned its whole collection as a bare array.
    Unpaginated,
}

/// One page of jobs, as returned by a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPage {
    /// The jobs on this page, in server order.
    pub jobs: Vec<Job>,
    /// Pagination information for the page.
    pub paging: Paging,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a job for tests; tags are given as a slice.
    pub fn job(id: &str, title: &str, company: &str, location: &str) -> Job {
        Job {
            id: id.parse().unwrap(),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            posting_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            job_type: "Full-time".to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn deserializes_numeric_id() {
        let job: Job = serde_json::from_str(
            r#"{"id": 7, "title": "Actuary", "company": "Acme", "location": "London",
                "posting_date": "2024-03-05", "job_type": "Full-time", "tags": ["life", "pricing"]}"#,
        )
        .unwrap();

        assert_eq!(job.id.as_str(), "7");
        assert_eq!(
            job.posting_date,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(job.tags, vec!["life", "pricing"]);
    }

    #[test]
    fn deserializes_string_id_and_missing_tags() {
        let job: Job = serde_json::from_str(
            r#"{"id": "abc-1", "title": "Actuary", "company": "Acme", "location": "Remote",
                "posting_date": "2024-03-05", "job_type": "Contract"}"#,
        )
        .unwrap();

        assert_eq!(job.id.to_string(), "abc-1");
        assert!(job.tags.is_empty());
    }

    #[test]
    fn accepts_datetime_posting_date() {
        let job: Job = serde_json::from_str(
            r#"{"id": 1, "title": "t", "company": "c", "location": "l",
                "posting_date": "2023-12-31T08:30:00", "job_type": "Full-time"}"#,
        )
        .unwrap();

        assert_eq!(
            job.posting_date,
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_posting_date() {
        let result = serde_json::from_str::<Job>(
            r#"{"id": 1, "title": "t", "company": "c", "location": "l",
                "posting_date": "31/12/2023", "job_type": "Full-time"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn job_id_parse_trims_and_rejects_empty() {
        assert_eq!(" 42 ".parse::<JobId>().unwrap().as_str(), "42");
        assert!("   ".parse::<JobId>().is_err());
        assert!("1/2".parse::<JobId>().is_err());
    }

    #[test]
    fn has_tag_is_exact() {
        let mut job = job("1", "Actuary", "Acme", "London");
        job.tags = vec!["Pricing".to_string()];

        assert!(job.has_tag("Pricing"));
        assert!(!job.has_tag("pricing"));
    }
}
