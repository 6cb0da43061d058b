use std::{cmp::Ordering, collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::job::Job;

/// Field a job listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Sort by title (case-insensitive).
    #[default]
    Title,
    /// Sort by company (case-insensitive).
    Company,
    /// Sort by location (case-insensitive).
    Location,
    /// Sort by job type (case-insensitive).
    JobType,
    /// Newest posting first.
    PostingDate,
}

impl SortField {
    /// All sort fields, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::Company,
        Self::Location,
        Self::JobType,
        Self::PostingDate,
    ];

    /// The name the jobs resource uses for this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Company => "company",
            Self::Location => "location",
            Self::JobType => "job_type",
            Self::PostingDate => "posting_date",
        }
    }

    fn text_of(self, job: &Job) -> Option<&str> {
        match self {
            Self::Title => Some(&job.title),
            Self::Company => Some(&job.company),
            Self::Location => Some(&job.location),
            Self::JobType => Some(&job.job_type),
            Self::PostingDate => None,
        }
    }

    /// Compares two jobs under this field's ordering.
    #[must_use]
    pub fn compare(self, a: &Job, b: &Job) -> Ordering {
        match (self.text_of(a), self.text_of(b)) {
            (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => b.posting_date.cmp(&a.posting_date),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = UnknownSortFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "title" => Ok(Self::Title),
            "company" => Ok(Self::Company),
            "location" => Ok(Self::Location),
            "job_type" | "type" => Ok(Self::JobType),
            "posting_date" | "date" => Ok(Self::PostingDate),
            _ => Err(UnknownSortFieldError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown [`SortField`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "unknown sort field '{0}' (expected one of: title, company, location, job_type, posting_date)"
)]
pub struct UnknownSortFieldError(String);

/// Direction of a server-side ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// The value used for the `order` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{other}' (expected asc or desc)")),
        }
    }
}

/// Sorts jobs in place.
///
/// The sort is stable. Text fields compare case-insensitively; posting date
/// orders newest first.
pub fn sort_jobs(jobs: &mut [Job], field: SortField) {
    jobs.sort_by(|a, b| field.compare(a, b));
}

/// Case-insensitive substring match against title, company and location.
///
/// An empty term matches every job.
#[must_use]
pub fn matches_search(job: &Job, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    needle.is_empty()
        || [&job.title, &job.company, &job.location]
            .iter()
            .any(|haystack| haystack.to_lowercase().contains(&needle))
}

/// The active search and filter selection.
///
/// Each filter is either unset or a single value. Setting an empty (or
/// whitespace-only) value clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    search: Option<String>,
    job_type: Option<String>,
    location: Option<String>,
    tag: Option<String>,
}

impl Filters {
    /// The free-text search term.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// The exact job type filter.
    #[must_use]
    pub fn job_type(&self) -> Option<&str> {
        self.job_type.as_deref()
    }

    /// The exact location filter.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The tag filter.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Sets the search term. Returns whether the value changed.
    pub fn set_search(&mut self, value: impl Into<String>) -> bool {
        replace(&mut self.search, &value.into())
    }

    /// Sets the job type filter. Returns whether the value changed.
    pub fn set_job_type(&mut self, value: impl Into<String>) -> bool {
        replace(&mut self.job_type, &value.into())
    }

    /// Sets the location filter. Returns whether the value changed.
    pub fn set_location(&mut self, value: impl Into<String>) -> bool {
        replace(&mut self.location, &value.into())
    }

    /// Sets the tag filter. Returns whether the value changed.
    pub fn set_tag(&mut self, value: impl Into<String>) -> bool {
        replace(&mut self.tag, &value.into())
    }

    /// Whether no search term or filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a job passes the search term and every set filter.
    #[must_use]
    pub fn matches(&self, job: &Job) -> bool {
        self.search().is_none_or(|term| matches_search(job, term))
            && self.job_type().is_none_or(|job_type| job.job_type == job_type)
            && self.location().is_none_or(|location| job.location == location)
            && self.tag().is_none_or(|tag| job.has_tag(tag))
    }
}

fn replace(slot: &mut Option<String>, value: &str) -> bool {
    let trimmed = value.trim();
    let value = (!trimmed.is_empty()).then(|| trimmed.to_string());
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Returns the jobs that pass `filters`, in their original order.
#[must_use]
pub fn filter_jobs(jobs: &[Job], filters: &Filters) -> Vec<Job> {
    jobs.iter()
        .filter(|job| filters.matches(job))
        .cloned()
        .collect()
}

/// The parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    /// Requested page (1-based).
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Search term and filters.
    pub filters: Filters,
    /// Optional server-side ordering.
    pub ordering: Option<(SortField, SortOrder)>,
}

impl JobQuery {
    /// Query parameters for the request. Unset filters are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];

        let filters = [
            ("search", self.filters.search()),
            ("job_type", self.filters.job_type()),
            ("location", self.filters.location()),
            ("tag", self.filters.tag()),
        ];
        pairs.extend(
            filters
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value.to_string()))),
        );

        if let Some((field, order)) = self.ordering {
            pairs.push(("sort_by", field.as_str().to_string()));
            pairs.push(("order", order.as_str().to_string()));
        }

        pairs
    }
}

/// Distinct filterable values present in a set of jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    /// Distinct job types, sorted.
    pub job_types: Vec<String>,
    /// Distinct locations, sorted.
    pub locations: Vec<String>,
    /// Distinct tags, sorted.
    pub tags: Vec<String>,
}

impl Facets {
    /// Collects the facets of `jobs`.
    #[must_use]
    pub fn collect<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Self {
        let mut job_types = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut tags = BTreeSet::new();

        for job in jobs {
            job_types.insert(job.job_type.clone());
            locations.insert(job.location.clone());
            tags.extend(job.tags.iter().cloned());
        }

        Self {
            job_types: job_types.into_iter().collect(),
            locations: locations.into_iter().collect(),
            tags: tags.into_iter().collect(),
        }
    }
}
