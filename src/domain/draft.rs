use std::fmt;

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use serde::Serialize;

use super::job::{DATE_FORMAT, Job};

/// The editable fields of a job, as typed by the user.
///
/// A draft is purely client-side staging. Every field is free text; tags are
/// a single comma-separated string which is split on submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDraft {
    /// Position title.
    pub title: String,
    /// Hiring company.
    pub company: String,
    /// Where the position is based.
    pub location: String,
    /// Posting date, expected as `YYYY-MM-DD`.
    pub posting_date: String,
    /// Free-text category, e.g. "Full-time".
    pub job_type: String,
    /// Comma-separated tags.
    pub tags: String,
}

impl JobDraft {
    /// A draft prefilled from an existing job, for editing.
    #[must_use]
    pub fn from_job(job: &Job) -> Self {
        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            posting_date: job.posting_date.format(DATE_FORMAT).to_string(),
            job_type: job.job_type.clone(),
            tags: job.tags.join(", "),
        }
    }

    /// Returns the draft's value for a field.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Company => &self.company,
            Field::Location => &self.location,
            Field::PostingDate => &self.posting_date,
            Field::JobType => &self.job_type,
            Field::Tags => &self.tags,
        }
    }

    /// Replaces the draft's value for a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Company => &mut self.company,
            Field::Location => &mut self.location,
            Field::PostingDate => &mut self.posting_date,
            Field::JobType => &mut self.job_type,
            Field::Tags => &mut self.tags,
        };
        *slot = value.into();
    }

    /// Validates the draft and normalizes it into a request payload.
    ///
    /// Every required field that is empty (or only whitespace) yields exactly
    /// one [`FieldError::Missing`], in field order. A posting date that is
    /// present but unparseable yields [`FieldError::InvalidDate`].
    ///
    /// # Errors
    ///
    /// Returns all validation failures if any required field is missing or
    /// malformed.
    pub fn validate(&self) -> Result<JobPayload, ValidationErrors> {
        let title = required(&self.title, Field::Title);
        let company = required(&self.company, Field::Company);
        let location = required(&self.location, Field::Location);
        let posting_date = required(&self.posting_date, Field::PostingDate).and_then(|raw| {
            NaiveDate::parse_from_str(raw.as_str(), DATE_FORMAT)
                .map_err(|_| FieldError::InvalidDate(raw.to_string()))
        });
        let job_type = required(&self.job_type, Field::JobType);

        // The first failure becomes the head when assembling fails below.
        let tail = [
            title.as_ref().err(),
            company.as_ref().err(),
            location.as_ref().err(),
            posting_date.as_ref().err(),
            job_type.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .skip(1)
        .cloned()
        .collect();

        assemble(
            title,
            company,
            location,
            posting_date,
            job_type,
            split_tags(&self.tags),
        )
        .map_err(|head| ValidationErrors {
            errors: NonEmpty { head, tail },
        })
    }
}

fn required(value: &str, field: Field) -> Result<NonEmptyString, FieldError> {
    NonEmptyString::new(value.trim().to_string()).map_err(|_| FieldError::Missing(field))
}

/// Builds the payload, stopping at the first failing field in form order.
fn assemble(
    title: Result<NonEmptyString, FieldError>,
    company: Result<NonEmptyString, FieldError>,
    location: Result<NonEmptyString, FieldError>,
    posting_date: Result<NaiveDate, FieldError>,
    job_type: Result<NonEmptyString, FieldError>,
    tags: Vec<String>,
) -> Result<JobPayload, FieldError> {
    Ok(JobPayload {
        title: title?,
        company: company?,
        location: location?,
        posting_date: posting_date?,
        job_type: job_type?,
        tags,
    })
}

/// Splits a comma-separated tag string.
///
/// Entries are trimmed and empty entries are dropped; order is preserved.
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// A validated job, ready to be sent as a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobPayload {
    /// Position title.
    pub title: NonEmptyString,
    /// Hiring company.
    pub company: NonEmptyString,
    /// Where the position is based.
    pub location: NonEmptyString,
    /// Date the job was posted.
    pub posting_date: NaiveDate,
    /// Free-text category.
    pub job_type: NonEmptyString,
    /// Normalized tags.
    pub tags: Vec<String>,
}

/// The editable fields of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Position title.
    Title,
    /// Hiring company.
    Company,
    /// Location.
    Location,
    /// Posting date.
    PostingDate,
    /// Job type.
    JobType,
    /// Tags.
    Tags,
}

impl Field {
    /// All fields, in form order.
    pub const ALL: [Self; 6] = [
        Self::Title,
        Self::Company,
        Self::Location,
        Self::PostingDate,
        Self::JobType,
        Self::Tags,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Company => "Company",
            Self::Location => "Location",
            Self::PostingDate => "Posting date",
            Self::JobType => "Job type",
            Self::Tags => "Tags",
        }
    }

    /// Whether the field must be non-empty.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Tags)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// A required field was left empty.
    #[error("{0} is required")]
    Missing(Field),
    /// The posting date was not a `YYYY-MM-DD` date.
    #[error("Posting date '{0}' is not a valid date (use YYYY-MM-DD)")]
    InvalidDate(String),
}

impl FieldError {
    /// The field the error refers to.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Missing(field) => *field,
            Self::InvalidDate(_) => Field::PostingDate,
        }
    }
}

/// All validation failures of a draft. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct ValidationErrors {
    errors: NonEmpty<FieldError>,
}

impl ValidationErrors {
    /// Iterates over the individual failures, in field order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// The fields that failed validation.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        self.iter().map(FieldError::field).collect()
    }

    /// One user-facing message per failing field.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.iter().map(ToString::to_string).collect()
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`; present for API symmetry with [`Self::len`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid job: {}", self.messages().join("; "))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::job::tests::job;

    fn complete_draft() -> JobDraft {
        JobDraft {
            title: "Pricing Actuary".to_string(),
            company: "Acme Re".to_string(),
            location: "London".to_string(),
            posting_date: "2024-05-01".to_string(),
            job_type: "Full-time".to_string(),
            tags: "pricing, life".to_string(),
        }
    }

    #[test]
    fn complete_draft_validates() {
        let payload = complete_draft().validate().unwrap();

        assert_eq!(payload.title.as_str(), "Pricing Actuary");
        assert_eq!(
            payload.posting_date,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(payload.tags, vec!["pricing", "life"]);
    }

    #[test_case(Field::Title; "title")]
    #[test_case(Field::Company; "company")]
    #[test_case(Field::Location; "location")]
    #[test_case(Field::PostingDate; "posting date")]
    #[test_case(Field::JobType; "job type")]
    fn single_missing_field_yields_one_error(field: Field) {
        let mut draft = complete_draft();
        draft.set(field, "   ");

        let errors = draft.validate().unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.fields(), vec![field]);
        assert_eq!(
            errors.iter().next(),
            Some(&FieldError::Missing(field))
        );
    }

    #[test]
    fn empty_draft_reports_every_required_field_in_order() {
        let errors = JobDraft::default().validate().unwrap_err();

        assert_eq!(
            errors.fields(),
            vec![
                Field::Title,
                Field::Company,
                Field::Location,
                Field::PostingDate,
                Field::JobType,
            ]
        );
        assert_eq!(errors.messages()[0], "Title is required");
    }

    #[test]
    fn tags_are_optional() {
        let mut draft = complete_draft();
        draft.tags = String::new();

        assert!(draft.validate().unwrap().tags.is_empty());
    }

    #[test]
    fn malformed_date_is_reported_once() {
        let mut draft = complete_draft();
        draft.posting_date = "01/05/2024".to_string();

        let errors = draft.validate().unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.iter().next(),
            Some(&FieldError::InvalidDate("01/05/2024".to_string()))
        );
    }

    #[test]
    fn mixed_failures_keep_field_order() {
        let mut draft = complete_draft();
        draft.title = String::new();
        draft.posting_date = "2024-13-40".to_string();
        draft.job_type = " ".to_string();

        let errors = draft.validate().unwrap_err();

        assert_eq!(
            errors.iter().cloned().collect::<Vec<_>>(),
            vec![
                FieldError::Missing(Field::Title),
                FieldError::InvalidDate("2024-13-40".to_string()),
                FieldError::Missing(Field::JobType),
            ]
        );
    }

    #[test]
    fn text_fields_are_trimmed() {
        let mut draft = complete_draft();
        draft.company = "  Acme Re  ".to_string();

        assert_eq!(draft.validate().unwrap().company.as_str(), "Acme Re");
    }

    #[test_case("", &[]; "empty")]
    #[test_case("a", &["a"]; "single")]
    #[test_case(" a , b ,c ", &["a", "b", "c"]; "trims entries")]
    #[test_case("a,,b, ,", &["a", "b"]; "drops empty entries")]
    #[test_case("b, a", &["b", "a"]; "keeps order")]
    fn split_tags_cases(raw: &str, expected: &[&str]) {
        assert_eq!(split_tags(raw), expected);
    }

    #[test]
    fn draft_from_job_round_trips_through_validation() {
        let mut source = job("9", "Analyst", "Acme", "Remote");
        source.tags = vec!["entry".to_string(), "health".to_string()];

        let draft = JobDraft::from_job(&source);
        assert_eq!(draft.tags, "entry, health");
        assert_eq!(draft.posting_date, "2024-01-01");

        let payload = draft.validate().unwrap();
        assert_eq!(payload.tags, source.tags);
        assert_eq!(payload.location.as_str(), "Remote");
    }

    #[test]
    fn payload_serializes_to_wire_shape() {
        let payload = complete_draft().validate().unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "title": "Pricing Actuary",
                "company": "Acme Re",
                "location": "London",
                "posting_date": "2024-05-01",
                "job_type": "Full-time",
                "tags": ["pricing", "life"],
            })
        );
    }
}
