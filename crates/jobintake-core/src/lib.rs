//! Core domain model for the job intake pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

/// Origin of an inbound posting, parsed from the payload's source field.
///
/// Unrecognized or absent tags map to `Unknown`, which is handled by the
/// default adapter rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTag {
    Default,
    LinkedIn,
    Indeed,
    Seek,
    Unknown,
}

impl SourceTag {
    /// Candidate keys for the source declaration itself.
    const SOURCE_KEYS: &'static [&'static str] = &["source", "source_name", "sourceName", "origin"];

    pub fn from_raw(raw: &JsonValue) -> Self {
        let declared = Self::SOURCE_KEYS
            .iter()
            .find_map(|key| raw.get(key).and_then(JsonValue::as_str));
        match declared {
            Some(tag) => Self::parse(tag),
            None => Self::Unknown,
        }
    }

    fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "default" | "generic" => Self::Default,
            "linkedin" => Self::LinkedIn,
            "indeed" => Self::Indeed,
            "seek" => Self::Seek,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::LinkedIn => "linkedin",
            Self::Indeed => "indeed",
            Self::Seek => "seek",
            Self::Unknown => "unknown",
        }
    }
}

/// A required field was missing or unusable after trying every known alias.
///
/// Always raised before any store call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required field: {field}")]
pub struct ValidationError {
    pub field: &'static str,
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self { field }
    }
}

/// Adapter output: canonical field names, required fields already validated
/// non-empty, but nothing normalized yet. The location value is carried as
/// raw JSON because its shape varies per source and is resolved by the
/// location normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub external_id: String,
    pub source: SourceTag,
    pub title: String,
    pub company_name: String,
    pub company_website: Option<String>,
    pub url: String,
    pub location: Option<JsonValue>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: Option<String>,
    pub date_published: Option<String>,
    pub contact_email: Option<String>,
}

/// The normalized, source-agnostic posting representation.
///
/// Never exposed downstream unless `title`, `company_name`, and `url` are
/// non-empty; immutable once the fingerprint is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalJob {
    pub external_id: String,
    pub source: SourceTag,
    pub title: String,
    pub company_name: String,
    pub company_website: Option<String>,
    pub url: String,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: String,
    pub date_published: String,
    pub contact_email: Option<String>,
    pub fingerprint: String,
}

/// Stable employer identity, owned by the persistent store. The resolver
/// only reads and creates rows, never updates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
}

/// Slice of a stored job returned by duplicate lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub external_id: String,
    pub fingerprint: String,
}

/// Matching is binary (exact fingerprint or exact external id), so the
/// recorded score is always 1.0.
pub const DUPLICATE_MATCH_SCORE: f64 = 1.0;

/// Terminal result of one posting submission, translated to a transport
/// status by the web layer. Duplicate detection is a normal outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Stored {
        external_id: String,
    },
    Duplicate {
        external_id: String,
        matched_external_id: String,
    },
    Rejected {
        reason: String,
    },
    StorageFailed {
        reason: String,
    },
}
