//! Normalization and deduplication pipeline orchestration.
//!
//! One run per inbound submission: adapter selection, extraction, field
//! normalization, company resolution, fingerprinting, duplicate detection,
//! and the persistence call, in that order. Any stage failure short-circuits
//! the rest; no partial normalization escapes to the caller.

pub mod fingerprint;
pub mod resolver;

use std::sync::Arc;

use chrono::Utc;
use jobintake_adapters::adapter_for;
use jobintake_adapters::normalize::{clean_text, normalize_location, normalize_salary};
use jobintake_core::{CanonicalJob, JobDraft, JobRecord, Outcome, SourceTag, ValidationError};
use jobintake_storage::{JobStore, StorageError};
use serde_json::Value as JsonValue;
use tracing::{info, warn};
use uuid::Uuid;

use crate::fingerprint::fingerprint;
use crate::resolver::{CompanyResolver, ResolveError};

/// Result of the dual-key duplicate check. `Rejected` never reaches this
/// point; validation failures stop the pipeline before any store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    New,
    DuplicateByExternalId(JobRecord),
    DuplicateByFingerprint(JobRecord),
}

/// External-id equality and fingerprint equality are independent duplicate
/// triggers, checked in one store query to avoid a second round trip.
pub async fn detect(store: &dyn JobStore, job: &CanonicalJob) -> Result<Detection, StorageError> {
    match store
        .find_job_by_external_id_or_fingerprint(&job.external_id, &job.fingerprint)
        .await?
    {
        Some(existing) if existing.external_id == job.external_id => {
            Ok(Detection::DuplicateByExternalId(existing))
        }
        Some(existing) => Ok(Detection::DuplicateByFingerprint(existing)),
        None => Ok(Detection::New),
    }
}

/// Applies the text/location/salary normalizers to an extracted draft and
/// computes the fingerprint. The returned job is immutable from here on.
pub fn build_canonical(draft: JobDraft) -> Result<CanonicalJob, ValidationError> {
    let title = clean_text(&draft.title).ok_or(ValidationError::missing("title"))?;
    let company_name =
        clean_text(&draft.company_name).ok_or(ValidationError::missing("company_name"))?;
    let url = draft.url.trim().to_string();
    if url.is_empty() {
        return Err(ValidationError::missing("url"));
    }

    let (city, state, country) = normalize_location(draft.location.as_ref());
    if draft.location.is_some() && city.is_none() && state.is_none() {
        warn!(
            external_id = %draft.external_id,
            "unrecognized location shape, using country default"
        );
    }
    let (salary_min, salary_max, currency) =
        normalize_salary(draft.salary_min, draft.salary_max, draft.currency);
    let date_published = draft
        .date_published
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let fingerprint = fingerprint(&company_name, &title, city.as_deref().unwrap_or(""));

    Ok(CanonicalJob {
        external_id: draft.external_id,
        source: draft.source,
        title,
        company_name,
        company_website: draft
            .company_website
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty()),
        url,
        location_city: city,
        location_state: state,
        location_country: country,
        salary_min,
        salary_max,
        currency,
        date_published,
        contact_email: draft.contact_email,
        fingerprint,
    })
}

/// Sequences the full intake flow for one raw payload and maps every
/// terminal state onto an [`Outcome`].
pub struct IngestPipeline {
    store: Arc<dyn JobStore>,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    pub async fn process_posting(&self, raw: &JsonValue) -> Outcome {
        let tag = SourceTag::from_raw(raw);
        if tag == SourceTag::Unknown {
            warn!("payload declared no recognized source, using default adapter");
        }

        let draft = match adapter_for(tag).extract(raw) {
            Ok(draft) => draft,
            Err(err) => {
                info!(source = tag.as_str(), %err, "posting rejected during extraction");
                return Outcome::Rejected {
                    reason: err.to_string(),
                };
            }
        };

        let job = match build_canonical(draft) {
            Ok(job) => job,
            Err(err) => {
                info!(source = tag.as_str(), %err, "posting rejected during normalization");
                return Outcome::Rejected {
                    reason: err.to_string(),
                };
            }
        };

        let resolver = CompanyResolver::new(self.store.as_ref());
        let company_id = match resolver
            .resolve(&job.company_name, job.company_website.as_deref())
            .await
        {
            Ok(id) => id,
            Err(ResolveError::Validation(err)) => {
                return Outcome::Rejected {
                    reason: err.to_string(),
                }
            }
            // A failed resolution must never be followed by a job insert.
            Err(ResolveError::Storage(err)) => {
                warn!(external_id = %job.external_id, %err, "company resolution failed");
                return Outcome::StorageFailed {
                    reason: err.to_string(),
                };
            }
        };

        match self.detect_and_persist(&job, company_id).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(external_id = %job.external_id, %err, "store call failed");
                Outcome::StorageFailed {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn detect_and_persist(
        &self,
        job: &CanonicalJob,
        company_id: Uuid,
    ) -> Result<Outcome, StorageError> {
        match detect(self.store.as_ref(), job).await? {
            Detection::New => {
                let record = self.store.insert_job(job, company_id).await?;
                info!(external_id = %record.external_id, job_id = %record.id, "stored new job");
                Ok(Outcome::Stored {
                    external_id: job.external_id.clone(),
                })
            }
            Detection::DuplicateByExternalId(existing)
            | Detection::DuplicateByFingerprint(existing) => {
                self.store
                    .insert_duplicate_link(&existing.external_id, &job.external_id)
                    .await?;
                info!(
                    external_id = %job.external_id,
                    matched = %existing.external_id,
                    "duplicate posting detected"
                );
                Ok(Outcome::Duplicate {
                    external_id: job.external_id.clone(),
                    matched_external_id: existing.external_id,
                })
            }
        }
    }
}
