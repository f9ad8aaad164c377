//! Persistence collaborator for the intake pipeline.
//!
//! The pipeline only sees the `JobStore` trait; `PgStore` is the production
//! Postgres implementation and `MemoryStore` the in-process substitute used
//! by tests and local development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use jobintake_core::{CanonicalJob, CompanyIdentity, JobRecord};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store returned no row where one was required: {0}")]
    MissingRow(&'static str),
}

/// Store primitives required by the pipeline. Each call is a single blocking
/// round trip from the pipeline's perspective; failures surface as
/// `StorageError` and are never retried here.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Case-insensitive exact match on stored company name.
    async fn find_company_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CompanyIdentity>, StorageError>;

    /// Case-insensitive, trimmed exact match on stored company website.
    async fn find_company_by_website(
        &self,
        website: &str,
    ) -> Result<Option<CompanyIdentity>, StorageError>;

    /// Insert-or-fetch: concurrent creation of the same name yields the one
    /// surviving row rather than a second identity.
    async fn create_company(
        &self,
        name: &str,
        website: Option<&str>,
    ) -> Result<CompanyIdentity, StorageError>;

    /// Single query covering both duplicate triggers; an external-id match
    /// is preferred when both would hit.
    async fn find_job_by_external_id_or_fingerprint(
        &self,
        external_id: &str,
        fingerprint: &str,
    ) -> Result<Option<JobRecord>, StorageError>;

    async fn insert_job(
        &self,
        job: &CanonicalJob,
        company_id: Uuid,
    ) -> Result<JobRecord, StorageError>;

    async fn insert_duplicate_link(
        &self,
        original_external_id: &str,
        duplicate_external_id: &str,
    ) -> Result<(), StorageError>;
}
