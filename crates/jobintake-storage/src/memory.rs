//! In-memory `JobStore` for tests and local development.
//!
//! A single Mutex serializes every operation, so the check-then-act races
//! the Postgres store closes with unique indexes cannot occur here either.

use std::sync::Arc;

use async_trait::async_trait;
use jobintake_core::{CanonicalJob, CompanyIdentity, JobRecord, DUPLICATE_MATCH_SCORE};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{JobStore, StorageError};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob {
    pub record: JobRecord,
    pub company_id: Uuid,
    pub job: CanonicalJob,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDuplicateLink {
    pub original_external_id: String,
    pub duplicate_external_id: String,
    pub match_score: f64,
}

#[derive(Debug, Default)]
struct State {
    companies: Vec<CompanyIdentity>,
    jobs: Vec<StoredJob>,
    links: Vec<StoredDuplicateLink>,
    calls: usize,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations performed, across all trait methods.
    /// Lets tests assert that rejections happen before any store access.
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.calls
    }

    pub async fn companies(&self) -> Vec<CompanyIdentity> {
        self.state.lock().await.companies.clone()
    }

    pub async fn jobs(&self) -> Vec<StoredJob> {
        self.state.lock().await.jobs.clone()
    }

    pub async fn duplicate_links(&self) -> Vec<StoredDuplicateLink> {
        self.state.lock().await.links.clone()
    }
}

fn site_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Website half of the company insert-or-fetch key; absent and blank
/// websites collapse to the same value, mirroring the Postgres
/// `lower(coalesce(website, ''))` index expression.
fn site_key(website: Option<&str>) -> String {
    website.unwrap_or_default().trim().to_ascii_lowercase()
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn find_company_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CompanyIdentity>, StorageError> {
        let mut state = self.state.lock().await;
        state.calls += 1;
        Ok(state
            .companies
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn find_company_by_website(
        &self,
        website: &str,
    ) -> Result<Option<CompanyIdentity>, StorageError> {
        let mut state = self.state.lock().await;
        state.calls += 1;
        Ok(state
            .companies
            .iter()
            .find(|c| c.website.as_deref().is_some_and(|w| site_eq(w, website)))
            .cloned())
    }

    async fn create_company(
        &self,
        name: &str,
        website: Option<&str>,
    ) -> Result<CompanyIdentity, StorageError> {
        let mut state = self.state.lock().await;
        state.calls += 1;
        // Insert-or-fetch on the same (name, website) key as the Postgres
        // upsert: a same-name row with a different website stays separate.
        let key = site_key(website);
        if let Some(existing) = state.companies.iter().find(|c| {
            c.name.eq_ignore_ascii_case(name) && site_key(c.website.as_deref()) == key
        }) {
            return Ok(existing.clone());
        }
        let company = CompanyIdentity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            website: website.map(|w| w.trim().to_string()),
        };
        state.companies.push(company.clone());
        Ok(company)
    }

    async fn find_job_by_external_id_or_fingerprint(
        &self,
        external_id: &str,
        fingerprint: &str,
    ) -> Result<Option<JobRecord>, StorageError> {
        let mut state = self.state.lock().await;
        state.calls += 1;
        let by_external_id = state
            .jobs
            .iter()
            .find(|j| j.record.external_id == external_id);
        let hit = by_external_id.or_else(|| {
            state
                .jobs
                .iter()
                .find(|j| j.record.fingerprint == fingerprint)
        });
        Ok(hit.map(|j| j.record.clone()))
    }

    async fn insert_job(
        &self,
        job: &CanonicalJob,
        company_id: Uuid,
    ) -> Result<JobRecord, StorageError> {
        let mut state = self.state.lock().await;
        state.calls += 1;
        let record = JobRecord {
            id: Uuid::new_v4(),
            external_id: job.external_id.clone(),
            fingerprint: job.fingerprint.clone(),
        };
        state.jobs.push(StoredJob {
            record: record.clone(),
            company_id,
            job: job.clone(),
        });
        Ok(record)
    }

    async fn insert_duplicate_link(
        &self,
        original_external_id: &str,
        duplicate_external_id: &str,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        state.calls += 1;
        state.links.push(StoredDuplicateLink {
            original_external_id: original_external_id.to_string(),
            duplicate_external_id: duplicate_external_id.to_string(),
            match_score: DUPLICATE_MATCH_SCORE,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobintake_core::SourceTag;

    fn canonical(external_id: &str, fingerprint: &str) -> CanonicalJob {
        CanonicalJob {
            external_id: external_id.to_string(),
            source: SourceTag::Default,
            title: "Engineer".into(),
            company_name: "Acme".into(),
            company_website: None,
            url: "https://example.com".into(),
            location_city: Some("Sydney".into()),
            location_state: Some("NSW".into()),
            location_country: "AU".into(),
            salary_min: None,
            salary_max: None,
            currency: "AUD".into(),
            date_published: "2026-08-31T00:00:00+00:00".into(),
            contact_email: None,
            fingerprint: fingerprint.to_string(),
        }
    }

    #[tokio::test]
    async fn create_company_is_insert_or_fetch() {
        let store = MemoryStore::new();
        let first = store
            .create_company("Acme", Some("https://acme.example"))
            .await
            .unwrap();
        let second = store
            .create_company("ACME", Some("HTTPS://ACME.EXAMPLE"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.companies().await.len(), 1);
    }

    #[tokio::test]
    async fn create_company_keeps_distinct_websites_apart() {
        let store = MemoryStore::new();
        let first = store
            .create_company("Acme", Some("https://acme.example"))
            .await
            .unwrap();
        let second = store
            .create_company("Acme", Some("https://other.example"))
            .await
            .unwrap();
        let third = store.create_company("Acme", None).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_ne!(first.id, third.id);
        assert_eq!(store.companies().await.len(), 3);
    }

    #[tokio::test]
    async fn job_lookup_prefers_external_id_match() {
        let store = MemoryStore::new();
        let company = store.create_company("Acme", None).await.unwrap();
        store
            .insert_job(&canonical("J1", "fp-one"), company.id)
            .await
            .unwrap();
        store
            .insert_job(&canonical("J2", "fp-two"), company.id)
            .await
            .unwrap();

        let hit = store
            .find_job_by_external_id_or_fingerprint("J2", "fp-one")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.external_id, "J2");
    }

    #[tokio::test]
    async fn call_count_tracks_every_operation() {
        let store = MemoryStore::new();
        assert_eq!(store.call_count().await, 0);
        store.find_company_by_name("Acme").await.unwrap();
        store.create_company("Acme", None).await.unwrap();
        assert_eq!(store.call_count().await, 2);
    }
}
