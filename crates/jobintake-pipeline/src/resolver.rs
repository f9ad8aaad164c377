//! Company entity resolution.

use jobintake_core::ValidationError;
use jobintake_storage::{JobStore, StorageError};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Common legal-entity suffixes stripped before the second name-match
/// attempt. Matching on the suffix is case-insensitive and tolerates one
/// trailing period; stripping repeats so "Pty. Ltd." falls away in two steps.
const LEGAL_SUFFIXES: &[&str] = &["pty ltd", "pty", "ltd", "inc", "llc", "corp", "co"];

pub fn strip_legal_suffix(name: &str) -> String {
    let mut current = name.trim().to_string();
    loop {
        let lower = current.to_ascii_lowercase();
        let mut next = None;
        'suffixes: for suffix in LEGAL_SUFFIXES {
            for tail in [format!(" {suffix}."), format!(" {suffix}")] {
                if lower.ends_with(&tail) {
                    let end = current.len() - tail.len();
                    next = Some(current[..end].trim_end().to_string());
                    break 'suffixes;
                }
            }
        }
        match next {
            Some(stripped) if !stripped.is_empty() => current = stripped,
            _ => return current,
        }
    }
}

/// Maps a free-text company reference to one stable identity, creating a row
/// when no existing one matches.
///
/// Best-effort: near-duplicates with unanticipated suffixes or naming drift
/// will still create separate rows.
pub struct CompanyResolver<'a> {
    store: &'a dyn JobStore,
}

impl<'a> CompanyResolver<'a> {
    pub fn new(store: &'a dyn JobStore) -> Self {
        Self { store }
    }

    /// Matching order, first hit wins: exact case-insensitive name;
    /// suffix-stripped name; then website. A name match is discarded when
    /// both sides carry a website and they differ; if either side has no
    /// website the name match stands on its own. New rows keep the original
    /// (non-stripped) name.
    pub async fn resolve(&self, name: &str, website: Option<&str>) -> Result<Uuid, ResolveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::missing("company_name").into());
        }
        let website = website.map(str::trim).filter(|w| !w.is_empty());

        let mut name_match = self.store.find_company_by_name(name).await?;
        if name_match.is_none() {
            let stripped = strip_legal_suffix(name);
            if !stripped.eq_ignore_ascii_case(name) {
                name_match = self.store.find_company_by_name(&stripped).await?;
            }
        }

        if let Some(company) = name_match {
            let stored_site = company
                .website
                .as_deref()
                .map(str::trim)
                .filter(|w| !w.is_empty());
            let conflicting = matches!(
                (website, stored_site),
                (Some(a), Some(b)) if !a.eq_ignore_ascii_case(b)
            );
            if !conflicting {
                return Ok(company.id);
            }
            debug!(
                company_id = %company.id,
                name,
                "name match discarded: websites differ"
            );
        }

        if let Some(site) = website {
            if let Some(company) = self.store.find_company_by_website(site).await? {
                return Ok(company.id);
            }
        }

        let created = self.store.create_company(name, website).await?;
        debug!(company_id = %created.id, name, "created new company identity");
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobintake_storage::MemoryStore;

    #[test]
    fn suffix_stripping_handles_periods_and_stacking() {
        assert_eq!(strip_legal_suffix("Acme Pty Ltd"), "Acme");
        assert_eq!(strip_legal_suffix("Acme Pty. Ltd."), "Acme");
        assert_eq!(strip_legal_suffix("Beta Inc."), "Beta");
        assert_eq!(strip_legal_suffix("Gamma LLC"), "Gamma");
        assert_eq!(strip_legal_suffix("Delta"), "Delta");
        // no mid-word stripping
        assert_eq!(strip_legal_suffix("Telco"), "Telco");
    }

    #[tokio::test]
    async fn exact_name_match_is_case_insensitive() {
        let store = MemoryStore::new();
        let existing = store.create_company("Acme", None).await.unwrap();

        let resolver = CompanyResolver::new(&store);
        let id = resolver.resolve("ACME", None).await.unwrap();
        assert_eq!(id, existing.id);
        assert_eq!(store.companies().await.len(), 1);
    }

    #[tokio::test]
    async fn suffix_stripped_match_reuses_existing_row() {
        let store = MemoryStore::new();
        let existing = store.create_company("Acme", None).await.unwrap();

        let resolver = CompanyResolver::new(&store);
        let id = resolver.resolve("Acme Pty Ltd", None).await.unwrap();
        assert_eq!(id, existing.id);
        assert_eq!(store.companies().await.len(), 1);
    }

    #[tokio::test]
    async fn conflicting_websites_block_the_name_match() {
        let store = MemoryStore::new();
        let existing = store
            .create_company("Acme", Some("https://acme.example"))
            .await
            .unwrap();

        let resolver = CompanyResolver::new(&store);
        let id = resolver
            .resolve("Acme", Some("https://other.example"))
            .await
            .unwrap();
        assert_ne!(id, existing.id);
        assert_eq!(store.companies().await.len(), 2);
    }

    #[tokio::test]
    async fn name_match_stands_when_a_website_is_missing() {
        let store = MemoryStore::new();
        let existing = store.create_company("Acme", None).await.unwrap();

        let resolver = CompanyResolver::new(&store);
        let id = resolver
            .resolve("acme", Some("https://acme.example"))
            .await
            .unwrap();
        assert_eq!(id, existing.id);
    }

    #[tokio::test]
    async fn website_match_applies_when_no_name_matches() {
        let store = MemoryStore::new();
        let existing = store
            .create_company("Acme Holdings", Some("https://acme.example"))
            .await
            .unwrap();

        let resolver = CompanyResolver::new(&store);
        let id = resolver
            .resolve("Totally Different Name", Some("HTTPS://ACME.EXAMPLE "))
            .await
            .unwrap();
        assert_eq!(id, existing.id);
    }

    #[tokio::test]
    async fn unmatched_input_creates_with_original_name() {
        let store = MemoryStore::new();
        let resolver = CompanyResolver::new(&store);
        let id = resolver
            .resolve("Fresh Ventures Pty Ltd", Some(" https://fresh.example "))
            .await
            .unwrap();

        let companies = store.companies().await;
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].id, id);
        assert_eq!(companies[0].name, "Fresh Ventures Pty Ltd");
        assert_eq!(companies[0].website.as_deref(), Some("https://fresh.example"));
    }

    #[tokio::test]
    async fn empty_name_is_a_validation_error_without_store_access() {
        let store = MemoryStore::new();
        let resolver = CompanyResolver::new(&store);
        let err = resolver.resolve("   ", None).await.unwrap_err();
        assert!(matches!(err, ResolveError::Validation(_)));
        assert_eq!(store.call_count().await, 0);
    }
}
