//! Postgres-backed `JobStore`.

use async_trait::async_trait;
use jobintake_core::{CanonicalJob, CompanyIdentity, JobRecord, DUPLICATE_MATCH_SCORE};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::{JobStore, StorageError};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }
}

fn company_from_row(row: &PgRow) -> Result<CompanyIdentity, StorageError> {
    Ok(CompanyIdentity {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        website: row.try_get("website")?,
    })
}

fn job_record_from_row(row: &PgRow) -> Result<JobRecord, StorageError> {
    Ok(JobRecord {
        id: row.try_get("id")?,
        external_id: row.try_get("external_id")?,
        fingerprint: row.try_get("fingerprint")?,
    })
}

#[async_trait]
impl JobStore for PgStore {
    async fn find_company_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CompanyIdentity>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, website
              FROM companies
             WHERE lower(name) = lower($1)
             LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(company_from_row).transpose()
    }

    async fn find_company_by_website(
        &self,
        website: &str,
    ) -> Result<Option<CompanyIdentity>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, website
              FROM companies
             WHERE website IS NOT NULL
               AND lower(trim(website)) = lower(trim($1))
             LIMIT 1
            "#,
        )
        .bind(website)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(company_from_row).transpose()
    }

    async fn create_company(
        &self,
        name: &str,
        website: Option<&str>,
    ) -> Result<CompanyIdentity, StorageError> {
        // The no-op DO UPDATE makes RETURNING yield the surviving row when a
        // concurrent request created the company first. The conflict key
        // includes the website so the resolver's website gate holds: a
        // same-name row with a different website stays a separate identity.
        let row = sqlx::query(
            r#"
            INSERT INTO companies (id, name, website)
            VALUES ($1, $2, $3)
            ON CONFLICT ((lower(name)), (lower(coalesce(website, ''))))
                DO UPDATE SET name = companies.name
            RETURNING id, name, website
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(website)
        .fetch_optional(&self.pool)
        .await?;
        let row = row.ok_or(StorageError::MissingRow("companies upsert"))?;
        let company = company_from_row(&row)?;
        debug!(company_id = %company.id, name, "company row resolved");
        Ok(company)
    }

    async fn find_job_by_external_id_or_fingerprint(
        &self,
        external_id: &str,
        fingerprint: &str,
    ) -> Result<Option<JobRecord>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, external_id, fingerprint
              FROM jobs
             WHERE external_id = $1 OR fingerprint = $2
             ORDER BY (external_id = $1) DESC
             LIMIT 1
            "#,
        )
        .bind(external_id)
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(job_record_from_row).transpose()
    }

    async fn insert_job(
        &self,
        job: &CanonicalJob,
        company_id: Uuid,
    ) -> Result<JobRecord, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO jobs (
                id, external_id, source, title, company_id, url,
                location_city, location_state, location_country,
                salary_min, salary_max, currency,
                date_published, contact_email, fingerprint
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, external_id, fingerprint
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.external_id)
        .bind(job.source.as_str())
        .bind(&job.title)
        .bind(company_id)
        .bind(&job.url)
        .bind(&job.location_city)
        .bind(&job.location_state)
        .bind(&job.location_country)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.currency)
        .bind(&job.date_published)
        .bind(&job.contact_email)
        .bind(&job.fingerprint)
        .fetch_one(&self.pool)
        .await?;
        job_record_from_row(&row)
    }

    async fn insert_duplicate_link(
        &self,
        original_external_id: &str,
        duplicate_external_id: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO job_duplicates (
                id, original_external_id, duplicate_external_id, match_score
            )
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(original_external_id)
        .bind(duplicate_external_id)
        .bind(DUPLICATE_MATCH_SCORE)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
