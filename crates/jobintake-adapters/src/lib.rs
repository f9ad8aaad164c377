//! Source adapter contracts + per-source payload extraction.

pub mod normalize;

use jobintake_core::{JobDraft, SourceTag, ValidationError};
use serde_json::Value as JsonValue;

/// A pure mapping from one source's raw payload shape to a canonical draft.
///
/// Adapters never error on missing optional fields; only a required field
/// (external id, title, company name, url) that stays empty after every
/// alias is a `ValidationError`.
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> SourceTag;
    fn extract(&self, raw: &JsonValue) -> Result<JobDraft, ValidationError>;
}

/// Selects the adapter for a declared source tag. Unknown tags fall through
/// to the default adapter, whose alias lists cover every generic
/// camelCase/snake_case variant seen across sources.
pub fn adapter_for(tag: SourceTag) -> &'static dyn SourceAdapter {
    match tag {
        SourceTag::LinkedIn => &LinkedInAdapter,
        SourceTag::Indeed => &IndeedAdapter,
        SourceTag::Seek => &SeekAdapter,
        SourceTag::Default | SourceTag::Unknown => &DefaultAdapter,
    }
}

/// Ordered candidate key paths per canonical field. Extraction is
/// first-match-wins, never a merge across keys.
struct FieldAliases {
    external_id: &'static [&'static str],
    /// Tried before `title`; only LinkedIn populates this, because its
    /// long-form title is frequently noisy.
    title_short: &'static [&'static str],
    title: &'static [&'static str],
    company: &'static [&'static str],
    website: &'static [&'static str],
    url: &'static [&'static str],
    location: &'static [&'static str],
    salary_min: &'static [&'static str],
    salary_max: &'static [&'static str],
    currency: &'static [&'static str],
    date_published: &'static [&'static str],
    contact_email: &'static [&'static str],
}

fn extract_with(
    aliases: &FieldAliases,
    source: SourceTag,
    raw: &JsonValue,
) -> Result<JobDraft, ValidationError> {
    let external_id =
        first_id(raw, aliases.external_id).ok_or(ValidationError::missing("external_id"))?;
    let title = first_string(raw, aliases.title_short)
        .or_else(|| first_string(raw, aliases.title))
        .ok_or(ValidationError::missing("title"))?;
    let company_name =
        first_company_name(raw, aliases.company).ok_or(ValidationError::missing("company_name"))?;
    let url = first_string(raw, aliases.url).ok_or(ValidationError::missing("url"))?;

    Ok(JobDraft {
        external_id,
        source,
        title,
        company_name,
        company_website: first_company_website(raw, aliases.company, aliases.website),
        url,
        location: aliases
            .location
            .iter()
            .find_map(|key| lookup(raw, key))
            .cloned(),
        salary_min: first_number(raw, aliases.salary_min),
        salary_max: first_number(raw, aliases.salary_max),
        currency: first_string(raw, aliases.currency),
        date_published: first_string(raw, aliases.date_published),
        contact_email: first_string(raw, aliases.contact_email),
    })
}

/// Walks a dotted path (`"salary.min"`) into nested objects.
fn lookup<'a>(raw: &'a JsonValue, key: &str) -> Option<&'a JsonValue> {
    key.split('.').try_fold(raw, |cur, segment| cur.get(segment))
}

fn string_value(value: &JsonValue) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_string(raw: &JsonValue, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| lookup(raw, key).and_then(string_value))
}

/// External ids are occasionally sent as bare numbers.
fn first_id(raw: &JsonValue, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let value = lookup(raw, key)?;
        string_value(value).or_else(|| value.as_i64().map(|n| n.to_string()))
    })
}

fn first_number(raw: &JsonValue, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| {
        let value = lookup(raw, key)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    })
}

/// Company fields arrive either as flat strings or as nested
/// `{name, website}` / `{name, url}` objects.
fn first_company_name(raw: &JsonValue, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let value = lookup(raw, key)?;
        if value.is_object() {
            value.get("name").and_then(string_value)
        } else {
            string_value(value)
        }
    })
}

fn first_company_website(
    raw: &JsonValue,
    company_keys: &[&str],
    website_keys: &[&str],
) -> Option<String> {
    first_string(raw, website_keys).or_else(|| {
        company_keys.iter().find_map(|key| {
            let value = lookup(raw, key)?;
            value
                .get("website")
                .and_then(string_value)
                .or_else(|| value.get("url").and_then(string_value))
        })
    })
}

/// Fallback for payloads with no or an unrecognized source tag; its lists
/// union the generic aliases of every known source.
struct DefaultAdapter;

const DEFAULT_ALIASES: FieldAliases = FieldAliases {
    external_id: &["job_id", "jobId", "external_id", "externalId", "id", "reference"],
    title_short: &[],
    title: &["job_title", "jobTitle", "title", "position", "role"],
    company: &[
        "company_name",
        "companyName",
        "company",
        "employer",
        "employer_name",
        "hiringOrganization",
    ],
    website: &["company_website", "companyWebsite", "website", "employer_website"],
    url: &["job_url", "jobUrl", "url", "link", "apply_url", "applyUrl"],
    location: &["location", "job_location", "jobLocation", "locations"],
    salary_min: &["salary_min", "salaryMin", "salary.min"],
    salary_max: &["salary_max", "salaryMax", "salary.max"],
    currency: &["currency", "salary_currency", "salaryCurrency", "salary.currency"],
    date_published: &[
        "date_published",
        "datePublished",
        "posted_at",
        "postedAt",
        "listed_date",
    ],
    contact_email: &["contact_email", "contactEmail", "email"],
};

impl SourceAdapter for DefaultAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::Default
    }

    fn extract(&self, raw: &JsonValue) -> Result<JobDraft, ValidationError> {
        extract_with(&DEFAULT_ALIASES, SourceTag::Default, raw)
    }
}

struct LinkedInAdapter;

const LINKEDIN_ALIASES: FieldAliases = FieldAliases {
    external_id: &["jobPostingId", "jobId", "id"],
    title_short: &["titleShort", "shortTitle"],
    title: &["title", "jobTitle"],
    company: &["hiringOrganization", "companyName", "company"],
    website: &["companyWebsite", "website"],
    url: &["jobPostingUrl", "applyUrl", "url"],
    location: &["formattedLocation", "location"],
    salary_min: &["salary.min", "salaryMin"],
    salary_max: &["salary.max", "salaryMax"],
    currency: &["salary.currency", "currency"],
    date_published: &["listedAt", "datePublished"],
    contact_email: &["contactEmail"],
};

impl SourceAdapter for LinkedInAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::LinkedIn
    }

    fn extract(&self, raw: &JsonValue) -> Result<JobDraft, ValidationError> {
        extract_with(&LINKEDIN_ALIASES, SourceTag::LinkedIn, raw)
    }
}

struct IndeedAdapter;

const INDEED_ALIASES: FieldAliases = FieldAliases {
    external_id: &["jobkey", "job_id", "id"],
    title_short: &[],
    title: &["job_title", "jobtitle", "title"],
    company: &["company", "company_name"],
    website: &["company_website", "website"],
    url: &["url", "job_url", "link"],
    location: &["formatted_location", "location"],
    salary_min: &["salary_min", "salary.min"],
    salary_max: &["salary_max", "salary.max"],
    currency: &["salary_currency", "currency"],
    date_published: &["date", "pub_date", "date_published"],
    contact_email: &["contact_email"],
};

impl SourceAdapter for IndeedAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::Indeed
    }

    fn extract(&self, raw: &JsonValue) -> Result<JobDraft, ValidationError> {
        extract_with(&INDEED_ALIASES, SourceTag::Indeed, raw)
    }
}

struct SeekAdapter;

const SEEK_ALIASES: FieldAliases = FieldAliases {
    external_id: &["id", "advertiser_job_id", "jobId"],
    title_short: &[],
    title: &["title", "job_title"],
    company: &["advertiser", "company_name", "companyName"],
    website: &["company_website", "website"],
    url: &["job_url", "url", "listing_url"],
    location: &["locations", "location"],
    salary_min: &["salary_min", "salaryMin"],
    salary_max: &["salary_max", "salaryMax"],
    currency: &["currency"],
    date_published: &["listing_date", "listingDate", "date_published"],
    contact_email: &["contact_email"],
};

impl SourceAdapter for SeekAdapter {
    fn source(&self) -> SourceTag {
        SourceTag::Seek
    }

    fn extract(&self, raw: &JsonValue) -> Result<JobDraft, ValidationError> {
        extract_with(&SEEK_ALIASES, SourceTag::Seek, raw)
    }
}
