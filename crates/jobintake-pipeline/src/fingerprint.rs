//! Content fingerprint used as the dedup key.

use jobintake_adapters::normalize::normalize_for_hash;

/// Deterministic hash over normalized (company, title, city).
///
/// md5 here is a content key, not a security boundary; a 128-bit
/// general-purpose digest is enough to make fingerprint collisions a
/// non-concern for dedup. Pure: independent of process, time, and locale.
pub fn fingerprint(company_name: &str, title: &str, city: &str) -> String {
    let base = format!(
        "{}_{}_{}",
        normalize_for_hash(company_name),
        normalize_for_hash(title),
        normalize_for_hash(city)
    );
    format!("{:x}", md5::compute(base.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_calls_are_stable() {
        assert_eq!(
            fingerprint("Acme Corp", "Engineer", "Sydney"),
            fingerprint("Acme Corp", "Engineer", "Sydney")
        );
    }

    #[test]
    fn case_and_whitespace_variations_collapse() {
        assert_eq!(
            fingerprint("Acme Corp", "Engineer", "Sydney"),
            fingerprint("acme corp", "ENGINEER", " sydney ")
        );
    }

    #[test]
    fn differing_city_changes_the_key() {
        assert_ne!(
            fingerprint("Acme", "Engineer", "Sydney"),
            fingerprint("Acme", "Engineer", "Melbourne")
        );
    }

    #[test]
    fn empty_city_is_a_valid_input() {
        assert_eq!(fingerprint("Acme", "Engineer", ""), fingerprint("Acme", "Engineer", "  "));
    }
}
