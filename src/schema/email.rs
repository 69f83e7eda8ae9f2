//! Email address syntax check.

use once_cell::sync::Lazy;
use regex::Regex;

static LOCAL_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+$").expect("local-part pattern is valid")
});

static DOMAIN_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$").expect("label pattern is valid")
});

/// Returns the reason `address` is rejected.
pub(crate) fn check(address: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = address.rsplit_once('@') else {
        return Err("An email address must have an @-sign.");
    };
    if local.is_empty() {
        return Err("There must be something before the @-sign.");
    }
    if domain.is_empty() {
        return Err("There must be something after the @-sign.");
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") || !LOCAL_PART.is_match(local) {
        return Err("The part before the @-sign is not valid.");
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err("The part after the @-sign is not valid. It should have a period.");
    }
    if labels.iter().any(|l| !DOMAIN_LABEL.is_match(l)) {
        return Err("The part after the @-sign is not valid.");
    }
    let tld = labels.last().copied().unwrap_or_default();
    if tld.len() < 2 || tld.chars().all(|c| c.is_ascii_digit()) {
        return Err("The part after the @-sign is not valid.");
    }
    Ok(())
}

/// Canonical form of an accepted address: the domain is case-insensitive
/// and stored lowercased, the local part is kept as given.
pub(crate) fn normalize(address: &str) -> String {
    match address.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_ascii_lowercase()),
        None => address.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        for ok in ["a@x.com", "giulia.rossi+news@lonaire.it", "o'neil@mail.co.uk"] {
            assert!(check(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "@x.com", "a@", "a@localhost", "a b@x.com", "a@@x.com", ".a@x.com", "a@-x.com", "a@x.c", "a@1.23"] {
            assert!(check(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn normalize_lowercases_only_the_domain() {
        assert_eq!(normalize("Giulia.Rossi@LONAIRE.It"), "Giulia.Rossi@lonaire.it");
    }

    #[test]
    fn reason_names_the_missing_at_sign() {
        assert_eq!(check("nobody"), Err("An email address must have an @-sign."));
    }
}
