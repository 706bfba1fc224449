//! Contact channel extraction

use folio_domain::LeadChannels;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}")
        .expect("valid email regex")
});

static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:https?://)?(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}(?::\d{2,5})?(?:/[^\s<>()"']*)?"#,
    )
    .expect("valid website regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d[\d ()-]*\d").expect("valid phone regex"));

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{1,2}-\d{1,2}").expect("valid date regex"));

static PHONE_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:call|phone|tel|mobile|cell|whats\s?app|text|ring|reach|number|contact)\b")
        .expect("valid phone context regex")
});

/// Top-level domains accepted for bare domains without scheme or `www.`
const COMMON_TLDS: &[&str] = &[
    "com", "net", "org", "io", "co", "dev", "app", "ai", "me", "info", "biz", "design", "studio",
    "agency", "tech", "site", "online", "xyz", "us", "uk", "ca", "au", "de", "fr", "nl", "es",
    "it", "in", "eu",
];

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Extract contact channels from free text
///
/// The first plausible email, phone number and website are returned. Emails
/// are lower-cased; phones are returned as written; websites lose their
/// scheme and have their host lower-cased while the path keeps its case.
/// Emails and URLs are masked before phone matching so their digits never
/// read as a phone number. Phone digits are grouped by single spaces, hyphens
/// or parentheses; dotted numbers, dates and spaced ranges are not phones.
pub fn parse_lead_channels_from_text(text: &str) -> LeadChannels {
    let email = EMAIL_RE
        .find(text)
        .map(|m| m.as_str().trim_end_matches('.').to_lowercase());

    let without_emails = mask(text, &EMAIL_RE);
    let website = WEBSITE_RE
        .find_iter(&without_emails)
        .find_map(|m| normalize_website(m.as_str()));

    let without_urls = mask(&without_emails, &WEBSITE_RE);
    let phone = PHONE_RE
        .find_iter(&without_urls)
        .map(|m| m.as_str())
        .find(|candidate| is_plausible_phone(candidate))
        .map(str::to_string);

    LeadChannels {
        email,
        phone,
        website,
    }
}

/// Whether the text's channels are strong enough to signal a lead on their own
///
/// Emails and websites always are. A bare phone number needs an
/// international prefix, an area code in parentheses, or a word like "call"
/// or "number" nearby.
pub(crate) fn has_contact_evidence(channels: &LeadChannels, text: &str) -> bool {
    if !channels.has_any() {
        return false;
    }
    if channels.email.is_some() || channels.website.is_some() {
        return true;
    }
    match channels.phone.as_deref() {
        Some(phone) => {
            phone.starts_with('+') || phone.starts_with('(') || PHONE_CONTEXT_RE.is_match(text)
        }
        None => false,
    }
}

fn is_plausible_phone(candidate: &str) -> bool {
    let digits = candidate.chars().filter(char::is_ascii_digit).count();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return false;
    }
    // Groups are joined by exactly one separator
    if ["  ", "--", " -", "- "].iter().any(|sep| candidate.contains(sep)) {
        return false;
    }
    !DATE_RE.is_match(candidate)
}

/// Replace every match with spaces of equal length
fn mask(text: &str, re: &Regex) -> String {
    re.replace_all(text, |caps: &Captures| " ".repeat(caps[0].len()))
        .into_owned()
}

fn normalize_website(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches(|c: char| ".,;:!?'\")]}".contains(c));

    let lower = trimmed.to_ascii_lowercase();
    let (has_scheme, rest) = if lower.starts_with("https://") {
        (true, &trimmed[8..])
    } else if lower.starts_with("http://") {
        (true, &trimmed[7..])
    } else {
        (false, trimmed)
    };

    let (host, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let host = host.to_ascii_lowercase();

    let tld = host
        .split(':')
        .next()
        .and_then(|h| h.rsplit('.').next())
        .unwrap_or("");
    if !(has_scheme || host.starts_with("www.") || COMMON_TLDS.contains(&tld)) {
        return None;
    }

    Some(format!("{}{}", host, path.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_and_website_fixture() {
        let channels = parse_lead_channels_from_text(
            "You can reach me at +1 555 444 3333 and details are on https://Example.com/services",
        );
        assert_eq!(channels.phone.as_deref(), Some("+1 555 444 3333"));
        assert_eq!(channels.website.as_deref(), Some("example.com/services"));
        assert_eq!(channels.email, None);
    }

    #[test]
    fn test_absent_channels_are_none() {
        assert_eq!(
            parse_lead_channels_from_text("Just browsing, thanks!"),
            LeadChannels::default()
        );
    }

    #[test]
    fn test_email_lowercased_and_not_a_website() {
        let channels = parse_lead_channels_from_text("Mail Jane.Doe@Studio.COM.");
        assert_eq!(channels.email.as_deref(), Some("jane.doe@studio.com"));
        assert_eq!(channels.website, None);
    }

    #[test]
    fn test_digits_in_email_or_url_are_not_phones() {
        let channels =
            parse_lead_channels_from_text("write to sales5551234567@co.com or see https://x.io/p/5551234567");
        assert_eq!(channels.phone, None);
        assert_eq!(channels.website.as_deref(), Some("x.io/p/5551234567"));
    }

    #[test]
    fn test_formatted_phone() {
        let channels = parse_lead_channels_from_text("Call (555) 111-2222 after 5.");
        assert_eq!(channels.phone.as_deref(), Some("(555) 111-2222"));
    }

    #[test]
    fn test_short_and_long_digit_runs_rejected() {
        assert_eq!(parse_lead_channels_from_text("Budget is 5000 for 12 pages").phone, None);
        assert_eq!(
            parse_lead_channels_from_text("Order 1234 5678 9012 3456 7").phone,
            None
        );
    }

    #[test]
    fn test_numbers_that_are_not_phones() {
        for text in [
            "Our budget is 15000 - 20000 dollars",
            "Can we launch by 2025-03-15?",
            "We expect 1.200.000 visitors a year",
            "Between 2024-1-5 and 2024-2-5 works",
        ] {
            assert_eq!(parse_lead_channels_from_text(text).phone, None, "{}", text);
        }
    }

    #[test]
    fn test_phone_found_after_a_range() {
        let channels = parse_lead_channels_from_text("Budget 15000 - 20000, call 555-123-4567");
        assert_eq!(channels.phone.as_deref(), Some("555-123-4567"));
    }

    #[test]
    fn test_bare_phone_needs_context() {
        let bare = parse_lead_channels_from_text("Reference 555 123 4567 please");
        assert_eq!(bare.phone.as_deref(), Some("555 123 4567"));
        assert!(!has_contact_evidence(&bare, "Reference 555 123 4567 please"));

        let text = "My number is 555 123 4567";
        assert!(has_contact_evidence(&parse_lead_channels_from_text(text), text));

        let text = "+1 555 123 4567";
        assert!(has_contact_evidence(&parse_lead_channels_from_text(text), text));

        let text = "hi@acme.io";
        assert!(has_contact_evidence(&parse_lead_channels_from_text(text), text));
    }

    #[test]
    fn test_bare_domain_needs_known_tld() {
        assert_eq!(
            parse_lead_channels_from_text("my site is acme-design.studio").website.as_deref(),
            Some("acme-design.studio")
        );
        assert_eq!(parse_lead_channels_from_text("we use Node.js and main.rs").website, None);
        assert_eq!(
            parse_lead_channels_from_text("see www.Acme.build/Work").website.as_deref(),
            Some("www.acme.build/Work")
        );
    }

    #[test]
    fn test_trailing_punctuation_stripped() {
        let channels = parse_lead_channels_from_text("Portfolio: http://Example.org/Case-Studies/.");
        assert_eq!(channels.website.as_deref(), Some("example.org/Case-Studies"));
    }
}
