//! Format checks shared by the field validators

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,24}$").expect("email pattern is valid")
});

static FULL_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

static YEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("year-month pattern is valid"));

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("year pattern is valid"));

/// Addresses commonly typed into forms instead of a real one
const PLACEHOLDER_EMAILS: [&str; 8] = [
    "test@test.com",
    "test@example.com",
    "example@example.com",
    "user@example.com",
    "email@example.com",
    "foo@bar.com",
    "noreply@example.com",
    "a@a.com",
];

/// Oldest age accepted as an integer date of birth
const MAX_AGE: u64 = 150;

pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

pub fn is_placeholder_email(address: &str) -> bool {
    let folded = address.trim().to_lowercase();
    PLACEHOLDER_EMAILS.contains(&folded.as_str())
}

/// Four dot-separated integers, each 0-255
pub fn is_valid_ipv4(ip: &str) -> bool {
    let octets: Vec<&str> = ip.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            !octet.is_empty()
                && octet.len() <= 3
                && octet.chars().all(|c| c.is_ascii_digit())
                && octet.parse::<u16>().map(|n| n <= 255).unwrap_or(false)
        })
}

/// Colon-grouped hex, 2-8 groups, at most one `::`
///
/// Not RFC 4291 complete: embedded IPv4 tails and zone ids are rejected,
/// and short uncompressed forms are accepted.
pub fn is_valid_ipv6(ip: &str) -> bool {
    if !ip.contains(':') || ip.contains(":::") || ip.matches("::").count() > 1 {
        return false;
    }

    let groups_of = |part: &str| -> Option<Vec<String>> {
        if part.is_empty() {
            return Some(Vec::new());
        }
        part.split(':')
            .map(|group| {
                let well_formed = !group.is_empty()
                    && group.len() <= 4
                    && group.chars().all(|c| c.is_ascii_hexdigit());
                well_formed.then(|| group.to_string())
            })
            .collect()
    };

    match ip.split_once("::") {
        Some((head, tail)) => match (groups_of(head), groups_of(tail)) {
            (Some(head), Some(tail)) => (1..=7).contains(&(head.len() + tail.len())),
            _ => false,
        },
        None => groups_of(ip)
            .map(|groups| (2..=8).contains(&groups.len()))
            .unwrap_or(false),
    }
}

pub fn is_valid_ip(ip: &str) -> bool {
    let ip = ip.trim();
    is_valid_ipv4(ip) || is_valid_ipv6(ip)
}

/// `YYYY-MM-DD` naming a real calendar day
pub fn is_full_date(text: &str) -> bool {
    FULL_DATE_RE.is_match(text) && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

/// Date of birth: `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, or an integer age
pub fn is_valid_dob(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_u64().map(|age| age <= MAX_AGE).unwrap_or(false),
        Value::String(text) => {
            let text = text.trim();
            is_full_date(text)
                || YEAR_MONTH_RE.is_match(text)
                || YEAR_RE.is_match(text)
                || text
                    .parse::<u64>()
                    .map(|age| age <= MAX_AGE && text.len() <= 3)
                    .unwrap_or(false)
        }
        _ => false,
    }
}

/// Creation timestamp: RFC 3339, `YYYY-MM-DD[ HH:MM:SS]`, or epoch seconds
pub fn is_valid_timestamp(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_u64().is_some(),
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text).is_ok()
                || is_full_date(text)
                || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").is_ok()
                || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok()
        }
        _ => false,
    }
}

/// Brazilian CPF check digits
///
/// Accepts digits with the usual `.`/`-` separators; rejects repeated-digit
/// sequences such as `111.111.111-11`.
pub fn is_valid_cpf(value: &str) -> bool {
    if !value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '))
    {
        return false;
    }

    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check_digit = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let remainder = (sum * 10) % 11;
        if remainder == 10 {
            0
        } else {
            remainder
        }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

/// Count of ASCII digits in `text`
pub fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

/// String or number rendered as text
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn is_two_letters(text: &str) -> bool {
    text.len() == 2 && text.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("jo@doe.com"));
        assert!(is_valid_email("first.last+tag@mail.example.museum"));
        assert!(!is_valid_email("jo@doe"));
        assert!(!is_valid_email("jo doe@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("jo@x.c"));
        assert!(!is_valid_email("jo@x.c0m"));
    }

    #[test]
    fn test_placeholder_emails() {
        assert!(is_placeholder_email("Test@Test.com"));
        assert!(!is_placeholder_email("jo@doe.com"));
    }

    #[test]
    fn test_ipv4() {
        assert!(is_valid_ip("1.2.3.4"));
        assert!(is_valid_ip("255.255.255.255"));
        assert!(!is_valid_ip("256.1.1.1"));
        assert!(!is_valid_ip("1.2.3"));
        assert!(!is_valid_ip("1.2.3.4.5"));
        assert!(!is_valid_ip("a.b.c.d"));
        assert!(!is_valid_ip("1..3.4"));
    }

    #[test]
    fn test_ipv6_simplified() {
        assert!(is_valid_ip("2001:0db8:85a3:0000:0000:8a2e:0370:7334"));
        assert!(is_valid_ip("fe80::1"));
        assert!(is_valid_ip("::1"));
        assert!(is_valid_ip("2001:db8::"));
        assert!(!is_valid_ip("2001:db8:::1"));
        assert!(!is_valid_ip("1::2::3"));
        assert!(!is_valid_ip("gggg::1"));
        assert!(!is_valid_ip("1:2:3:4:5:6:7:8:9"));
        assert!(!is_valid_ip(":1:2"));
        assert!(!is_valid_ip("12345::1"));
    }

    #[test]
    fn test_dob_forms() {
        assert!(is_valid_dob(&json!("1990-05-17")));
        assert!(is_valid_dob(&json!("1990-05")));
        assert!(is_valid_dob(&json!("1990")));
        assert!(is_valid_dob(&json!(34)));
        assert!(is_valid_dob(&json!("34")));
        assert!(!is_valid_dob(&json!("1990-13")));
        assert!(!is_valid_dob(&json!("1990-02-30")));
        assert!(!is_valid_dob(&json!("17/05/1990")));
        assert!(!is_valid_dob(&json!(-3)));
        assert!(!is_valid_dob(&json!(true)));
    }

    #[test]
    fn test_timestamps() {
        assert!(is_valid_timestamp(&json!("2024-03-01T10:00:00Z")));
        assert!(is_valid_timestamp(&json!("2024-03-01")));
        assert!(is_valid_timestamp(&json!("2024-03-01 10:00:00")));
        assert!(is_valid_timestamp(&json!(1709287200)));
        assert!(!is_valid_timestamp(&json!("yesterday")));
    }

    #[test]
    fn test_cpf_checksum() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(!is_valid_cpf("529.982.247-24"));
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf("5299822472"));
        assert!(!is_valid_cpf("529x982.247-25"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(digit_count("(555) 123-4"), 8);
        assert_eq!(scalar_text(&json!(44)), Some("44".to_string()));
        assert_eq!(scalar_text(&json!(" +1 ")), Some("+1".to_string()));
        assert!(is_two_letters("US"));
        assert!(!is_two_letters("USA"));
    }
}
