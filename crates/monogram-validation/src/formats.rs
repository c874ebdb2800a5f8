//! Format validation for common string patterns
//!
//! Pre-compiled regex validators for emails, URLs and wall-clock times.

use once_cell::sync::Lazy;
use regex::Regex;

/// Email regex pattern (permissive, matches anything shaped like a@b.c)
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+@.+\..+$").unwrap());

/// URL regex pattern (http, https, ftp, ftps)
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:http|ftp)s?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .unwrap()
});

/// URL regex pattern restricted to http/https
static HTTP_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .unwrap()
});

/// Wall-clock time pattern ("h:m" through "hh:mm")
static TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{1,2})$").unwrap());

/// Validate email format
pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Validate URL format (http/https/ftp/ftps)
pub fn is_url(value: &str) -> bool {
    URL_REGEX.is_match(value)
}

/// Validate URL format restricted to http/https
pub fn is_http_url(value: &str) -> bool {
    HTTP_URL_REGEX.is_match(value)
}

/// Validate a "hh:mm" wall-clock time
///
/// "24:00" is accepted as the conventional end-of-day marker.
pub fn is_time_of_day(value: &str) -> bool {
    let Some(caps) = TIME_REGEX.captures(value) else {
        return false;
    };
    // The regex only admits 1-2 digit groups, so these parses cannot fail.
    let hours: u32 = caps[1].parse().unwrap_or(99);
    let minutes: u32 = caps[2].parse().unwrap_or(99);
    if hours == 24 && minutes == 0 {
        return true;
    }
    hours <= 23 && minutes <= 59
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_email("user@example.com"));
        assert!(is_email("a.b+c@sub.domain.org"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("missing@tld"));
    }

    #[test]
    fn test_url() {
        assert!(is_url("https://example.com/path?q=1"));
        assert!(is_url("http://localhost:8080/"));
        assert!(is_url("ftp://files.example.com/pub"));
        assert!(!is_url("example.com"));
        assert!(!is_url("mailto:user@example.com"));
    }

    #[test]
    fn test_http_url() {
        assert!(is_http_url("https://example.com"));
        assert!(is_http_url("http://127.0.0.1:9000/api"));
        assert!(!is_http_url("ftp://files.example.com/pub"));
    }

    #[test]
    fn test_time_of_day() {
        assert!(is_time_of_day("09:30"));
        assert!(is_time_of_day("9:5"));
        assert!(is_time_of_day("23:59"));
        assert!(is_time_of_day("24:00")); // end-of-day marker
        assert!(!is_time_of_day("24:01"));
        assert!(!is_time_of_day("25:00"));
        assert!(!is_time_of_day("12:60"));
        assert!(!is_time_of_day("noon"));
    }
}
