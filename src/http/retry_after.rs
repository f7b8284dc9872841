//! `Retry-After` header parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Milliseconds to wait before retrying, per the `Retry-After` header.
///
/// Accepts delta-seconds (`"30"` → 30000) or an HTTP-date, in which case the
/// remaining time until that date is returned, floored at zero. Missing or
/// unparseable headers yield `None`.
pub fn parse_retry_after(header: Option<&str>) -> Option<u64> {
    parse_retry_after_at(header, Utc::now())
}

/// [`parse_retry_after`] against an explicit current time.
pub fn parse_retry_after_at(header: Option<&str>, now: DateTime<Utc>) -> Option<u64> {
    let value = header?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds.saturating_mul(1000));
    }

    let target = parse_http_date(value)?;
    let remaining = target.signed_duration_since(now).num_milliseconds();
    Some(remaining.max(0) as u64)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    // IMF-fixdate, e.g. "Sun, 06 Nov 1994 08:49:37 GMT"
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }

    // RFC 850, e.g. "Sunday, 06-Nov-94 08:49:37 GMT", then asctime,
    // e.g. "Sun Nov  6 08:49:37 1994"
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
