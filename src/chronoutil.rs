//! ISO 8601 formatting and parsing for the timestamps a POST policy carries.
//!
//! The policy `expiration` uses the extended form (`2024-01-02T00:00:00Z`); `x-amz-date` uses the
//! basic form (`20240101T000000Z`); the credential scope uses the bare date (`20240101`).

use {
    crate::{constants::*, PostPolicyError},
    chrono::{
        naive::{NaiveDate, NaiveDateTime, NaiveTime},
        offset::FixedOffset,
        DateTime, Timelike, Utc,
    },
    lazy_static::lazy_static,
    regex::{Captures, Regex},
    std::str::FromStr,
};

lazy_static! {
    /// ISO 8601 basic format with second precision, e.g. `20240101T000000Z`.
    static ref ISO_8601_BASIC_REGEX: Regex = Regex::new(
        r"(?x)^
        (?P<year>\d{4})
        (?P<month>0[1-9]|1[0-2])
        (?P<day>0[1-9]|[12][0-9]|3[01])
        T
        (?P<hour>[01][0-9]|2[0-3])
        (?P<minute>[0-5][0-9])
        (?P<second>[0-5][0-9])
        (?:\.(?P<fraction>\d{1,9}))?
        (?P<offset>[-+][01][0-9][0-5][0-9]|Z)$").expect("ISO 8601 basic regex is valid");

    /// ISO 8601 extended format with second precision, e.g. `2024-01-01T00:00:00Z`.
    static ref ISO_8601_EXTENDED_REGEX: Regex = Regex::new(
        r"(?x)^
        (?P<year>\d{4})-
        (?P<month>0[1-9]|1[0-2])-
        (?P<day>0[1-9]|[12][0-9]|3[01])
        T
        (?P<hour>[01][0-9]|2[0-3]):
        (?P<minute>[0-5][0-9]):
        (?P<second>[0-5][0-9])
        (?:\.(?P<fraction>\d{1,9}))?
        (?P<offset>[-+][01][0-9]:[0-5][0-9]|Z)$").expect("ISO 8601 extended regex is valid");
}

/// Format a timestamp as a policy `expiration` value, e.g. `2024-01-02T00:00:00Z`.
pub(crate) fn format_expiration(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO8601_EXTENDED_FORMAT).to_string()
}

/// Format a timestamp as an `x-amz-date` value, e.g. `20240101T000000Z`.
pub(crate) fn format_amz_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO8601_COMPACT_FORMAT).to_string()
}

/// Format a date for the credential scope, e.g. `20240101`.
pub(crate) fn format_scope_date(date: NaiveDate) -> String {
    date.format(ISO8601_DATE_FORMAT).to_string()
}

/// Drop any fractional seconds from a timestamp.
pub(crate) fn truncate_to_seconds(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    // Setting nanoseconds to 0 is always in range.
    timestamp.with_nanosecond(0).unwrap_or(timestamp)
}

fn capture_u32(cap: &Captures, name: &str) -> Option<u32> {
    cap.name(name).and_then(|m| u32::from_str(m.as_str()).ok())
}

/// Parse an ISO 8601 timestamp in either the basic (`20240101T000000Z`) or the extended
/// (`2024-01-01T00:00:00Z`) form and convert it to UTC.
///
/// Fractional seconds are accepted and discarded, since every timestamp this crate emits has
/// second precision.
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, PostPolicyError> {
    let malformed = || PostPolicyError::MalformedTimestamp(format!("Timestamp is not in ISO 8601 format: '{}'", s));
    let cap = ISO_8601_EXTENDED_REGEX
        .captures(s)
        .or_else(|| ISO_8601_BASIC_REGEX.captures(s))
        .ok_or_else(malformed)?;

    let year = cap.name("year").and_then(|m| i32::from_str(m.as_str()).ok()).ok_or_else(malformed)?;
    let month = capture_u32(&cap, "month").ok_or_else(malformed)?;
    let day = capture_u32(&cap, "day").ok_or_else(malformed)?;
    let hour = capture_u32(&cap, "hour").ok_or_else(malformed)?;
    let minute = capture_u32(&cap, "minute").ok_or_else(malformed)?;
    let second = capture_u32(&cap, "second").ok_or_else(malformed)?;

    // Day-of-month overflow (e.g. February 30) is caught here.
    let naive_date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)?;
    let naive_time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(malformed)?;
    let naive_dt = NaiveDateTime::new(naive_date, naive_time);

    let offset_str = cap.name("offset").map(|m| m.as_str()).ok_or_else(malformed)?;
    let offset_secs = if offset_str == "Z" {
        0
    } else {
        // Must be [+-]HHMM at this point.
        let offset_condensed = offset_str.replace(':', "");
        let (sign_str, hm) = offset_condensed.split_at(1);
        let (hour_off_str, minute_off_str) = hm.split_at(2);
        let sign = if sign_str == "-" {
            -1
        } else {
            1
        };

        let hour = i32::from_str(hour_off_str).map_err(|_| malformed())?;
        let min = i32::from_str(minute_off_str).map_err(|_| malformed())?;
        sign * (hour * 3600 + min * 60)
    };

    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(malformed)?;
    let local = naive_dt.and_local_timezone(offset).single().ok_or_else(malformed)?;
    Ok(local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use {
        super::{format_amz_date, format_expiration, format_scope_date, parse_iso8601, truncate_to_seconds},
        chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc},
    };

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test_log::test]
    fn test_formats() {
        let t = ts(2024, 1, 2, 3, 4, 5);
        assert_eq!(format_expiration(&t), "2024-01-02T03:04:05Z");
        assert_eq!(format_amz_date(&t), "20240102T030405Z");
        assert_eq!(format_scope_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), "20240102");
    }

    #[test_log::test]
    fn test_truncate() {
        let t = ts(2024, 1, 2, 3, 4, 5).with_nanosecond(999_999_999).unwrap();
        let truncated = truncate_to_seconds(t);
        assert_eq!(truncated, ts(2024, 1, 2, 3, 4, 5));
        assert_eq!(format_expiration(&t), "2024-01-02T03:04:05Z");
    }

    #[test_log::test]
    fn test_parse_forms() {
        let expected = ts(2024, 1, 1, 0, 0, 0);
        assert_eq!(parse_iso8601("20240101T000000Z").unwrap(), expected);
        assert_eq!(parse_iso8601("2024-01-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_iso8601("2024-01-01T00:00:00.250Z").unwrap(), expected);
        assert_eq!(parse_iso8601("2024-01-01T01:30:00+01:30").unwrap(), expected);
        assert_eq!(parse_iso8601("20231231T220000-0200").unwrap(), expected);
    }

    #[test_log::test]
    fn test_parse_rejects() {
        for bad in [
            "",
            "2024-01-01",
            "2024-13-01T00:00:00Z",
            "2024-02-30T00:00:00Z",
            "2024-01-01T00:00:00",
            "garbage",
            "2024-0101T00:0000Z",
            "20240101T00:00:00Z",
            "2024-01-01T000000Z",
            "2024-01-01T00:00:00+0100",
            "20240101T000000+01:00",
        ] {
            let e = parse_iso8601(bad).unwrap_err();
            assert_eq!(e.to_string(), format!("Timestamp is not in ISO 8601 format: '{}'", bad));
        }
    }
}
