use crate::error::{ContribError, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const FILENAME_STAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";
const GIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S +0000";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `YYYY-MM-DDTHH?MM?SS` where `?` is `sep`, digits everywhere else.
fn has_stamp_shape(s: &str, sep: u8) -> bool {
    let b = s.as_bytes();
    if b.len() != 19 {
        return false;
    }
    b.iter().enumerate().all(|(i, &c)| match i {
        4 | 7 => c == b'-',
        10 => c == b'T',
        13 | 16 => c == sep,
        _ => c.is_ascii_digit(),
    })
}

/// Validate a since-date given as exactly `YYYY-MM-DDTHH:MM:SSZ`.
pub fn parse_since_date(input: &str) -> Result<DateTime<Utc>> {
    let body = input
        .strip_suffix('Z')
        .filter(|b| has_stamp_shape(b, b':'))
        .ok_or_else(|| ContribError::InvalidDate(input.to_string()))?;
    NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| ContribError::InvalidDate(input.to_string()))
}

pub fn to_iso(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO_FORMAT).to_string()
}

fn parse_iso(input: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Normalize an API timestamp to UTC with a `Z` suffix. Empty stays empty,
/// anything unparseable is passed through.
pub fn normalize_timestamp(input: Option<&str>) -> String {
    match input {
        None => String::new(),
        Some(raw) => parse_iso(raw).map(|dt| to_iso(&dt)).unwrap_or_else(|| raw.to_string()),
    }
}

/// `2024-03-01T12:00:00Z` -> `2024-03-01T12-00-00`
pub fn filename_stamp(timestamp: &str) -> String {
    timestamp.replace(':', "-").replace('Z', "")
}

/// Recover the timestamp encoded in a `YYYY-MM-DDTHH-MM-SS-<id>.md` name.
pub fn timestamp_from_filename(filename: &str) -> Option<DateTime<Utc>> {
    let prefix = filename.get(..19)?;
    if !has_stamp_shape(prefix, b'-') || filename.as_bytes().get(19) != Some(&b'-') {
        return None;
    }
    NaiveDateTime::parse_from_str(prefix, FILENAME_STAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Date syntax accepted by `GIT_AUTHOR_DATE` / `GIT_COMMITTER_DATE`.
pub fn git_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(GIT_DATE_FORMAT).to_string()
}

/// Human-readable date for markdown bodies; falls back to the raw value.
pub fn display_date(raw: &str) -> String {
    parse_iso(raw)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Collapse a free-text field onto one line so each CSV record stays one line.
pub fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}

pub fn short_sha(sha: &str) -> String {
    sha.chars().take(7).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn since_date_requires_exact_shape() {
        assert!(parse_since_date("2024-01-01T00:00:00Z").is_ok());
        assert!(parse_since_date("2024-01-01").is_err());
        assert!(parse_since_date("2024-1-01T00:00:00Z").is_err());
        assert!(parse_since_date("2024-01-01T00:00:00+01:00").is_err());
        assert!(parse_since_date("2024-02-30T00:00:00Z").is_err());
    }

    #[test]
    fn filename_round_trips_to_git_date() {
        let stamp = filename_stamp("2024-03-01T12:00:00Z");
        assert_eq!(stamp, "2024-03-01T12-00-00");

        let name = format!("{stamp}-abc1234.md");
        let ts = timestamp_from_filename(&name).unwrap();
        assert_eq!(git_date(&ts), "2024-03-01 12:00:00 +0000");
        assert_eq!(to_iso(&ts), "2024-03-01T12:00:00Z");
    }

    #[test]
    fn bad_filename_prefix_is_rejected() {
        assert!(timestamp_from_filename("README.md").is_none());
        assert!(timestamp_from_filename("2024-03-01T12-00-00.md").is_none());
        assert!(timestamp_from_filename("2024-13-01T12-00-00-abc.md").is_none());
        assert!(timestamp_from_filename("notes-2024-03-01T12-00-00-abc.md").is_none());
    }

    #[test]
    fn normalize_converts_offsets_to_utc() {
        assert_eq!(
            normalize_timestamp(Some("2024-03-01T14:00:00+02:00")),
            "2024-03-01T12:00:00Z"
        );
        assert_eq!(normalize_timestamp(None), "");
        assert_eq!(normalize_timestamp(Some("yesterday")), "yesterday");
    }

    #[test]
    fn display_date_falls_back_to_raw() {
        assert_eq!(display_date("2024-03-01T12:00:00Z"), "2024-03-01 12:00:00");
        assert_eq!(display_date("not a date"), "not a date");
    }

    #[test]
    fn single_line_strips_newlines() {
        assert_eq!(single_line(" fix\r\nthe bug \n"), "fix  the bug");
    }
}
