/// Row Normalizer — extracts a canonical review record from one CSV row.
///
/// Exports from different platforms name their columns differently, so both
/// the content and the date column are located by alias lists. Matching is
/// case-insensitive on trimmed header names for BOTH lists (one consistent
/// policy; the alias lists themselves are the contract).
use chrono::NaiveDate;

use crate::models::review::NormalizedReview;

/// Column aliases recognized as review text, highest priority first.
pub const CONTENT_ALIASES: [&str; 5] = ["content", "text", "review", "comment", "caption"];

/// Column aliases recognized as the review date, highest priority first.
/// Indonesian platform exports label the column `tanggal` or `waktu`.
pub const DATE_ALIASES: [&str; 10] = [
    "date",
    "publish_date",
    "created_at",
    "timestamp",
    "published_at",
    "time",
    "created",
    "published",
    "tanggal",
    "waktu",
];

/// One parsed data row paired with the upload's header row. Ephemeral; lives
/// only long enough to be normalized.
pub struct RawRow<'a> {
    headers: &'a [String],
    fields: &'a [String],
}

impl<'a> RawRow<'a> {
    pub fn new(headers: &'a [String], fields: &'a [String]) -> Self {
        Self { headers, fields }
    }

    /// Case-insensitive, whitespace-trimmed header lookup.
    fn value_for(&self, alias: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(alias))
            .and_then(|i| self.fields.get(i))
            .map(|v| v.as_str())
    }

    /// First alias (in priority order) whose column holds a non-empty value.
    fn first_match(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|alias| {
            self.value_for(alias)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
    }
}

/// Builds a [`NormalizedReview`] from one data row, or `None` when the row has
/// no usable content (silently dropped, not an error).
///
/// `ordinal` is the 1-based position of the data row within the upload.
/// Dropped rows keep their ordinal, so surviving ids may have gaps.
pub fn normalize_row(
    row: &RawRow,
    ordinal: usize,
    source: &str,
    fallback_date: NaiveDate,
) -> Option<NormalizedReview> {
    let content = row.first_match(&CONTENT_ALIASES)?;

    let date = match row.first_match(&DATE_ALIASES) {
        Some(raw) => normalize_date(raw, fallback_date),
        None => iso_date(fallback_date),
    };

    Some(NormalizedReview {
        id: format!("csv-row-{ordinal}"),
        content: content.to_string(),
        date,
        source: source.to_string(),
    })
}

/// Reduces a raw date value to `YYYY-MM-DD`: take the part before the first
/// `T` or space (drops time-of-day and timezone), keep at most 10 characters,
/// and verify the result is a real calendar date. Anything that fails falls
/// back to the upload date.
fn normalize_date(raw: &str, fallback: NaiveDate) -> String {
    let head = raw.trim();
    let head = match head.split(['T', ' ']).next() {
        Some(h) => h,
        None => head,
    };
    let candidate = head.get(..10).unwrap_or(head);

    match NaiveDate::parse_from_str(candidate, "%Y-%m-%d") {
        // Reformat so single-digit months/days come out zero-padded.
        Ok(date) => iso_date(date),
        Err(_) => iso_date(fallback),
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
