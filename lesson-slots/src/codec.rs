use chrono::format::{parse, Item, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;

use crate::error::SlotError;
use crate::slot::Slot;

macro_rules! format_items {
    ($fmt:expr) => {{
        static ITEMS: Lazy<Vec<Item<'static>>> = Lazy::new(|| StrftimeItems::new($fmt).collect());
        ITEMS.as_slice()
    }};
}

fn date_items() -> &'static [Item<'static>] {
    format_items!("%Y-%m-%d")
}

fn time_items() -> &'static [Item<'static>] {
    format_items!("%H:%M")
}

fn parse_with(s: &str, items: &[Item<'_>]) -> Option<Parsed> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, s.trim(), items.iter()).ok()?;
    Some(parsed)
}

// chrono reads `%m`, `%d`, `%H` and `%M` without their leading zero, the
// input formats do not allow that.
fn field_widths(s: &str, separator: char) -> Vec<usize> {
    s.trim().split(separator).map(str::len).collect()
}

/// Parses a `YYYY-MM-DD` calendar date. Years outside 0..=9999 carry a sign.
pub fn parse_date(s: &str) -> Result<NaiveDate, SlotError> {
    let unsigned = s.trim().trim_start_matches(|c: char| c == '+' || c == '-');
    let padded = matches!(field_widths(unsigned, '-').as_slice(), [year, 2, 2] if *year >= 4);

    padded
        .then(|| parse_with(s, date_items()))
        .flatten()
        .and_then(|parsed| parsed.to_naive_date().ok())
        .ok_or_else(|| SlotError::InvalidDate(s.to_string()))
}

pub fn parse_time(s: &str) -> Result<NaiveTime, SlotError> {
    let padded = field_widths(s, ':') == [2, 2];

    padded
        .then(|| parse_with(s, time_items()))
        .flatten()
        .and_then(|parsed| parsed.to_naive_time().ok())
        .ok_or_else(|| SlotError::InvalidTime(s.to_string()))
}

#[must_use]
pub fn slot_from_utc_instant(instant: DateTime<Utc>) -> Slot {
    Slot::from_time(instant.time())
}

pub fn utc_instant_from_slot(date: NaiveDate, slot: i32) -> Result<DateTime<Utc>, SlotError> {
    Ok(Slot::try_from(slot)?.start_on(date))
}

/// `YYYY-MM-DD` of `instant`, read from its UTC fields.
#[must_use]
pub fn date_string_from_instant(instant: DateTime<Utc>) -> String {
    instant.format_with_items(date_items().iter()).to_string()
}

#[must_use]
pub fn time_string_from_instant(instant: DateTime<Utc>) -> String {
    instant.format_with_items(time_items().iter()).to_string()
}
