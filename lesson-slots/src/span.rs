use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::{parse_date, parse_time, slot_from_utc_instant};
use crate::error::{Result, SlotError};
use crate::projector::{localize, Projector};
use crate::slot::{Slot, SLOTS_PER_DAY, SLOT_MINUTES};

const SLOT_SECONDS: i64 = SLOT_MINUTES as i64 * 60;

/// A run of consecutive slots on one UTC date. Spans never cross UTC
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SpanFields"))]
pub struct SlotSpan {
    date: NaiveDate,
    start: Slot,
    len: u8,
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct SpanFields {
    date: NaiveDate,
    start: Slot,
    len: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<SpanFields> for SlotSpan {
    type Error = SlotError;

    fn try_from(fields: SpanFields) -> Result<Self, Self::Error> {
        SlotSpan::new(fields.date, fields.start, fields.len)
    }
}

impl SlotSpan {
    /// Fails for empty spans, spans running past midnight, and spans on the
    /// last date chrono can represent (their end would not be).
    pub fn new(date: NaiveDate, start: Slot, len: u8) -> Result<Self, SlotError> {
        if len == 0
            || u16::from(start.index()) + u16::from(len) > u16::from(SLOTS_PER_DAY)
            || date.succ_opt().is_none()
        {
            return Err(SlotError::InvalidSpan {
                date,
                start: start.index(),
                len,
            });
        }

        Ok(SlotSpan { date, start, len })
    }

    /// The span covering `[start, end)`. `start` is truncated to its slot and
    /// `end` is rounded up to the next slot boundary; `end` may be the
    /// midnight that closes `start`'s UTC day.
    pub fn from_instants(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, SlotError> {
        let date = start.date_naive();
        let first = slot_from_utc_instant(start);
        let invalid = |len: i64| SlotError::InvalidSpan {
            date,
            start: first.index(),
            len: u8::try_from(len.max(0)).unwrap_or(u8::MAX),
        };

        if end <= start {
            return Err(invalid(0));
        }

        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        let seconds = (end - midnight).num_seconds();
        let end_index = (seconds + SLOT_SECONDS - 1) / SLOT_SECONDS;
        let len = end_index - i64::from(first.index());

        match u8::try_from(len) {
            Ok(len) => SlotSpan::new(date, first, len),
            Err(_) => Err(invalid(len)),
        }
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub const fn start(&self) -> Slot {
        self.start
    }

    #[must_use]
    pub const fn len(&self) -> u8 {
        self.len
    }

    /// Index one past the last slot; 96 when the span runs to midnight.
    #[must_use]
    pub const fn end_slot(&self) -> u8 {
        self.start.index() + self.len
    }

    #[must_use]
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start.start_on(self.date)
    }

    #[must_use]
    pub fn end_instant(&self) -> DateTime<Utc> {
        self.start_instant() + TimeDelta::minutes(i64::from(self.len) * i64::from(SLOT_MINUTES))
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> {
        (self.start.index()..self.end_slot()).map(Slot::from_index)
    }

    #[must_use]
    pub fn covers(&self, date: NaiveDate, slot: Slot) -> bool {
        self.date == date && self.start <= slot && slot.index() < self.end_slot()
    }

    /// Touching spans do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &SlotSpan) -> bool {
        self.date == other.date
            && self.start.index() < other.end_slot()
            && other.start.index() < self.end_slot()
    }

    #[must_use]
    pub fn contains(&self, other: &SlotSpan) -> bool {
        self.date == other.date
            && self.start <= other.start
            && other.end_slot() <= self.end_slot()
    }
}

#[must_use]
pub fn find_conflicts(booked: &[SlotSpan], candidate: &SlotSpan) -> Vec<usize> {
    booked
        .iter()
        .enumerate()
        .filter(|(_, span)| span.overlaps(candidate))
        .map(|(idx, _)| idx)
        .collect()
}

/// Adjacent availability spans join up.
#[must_use]
pub fn is_available(availability: &[SlotSpan], candidate: &SlotSpan) -> bool {
    candidate.slots().all(|slot| {
        availability
            .iter()
            .any(|span| span.covers(candidate.date, slot))
    })
}

impl Projector {
    /// Projects the local range `[start, end)` on `date` onto UTC spans, one
    /// per UTC date the range touches. An `end` earlier than `start` closes
    /// the range on the following local day.
    pub fn project_local_range(
        &self,
        start: &str,
        end: &str,
        date: &str,
        timezone: Option<&str>,
    ) -> Result<Vec<SlotSpan>> {
        let date = parse_date(date)?;
        let start = parse_time(start)?;
        let end = parse_time(end)?;

        let end_date = if end < start {
            date.succ_opt().ok_or_else(|| SlotError::InvalidDate(date.to_string()))?
        } else {
            date
        };

        let tz = self.zone(timezone)?;
        let start_utc = localize(tz, date.and_time(start))
            .ok_or_else(|| SlotError::InvalidDate(date.to_string()))?;
        let end_utc = localize(tz, end_date.and_time(end))
            .ok_or_else(|| SlotError::InvalidDate(end_date.to_string()))?;

        if end_utc <= start_utc {
            return Err(SlotError::InvalidSpan {
                date: start_utc.date_naive(),
                start: slot_from_utc_instant(start_utc).index(),
                len: 0,
            }
            .into());
        }

        let mut spans = Vec::new();
        let mut cursor = start_utc;

        while cursor < end_utc {
            let next_midnight = cursor
                .date_naive()
                .succ_opt()
                .ok_or_else(|| SlotError::InvalidDate(cursor.date_naive().to_string()))?
                .and_time(NaiveTime::MIN)
                .and_utc();
            let segment_end = end_utc.min(next_midnight);

            spans.push(SlotSpan::from_instants(cursor, segment_end)?);
            cursor = segment_end;
        }

        Ok(spans)
    }
}
