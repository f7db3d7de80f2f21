//! Offsets are looked up for the specific date being converted, so the same
//! local time maps to different slots on either side of a DST change.

use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use log::{debug, warn};

use crate::codec::{parse_date, slot_from_utc_instant};
use crate::error::{Result, SlotError, TimezoneError};
use crate::slot::{LocalTimeInput, LocalWallClock, Slot};

/// What to do when a timezone name cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FallbackPolicy {
    /// Log a warning and treat the input as UTC.
    #[default]
    Utc,
    /// Fail with [`TimezoneError::Unknown`].
    Strict,
}

/// Resolves a timezone identifier. `None`, the empty string and `"UTC"` all
/// mean UTC.
pub fn resolve_timezone(name: Option<&str>) -> Result<Tz, TimezoneError> {
    match name.map(str::trim) {
        None | Some("") | Some("UTC") => Ok(Tz::UTC),
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| TimezoneError::Unknown(name.to_string())),
    }
}

/// Interprets `naive` as a wall-clock time in `tz`, or `None` when the
/// instant falls outside chrono's range.
///
/// Ambiguous times resolve to the earlier instant. Times inside a DST gap use
/// the offset in force before the transition, which moves them forward by the
/// length of the gap.
pub(crate) fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let offset = naive
                .checked_sub_signed(TimeDelta::days(1))
                .and_then(|day_before| tz.from_local_datetime(&day_before).earliest())
                .map(|before| before.offset().fix())
                .unwrap_or_else(|| tz.offset_from_utc_datetime(&naive).fix());
            debug!("{naive} does not exist in {tz}, using offset {offset}");
            naive
                .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
                .map(|utc| utc.and_utc())
        }
    }
}

/// The wall-clock reading of `instant` in `tz`, or `None` when it falls
/// outside chrono's range.
pub(crate) fn wall_clock(instant: DateTime<Utc>, tz: Tz) -> Option<NaiveDateTime> {
    let offset = tz.offset_from_utc_datetime(&instant.naive_utc()).fix();
    instant
        .naive_utc()
        .checked_add_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Projector {
    policy: FallbackPolicy,
}

impl Projector {
    #[must_use]
    pub const fn new(policy: FallbackPolicy) -> Self {
        Projector { policy }
    }

    #[must_use]
    pub const fn strict() -> Self {
        Projector::new(FallbackPolicy::Strict)
    }

    #[must_use]
    pub const fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub(crate) fn zone(&self, name: Option<&str>) -> Result<Tz, TimezoneError> {
        match resolve_timezone(name) {
            Err(err) if self.policy == FallbackPolicy::Utc => {
                warn!("{err}, treating input as UTC");
                Ok(Tz::UTC)
            }
            resolved => resolved,
        }
    }

    pub fn local_to_utc(
        &self,
        time: NaiveTime,
        date: NaiveDate,
        timezone: Option<&str>,
    ) -> Result<DateTime<Utc>> {
        let tz = self.zone(timezone)?;
        localize(tz, date.and_time(time))
            .ok_or_else(|| SlotError::InvalidDate(date.to_string()).into())
    }

    pub fn project(&self, input: &LocalTimeInput) -> Result<Slot> {
        let instant = self.local_to_utc(input.time, input.date, input.timezone.as_deref())?;
        Ok(slot_from_utc_instant(instant))
    }

    /// The UTC slot of a local `HH:MM` time on a `YYYY-MM-DD` date.
    ///
    /// Only the slot is returned. Evening times west of UTC (and morning times
    /// east of it) land on a different UTC date; use [`Projector::local_to_utc`]
    /// when that date matters.
    pub fn local_to_utc_slot(&self, time: &str, date: &str, timezone: Option<&str>) -> Result<Slot> {
        self.project(&LocalTimeInput::parse(time, date, timezone)?)
    }

    pub fn utc_slot_to_wall_clock(
        &self,
        slot: i32,
        date: &str,
        timezone: Option<&str>,
    ) -> Result<LocalWallClock> {
        let date = parse_date(date)?;
        let instant = Slot::try_from(slot)?.start_on(date);
        let local = wall_clock(instant, self.zone(timezone)?)
            .ok_or_else(|| SlotError::InvalidDate(date.to_string()))?;

        Ok(LocalWallClock {
            date: local.date(),
            time: local.time(),
        })
    }

    pub fn utc_slot_to_local(&self, slot: i32, date: &str, timezone: Option<&str>) -> Result<String> {
        Ok(self.utc_slot_to_wall_clock(slot, date, timezone)?.to_string())
    }
}

/// [`Projector::local_to_utc_slot`] with the default UTC fallback.
pub fn local_to_utc_slot(time: &str, date: &str, timezone: Option<&str>) -> Result<Slot> {
    Projector::default().local_to_utc_slot(time, date, timezone)
}

/// [`Projector::utc_slot_to_local`] with the default UTC fallback.
pub fn utc_slot_to_local(slot: i32, date: &str, timezone: Option<&str>) -> Result<String> {
    Projector::default().utc_slot_to_local(slot, date, timezone)
}

pub fn utc_slot_to_wall_clock(
    slot: i32,
    date: &str,
    timezone: Option<&str>,
) -> Result<LocalWallClock> {
    Projector::default().utc_slot_to_wall_clock(slot, date, timezone)
}
