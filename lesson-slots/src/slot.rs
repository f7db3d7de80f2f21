use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Timelike, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::{parse_date, parse_time};
use crate::error::SlotError;

pub const SLOTS_PER_DAY: u8 = 96;
pub const SLOT_MINUTES: u8 = 15;

/// A 15-minute quantum of a UTC calendar day. Slot 0 starts at 00:00 UTC,
/// slot 95 at 23:45 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Slot(u8);

impl Slot {
    pub const MIN: Slot = Slot(0);
    pub const MAX: Slot = Slot(SLOTS_PER_DAY - 1);

    /// Callers guarantee `index < SLOTS_PER_DAY`.
    pub(crate) const fn from_index(index: u8) -> Self {
        Slot(index)
    }

    #[must_use]
    pub fn from_time(time: NaiveTime) -> Self {
        // hour <= 23 and minute <= 59, so this is at most 95
        Slot((time.hour() * 4 + time.minute() / u32::from(SLOT_MINUTES)) as u8)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn minutes_from_midnight(self) -> u16 {
        self.0 as u16 * SLOT_MINUTES as u16
    }

    #[must_use]
    pub fn time(self) -> NaiveTime {
        NaiveTime::MIN + TimeDelta::minutes(i64::from(self.minutes_from_midnight()))
    }

    #[must_use]
    pub fn start_on(self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.time()).and_utc()
    }

    #[must_use]
    pub fn next(self) -> Option<Slot> {
        (self.0 + 1 < SLOTS_PER_DAY).then(|| Slot(self.0 + 1))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.minutes_from_midnight();
        write!(f, "{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

impl TryFrom<i64> for Slot {
    type Error = SlotError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(index) if index < SLOTS_PER_DAY => Ok(Slot(index)),
            _ => Err(SlotError::OutOfRange(value)),
        }
    }
}

impl TryFrom<i32> for Slot {
    type Error = SlotError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Slot::try_from(i64::from(value))
    }
}

impl TryFrom<u8> for Slot {
    type Error = SlotError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Slot::try_from(i64::from(value))
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.0
    }
}

impl From<Slot> for i32 {
    fn from(slot: Slot) -> i32 {
        i32::from(slot.0)
    }
}

/// A wall-clock time entered by a user, together with the date and timezone
/// it was entered in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalTimeInput {
    #[cfg_attr(feature = "serde", serde(with = "hhmm"))]
    pub time: NaiveTime,
    pub date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub timezone: Option<String>,
}

impl LocalTimeInput {
    pub fn parse(time: &str, date: &str, timezone: Option<&str>) -> Result<Self, SlotError> {
        Ok(LocalTimeInput {
            time: parse_time(time)?,
            date: parse_date(date)?,
            timezone: timezone.map(str::to_string),
        })
    }
}

/// A UTC slot as seen on a wall clock in some timezone. The local date can
/// differ from the UTC date the slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalWallClock {
    pub date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(with = "hhmm"))]
    pub time: NaiveTime,
}

impl fmt::Display for LocalWallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.time.hour(), self.time.minute())
    }
}

#[cfg(feature = "serde")]
mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted_time = format!("{:02}:{:02}", time.hour(), time.minute());
        serializer.serialize_str(&formatted_time)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::codec::parse_time(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_bounds() {
        assert_eq!(Slot::try_from(0).unwrap(), Slot::MIN);
        assert_eq!(Slot::try_from(95).unwrap(), Slot::MAX);
        assert_eq!(Slot::try_from(96), Err(SlotError::OutOfRange(96)));
        assert_eq!(Slot::try_from(-1), Err(SlotError::OutOfRange(-1)));
        assert_eq!(Slot::try_from(i64::MAX), Err(SlotError::OutOfRange(i64::MAX)));
    }

    #[test]
    fn from_time_truncates() {
        let time = NaiveTime::from_hms_opt(9, 14, 59).unwrap();
        assert_eq!(Slot::from_time(time).index(), 36);

        let time = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(Slot::from_time(time), Slot::MAX);
    }

    #[test]
    fn time_and_display() {
        let slot = Slot::try_from(37).unwrap();
        assert_eq!(slot.time(), NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert_eq!(slot.to_string(), "09:15");
        assert_eq!(Slot::MAX.to_string(), "23:45");
    }

    #[test]
    fn next_stops_at_end_of_day() {
        assert_eq!(Slot::MIN.next(), Some(Slot::from_index(1)));
        assert_eq!(Slot::MAX.next(), None);
    }

    #[test]
    fn parse_local_input() {
        let input = LocalTimeInput::parse("09:30", "2025-06-15", Some("Europe/Paris")).unwrap();
        assert_eq!(input.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(input.timezone.as_deref(), Some("Europe/Paris"));

        assert!(matches!(
            LocalTimeInput::parse("9h30", "2025-06-15", None),
            Err(SlotError::InvalidTime(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_representation() {
        let input = LocalTimeInput::parse("07:45", "2025-01-02", None).unwrap();
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(json, r#"{"time":"07:45","date":"2025-01-02"}"#);

        let slot: Slot = serde_json::from_str("52").unwrap();
        assert_eq!(slot.index(), 52);
        assert!(serde_json::from_str::<Slot>("96").is_err());
    }
}
