use chrono::{NaiveTime, Timelike};

use crate::codec::parse_time;
use crate::error::{Result, SlotError};
use crate::projector::{wall_clock, Projector};
use crate::span::SlotSpan;

fn twelve_hour(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    let period = if pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {period}", time.minute())
}

/// `"09:00"` -> `"9:00 AM"`, `"00:15"` -> `"12:15 AM"`, `"12:00"` -> `"12:00 PM"`.
pub fn to_twelve_hour(time: &str) -> Result<String, SlotError> {
    parse_time(time).map(twelve_hour)
}

fn render(time: NaiveTime, use_12_hour: bool) -> String {
    if use_12_hour {
        twelve_hour(time)
    } else {
        format!("{:02}:{:02}", time.hour(), time.minute())
    }
}

impl Projector {
    pub fn format_slot(
        &self,
        slot: i32,
        date: &str,
        timezone: Option<&str>,
        use_12_hour: bool,
    ) -> Result<String> {
        let local = self.utc_slot_to_wall_clock(slot, date, timezone)?;
        Ok(render(local.time, use_12_hour))
    }

    /// Renders `span` as `"start - end"`.
    pub fn format_span(
        &self,
        span: &SlotSpan,
        timezone: Option<&str>,
        use_12_hour: bool,
    ) -> Result<String> {
        let tz = self.zone(timezone)?;
        let out_of_range = || SlotError::InvalidDate(span.date().to_string());
        let start = wall_clock(span.start_instant(), tz).ok_or_else(out_of_range)?;
        let end = wall_clock(span.end_instant(), tz).ok_or_else(out_of_range)?;

        Ok(format!(
            "{} - {}",
            render(start.time(), use_12_hour),
            render(end.time(), use_12_hour)
        ))
    }
}

pub fn format_slot_for_display(
    slot: i32,
    date: &str,
    timezone: Option<&str>,
    use_12_hour: bool,
) -> Result<String> {
    Projector::default().format_slot(slot, date, timezone, use_12_hour)
}

pub fn format_span_for_display(
    span: &SlotSpan,
    timezone: Option<&str>,
    use_12_hour: bool,
) -> Result<String> {
    Projector::default().format_span(span, timezone, use_12_hour)
}
