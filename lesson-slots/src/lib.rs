//! Canonical UTC slot representation for lesson booking: 96 quarter-hour
//! slots per UTC day, and DST-aware projection between slots and wall-clock
//! times in IANA timezones.

mod codec;
mod display;
mod error;
mod lesson;
mod projector;
mod slot;
mod span;

#[cfg(feature = "ics")]
mod ics;

pub use codec::{
    date_string_from_instant, parse_date, parse_time, slot_from_utc_instant,
    time_string_from_instant, utc_instant_from_slot,
};
pub use display::{format_slot_for_display, format_span_for_display, to_twelve_hour};
pub use error::{ProjectionError, SlotError, TimezoneError};
pub use lesson::{Lesson, Timetable};
pub use projector::{
    local_to_utc_slot, resolve_timezone, utc_slot_to_local, utc_slot_to_wall_clock,
    FallbackPolicy, Projector,
};
pub use slot::{LocalTimeInput, LocalWallClock, Slot, SLOTS_PER_DAY, SLOT_MINUTES};
pub use span::{find_conflicts, is_available, SlotSpan};
