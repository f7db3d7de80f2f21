use chrono::{DateTime, Utc};
use ics::properties::{DtEnd, DtStart, Location, Organizer, Summary};

use crate::lesson::{Lesson, Timetable};

fn ics_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

impl Timetable {
    #[must_use]
    pub fn to_ics(&self) -> ics::ICalendar<'_> {
        let mut icalendar = ics::ICalendar::new("2.0", &self.name);

        for lesson in &self.lessons {
            icalendar.add_event(lesson.to_ics());
        }

        icalendar
    }
}

impl Lesson {
    #[must_use]
    pub fn to_ics(&self) -> ics::Event<'_> {
        let start = ics_timestamp(self.span.start_instant());
        let end = ics_timestamp(self.span.end_instant());

        let id = format!("{}_{}", start, self.title.replace(' ', "-"));

        let mut ics_event = ics::Event::new(id, start.clone());

        ics_event.push(DtStart::new(start));
        ics_event.push(DtEnd::new(end));
        ics_event.push(Summary::new(&self.title));

        if let Some(location) = &self.location {
            ics_event.push(Location::new(location));
        }

        if let Some(instructor) = &self.instructor {
            ics_event.push(Organizer::new(instructor));
        }

        ics_event
    }
}
