#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::span::SlotSpan;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timetable {
    pub name: String,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lesson {
    pub span: SlotSpan,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub location: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub instructor: Option<String>,
}

impl Lesson {
    pub fn new<S: Into<String>>(span: SlotSpan, title: S) -> Self {
        Lesson {
            span,
            title: title.into(),
            location: None,
            instructor: None,
        }
    }
}

impl Timetable {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Timetable {
            name: name.into(),
            lessons: Vec::new(),
        }
    }

    /// Lessons already holding any slot of `span`.
    pub fn conflicts<'a>(&'a self, span: &'a SlotSpan) -> impl Iterator<Item = &'a Lesson> {
        self.lessons
            .iter()
            .filter(move |lesson| lesson.span.overlaps(span))
    }

    /// Adds `lesson` unless it collides with a booked one, in which case the
    /// lesson is handed back.
    pub fn book(&mut self, lesson: Lesson) -> Result<(), Lesson> {
        if self.conflicts(&lesson.span).next().is_some() {
            return Err(lesson);
        }

        self.lessons.push(lesson);
        self.lessons.sort_by_key(|lesson| lesson.span.start_instant());
        Ok(())
    }
}
