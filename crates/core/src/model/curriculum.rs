use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, LessonId};

//
// ─── LANGUAGE ──────────────────────────────────────────────────────────────────
//

/// Languages a course can be taught from or into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    English,
    German,
    Ukrainian,
}

//
// ─── SUMMARIES ─────────────────────────────────────────────────────────────────
//

/// Lesson entry as listed inside a course section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub identifier: LessonId,
    pub title: String,
    pub order_index: u32,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub identifier: String,
    pub title: String,
    pub order_index: u32,
    #[serde(default)]
    pub lessons: Vec<LessonSummary>,
}

/// Catalogue entry returned by `GET /courses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub identifier: CourseId,
    pub title: String,
    pub origin_language: Language,
    pub target_language: Language,
    #[serde(default)]
    pub is_enrolled: bool,
}

//
// ─── DETAILS ───────────────────────────────────────────────────────────────────
//

/// Full course tree returned by `GET /courses/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    pub identifier: CourseId,
    pub title: String,
    pub origin_language: Language,
    pub target_language: Language,
    #[serde(default)]
    pub enrolled: bool,
    #[serde(default)]
    pub sections: Vec<SectionSummary>,
}

impl CourseDetails {
    /// All lessons of the course, section by section, in server order.
    pub fn lessons(&self) -> impl Iterator<Item = &LessonSummary> {
        self.sections.iter().flat_map(|section| section.lessons.iter())
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons().count()
    }

    /// Share of the course's lessons found in `completed`, as a rounded percentage.
    ///
    /// An empty course reports 0.
    #[must_use]
    pub fn progress_percent(&self, completed: &[LessonId]) -> u8 {
        let total = self.lesson_count();
        if total == 0 {
            return 0;
        }
        let done = self
            .lessons()
            .filter(|lesson| completed.contains(&lesson.identifier))
            .count();
        rounded_percent(done, total)
    }

    /// The first lesson not yet in `completed`.
    ///
    /// Falls back to the first lesson once everything is done so the learner
    /// always has somewhere to go; `None` only for a course without lessons.
    #[must_use]
    pub fn next_lesson(&self, completed: &[LessonId]) -> Option<&LessonSummary> {
        self.lessons()
            .find(|lesson| !completed.contains(&lesson.identifier))
            .or_else(|| self.lessons().next())
    }
}

/// `round(part / whole * 100)` with halves rounded up, clamped to 100.
#[must_use]
pub fn rounded_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole);
    let scaled = (part * 200 + whole) / (whole * 2);
    u8::try_from(scaled).unwrap_or(100)
}
