use serde::{Deserialize, Serialize};

use crate::model::curriculum::{CourseSummary, LessonSummary};
use crate::model::ids::{CourseId, LessonId, UserId};

/// Account as returned by `GET /auth/me` and the login endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub enrolled_courses: Vec<CourseSummary>,
    #[serde(default)]
    pub last_lesson: Option<LessonSummary>,
    #[serde(default)]
    pub active_course_identifier: Option<CourseId>,
    #[serde(default)]
    pub completed_lesson_ids: Vec<LessonId>,
}

impl User {
    #[must_use]
    pub fn has_completed(&self, lesson: &LessonId) -> bool {
        self.completed_lesson_ids.contains(lesson)
    }

    /// Record a completed lesson; returns `false` if it was already recorded.
    pub fn mark_lesson_completed(&mut self, lesson: LessonId) -> bool {
        if self.has_completed(&lesson) {
            return false;
        }
        self.completed_lesson_ids.push(lesson);
        true
    }
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Partial update for `PATCH /auth/me`. Unset fields are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_course_identifier: Option<CourseId>,
}

impl UserPatch {
    #[must_use]
    pub fn active_course(identifier: CourseId) -> Self {
        Self {
            active_course_identifier: Some(identifier),
            ..Self::default()
        }
    }
}
