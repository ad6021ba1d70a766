use std::sync::Arc;

use parking_lot::RwLock;

use langapp_core::model::{CourseDetails, CourseId, CourseSummary, LessonSummary, User, UserPatch};
use storage::{ACTIVE_COURSE_KEY, PreferenceStore, sanitize_stored_value};

use crate::api::{AuthApi, CourseApi};
use crate::auth_context::AuthContext;

/// Observable state of the course store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseState {
    pub courses: Vec<CourseSummary>,
    pub current_course: Option<CourseDetails>,
    pub active_course_identifier: Option<CourseId>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Course catalogue plus the course the learner is working through.
pub struct CourseStore {
    courses_api: Arc<dyn CourseApi>,
    auth_api: Arc<dyn AuthApi>,
    preferences: Arc<dyn PreferenceStore>,
    auth: AuthContext,
    state: RwLock<CourseState>,
}

impl CourseStore {
    /// Build the store, restoring the active course identifier from storage.
    ///
    /// Unreadable storage is logged and treated as "no active course".
    pub async fn load(
        courses_api: Arc<dyn CourseApi>,
        auth_api: Arc<dyn AuthApi>,
        preferences: Arc<dyn PreferenceStore>,
        auth: AuthContext,
    ) -> Self {
        let stored = match preferences.get_item(ACTIVE_COURSE_KEY).await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(error = %err, "failed to read active course from storage");
                None
            }
        };
        let active_course_identifier = sanitize_stored_value(stored).map(CourseId::new);

        Self {
            courses_api,
            auth_api,
            preferences,
            auth,
            state: RwLock::new(CourseState {
                active_course_identifier,
                ..CourseState::default()
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> CourseState {
        self.state.read().clone()
    }

    #[must_use]
    pub fn active_course_identifier(&self) -> Option<CourseId> {
        self.state.read().active_course_identifier.clone()
    }

    #[must_use]
    pub fn current_course(&self) -> Option<CourseDetails> {
        self.state.read().current_course.clone()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    // ── views ────────────────────────────────────────────────────────

    #[must_use]
    pub fn enrolled_courses(&self) -> Vec<CourseSummary> {
        self.state
            .read()
            .courses
            .iter()
            .filter(|course| course.is_enrolled)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn available_courses(&self) -> Vec<CourseSummary> {
        self.state
            .read()
            .courses
            .iter()
            .filter(|course| !course.is_enrolled)
            .cloned()
            .collect()
    }

    /// Percentage of the current course's lessons completed by `user`.
    #[must_use]
    pub fn active_course_progress(&self, user: Option<&User>) -> u8 {
        let state = self.state.read();
        match (state.current_course.as_ref(), user) {
            (Some(course), Some(user)) => course.progress_percent(&user.completed_lesson_ids),
            _ => 0,
        }
    }

    /// The lesson `user` should take next in the current course.
    #[must_use]
    pub fn active_lesson(&self, user: Option<&User>) -> Option<LessonSummary> {
        let state = self.state.read();
        let course = state.current_course.as_ref()?;
        let completed = user.map_or(&[][..], |user| &user.completed_lesson_ids[..]);
        course.next_lesson(completed).cloned()
    }

    // ── actions ──────────────────────────────────────────────────────

    pub async fn fetch_courses(&self) {
        self.begin();
        let result = self.courses_api.list_courses().await;

        let mut state = self.state.write();
        match result {
            Ok(courses) => {
                tracing::debug!(count = courses.len(), "fetched course catalogue");
                state.courses = courses;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch courses");
                state.error = Some(err.user_message("Failed to fetch courses"));
            }
        }
        state.is_loading = false;
    }

    pub async fn fetch_course_by_id(&self, id: &CourseId) {
        self.begin();
        let result = self.courses_api.course(id).await;

        let mut state = self.state.write();
        match result {
            Ok(course) => state.current_course = Some(course),
            Err(err) => {
                tracing::error!(course = %id, error = %err, "failed to fetch course details");
                state.error = Some(err.user_message("Failed to fetch course details"));
                state.current_course = None;
            }
        }
        state.is_loading = false;
    }

    /// Fetch the active course's details, if one is selected.
    pub async fn load_active_course(&self) -> Option<CourseId> {
        let id = self.active_course_identifier()?;
        self.fetch_course_by_id(&id).await;
        Some(id)
    }

    /// Select `id` as the active course and persist the choice.
    ///
    /// With `sync_to_server`, the signed-in user's record is updated locally
    /// and on the server; a failed server update is logged, not surfaced.
    pub async fn set_active_course_identifier(&self, id: CourseId, sync_to_server: bool) {
        self.state.write().active_course_identifier = Some(id.clone());
        if let Err(err) = self.preferences.set_item(ACTIVE_COURSE_KEY, id.as_str()).await {
            tracing::error!(error = %err, "failed to persist active course");
        }

        if !sync_to_server {
            return;
        }

        self.auth
            .update_user(|user| user.active_course_identifier = Some(id.clone()));
        if let Err(err) = self.auth_api.update_me(&UserPatch::active_course(id)).await {
            tracing::error!(error = %err, "failed to sync active course to server");
        }
    }

    /// Forget the current course and the persisted selection.
    pub async fn clear_current_course(&self) {
        {
            let mut state = self.state.write();
            state.current_course = None;
            state.active_course_identifier = None;
        }
        if let Err(err) = self.preferences.remove_item(ACTIVE_COURSE_KEY).await {
            tracing::error!(error = %err, "failed to remove active course from storage");
        }
    }

    fn begin(&self) {
        let mut state = self.state.write();
        state.is_loading = true;
        state.error = None;
    }
}
