use std::sync::Arc;

use parking_lot::RwLock;

use langapp_core::model::{LessonDetails, LessonId, Task};
use langapp_core::{LessonSession, SessionPhase, SessionStep};

use crate::api::LessonApi;
use crate::auth_context::AuthContext;

/// Observable state of the lesson store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonState {
    pub current_lesson: Option<LessonDetails>,
    pub session: LessonSession,
    pub is_loading: bool,
    pub is_completing: bool,
    pub error: Option<String>,
}

/// Drives the practice loop of one lesson at a time.
pub struct LessonStore {
    api: Arc<dyn LessonApi>,
    auth: AuthContext,
    state: RwLock<LessonState>,
}

impl LessonStore {
    #[must_use]
    pub fn new(api: Arc<dyn LessonApi>, auth: AuthContext) -> Self {
        Self {
            api,
            auth,
            state: RwLock::new(LessonState::default()),
        }
    }

    #[must_use]
    pub fn state(&self) -> LessonState {
        self.state.read().clone()
    }

    #[must_use]
    pub fn current_lesson(&self) -> Option<LessonDetails> {
        self.state.read().current_lesson.clone()
    }

    #[must_use]
    pub fn active_task(&self) -> Option<Task> {
        self.state.read().session.active_task().cloned()
    }

    #[must_use]
    pub fn session_progress(&self) -> u8 {
        self.state.read().session.progress_percent()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.read().session.phase()
    }

    #[must_use]
    pub fn is_session_finished(&self) -> bool {
        self.state.read().session.is_finished()
    }

    #[must_use]
    pub fn is_correction_phase(&self) -> bool {
        self.state.read().session.is_correction_phase()
    }

    #[must_use]
    pub fn show_correction_intro(&self) -> bool {
        self.state.read().session.show_correction_intro()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.state.read().session.correct_count()
    }

    #[must_use]
    pub fn initial_task_count(&self) -> usize {
        self.state.read().session.initial_task_count()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    #[must_use]
    pub fn is_completing(&self) -> bool {
        self.state.read().is_completing
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Start a fresh session for `id`, fetching metadata and tasks together.
    pub async fn load_lesson_session(&self, id: &LessonId) {
        {
            let mut state = self.state.write();
            *state = LessonState {
                is_loading: true,
                ..LessonState::default()
            };
        }

        let result = tokio::try_join!(self.api.lesson_details(id), self.api.lesson_tasks(id));

        let mut state = self.state.write();
        match result {
            Ok((details, tasks)) => {
                tracing::debug!(lesson = %id, tasks = tasks.len(), "lesson session loaded");
                state.current_lesson = Some(details);
                state.session = LessonSession::new(tasks);
            }
            Err(err) => {
                tracing::error!(lesson = %id, error = %err, "failed to load lesson");
                state.error = Some(err.user_message("Failed to load lesson."));
            }
        }
        state.is_loading = false;
    }

    pub fn register_result(&self, correct: bool) {
        self.state.write().session.register_result(correct);
    }

    /// Move past the active task.
    ///
    /// When this finishes the session, the server is told about the completed
    /// lesson before returning. That call is best effort: a failure is logged
    /// and the session stays finished.
    pub async fn proceed(&self) -> SessionStep {
        let step = self.state.write().session.proceed();
        match step {
            SessionStep::CorrectionStarted { replay } => {
                tracing::debug!(replay, "correction pass started");
            }
            SessionStep::Finished => self.finish_lesson().await,
            SessionStep::Advanced | SessionStep::AlreadyFinished => {}
        }
        step
    }

    /// Dismiss the correction intro and start replaying mistakes.
    pub fn start_correction(&self) {
        self.state.write().session.start_correction();
    }

    pub fn reset_session(&self) {
        *self.state.write() = LessonState::default();
    }

    async fn finish_lesson(&self) {
        let lesson_id = {
            let mut state = self.state.write();
            let Some(lesson) = state.current_lesson.as_ref() else {
                return;
            };
            let id = lesson.identifier.clone();
            state.is_completing = true;
            id
        };

        match self.api.complete_lesson(&lesson_id).await {
            Ok(_) => {
                self.auth
                    .update_user(|user| user.mark_lesson_completed(lesson_id.clone()));
                tracing::debug!(lesson = %lesson_id, "lesson completion saved");
            }
            Err(err) => {
                tracing::error!(lesson = %lesson_id, error = %err, "failed to save progress");
            }
        }

        self.state.write().is_completing = false;
    }
}
