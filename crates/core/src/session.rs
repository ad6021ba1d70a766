//! Practice loop for a single lesson.
//!
//! A session walks its task queue once (the primary pass), collecting every
//! task answered incorrectly. Whenever a queue runs out with mistakes
//! pending, those tasks become the queue of a correction pass, so a task
//! keeps coming back until it is answered correctly. The session finishes
//! when a queue runs out with no mistakes pending.

use crate::model::curriculum::rounded_percent;
use crate::model::Task;

/// Which pass of the lesson the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Primary,
    Correction,
    Finished,
}

/// What a call to [`LessonSession::proceed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    /// Moved to the next task of the current queue.
    Advanced,
    /// A queue ran out with mistakes pending; the mistakes are now the queue.
    CorrectionStarted { replay: usize },
    /// The session reached its terminal state with this call.
    Finished,
    /// The session had already finished; nothing changed.
    AlreadyFinished,
}

/// In-memory state of one lesson's practice loop.
///
/// The cursor is always a valid index into `queue` or equal to its length.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSession {
    queue: Vec<Task>,
    mistakes: Vec<Task>,
    cursor: usize,
    phase: SessionPhase,
    show_correction_intro: bool,
    initial_task_count: usize,
    correct_count: usize,
}

impl Default for LessonSession {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl LessonSession {
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            initial_task_count: tasks.len(),
            queue: tasks,
            mistakes: Vec::new(),
            cursor: 0,
            phase: SessionPhase::Primary,
            show_correction_intro: false,
            correct_count: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Tasks in the current queue, including ones already answered.
    #[must_use]
    pub fn queue(&self) -> &[Task] {
        &self.queue
    }

    /// Tasks answered incorrectly in the current pass.
    #[must_use]
    pub fn mistakes(&self) -> &[Task] {
        &self.mistakes
    }

    #[must_use]
    pub fn initial_task_count(&self) -> usize {
        self.initial_task_count
    }

    /// Correct answers given during the primary pass.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn is_correction_phase(&self) -> bool {
        self.phase == SessionPhase::Correction
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    /// Raised when the correction pass starts, until [`Self::start_correction`].
    #[must_use]
    pub fn show_correction_intro(&self) -> bool {
        self.show_correction_intro
    }

    /// The task under the cursor; `None` at the end of a queue or once finished.
    #[must_use]
    pub fn active_task(&self) -> Option<&Task> {
        if self.is_finished() {
            return None;
        }
        self.queue.get(self.cursor)
    }

    /// Record the learner's answer to the active task.
    ///
    /// Correct answers only count towards the score in the primary pass.
    /// Wrong answers queue the task for a correction replay, in either pass.
    /// Does nothing without an active task.
    pub fn register_result(&mut self, correct: bool) {
        let Some(task) = self.active_task() else {
            return;
        };

        if correct {
            if !self.is_correction_phase() {
                self.correct_count += 1;
            }
        } else {
            let task = task.clone();
            self.mistakes.push(task);
        }
    }

    /// Move past the active task.
    pub fn proceed(&mut self) -> SessionStep {
        if self.is_finished() {
            return SessionStep::AlreadyFinished;
        }

        if self.cursor + 1 < self.queue.len() {
            self.cursor += 1;
            return SessionStep::Advanced;
        }

        if !self.mistakes.is_empty() {
            self.queue = std::mem::take(&mut self.mistakes);
            self.cursor = 0;
            self.phase = SessionPhase::Correction;
            self.show_correction_intro = true;
            return SessionStep::CorrectionStarted {
                replay: self.queue.len(),
            };
        }

        self.cursor = self.queue.len();
        self.phase = SessionPhase::Finished;
        SessionStep::Finished
    }

    /// Dismiss the correction intro.
    pub fn start_correction(&mut self) {
        self.show_correction_intro = false;
    }

    /// Rounded share of the primary pass already behind the learner.
    ///
    /// Reports 100 throughout the correction pass and once finished, and 0
    /// for a lesson without tasks.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.initial_task_count == 0 {
            return 0;
        }
        if self.phase != SessionPhase::Primary {
            return 100;
        }
        rounded_percent(self.cursor, self.initial_task_count)
    }
}
