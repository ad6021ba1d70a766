//! App-wide state containers.
//!
//! Each store owns its slice of state behind a lock and exposes snapshot
//! getters plus async actions. Network failures never escape an action as a
//! panic: they are logged and recorded as a user-facing error string.

mod auth;
mod course;
mod lesson;

pub use auth::AuthStore;
pub use course::{CourseState, CourseStore};
pub use lesson::{LessonState, LessonStore};
