//! Typed wrappers around the REST endpoints.
//!
//! Each concern gets its own trait so stores can depend on exactly what they
//! call. [`ApiClient`] implements all of them over HTTP; [`InMemoryApi`] is a
//! self-contained backend for tests and offline prototyping.

mod client;
mod in_memory;

use async_trait::async_trait;
use langapp_core::model::{
    AuthResponse, CourseDetails, CourseId, CourseSummary, LessonDetails, LessonId, Task, User,
    UserPatch,
};

use crate::error::ApiError;

pub use client::ApiClient;
pub use in_memory::InMemoryApi;

/// `/auth/*` endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/register`
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError>;

    /// `POST /auth/login`
    async fn login(&self, username_or_email: &str, password: &str)
    -> Result<AuthResponse, ApiError>;

    /// `POST /auth/logout`
    async fn logout(&self) -> Result<(), ApiError>;

    /// `GET /auth/me`
    async fn me(&self) -> Result<User, ApiError>;

    /// `PATCH /auth/me`
    async fn update_me(&self, patch: &UserPatch) -> Result<User, ApiError>;
}

/// `/courses*` endpoints.
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// `GET /courses`
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, ApiError>;

    /// `GET /courses/{id}`
    async fn course(&self, id: &CourseId) -> Result<CourseDetails, ApiError>;
}

/// `/lessons/*` endpoints.
#[async_trait]
pub trait LessonApi: Send + Sync {
    /// `GET /lessons/{id}`
    async fn lesson_details(&self, id: &LessonId) -> Result<LessonDetails, ApiError>;

    /// `GET /lessons/{id}/tasks`
    async fn lesson_tasks(&self, id: &LessonId) -> Result<Vec<Task>, ApiError>;

    /// `POST /lessons/{id}/complete`; the server answers with a short text.
    async fn complete_lesson(&self, id: &LessonId) -> Result<String, ApiError>;
}
