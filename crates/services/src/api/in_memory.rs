use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use langapp_core::model::{
    AuthResponse, CourseDetails, CourseId, CourseSummary, LessonDetails, LessonId, Task, User,
    UserId, UserPatch,
};

use crate::auth_context::AuthContext;
use crate::error::ApiError;

use super::{AuthApi, CourseApi, LessonApi};

#[derive(Debug)]
struct Account {
    password: String,
    user: User,
}

#[derive(Debug, Default)]
struct Backend {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    next_token: u64,
    courses: Vec<CourseDetails>,
    lessons: HashMap<LessonId, (LessonDetails, Vec<Task>)>,
    completions: Vec<LessonId>,
    fail_completion: bool,
}

fn status(status: StatusCode, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: Some(message.to_string()),
    }
}

impl Backend {
    fn issue_token(&mut self, user: UserId) -> String {
        self.next_token += 1;
        let token = format!("token-{}", self.next_token);
        self.tokens.insert(token.clone(), user);
        token
    }

    fn account_mut(&mut self, token: Option<&str>) -> Result<&mut Account, ApiError> {
        let user_id = token
            .and_then(|token| self.tokens.get(token))
            .copied()
            .ok_or_else(|| status(StatusCode::UNAUTHORIZED, "Invalid or expired token"))?;
        self.accounts
            .iter_mut()
            .find(|account| account.user.id == user_id)
            .ok_or_else(|| status(StatusCode::UNAUTHORIZED, "Unknown user"))
    }
}

/// Simple in-memory API backend for testing and prototyping.
///
/// Behaves like the real server for the endpoints the client uses, including
/// bearer-token checks against the shared [`AuthContext`].
#[derive(Clone, Debug)]
pub struct InMemoryApi {
    auth: AuthContext,
    backend: Arc<Mutex<Backend>>,
}

impl InMemoryApi {
    #[must_use]
    pub fn new(auth: AuthContext) -> Self {
        Self {
            auth,
            backend: Arc::new(Mutex::new(Backend::default())),
        }
    }

    /// Another client of the same backend, authenticating through `auth`.
    #[must_use]
    pub fn for_client(&self, auth: AuthContext) -> Self {
        Self {
            auth,
            backend: Arc::clone(&self.backend),
        }
    }

    /// Add a course to the catalogue.
    pub fn seed_course(&self, course: CourseDetails) {
        self.backend.lock().courses.push(course);
    }

    /// Add a lesson with its tasks.
    pub fn seed_lesson(&self, details: LessonDetails, tasks: Vec<Task>) {
        self.backend
            .lock()
            .lessons
            .insert(details.identifier.clone(), (details, tasks));
    }

    /// Invalidate every issued token, as a server restart or expiry would.
    pub fn expire_all_tokens(&self) {
        self.backend.lock().tokens.clear();
    }

    /// Make `POST /lessons/{id}/complete` fail with a 500 until reset.
    pub fn fail_completions(&self, fail: bool) {
        self.backend.lock().fail_completion = fail;
    }

    /// Lessons the server acknowledged as completed, in call order.
    #[must_use]
    pub fn completions(&self) -> Vec<LessonId> {
        self.backend.lock().completions.clone()
    }

    /// Server-side copy of a user, for assertions.
    #[must_use]
    pub fn stored_user(&self, username: &str) -> Option<User> {
        self.backend
            .lock()
            .accounts
            .iter()
            .find(|account| account.user.username == username)
            .map(|account| account.user.clone())
    }
}

#[async_trait]
impl AuthApi for InMemoryApi {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let mut backend = self.backend.lock();
        if backend
            .accounts
            .iter()
            .any(|a| a.user.username == username || a.user.email == email)
        {
            return Err(status(StatusCode::CONFLICT, "Username or email already taken"));
        }
        let next_id = u64::try_from(backend.accounts.len()).unwrap_or(u64::MAX - 1) + 1;
        let user = User {
            id: UserId::new(next_id),
            username: username.to_string(),
            email: email.to_string(),
            enrolled_courses: Vec::new(),
            last_lesson: None,
            active_course_identifier: None,
            completed_lesson_ids: Vec::new(),
        };
        backend.accounts.push(Account {
            password: password.to_string(),
            user: user.clone(),
        });
        let token = backend.issue_token(user.id);
        Ok(AuthResponse { user, token })
    }

    async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let mut backend = self.backend.lock();
        let user = backend
            .accounts
            .iter()
            .find(|a| {
                (a.user.username == username_or_email || a.user.email == username_or_email)
                    && a.password == password
            })
            .map(|a| a.user.clone())
            .ok_or_else(|| status(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;
        let token = backend.issue_token(user.id);
        Ok(AuthResponse { user, token })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        if let Some(token) = self.auth.token() {
            self.backend.lock().tokens.remove(&token);
        }
        Ok(())
    }

    async fn me(&self) -> Result<User, ApiError> {
        let token = self.auth.token();
        let mut backend = self.backend.lock();
        Ok(backend.account_mut(token.as_deref())?.user.clone())
    }

    async fn update_me(&self, patch: &UserPatch) -> Result<User, ApiError> {
        let token = self.auth.token();
        let mut backend = self.backend.lock();
        let account = backend.account_mut(token.as_deref())?;
        if let Some(username) = &patch.username {
            account.user.username.clone_from(username);
        }
        if let Some(email) = &patch.email {
            account.user.email.clone_from(email);
        }
        if let Some(course) = &patch.active_course_identifier {
            account.user.active_course_identifier = Some(course.clone());
        }
        Ok(account.user.clone())
    }
}

#[async_trait]
impl CourseApi for InMemoryApi {
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, ApiError> {
        let backend = self.backend.lock();
        Ok(backend
            .courses
            .iter()
            .map(|course| CourseSummary {
                identifier: course.identifier.clone(),
                title: course.title.clone(),
                origin_language: course.origin_language,
                target_language: course.target_language,
                is_enrolled: course.enrolled,
            })
            .collect())
    }

    async fn course(&self, id: &CourseId) -> Result<CourseDetails, ApiError> {
        let backend = self.backend.lock();
        backend
            .courses
            .iter()
            .find(|course| &course.identifier == id)
            .cloned()
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "Course not found"))
    }
}

#[async_trait]
impl LessonApi for InMemoryApi {
    async fn lesson_details(&self, id: &LessonId) -> Result<LessonDetails, ApiError> {
        let backend = self.backend.lock();
        backend
            .lessons
            .get(id)
            .map(|(details, _)| details.clone())
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "Lesson not found"))
    }

    async fn lesson_tasks(&self, id: &LessonId) -> Result<Vec<Task>, ApiError> {
        let backend = self.backend.lock();
        backend
            .lessons
            .get(id)
            .map(|(_, tasks)| tasks.clone())
            .ok_or_else(|| status(StatusCode::NOT_FOUND, "Lesson not found"))
    }

    async fn complete_lesson(&self, id: &LessonId) -> Result<String, ApiError> {
        let token = self.auth.token();
        let mut backend = self.backend.lock();
        if backend.fail_completion {
            return Err(status(StatusCode::INTERNAL_SERVER_ERROR, "Could not save progress"));
        }
        if !backend.lessons.contains_key(id) {
            return Err(status(StatusCode::NOT_FOUND, "Lesson not found"));
        }
        backend.account_mut(token.as_deref())?.user.mark_lesson_completed(id.clone());
        backend.completions.push(id.clone());
        Ok("Lesson completed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn me_requires_a_live_token() {
        let auth = AuthContext::new();
        let api = InMemoryApi::new(auth.clone());
        let registered = api.register("olena", "o@example.com", "pw").await.unwrap();

        assert!(api.me().await.is_err());

        auth.set_token(Some(registered.token));
        assert_eq!(api.me().await.unwrap().username, "olena");

        api.expire_all_tokens();
        let err = api.me().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn login_accepts_username_or_email() {
        let api = InMemoryApi::new(AuthContext::new());
        api.register("olena", "o@example.com", "pw").await.unwrap();

        assert!(api.login("olena", "pw").await.is_ok());
        assert!(api.login("o@example.com", "pw").await.is_ok());
        let err = api.login("olena", "wrong").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let api = InMemoryApi::new(AuthContext::new());
        api.register("olena", "o@example.com", "pw").await.unwrap();
        let err = api
            .register("olena", "other@example.com", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    }
}
