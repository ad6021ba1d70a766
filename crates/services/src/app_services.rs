use std::sync::Arc;

use storage::Storage;

use crate::api::{ApiClient, AuthApi, CourseApi, InMemoryApi, LessonApi};
use crate::auth_context::AuthContext;
use crate::config::AppConfig;
use crate::error::AppServicesError;
use crate::navigation::{Navigation, Route, guard};
use crate::stores::{AuthStore, CourseStore, LessonStore};

/// Assembles the API backend, storage and the three stores.
#[derive(Clone)]
pub struct AppServices {
    auth_context: AuthContext,
    auth: Arc<AuthStore>,
    courses: Arc<CourseStore>,
    lessons: Arc<LessonStore>,
}

impl AppServices {
    /// Build services talking to the configured REST API, with preferences in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or client setup fails.
    pub async fn new_sqlite(config: &AppConfig) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        let auth_context = AuthContext::new();
        let api = Arc::new(ApiClient::new(&config.api, auth_context.clone())?);
        Ok(Self::with_backend(storage, auth_context, api).await)
    }

    /// Build services over an in-memory backend and in-memory storage.
    pub async fn in_memory(api: &InMemoryApi) -> Self {
        let auth_context = AuthContext::new();
        let api = Arc::new(api.for_client(auth_context.clone()));
        Self::with_backend(Storage::in_memory(), auth_context, api).await
    }

    /// Wire stores over any backend implementing all API traits.
    ///
    /// `api` must authenticate through `auth_context`.
    pub async fn with_backend<A>(storage: Storage, auth_context: AuthContext, api: Arc<A>) -> Self
    where
        A: AuthApi + CourseApi + LessonApi + 'static,
    {
        let auth_api: Arc<dyn AuthApi> = api.clone();
        let course_api: Arc<dyn CourseApi> = api.clone();
        let lesson_api: Arc<dyn LessonApi> = api;

        let courses = Arc::new(
            CourseStore::load(
                course_api,
                Arc::clone(&auth_api),
                Arc::clone(&storage.preferences),
                auth_context.clone(),
            )
            .await,
        );
        let auth = Arc::new(
            AuthStore::load(
                auth_api,
                Arc::clone(&storage.preferences),
                auth_context.clone(),
                Arc::clone(&courses),
            )
            .await,
        );
        let lessons = Arc::new(LessonStore::new(lesson_api, auth_context.clone()));

        Self {
            auth_context,
            auth,
            courses,
            lessons,
        }
    }

    #[must_use]
    pub fn auth_context(&self) -> AuthContext {
        self.auth_context.clone()
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthStore> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseStore> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonStore> {
        Arc::clone(&self.lessons)
    }

    /// Apply the route guard using the current sign-in state.
    #[must_use]
    pub fn navigate(&self, target: Route) -> Navigation {
        guard(target, self.auth.is_logged_in())
    }
}
