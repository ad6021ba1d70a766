use std::sync::Arc;

use parking_lot::RwLock;

use langapp_core::model::{AuthResponse, User};
use storage::{AUTH_TOKEN_KEY, PreferenceStore, sanitize_stored_value};

use crate::api::AuthApi;
use crate::auth_context::AuthContext;
use crate::error::ApiError;
use crate::stores::CourseStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AuthStatus {
    is_loading: bool,
    auth_error: Option<String>,
}

/// Sign-in state of the app.
///
/// The user and token live in the shared [`AuthContext`]; this store adds
/// persistence of the token and keeps the course store's selection in step
/// with the signed-in account.
pub struct AuthStore {
    api: Arc<dyn AuthApi>,
    preferences: Arc<dyn PreferenceStore>,
    auth: AuthContext,
    courses: Arc<CourseStore>,
    status: RwLock<AuthStatus>,
}

impl AuthStore {
    /// Build the store, restoring a persisted token into `auth`.
    pub async fn load(
        api: Arc<dyn AuthApi>,
        preferences: Arc<dyn PreferenceStore>,
        auth: AuthContext,
        courses: Arc<CourseStore>,
    ) -> Self {
        let stored = match preferences.get_item(AUTH_TOKEN_KEY).await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(error = %err, "failed to read auth token from storage");
                None
            }
        };
        if let Some(token) = sanitize_stored_value(stored) {
            auth.set_token(Some(token));
        }

        Self {
            api,
            preferences,
            auth,
            courses,
            status: RwLock::new(AuthStatus::default()),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.auth.user()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.auth.token()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status.read().is_loading
    }

    #[must_use]
    pub fn auth_error(&self) -> Option<String> {
        self.status.read().auth_error.clone()
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` after recording a user-facing message in `auth_error`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        self.begin();
        let result = self.api.register(username, email, password).await;
        self.finish(result.map(|_| ()), "Registration failed")
    }

    /// Sign in and persist the returned token.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` after recording a user-facing message in `auth_error`.
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<User, ApiError> {
        self.begin();
        let result = self.api.login(username_or_email, password).await;
        let result = match result {
            Ok(response) => Ok(self.set_auth(response).await),
            Err(err) => Err(err),
        };
        self.finish(result, "Login failed")
    }

    /// Sign out locally. The server is told on a best-effort basis.
    pub async fn logout(&self) {
        self.status.write().is_loading = true;
        if let Err(err) = self.api.logout().await {
            tracing::debug!(error = %err, "server logout failed; clearing local session anyway");
        }
        self.clear_auth().await;
        self.status.write().is_loading = false;
    }

    /// Restore the session from a persisted token.
    ///
    /// Returns `false` without a token, or after clearing credentials the
    /// server no longer accepts.
    pub async fn try_auto_login(&self) -> bool {
        if self.auth.token().is_none() {
            return false;
        }

        self.status.write().is_loading = true;
        let signed_in = match self.api.me().await {
            Ok(user) => {
                self.auth.set_user(Some(user.clone()));
                self.sync_active_course(&user).await;
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "auto-login rejected; clearing stored credentials");
                self.clear_auth().await;
                false
            }
        };
        self.status.write().is_loading = false;
        signed_in
    }

    async fn set_auth(&self, response: AuthResponse) -> User {
        let AuthResponse { user, token } = response;
        self.auth.set_user(Some(user.clone()));
        self.auth.set_token(Some(token.clone()));
        if let Err(err) = self.preferences.set_item(AUTH_TOKEN_KEY, &token).await {
            tracing::error!(error = %err, "failed to persist auth token");
        }
        self.sync_active_course(&user).await;
        user
    }

    async fn clear_auth(&self) {
        self.auth.clear();
        if let Err(err) = self.preferences.remove_item(AUTH_TOKEN_KEY).await {
            tracing::error!(error = %err, "failed to remove auth token from storage");
        }
        self.courses.clear_current_course().await;
    }

    async fn sync_active_course(&self, user: &User) {
        if let Some(course) = user.active_course_identifier.clone() {
            self.courses.set_active_course_identifier(course, false).await;
        }
    }

    fn begin(&self) {
        let mut status = self.status.write();
        status.is_loading = true;
        status.auth_error = None;
    }

    fn finish<T>(&self, result: Result<T, ApiError>, fallback: &str) -> Result<T, ApiError> {
        let mut status = self.status.write();
        status.is_loading = false;
        if let Err(err) = &result {
            status.auth_error = Some(err.user_message(fallback));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryApi;
    use langapp_core::model::{CourseId, UserPatch};
    use storage::{ACTIVE_COURSE_KEY, InMemoryPreferences};

    struct Fixture {
        auth: AuthContext,
        api: InMemoryApi,
        prefs: InMemoryPreferences,
        courses: Arc<CourseStore>,
        store: AuthStore,
    }

    async fn fixture_with(prefs: InMemoryPreferences, server: Option<&InMemoryApi>) -> Fixture {
        let auth = AuthContext::new();
        let api = server.map_or_else(
            || InMemoryApi::new(auth.clone()),
            |server| server.for_client(auth.clone()),
        );
        let courses = Arc::new(
            CourseStore::load(
                Arc::new(api.clone()),
                Arc::new(api.clone()),
                Arc::new(prefs.clone()),
                auth.clone(),
            )
            .await,
        );
        let store = AuthStore::load(
            Arc::new(api.clone()),
            Arc::new(prefs.clone()),
            auth.clone(),
            Arc::clone(&courses),
        )
        .await;
        Fixture {
            auth,
            api,
            prefs,
            courses,
            store,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(InMemoryPreferences::new(), None).await
    }

    #[tokio::test]
    async fn login_persists_token_and_syncs_course() {
        let f = fixture().await;
        let registered = f.api.register("olena", "o@example.com", "pw").await.unwrap();
        f.auth.set_token(Some(registered.token));
        f.api
            .update_me(&UserPatch::active_course(CourseId::new("de-en")))
            .await
            .unwrap();
        f.auth.set_token(None);

        let user = f.store.login("olena", "pw").await.unwrap();
        assert_eq!(user.username, "olena");
        assert!(f.store.is_logged_in());
        assert!(!f.store.is_loading());
        assert_eq!(f.store.auth_error(), None);

        let token = f.store.token().unwrap();
        assert_eq!(
            f.prefs.get_item(AUTH_TOKEN_KEY).await.unwrap(),
            Some(token)
        );
        assert_eq!(
            f.courses.active_course_identifier(),
            Some(CourseId::new("de-en"))
        );
        assert_eq!(
            f.prefs.get_item(ACTIVE_COURSE_KEY).await.unwrap().as_deref(),
            Some("de-en")
        );
    }

    #[tokio::test]
    async fn login_failure_surfaces_server_message() {
        let f = fixture().await;
        let err = f.store.login("nobody", "pw").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert_eq!(f.store.auth_error().as_deref(), Some("Invalid credentials"));
        assert!(!f.store.is_logged_in());
        assert!(!f.store.is_loading());
    }

    #[tokio::test]
    async fn register_does_not_sign_in() {
        let f = fixture().await;
        f.store.register("olena", "o@example.com", "pw").await.unwrap();
        assert!(!f.store.is_logged_in());
        assert_eq!(f.prefs.get_item(AUTH_TOKEN_KEY).await.unwrap(), None);

        let err = f
            .store
            .register("olena", "o@example.com", "pw")
            .await
            .unwrap_err();
        assert!(err.status().is_some());
        assert_eq!(
            f.store.auth_error().as_deref(),
            Some("Username or email already taken")
        );
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let f = fixture().await;
        f.store.register("olena", "o@example.com", "pw").await.unwrap();
        f.store.login("olena", "pw").await.unwrap();
        f.courses
            .set_active_course_identifier(CourseId::new("de-en"), false)
            .await;

        f.store.logout().await;
        assert!(!f.store.is_logged_in());
        assert_eq!(f.store.token(), None);
        assert_eq!(f.prefs.get_item(AUTH_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(f.courses.active_course_identifier(), None);
        assert_eq!(f.prefs.get_item(ACTIVE_COURSE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn auto_login_without_token_is_negative() {
        let f = fixture().await;
        assert!(!f.store.try_auto_login().await);
        assert!(!f.store.is_loading());
    }

    #[tokio::test]
    async fn auto_login_restores_user_from_persisted_token() {
        let first = fixture().await;
        first.store.register("olena", "o@example.com", "pw").await.unwrap();
        first.store.login("olena", "pw").await.unwrap();

        // Same server and storage, fresh client state: an app restart.
        let restarted = fixture_with(first.prefs.clone(), Some(&first.api)).await;
        assert!(restarted.store.token().is_some());
        assert!(!restarted.store.is_logged_in());

        assert!(restarted.store.try_auto_login().await);
        assert_eq!(
            restarted.store.user().map(|u| u.username).as_deref(),
            Some("olena")
        );
    }

    #[tokio::test]
    async fn auto_login_with_expired_token_clears_storage() {
        let prefs = InMemoryPreferences::new();
        prefs.set_item(AUTH_TOKEN_KEY, "stale-token").await.unwrap();
        prefs.set_item(ACTIVE_COURSE_KEY, "de-en").await.unwrap();

        let f = fixture_with(prefs, None).await;
        assert_eq!(f.store.token().as_deref(), Some("stale-token"));

        assert!(!f.store.try_auto_login().await);
        assert_eq!(f.store.token(), None);
        assert!(!f.store.is_logged_in());
        assert_eq!(f.prefs.get_item(AUTH_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(f.prefs.get_item(ACTIVE_COURSE_KEY).await.unwrap(), None);
    }
}
