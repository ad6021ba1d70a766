use std::sync::Arc;

use langapp_core::model::User;
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct AuthState {
    token: Option<String>,
    user: Option<User>,
}

/// Signed-in user and bearer token, shared by the API client and all stores.
///
/// Cloning yields another handle to the same state.
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    inner: Arc<RwLock<AuthState>>,
}

impl AuthContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let ctx = Self::new();
        ctx.set_token(Some(token.into()));
        ctx
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        self.inner.write().token = token;
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.read().user.clone()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.inner.write().user = user;
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.inner.read().user.is_some()
    }

    /// Apply `f` to the signed-in user. Returns `None` when nobody is signed in.
    pub fn update_user<R>(&self, f: impl FnOnce(&mut User) -> R) -> Option<R> {
        self.inner.write().user.as_mut().map(f)
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write();
        guard.token = None;
        guard.user = None;
    }
}
