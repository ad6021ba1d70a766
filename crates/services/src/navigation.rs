use std::fmt;

use langapp_core::model::LessonId;

/// Screens a frontend can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Courses,
    Lesson(LessonId),
}

impl Route {
    /// Only reachable while signed in.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Home | Route::Courses | Route::Lesson(_))
    }

    /// Only reachable while signed out.
    #[must_use]
    pub fn requires_guest(&self) -> bool {
        matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Login => f.write_str("/login"),
            Route::Courses => f.write_str("/courses"),
            Route::Lesson(id) => write!(f, "/lessons/{id}"),
        }
    }
}

/// Outcome of [`guard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed(Route),
    Redirect(Route),
}

impl Navigation {
    /// Where the user ends up.
    #[must_use]
    pub fn destination(&self) -> &Route {
        match self {
            Navigation::Proceed(route) | Navigation::Redirect(route) => route,
        }
    }
}

/// Decide whether `target` may be shown given the sign-in state.
#[must_use]
pub fn guard(target: Route, is_logged_in: bool) -> Navigation {
    if target.requires_auth() && !is_logged_in {
        Navigation::Redirect(Route::Login)
    } else if target.requires_guest() && is_logged_in {
        Navigation::Redirect(Route::Home)
    } else {
        Navigation::Proceed(target)
    }
}
