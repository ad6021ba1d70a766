#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod auth_context;
pub mod config;
pub mod error;
pub mod navigation;
pub mod stores;

pub use api::{ApiClient, AuthApi, CourseApi, InMemoryApi, LessonApi};
pub use app_services::AppServices;
pub use auth_context::AuthContext;
pub use config::{ApiConfig, AppConfig};
pub use error::{ApiError, AppServicesError, ConfigError};
pub use navigation::{Navigation, Route, guard};
pub use stores::{AuthStore, CourseState, CourseStore, LessonState, LessonStore};
