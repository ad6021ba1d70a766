use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use langapp_core::model::{CourseId, LessonId};
use services::{ApiConfig, AppConfig, AppServices, Navigation, Route};

mod practice;

use practice::Practice;

/// Language-learning client for the terminal.
///
/// Signs in against the course server, browses courses and runs lessons
/// interactively. The session token and active course are kept in a local
/// `SQLite` file between runs.
#[derive(Parser, Debug)]
#[command(name = "langapp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the REST API
    #[arg(long, value_name = "URL", env = "LANGAPP_API_URL", global = true)]
    api_url: Option<String>,

    /// `SQLite` URL or file path for local preferences
    #[arg(long, value_name = "DB", env = "LANGAPP_DB_URL", global = true)]
    db: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Register {
        username: String,
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in and remember the session
    Login {
        username_or_email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List enrolled and available courses
    Courses,
    /// Show a course with your progress (defaults to the active course)
    Course { id: Option<CourseId> },
    /// Make a course the active one
    UseCourse { id: CourseId },
    /// Practice a lesson (defaults to the next lesson of the active course)
    Lesson { id: Option<LessonId> },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins over --verbose.
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = &args.api_url {
        config.api = ApiConfig::new(url)?.with_timeout(config.api.timeout());
    }
    if let Some(db) = &args.db {
        config.db_url = normalize_sqlite_url(db)?;
    }
    prepare_sqlite_dir(&config.db_url)?;
    Ok(config)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    tracing::debug!(api = %config.api.base_url(), db = %config.db_url, "configuration loaded");

    let app = AppServices::new_sqlite(&config)
        .await
        .context("failed to initialize local storage")?;
    let restored = app.auth().try_auto_login().await;
    tracing::debug!(restored, "session restore attempted");

    match args.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            if !enter_guest_area(&app) {
                return Ok(());
            }
            let password = password_or_prompt(password)?;
            if let Err(err) = app.auth().register(&username, &email, &password).await {
                bail!(err.user_message("Registration failed"));
            }
            println!("Account created. Sign in with `langapp login {username}`.");
        }
        Command::Login {
            username_or_email,
            password,
        } => {
            if !enter_guest_area(&app) {
                return Ok(());
            }
            let password = password_or_prompt(password)?;
            let user = match app.auth().login(&username_or_email, &password).await {
                Ok(user) => user,
                Err(err) => bail!(err.user_message("Login failed")),
            };
            println!("Signed in as {}.", user.username);
            if let Some(course) = app.courses().active_course_identifier() {
                println!("Active course: {course}");
            }
        }
        Command::Logout => {
            if app.auth().is_logged_in() {
                app.auth().logout().await;
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        Command::Whoami => {
            enter(&app, Route::Home)?;
            let Some(user) = app.auth().user() else {
                bail!("not signed in");
            };
            println!("{} <{}>", user.username, user.email);
            match &user.active_course_identifier {
                Some(course) => println!("Active course: {course}"),
                None => println!("No active course."),
            }
            println!("Lessons completed: {}", user.completed_lesson_ids.len());
        }
        Command::Courses => {
            enter(&app, Route::Courses)?;
            list_courses(&app).await?;
        }
        Command::Course { id } => {
            enter(&app, Route::Courses)?;
            let id = match id.or_else(|| app.courses().active_course_identifier()) {
                Some(id) => id,
                None => bail!("no active course; pick one with `langapp use-course <id>`"),
            };
            show_course(&app, &id).await?;
        }
        Command::UseCourse { id } => {
            enter(&app, Route::Courses)?;
            let courses = app.courses();
            courses.set_active_course_identifier(id.clone(), true).await;
            courses.load_active_course().await;
            if let Some(err) = courses.error() {
                bail!("course {id} selected but could not be loaded: {err}");
            }
            if let Some(course) = courses.current_course() {
                println!("Active course: {} ({})", course.title, course.identifier);
            }
        }
        Command::Lesson { id } => {
            let id = match id {
                Some(id) => id,
                None => next_lesson(&app).await?,
            };
            enter(&app, Route::Lesson(id.clone()))?;

            let lessons = app.lessons();
            lessons.load_lesson_session(&id).await;
            if let Some(err) = lessons.error() {
                bail!(err);
            }

            let stdin = io::stdin();
            let mut practice = Practice::new(stdin.lock(), io::stdout());
            practice.run(&lessons).await?;
        }
    }

    Ok(())
}

/// Apply the route guard; a redirect to the login screen becomes an error.
fn enter(app: &AppServices, route: Route) -> anyhow::Result<()> {
    match app.navigate(route) {
        Navigation::Proceed(route) => {
            tracing::debug!(%route, "entering");
            Ok(())
        }
        Navigation::Redirect(Route::Login) => {
            bail!("not signed in; run `langapp login <username>` first")
        }
        Navigation::Redirect(route) => bail!("redirected to {route}"),
    }
}

/// `false` when the user is already signed in and the login screen is skipped.
fn enter_guest_area(app: &AppServices) -> bool {
    match app.navigate(Route::Login) {
        Navigation::Proceed(_) => true,
        Navigation::Redirect(_) => {
            let name = app.auth().user().map(|u| u.username).unwrap_or_default();
            println!("Already signed in as {name}. Run `langapp logout` first.");
            false
        }
    }
}

async fn list_courses(app: &AppServices) -> anyhow::Result<()> {
    let courses = app.courses();
    courses.fetch_courses().await;
    if let Some(err) = courses.error() {
        bail!(err);
    }

    let active = courses.active_course_identifier();
    let marker = |id: &CourseId| if active.as_ref() == Some(id) { '*' } else { ' ' };

    let enrolled = courses.enrolled_courses();
    println!("Enrolled:");
    if enrolled.is_empty() {
        println!("  (none)");
    }
    for course in &enrolled {
        println!(
            "{} {:<16} {} ({:?} -> {:?})",
            marker(&course.identifier),
            course.identifier.as_str(),
            course.title,
            course.origin_language,
            course.target_language
        );
    }

    let available = courses.available_courses();
    if !available.is_empty() {
        println!("Available:");
        for course in &available {
            println!(
                "{} {:<16} {} ({:?} -> {:?})",
                marker(&course.identifier),
                course.identifier.as_str(),
                course.title,
                course.origin_language,
                course.target_language
            );
        }
    }
    Ok(())
}

async fn show_course(app: &AppServices, id: &CourseId) -> anyhow::Result<()> {
    let courses = app.courses();
    courses.fetch_course_by_id(id).await;
    if let Some(err) = courses.error() {
        bail!(err);
    }
    let Some(course) = courses.current_course() else {
        bail!("course {id} not found");
    };
    let user = app.auth().user();

    println!(
        "{} ({}), {}% complete",
        course.title,
        course.identifier.as_str(),
        courses.active_course_progress(user.as_ref())
    );
    for section in &course.sections {
        println!("{}", section.title);
        for lesson in &section.lessons {
            let done = user
                .as_ref()
                .is_some_and(|u| u.has_completed(&lesson.identifier));
            println!(
                "  [{}] {:<16} {}",
                if done { 'x' } else { ' ' },
                lesson.identifier.as_str(),
                lesson.title
            );
        }
    }
    if let Some(next) = courses.active_lesson(user.as_ref()) {
        println!("Next: {} (`langapp lesson {}`)", next.title, next.identifier);
    }
    Ok(())
}

async fn next_lesson(app: &AppServices) -> anyhow::Result<LessonId> {
    enter(app, Route::Home)?;
    let courses = app.courses();
    if courses.load_active_course().await.is_none() {
        bail!("no active course; pick one with `langapp use-course <id>`");
    }
    if let Some(err) = courses.error() {
        bail!(err);
    }
    let user = app.auth().user();
    courses
        .active_lesson(user.as_ref())
        .map(|lesson| lesson.identifier)
        .context("the active course has no lessons")
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

/// Accept `sqlite:` URLs as-is and turn bare paths into absolute `sqlite://` URLs.
fn normalize_sqlite_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("invalid --db value: {raw:?}");
    }
    if trimmed.starts_with("sqlite:") {
        return Ok(trimmed.to_string());
    }
    let path = Path::new(trimmed);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    Ok(format!("sqlite://{}", absolute.display()))
}

/// Make sure the directory holding a file-backed database exists.
fn prepare_sqlite_dir(db_url: &str) -> anyhow::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_pass_through() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite://data/app.db").unwrap(),
            "sqlite://data/app.db"
        );
    }

    #[test]
    fn bare_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("/tmp/langapp/prefs.sqlite3").unwrap();
        assert_eq!(url, "sqlite:///tmp/langapp/prefs.sqlite3");
        assert!(normalize_sqlite_url("  ").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        let args = Args::try_parse_from(["langapp", "-v", "lesson", "l-1"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Lesson { id: Some(id) } if id.as_str() == "l-1"));

        let args = Args::try_parse_from(["langapp", "use-course", "de-en"]).unwrap();
        assert!(matches!(args.command, Command::UseCourse { id } if id.as_str() == "de-en"));

        assert!(Args::try_parse_from(["langapp", "use-course", "a/b"]).is_err());
    }
}
