use langapp_core::model::{
    CourseDetails, CourseId, Language, LessonDetails, LessonId, LessonSectionSummary,
    LessonSummary, SectionSummary, SentenceBuildingData, Task, TaskId, TaskKind,
};
use langapp_core::{SessionPhase, SessionStep};
use services::{AppServices, AuthContext, InMemoryApi, Navigation, Route};

fn sentence(id: i64) -> Task {
    Task {
        id: TaskId::new(id),
        kind: TaskKind::SentenceBuilding(SentenceBuildingData {
            prompt: format!("prompt {id}"),
            words: vec!["Guten".into(), "Morgen".into()],
        }),
    }
}

fn lesson_summary(id: &str, order: u32) -> LessonSummary {
    LessonSummary {
        identifier: LessonId::new(id),
        title: id.to_uppercase(),
        order_index: order,
        completed: false,
    }
}

fn seeded_backend() -> InMemoryApi {
    let api = InMemoryApi::new(AuthContext::new());
    api.seed_course(CourseDetails {
        identifier: CourseId::new("de-en"),
        title: "German".into(),
        origin_language: Language::English,
        target_language: Language::German,
        enrolled: true,
        sections: vec![SectionSummary {
            identifier: "basics".into(),
            title: "Basics".into(),
            order_index: 0,
            lessons: vec![
                lesson_summary("greetings", 0),
                lesson_summary("food", 1),
                lesson_summary("travel", 2),
            ],
        }],
    });
    api.seed_course(CourseDetails {
        identifier: CourseId::new("uk-en"),
        title: "Ukrainian".into(),
        origin_language: Language::English,
        target_language: Language::Ukrainian,
        enrolled: false,
        sections: Vec::new(),
    });
    api.seed_lesson(
        LessonDetails {
            identifier: LessonId::new("greetings"),
            title: "Greetings".into(),
            subtitle: String::new(),
            order_index: 0,
            completed: false,
            section: LessonSectionSummary {
                title: "Basics".into(),
            },
            topics: Vec::new(),
        },
        vec![sentence(1), sentence(2), sentence(3)],
    );
    api
}

#[tokio::test]
async fn guest_is_redirected_until_signed_in() {
    let backend = seeded_backend();
    let app = AppServices::in_memory(&backend).await;

    assert_eq!(app.navigate(Route::Courses), Navigation::Redirect(Route::Login));
    assert!(!app.auth().try_auto_login().await);

    app.auth()
        .register("olena", "o@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(app.navigate(Route::Courses), Navigation::Redirect(Route::Login));

    app.auth().login("o@example.com", "pw").await.unwrap();
    assert_eq!(app.navigate(Route::Courses), Navigation::Proceed(Route::Courses));
    assert_eq!(app.navigate(Route::Login), Navigation::Redirect(Route::Home));

    app.auth().logout().await;
    assert_eq!(
        app.navigate(Route::Lesson(LessonId::new("greetings"))),
        Navigation::Redirect(Route::Login)
    );
}

#[tokio::test]
async fn picking_a_course_and_finishing_a_lesson_with_corrections() {
    let backend = seeded_backend();
    let app = AppServices::in_memory(&backend).await;
    app.auth()
        .register("olena", "o@example.com", "pw")
        .await
        .unwrap();
    app.auth().login("olena", "pw").await.unwrap();

    let courses = app.courses();
    courses.fetch_courses().await;
    assert_eq!(courses.enrolled_courses().len(), 1);
    assert_eq!(courses.available_courses()[0].identifier, CourseId::new("uk-en"));

    courses
        .set_active_course_identifier(CourseId::new("de-en"), true)
        .await;
    assert_eq!(
        backend.stored_user("olena").unwrap().active_course_identifier,
        Some(CourseId::new("de-en"))
    );
    assert_eq!(courses.load_active_course().await, Some(CourseId::new("de-en")));

    let user = app.auth().user();
    let next = courses.active_lesson(user.as_ref()).unwrap();
    assert_eq!(next.identifier, LessonId::new("greetings"));
    assert_eq!(courses.active_course_progress(user.as_ref()), 0);

    let lessons = app.lessons();
    lessons.load_lesson_session(&next.identifier).await;
    assert_eq!(lessons.initial_task_count(), 3);

    lessons.register_result(true);
    assert_eq!(lessons.proceed().await, SessionStep::Advanced);
    lessons.register_result(false);
    assert_eq!(lessons.proceed().await, SessionStep::Advanced);
    lessons.register_result(true);
    assert_eq!(
        lessons.proceed().await,
        SessionStep::CorrectionStarted { replay: 1 }
    );
    assert!(lessons.show_correction_intro());
    assert!(backend.completions().is_empty());

    lessons.start_correction();
    assert_eq!(lessons.phase(), SessionPhase::Correction);
    assert_eq!(lessons.active_task().unwrap().id, TaskId::new(2));
    lessons.register_result(true);
    assert_eq!(lessons.proceed().await, SessionStep::Finished);
    assert_eq!(lessons.proceed().await, SessionStep::AlreadyFinished);

    assert_eq!(backend.completions(), vec![LessonId::new("greetings")]);
    assert_eq!(lessons.correct_count(), 2);

    let user = app.auth().user().unwrap();
    assert!(user.has_completed(&LessonId::new("greetings")));
    assert_eq!(courses.active_course_progress(Some(&user)), 33);
    assert_eq!(
        courses.active_lesson(Some(&user)).unwrap().identifier,
        LessonId::new("food")
    );
}

#[tokio::test]
async fn expired_token_is_dropped_on_auto_login() {
    let backend = seeded_backend();
    let app = AppServices::in_memory(&backend).await;
    app.auth()
        .register("olena", "o@example.com", "pw")
        .await
        .unwrap();
    app.auth().login("olena", "pw").await.unwrap();
    assert!(app.auth().try_auto_login().await);

    backend.expire_all_tokens();
    assert!(!app.auth().try_auto_login().await);
    assert!(!app.auth().is_logged_in());
    assert_eq!(app.auth().token(), None);
    assert_eq!(app.courses().active_course_identifier(), None);
}

#[tokio::test]
async fn failed_completion_keeps_the_session_finished() {
    let backend = seeded_backend();
    backend.fail_completions(true);
    let app = AppServices::in_memory(&backend).await;
    app.auth()
        .register("olena", "o@example.com", "pw")
        .await
        .unwrap();
    app.auth().login("olena", "pw").await.unwrap();

    let lessons = app.lessons();
    lessons.load_lesson_session(&LessonId::new("greetings")).await;
    for _ in 0..3 {
        lessons.register_result(true);
        lessons.proceed().await;
    }

    assert!(lessons.is_session_finished());
    assert!(!lessons.is_completing());
    assert!(backend.completions().is_empty());
    let user = app.auth().user().unwrap();
    assert!(!user.has_completed(&LessonId::new("greetings")));
}

#[tokio::test]
async fn unknown_lesson_reports_server_message() {
    let backend = seeded_backend();
    let app = AppServices::in_memory(&backend).await;

    let lessons = app.lessons();
    lessons.load_lesson_session(&LessonId::new("nope")).await;
    assert_eq!(lessons.error().as_deref(), Some("Lesson not found"));
    assert!(lessons.current_lesson().is_none());
    assert!(!lessons.is_loading());
}
