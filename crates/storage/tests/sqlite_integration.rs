use storage::repository::{ACTIVE_COURSE_KEY, AUTH_TOKEN_KEY, PreferenceStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_persists_preferences() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_prefs_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get_item(AUTH_TOKEN_KEY).await.unwrap(), None);

    repo.set_item(AUTH_TOKEN_KEY, "token-1").await.unwrap();
    repo.set_item(ACTIVE_COURSE_KEY, "de-en").await.unwrap();
    repo.set_item(AUTH_TOKEN_KEY, "token-2").await.unwrap();

    assert_eq!(
        repo.get_item(AUTH_TOKEN_KEY).await.unwrap().as_deref(),
        Some("token-2")
    );
    assert_eq!(
        repo.get_item(ACTIVE_COURSE_KEY).await.unwrap().as_deref(),
        Some("de-en")
    );

    repo.remove_item(AUTH_TOKEN_KEY).await.unwrap();
    assert_eq!(repo.get_item(AUTH_TOKEN_KEY).await.unwrap(), None);
    assert_eq!(
        repo.get_item(ACTIVE_COURSE_KEY).await.unwrap().as_deref(),
        Some("de-en")
    );
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_prefs_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set_item("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get_item("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn storage_survives_reopening_the_database_file() {
    let dir = std::env::temp_dir().join(format!("langapp-storage-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("prefs.sqlite3");
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());

    {
        let storage = Storage::sqlite(&url).await.expect("open");
        storage
            .preferences
            .set_item(ACTIVE_COURSE_KEY, "uk-en")
            .await
            .unwrap();
    }

    let reopened = Storage::sqlite(&url).await.expect("reopen");
    assert_eq!(
        reopened
            .preferences
            .get_item(ACTIVE_COURSE_KEY)
            .await
            .unwrap()
            .as_deref(),
        Some("uk-en")
    );
    let _ = std::fs::remove_dir_all(&dir);
}
