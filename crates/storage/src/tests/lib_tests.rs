use super::*;

fn alice() -> User {
    User {
        name: "Alice Doe".into(),
        email: "alice@example.com".into(),
        password: "hunter2".into(),
        occupation: "Student".into(),
        bio: "Learning Rust".into(),
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn fresh_store_has_no_account() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.load_user().await.expect("load").is_none());
    assert!(storage.logged_in_email().await.expect("email").is_none());
}

#[tokio::test]
async fn saving_a_user_replaces_the_previous_record() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.save_user(&alice()).await.expect("save");

    let bob = User {
        name: "Bob".into(),
        email: "bob@example.com".into(),
        ..alice()
    };
    storage.save_user(&bob).await.expect("save");

    assert_eq!(storage.load_user().await.expect("load"), Some(bob));
}

#[tokio::test]
async fn logged_in_marker_can_be_set_and_cleared() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .set_logged_in_email(Some("alice@example.com"))
        .await
        .expect("set");
    assert_eq!(
        storage.logged_in_email().await.expect("email").as_deref(),
        Some("alice@example.com")
    );

    storage.set_logged_in_email(None).await.expect("clear");
    storage.set_logged_in_email(None).await.expect("clear twice");
    assert!(storage.logged_in_email().await.expect("email").is_none());
}

#[tokio::test]
async fn unreadable_user_record_is_treated_as_missing() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_item(USER_KEY, "{not json").await.expect("write");
    assert!(storage.load_user().await.expect("load").is_none());
}

#[test]
fn memory_urls_have_no_parent_directory() {
    assert!(sqlite_path("sqlite::memory:").is_none());
    assert!(sqlite_path("postgres://db").is_none());
    assert_eq!(
        sqlite_path("sqlite://./data/pollen.db?mode=rwc"),
        Some(PathBuf::from("./data/pollen.db"))
    );
}
