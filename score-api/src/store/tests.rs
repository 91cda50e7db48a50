use super::*;
use tempfile::TempDir;

fn test_store() -> (PlayerStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = PlayerStore::open(dir.path()).unwrap();
    (store, dir)
}

#[test]
fn register_and_get() {
    let (store, _dir) = test_store();
    assert_eq!(store.register("Alice").unwrap(), RegisterOutcome::Registered);

    let loaded = store.get("Alice").unwrap().unwrap();
    assert_eq!(loaded.player_name, "Alice");
    assert_eq!(loaded.high_score, 0);
    assert!(loaded.id > 0);
}

#[test]
fn duplicate_registration_is_rejected_without_changes() {
    let (store, _dir) = test_store();
    store.register("Alice").unwrap();
    store.submit_score("Alice", 300).unwrap();

    assert_eq!(store.register("Alice").unwrap(), RegisterOutcome::AlreadyExists);
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.get("Alice").unwrap().unwrap().high_score, 300);
}

#[test]
fn names_are_case_sensitive() {
    let (store, _dir) = test_store();
    store.register("alice").unwrap();
    assert_eq!(store.register("Alice").unwrap(), RegisterOutcome::Registered);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn get_missing_returns_none() {
    let (store, _dir) = test_store();
    assert!(store.get("Nobody").unwrap().is_none());
}

#[test]
fn submit_keeps_the_maximum() {
    let (store, _dir) = test_store();
    store.register("Alice").unwrap();

    assert_eq!(
        store.submit_score("Alice", 500).unwrap(),
        SubmitOutcome::Raised { high_score: 500 }
    );
    assert_eq!(
        store.submit_score("Alice", 100).unwrap(),
        SubmitOutcome::Kept { high_score: 500 }
    );
    assert_eq!(
        store.submit_score("Alice", 500).unwrap(),
        SubmitOutcome::Kept { high_score: 500 }
    );
    assert_eq!(store.get("Alice").unwrap().unwrap().high_score, 500);
}

#[test]
fn submit_for_unknown_player_changes_nothing() {
    let (store, _dir) = test_store();
    assert_eq!(
        store.submit_score("Ghost", 50).unwrap(),
        SubmitOutcome::UnknownPlayer
    );
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = PlayerStore::open(dir.path()).unwrap();
        store.register("Alice").unwrap();
        store.submit_score("Alice", 250).unwrap();
    }

    let store = PlayerStore::open(dir.path()).unwrap();
    assert_eq!(store.get("Alice").unwrap().unwrap().high_score, 250);
    assert!(dir.path().join(DATABASE_FILE).exists());
}

#[test]
fn migrates_legacy_table_without_high_score() {
    let dir = TempDir::new().unwrap();
    {
        let conn = Connection::open(dir.path().join(DATABASE_FILE)).unwrap();
        conn.execute_batch(
            "CREATE TABLE players (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                player_name TEXT UNIQUE NOT NULL
            );
            INSERT INTO players (player_name) VALUES ('Legacy');",
        )
        .unwrap();
    }

    let store = PlayerStore::open(dir.path()).unwrap();
    assert_eq!(store.get("Legacy").unwrap().unwrap().high_score, 0);
    assert_eq!(
        store.submit_score("Legacy", 50).unwrap(),
        SubmitOutcome::Raised { high_score: 50 }
    );
}
