use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use kanban_core::{
    Board, BoardRepository, BoardStore, Column, KeyValueStore, LoadOutcome, ManualClock,
    MemoryKeyValueStore, SqliteKeyValueStore, StorageError, STORAGE_KEY, STORAGE_VERSION,
};
use serde_json::{json, Value};
use std::time::Duration;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn repo_with(raw: Option<&str>) -> BoardRepository<MemoryKeyValueStore> {
    let mut kv = MemoryKeyValueStore::new();
    if let Some(raw) = raw {
        kv.set(STORAGE_KEY, raw).unwrap();
    }
    BoardRepository::new(kv)
}

fn titles(columns: &[Column]) -> Vec<&str> {
    columns.iter().map(|column| column.title.as_str()).collect()
}

fn loaded(raw: &str) -> Board {
    repo_with(Some(raw)).load(start()).into_board().unwrap()
}

#[test]
fn load_distinguishes_missing_from_unusable_payloads() {
    assert_eq!(repo_with(None).load(start()), LoadOutcome::Missing);
    for raw in [
        "{broken",
        r#"{"version":"1.0.0"}"#,
        r#"{"columns":[{"title":"no id"}]}"#,
        r#"{"columns":[{"id":"a","title":"A"},{"id":"a","title":"B"}]}"#,
        "42",
    ] {
        assert_eq!(repo_with(Some(raw)).load(start()), LoadOutcome::Rejected, "{raw}");
    }
}

#[test]
fn load_migrates_legacy_shapes() {
    let bare_array = json!([{ "id": "todo", "title": "To Do", "tasks": [] }]).to_string();
    let board = loaded(&bare_array);
    assert_eq!(titles(board.columns()), vec!["To Do"]);

    let unversioned = json!({ "columns": [{ "id": "a", "title": "A" }] }).to_string();
    let board = loaded(&unversioned);
    assert_eq!(titles(board.columns()), vec!["A"]);
    assert!(board.columns()[0].tasks.is_empty());

    let older = json!({ "version": "0.9.0", "columns": [{ "id": "b", "title": "B" }] }).to_string();
    let board = loaded(&older);
    assert_eq!(titles(board.columns()), vec!["B"]);
}

#[test]
fn stored_board_with_over_limit_fields_is_kept() {
    let long_title = "x".repeat(60);
    let raw = json!({
        "version": STORAGE_VERSION,
        "columns": [{
            "id": "mine",
            "title": long_title,
            "tasks": [{ "id": "t-keep", "title": "keep me", "tags": ["a-tag-well-over-twenty-chars"] }]
        }]
    })
    .to_string();
    let mut kv = MemoryKeyValueStore::new();
    kv.set(STORAGE_KEY, &raw).unwrap();
    let clock = ManualClock::new(start());

    {
        let mut store = BoardStore::open(
            BoardRepository::new(&mut kv),
            Box::new(clock.clone()),
            Duration::from_millis(500),
        );
        assert_eq!(titles(store.columns()), vec![long_title.as_str()]);
        assert!(store.find_task(&"t-keep".into()).is_some());
        assert!(!store.has_pending_save());

        clock.advance(TimeDelta::milliseconds(500));
        assert!(!store.tick());
    }

    let stored = kv.get(STORAGE_KEY).unwrap().unwrap();
    assert!(stored.contains("t-keep"));
}

#[test]
fn save_writes_versioned_snapshot() {
    let mut repo = repo_with(None);
    let columns = vec![Column::create("Inbox", Some("blue"), start()).unwrap()];

    repo.save(&columns, start()).unwrap();

    let raw = repo.storage().get(STORAGE_KEY).unwrap().unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], STORAGE_VERSION);
    assert_eq!(
        value["savedAt"].as_str().map(|text| text.starts_with("2024-03-01T09:00:00")),
        Some(true)
    );
    assert_eq!(value["columns"][0]["title"], "Inbox");
    assert_eq!(repo.load(start()).into_board().unwrap().columns(), columns.as_slice());
}

#[test]
fn save_surfaces_quota_errors() {
    let mut repo = BoardRepository::new(MemoryKeyValueStore::with_quota(16));
    let columns = vec![Column::create("Inbox", None, start()).unwrap()];

    let err = repo.save(&columns, start()).unwrap_err();
    assert!(err.to_string().contains("quota"));
    assert!(repo.storage().is_empty());
}

#[test]
fn storage_info_describes_stored_payload() {
    let mut repo = repo_with(None);
    assert!(repo.storage_info().is_none());

    let store_json = json!({
        "version": "1.0.0",
        "savedAt": "2024-03-01T09:00:00Z",
        "columns": [
            { "id": "a", "title": "A", "tasks": [{ "id": "1", "title": "one" }, { "id": "2", "title": "two" }] },
            { "id": "b", "title": "B", "tasks": [] }
        ]
    })
    .to_string();
    repo.storage_mut().set(STORAGE_KEY, &store_json).unwrap();

    let info = repo.storage_info().unwrap();
    assert_eq!(info.size, store_json.len());
    assert_eq!(info.version.as_deref(), Some("1.0.0"));
    assert_eq!(info.saved_at.as_deref(), Some("2024-03-01T09:00:00Z"));
    assert_eq!(info.columns_count, 2);
    assert_eq!(info.tasks_count, 2);

    repo.clear().unwrap();
    assert!(repo.storage_info().is_none());
}

#[test]
fn custom_storage_key_is_isolated() {
    let mut repo = BoardRepository::with_key(MemoryKeyValueStore::new(), "board-b");
    repo.save(&[], start()).unwrap();

    assert!(repo.storage().get(STORAGE_KEY).unwrap().is_none());
    assert!(repo.storage().get("board-b").unwrap().is_some());
}

#[test]
fn sqlite_store_round_trips_values() {
    let mut kv = SqliteKeyValueStore::open_in_memory().unwrap();
    assert_eq!(kv.get("missing").unwrap(), None);

    kv.set("k", "first").unwrap();
    kv.set("k", "second").unwrap();
    assert_eq!(kv.get("k").unwrap().as_deref(), Some("second"));

    kv.remove("k").unwrap();
    kv.remove("k").unwrap();
    assert_eq!(kv.get("k").unwrap(), None);
}

#[test]
fn board_survives_restart_on_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let clock = ManualClock::new(start());

    {
        let storage = SqliteKeyValueStore::open(&path).unwrap();
        let mut store = BoardStore::open(
            BoardRepository::new(storage),
            Box::new(clock.clone()),
            Duration::from_millis(500),
        );
        store.add_column("Review", None);
        assert!(store.move_task(&"todo".into(), &"done".into(), &"task-1".into(), 0));
        clock.advance(TimeDelta::seconds(1));
        assert!(store.tick());
    }

    let storage = SqliteKeyValueStore::open(&path).unwrap();
    let store = BoardStore::open(
        BoardRepository::new(storage),
        Box::new(clock.clone()),
        Duration::from_millis(500),
    );
    assert_eq!(
        titles(store.columns()),
        vec!["To Do", "In Progress", "Done", "Review"]
    );
    assert_eq!(store.find_task(&"task-1".into()).unwrap().column_id.as_str(), "done");
    assert!(!store.has_pending_save());
}

#[test]
fn corrupt_stored_payload_shows_seed_without_overwriting() {
    let corrupt = "{\"columns\": \"oops\"}";
    let mut kv = MemoryKeyValueStore::new();
    kv.set(STORAGE_KEY, corrupt).unwrap();
    let clock = ManualClock::new(start());

    {
        let mut store = BoardStore::open(
            BoardRepository::new(&mut kv),
            Box::new(clock.clone()),
            Duration::from_millis(500),
        );
        assert_eq!(titles(store.columns()), vec!["To Do", "In Progress", "Done"]);
        assert!(!store.has_pending_save());
        clock.advance(TimeDelta::seconds(1));
        assert!(!store.tick());
    }

    assert_eq!(kv.get(STORAGE_KEY).unwrap().as_deref(), Some(corrupt));
}

#[test]
fn missing_key_schedules_seed_save() {
    let mut kv = MemoryKeyValueStore::new();
    let clock = ManualClock::new(start());

    {
        let mut store = BoardStore::open(
            BoardRepository::new(&mut kv),
            Box::new(clock.clone()),
            Duration::from_millis(500),
        );
        assert!(store.has_pending_save());
        clock.advance(TimeDelta::milliseconds(500));
        assert!(store.tick());
    }

    assert!(kv.get(STORAGE_KEY).unwrap().unwrap().contains("task-1"));
}

#[test]
fn export_to_dir_writes_dated_file_that_imports_back() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(start());
    let mut source_kv = MemoryKeyValueStore::new();
    let source = BoardStore::open(
        BoardRepository::new(&mut source_kv),
        Box::new(clock.clone()),
        Duration::from_millis(500),
    );

    assert_eq!(source.export_file_name(), "kanban-board-2024-03-01.json");
    let path = source.export_to_dir(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("kanban-board-2024-03-01.json"));

    let text = std::fs::read_to_string(&path).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["version"], STORAGE_VERSION);
    assert!(value["exportedAt"].is_string());
    assert!(text.contains('\n'));

    let mut target_kv = MemoryKeyValueStore::new();
    let mut target = BoardStore::open(
        BoardRepository::new(&mut target_kv),
        Box::new(clock.clone()),
        Duration::from_millis(500),
    );
    target.reset();
    target.import_json(&text).unwrap();
    assert_eq!(target.board(), source.board());
}

#[test]
fn export_to_missing_dir_fails_without_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let clock = ManualClock::new(start());
    let mut kv = MemoryKeyValueStore::new();
    let store = BoardStore::open(
        BoardRepository::new(&mut kv),
        Box::new(clock),
        Duration::from_millis(500),
    );

    assert!(store.export_to_dir(&missing).is_err());
}

#[test]
fn quota_error_is_typed() {
    let mut kv = MemoryKeyValueStore::with_quota(4);
    match kv.set("key", "value") {
        Err(StorageError::QuotaExceeded {
            required_bytes,
            quota_bytes,
        }) => {
            assert_eq!(required_bytes, 8);
            assert_eq!(quota_bytes, 4);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
