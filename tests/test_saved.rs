use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::executor::block_on;
use range_trainer::cards::Hand;
use range_trainer::config::STORAGE_KEY;
use range_trainer::error::{TrainerError, TrainerResult};
use range_trainer::ranges::{Action, Selection};
use range_trainer::saved::*;
use range_trainer::storage::{FileStore, KeyValueStore, MemoryStore};

fn hand(label: &str) -> Hand {
    Hand::parse(label).unwrap()
}

fn selection(entries: &[(&str, Action)]) -> Selection {
    entries.iter().map(|&(l, a)| (hand(l), a)).collect()
}

fn raw(repo: &SavedRangeRepository<MemoryStore>) -> Option<String> {
    repo.store().get(STORAGE_KEY).unwrap()
}

/// Records every question and answers with a fixed value.
struct Recorder {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl Recorder {
    fn new(answer: bool) -> Recorder {
        Recorder {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    fn questions(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for Recorder {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}

/// Saves another range under the same key while the question is still open.
struct SaveWhileAsking {
    dir: PathBuf,
}

#[async_trait]
impl Confirm for SaveWhileAsking {
    async fn confirm(&self, _message: &str) -> bool {
        let mut store = FileStore::new(&self.dir);
        let text = store.get(STORAGE_KEY).unwrap().unwrap();
        let mut records: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        records.push(serde_json::json!({
            "name": "concurrent",
            "hands": {"QQ": "call"},
            "timestamp": 5
        }));
        store
            .set(STORAGE_KEY, &serde_json::to_string(&records).unwrap())
            .unwrap();
        true
    }
}

struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> TrainerResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> TrainerResult<()> {
        Err(TrainerError::Storage("quota exceeded".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

#[test]
fn test_save_new_range() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    let sel = selection(&[("AA", Action::Raise), ("KK", Action::Call)]);
    let outcome = block_on(repo.save("  BTN 3bet  ", &sel, &Always(false))).unwrap();
    assert_eq!(outcome, SaveOutcome::Created);

    let ranges = repo.list();
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].name, "BTN 3bet");
    assert_eq!(ranges[0].selection(), sel);
    assert!(ranges[0].timestamp > 0);
}

#[test]
fn test_save_persists_action_map() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    let sel = selection(&[("AKs", Action::Mix)]);
    block_on(repo.save("x", &sel, &Always(true))).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw(&repo).unwrap()).unwrap();
    assert_eq!(stored[0]["name"], "x");
    assert_eq!(stored[0]["hands"]["AKs"], "mix");
    assert!(stored[0]["timestamp"].is_u64());
}

#[test]
fn test_save_empty_name() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    let sel = selection(&[("AA", Action::Raise)]);
    let err = block_on(repo.save("   ", &sel, &Always(true))).unwrap_err();
    assert!(matches!(err, TrainerError::EmptyName));
    assert!(raw(&repo).is_none());
}

#[test]
fn test_save_empty_selection() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    let err = block_on(repo.save("x", &Selection::new(), &Always(true))).unwrap_err();
    assert!(matches!(err, TrainerError::EmptySelection));
    let only_folds = selection(&[("AA", Action::Fold)]);
    assert!(block_on(repo.save("x", &only_folds, &Always(true))).is_err());
    assert!(raw(&repo).is_none());
}

#[test]
fn test_declined_overwrite_leaves_store_untouched() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    block_on(repo.save("A", &selection(&[("AA", Action::Raise)]), &Always(true))).unwrap();
    let before = raw(&repo);

    let confirm = Recorder::new(false);
    let outcome = block_on(repo.save("A", &selection(&[("KK", Action::Call)]), &confirm)).unwrap();
    assert_eq!(outcome, SaveOutcome::Declined);
    assert_eq!(raw(&repo), before);
    assert_eq!(
        confirm.questions(),
        vec!["A range named \"A\" already exists. Overwrite it?".to_string()]
    );
}

#[test]
fn test_accepted_overwrite_replaces_entry() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    block_on(repo.save("A", &selection(&[("AA", Action::Raise)]), &Always(true))).unwrap();
    block_on(repo.save("B", &selection(&[("22", Action::Raise)]), &Always(true))).unwrap();

    let replacement = selection(&[("KK", Action::Call)]);
    let outcome = block_on(repo.save("A", &replacement, &Always(true))).unwrap();
    assert_eq!(outcome, SaveOutcome::Overwritten);

    let ranges = repo.list();
    assert_eq!(ranges.len(), 2);
    assert_eq!(repo.load("A").unwrap(), replacement);
}

#[test]
fn test_overwrite_collapses_duplicate_names() {
    let seeded = r#"[
        {"name": "dup", "hands": ["AA"], "timestamp": 1},
        {"name": "other", "hands": ["KK"], "timestamp": 2},
        {"name": "dup", "hands": ["QQ"], "timestamp": 3}
    ]"#;
    let mut repo = SavedRangeRepository::new(MemoryStore::with_entry(STORAGE_KEY, seeded));
    block_on(repo.save("dup", &selection(&[("JJ", Action::Call)]), &Always(true))).unwrap();
    let ranges = repo.list();
    assert_eq!(ranges.iter().filter(|r| r.name == "dup").count(), 1);
    assert_eq!(ranges.len(), 2);
}

#[test]
fn test_overwrite_keeps_entry_saved_during_confirm() {
    let dir = std::env::temp_dir().join(format!("range-trainer-saved-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let mut repo = SavedRangeRepository::new(FileStore::new(&dir));
    block_on(repo.save("X", &selection(&[("AA", Action::Raise)]), &Always(true))).unwrap();

    let confirm = SaveWhileAsking { dir: dir.clone() };
    let replacement = selection(&[("KK", Action::Mix)]);
    let outcome = block_on(repo.save("X", &replacement, &confirm)).unwrap();
    assert_eq!(outcome, SaveOutcome::Overwritten);

    let mut names: Vec<String> = repo.list().into_iter().map(|r| r.name).collect();
    names.sort();
    assert_eq!(names, vec!["X", "concurrent"]);
    assert_eq!(repo.load("X").unwrap(), replacement);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_storage_failure_reported() {
    let mut repo = SavedRangeRepository::new(BrokenStore);
    let err = block_on(repo.save("x", &selection(&[("AA", Action::Raise)]), &Always(true))).unwrap_err();
    assert!(matches!(err, TrainerError::Storage(_)));
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[test]
fn test_list_newest_first() {
    let seeded = r#"[
        {"name": "old", "hands": {"AA": "raise"}, "timestamp": 100},
        {"name": "new", "hands": {"KK": "call"}, "timestamp": 300},
        {"name": "mid", "hands": {"QQ": "mix"}, "timestamp": 200}
    ]"#;
    let repo = SavedRangeRepository::new(MemoryStore::with_entry(STORAGE_KEY, seeded));
    let names: Vec<String> = repo.list().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["new", "mid", "old"]);
}

#[test]
fn test_legacy_list_loads_as_raise() {
    let seeded = r#"[{"name": "legacy", "hands": ["AA", "AKs", "bogus"], "timestamp": 5}]"#;
    let repo = SavedRangeRepository::new(MemoryStore::with_entry(STORAGE_KEY, seeded));
    let sel = repo.load("legacy").unwrap();
    assert_eq!(sel.len(), 2);
    assert!(sel.values().all(|&a| a == Action::Raise));
}

#[test]
fn test_malformed_storage_reads_empty() {
    let repo = SavedRangeRepository::new(MemoryStore::with_entry(STORAGE_KEY, "{not json"));
    assert!(repo.list().is_empty());
    assert!(matches!(
        repo.load("anything"),
        Err(TrainerError::UnknownSavedRange(_))
    ));
}

#[test]
fn test_unknown_action_name_drops_only_that_hand() {
    let seeded = r#"[
        {"name": "good", "hands": {"AA": "raise"}, "timestamp": 1},
        {"name": "odd", "hands": {"KK": "limp", "QQ": "call", "JJ": "Raise"}, "timestamp": 2}
    ]"#;
    let repo = SavedRangeRepository::new(MemoryStore::with_entry(STORAGE_KEY, seeded));
    assert_eq!(repo.list().len(), 2);
    assert_eq!(repo.load("good").unwrap(), selection(&[("AA", Action::Raise)]));
    assert_eq!(repo.load("odd").unwrap(), selection(&[("QQ", Action::Call)]));
}

#[test]
fn test_odd_records_do_not_cost_other_ranges_on_save() {
    let seeded = r#"[
        {"name": "good", "hands": {"AA": "raise"}},
        {"name": "odd", "hands": {"KK": "limp"}},
        {"hands": ["QQ"], "timestamp": 3},
        {"name": "weird", "hands": 7}
    ]"#;
    let mut repo = SavedRangeRepository::new(MemoryStore::with_entry(STORAGE_KEY, seeded));
    let names: Vec<String> = repo.list().into_iter().map(|r| r.name).collect();
    assert_eq!(names.len(), 2);

    block_on(repo.save("new", &selection(&[("22", Action::Mix)]), &Always(true))).unwrap();
    let mut names: Vec<String> = repo.list().into_iter().map(|r| r.name).collect();
    names.sort();
    assert_eq!(names, vec!["good", "new", "odd"]);
    assert_eq!(repo.load("good").unwrap(), selection(&[("AA", Action::Raise)]));
}

#[test]
fn test_empty_storage() {
    let repo = SavedRangeRepository::new(MemoryStore::new());
    assert!(repo.list().is_empty());
    assert!(repo.find("x").is_none());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn test_delete_declined() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    block_on(repo.save("A", &selection(&[("AA", Action::Raise)]), &Always(true))).unwrap();
    let before = raw(&repo);

    let confirm = Recorder::new(false);
    assert!(!block_on(repo.delete("A", &confirm)).unwrap());
    assert_eq!(raw(&repo), before);
    assert_eq!(
        confirm.questions(),
        vec!["Are you sure you want to delete \"A\"?".to_string()]
    );
}

#[test]
fn test_delete_confirmed() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    block_on(repo.save("A", &selection(&[("AA", Action::Raise)]), &Always(true))).unwrap();
    block_on(repo.save("B", &selection(&[("KK", Action::Raise)]), &Always(true))).unwrap();

    assert!(block_on(repo.delete("A", &Always(true))).unwrap());
    let names: Vec<String> = repo.list().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["B"]);
}

#[test]
fn test_delete_unknown_does_not_prompt() {
    let mut repo = SavedRangeRepository::new(MemoryStore::new());
    let confirm = Recorder::new(true);
    let err = block_on(repo.delete("ghost", &confirm)).unwrap_err();
    assert!(matches!(err, TrainerError::UnknownSavedRange(_)));
    assert!(confirm.questions().is_empty());
}
