use std::fs;
use std::path::PathBuf;

use log::LevelFilter;
use range_trainer::config::*;
use range_trainer::storage::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("range-trainer-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_memory_store() {
    let mut store = MemoryStore::new();
    assert_eq!(store.get("k").unwrap(), None);
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    store.set("k", "w").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));
}

#[test]
fn test_file_store_round_trip() {
    let dir = scratch_dir("roundtrip");
    let mut store = FileStore::new(&dir);
    assert_eq!(store.get(STORAGE_KEY).unwrap(), None);

    store.set(STORAGE_KEY, "[]").unwrap();
    assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    assert!(dir.join(format!("{}.json", STORAGE_KEY)).exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_file_store_unwritable_dir() {
    let dir = scratch_dir("blocked");
    fs::write(&dir, "not a directory").unwrap();
    let mut store = FileStore::new(&dir);
    assert!(matches!(
        store.set("k", "v"),
        Err(range_trainer::error::TrainerError::Storage(_))
    ));
    fs::remove_file(&dir).unwrap();
}

#[test]
fn test_level_from_flags() {
    assert_eq!(Config::level_from_flags(0, false), LevelFilter::Warn);
    assert_eq!(Config::level_from_flags(1, false), LevelFilter::Info);
    assert_eq!(Config::level_from_flags(2, false), LevelFilter::Debug);
    assert_eq!(Config::level_from_flags(5, false), LevelFilter::Trace);
    assert_eq!(Config::level_from_flags(3, true), LevelFilter::Off);
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.drill_batch, DRILL_BATCH);
    assert_eq!(config.reveal_delay.as_millis(), 1000);
    assert!(config.presets_path.is_none());
    assert_eq!(config.store_dir, PathBuf::from(DEFAULT_STORE_DIR));
}

#[test]
fn test_init_logging_twice_is_harmless() {
    init_logging(LevelFilter::Off);
    init_logging(LevelFilter::Debug);
}
