use std::path::Path;

use range_trainer::cards::Hand;
use range_trainer::error::TrainerError;
use range_trainer::presets::*;
use range_trainer::ranges::Action;
use serde_json::json;

fn hand(label: &str) -> Hand {
    Hand::parse(label).unwrap()
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[test]
fn test_list_shape_is_all_raise() {
    let selection = normalize(json!(["AA", "KK", "AKs"])).unwrap();
    assert_eq!(selection.len(), 3);
    assert!(selection.values().all(|&a| a == Action::Raise));
}

#[test]
fn test_flat_shape() {
    let selection = normalize(json!({"AA": "raise", "KK": "call", "22": "mix"})).unwrap();
    assert_eq!(selection[&hand("AA")], Action::Raise);
    assert_eq!(selection[&hand("KK")], Action::Call);
    assert_eq!(selection[&hand("22")], Action::Mix);
}

#[test]
fn test_grouped_shape() {
    let selection = normalize(json!({"raise": ["AA", "KK"], "call": ["QQ"], "mix": ["AKo"]})).unwrap();
    assert_eq!(selection.len(), 4);
    assert_eq!(selection[&hand("QQ")], Action::Call);
    assert_eq!(selection[&hand("AKo")], Action::Mix);
}

#[test]
fn test_decode_picks_shape() {
    assert!(matches!(
        HandsFormat::decode(json!(["AA"])).unwrap(),
        HandsFormat::List(_)
    ));
    assert!(matches!(
        HandsFormat::decode(json!({"AA": "raise"})).unwrap(),
        HandsFormat::Flat(_)
    ));
    assert!(matches!(
        HandsFormat::decode(json!({"raise": ["AA"]})).unwrap(),
        HandsFormat::Grouped(_)
    ));
}

#[test]
fn test_unknown_hands_and_actions_dropped() {
    let flat = normalize(json!({"AA": "raise", "KAs": "call", "QQ": "shove"})).unwrap();
    assert_eq!(flat.len(), 1);
    let grouped = normalize(json!({"raise": ["AA", "XX"], "limp": ["KK"]})).unwrap();
    assert_eq!(grouped.len(), 1);
    assert!(grouped.contains_key(&hand("AA")));
}

#[test]
fn test_fold_entries_never_stored() {
    let flat = normalize(json!({"AA": "raise", "72o": "fold"})).unwrap();
    assert_eq!(flat.len(), 1);
    let grouped = normalize(json!({"fold": ["72o"], "raise": ["AA"]})).unwrap();
    assert_eq!(grouped.len(), 1);
    assert!(!grouped.contains_key(&hand("72o")));
}

#[test]
fn test_mixed_shape_fails_decode() {
    assert!(normalize(json!({"AA": "raise", "call": ["KK"]})).is_err());
    assert!(normalize(json!(42)).is_err());
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[test]
fn test_bundled_catalog() {
    let catalog = PresetCatalog::bundled();
    assert!(!catalog.is_empty());
    for (key, preset) in catalog.iter() {
        assert!(!preset.name.is_empty(), "{} has no name", key);
        assert!(!preset.selection().is_empty(), "{} has no hands", key);
    }
}

#[test]
fn test_bundled_catalog_covers_every_shape() {
    let catalog = PresetCatalog::bundled();
    let shapes: Vec<&HandsFormat> = catalog.iter().map(|(_, p)| &p.hands).collect();
    assert!(shapes.iter().any(|h| matches!(h, HandsFormat::List(_))));
    assert!(shapes.iter().any(|h| matches!(h, HandsFormat::Flat(_))));
    assert!(shapes.iter().any(|h| matches!(h, HandsFormat::Grouped(_))));
}

#[test]
fn test_malformed_entry_skipped() {
    let text = r#"{
        "good": {"name": "Good", "description": "ok", "hands": ["AA"]},
        "bad": {"description": "missing name", "hands": ["KK"]},
        "worse": {"name": "Worse", "hands": 7}
    }"#;
    let catalog = PresetCatalog::from_json(text);
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get("good").is_some());
    assert!(catalog.get("bad").is_none());
}

#[test]
fn test_description_optional() {
    let catalog = PresetCatalog::from_json(r#"{"x": {"name": "X", "hands": ["AA"]}}"#);
    assert_eq!(catalog.get("x").unwrap().description, "");
}

#[test]
fn test_malformed_document_is_empty() {
    assert!(PresetCatalog::from_json("not json").is_empty());
    assert!(PresetCatalog::from_json("[1, 2]").is_empty());
}

#[test]
fn test_missing_file_is_empty() {
    let catalog = PresetCatalog::from_file(Path::new("/nonexistent/presets.json"));
    assert!(catalog.is_empty());
}

#[test]
fn test_require_unknown() {
    let catalog = PresetCatalog::bundled();
    assert!(matches!(
        catalog.require("nope"),
        Err(TrainerError::UnknownPreset(k)) if k == "nope"
    ));
    assert!(catalog.require("utg-open").is_ok());
}

#[test]
fn test_action_names_must_match_exactly() {
    let flat = normalize(json!({"AA": "r", "KK": "RAISE", "QQ": " Call ", "JJ": "call"})).unwrap();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[&hand("JJ")], Action::Call);

    let grouped = normalize(json!({"r": ["JJ"], "Mix": ["TT"]})).unwrap();
    assert!(grouped.is_empty());
}

#[test]
fn test_grouped_applies_groups_in_document_order() {
    let later_call = normalize(json!({"raise": ["AA"], "call": ["AA"]})).unwrap();
    assert_eq!(later_call[&hand("AA")], Action::Call);

    let later_raise = normalize(json!({"call": ["AA"], "raise": ["AA"]})).unwrap();
    assert_eq!(later_raise[&hand("AA")], Action::Raise);

    let folded_last = normalize(json!({"raise": ["AA", "KK"], "fold": ["AA"]})).unwrap();
    assert_eq!(folded_last.len(), 1);
    assert!(folded_last.contains_key(&hand("KK")));
}

#[test]
fn test_catalog_keeps_group_order() {
    let text = r#"{"p": {"name": "P", "hands": {"mix": ["AA"], "call": ["AA"]}}}"#;
    let catalog = PresetCatalog::from_json(text);
    assert_eq!(catalog.get("p").unwrap().selection()[&hand("AA")], Action::Call);
}
