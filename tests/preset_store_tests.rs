use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use cdr_heatmap::data::{NewPreset, PresetError, PresetStore};

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("cdr-heatmap-{name}-{stamp}.json"))
}

fn new_preset(name: &str) -> NewPreset {
    NewPreset {
        name: name.to_string(),
        damage: 25.0,
        mult: 2,
        base_cooldown: 6.0,
        low_cap: None,
        high_cap: Some(400.0),
        max_cdr: 60,
    }
}

#[test]
fn missing_store_loads_empty() {
    let store = PresetStore::open(unique_temp_path("missing"));
    assert!(store.load_all().expect("load").is_empty());
}

#[test]
fn save_assigns_sequential_ids_in_order() {
    let path = unique_temp_path("sequential");
    let store = PresetStore::open(&path);

    let first = store.save(new_preset("Katana")).expect("save first");
    let second = store.save(new_preset("Longbow")).expect("save second");
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert!(first.saved_at.is_some());

    let names: Vec<String> = store
        .load_all()
        .expect("load")
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Katana", "Longbow"]);

    let _ = std::fs::remove_file(path);
}

#[test]
fn duplicate_name_is_rejected_without_writing() {
    let path = unique_temp_path("duplicate");
    let store = PresetStore::open(&path);
    store.save(new_preset("Katana")).expect("save");

    let err = store.save(new_preset("Katana")).expect_err("duplicate");
    assert!(matches!(err, PresetError::DuplicateName(ref name) if name == "Katana"));
    assert_eq!(store.load_all().expect("load").len(), 1);

    let _ = std::fs::remove_file(path);
}

#[test]
fn invalid_preset_fields_are_rejected() {
    let store = PresetStore::open(unique_temp_path("invalid"));
    let mut bad = new_preset("Broken");
    bad.base_cooldown = 0.0;
    assert!(matches!(store.save(bad), Err(PresetError::Param(_))));

    let mut out_of_band = new_preset("Too far");
    out_of_band.max_cdr = 150;
    assert!(matches!(store.save(out_of_band), Err(PresetError::Param(_))));

    assert!(matches!(store.save(new_preset("  ")), Err(PresetError::EmptyName)));
}

#[test]
fn find_looks_up_by_name() {
    let path = unique_temp_path("find");
    let store = PresetStore::open(&path);
    store.save(new_preset("Katana")).expect("save");

    let found = store.find("Katana").expect("found");
    assert_eq!(found.max_cdr, 60);
    assert!(matches!(store.find("Axe"), Err(PresetError::NotFound)));

    let _ = std::fs::remove_file(path);
}

#[test]
fn save_replaces_store_without_leaving_temp_file() {
    let path = unique_temp_path("atomic");
    let temp = PathBuf::from(format!("{}.tmp", path.display()));
    let store = PresetStore::open(&path);
    store.save(new_preset("Katana")).expect("save first");

    // Leftovers from an interrupted write are ignored and overwritten.
    std::fs::write(&temp, "{half written").expect("write stale temp");
    assert_eq!(store.load_all().expect("load").len(), 1);

    store.save(new_preset("Longbow")).expect("save second");
    assert!(!temp.exists());
    assert_eq!(store.load_all().expect("load").len(), 2);

    let _ = std::fs::remove_file(path);
}
