//! Save/load behaviour of complete project documents.

use std::fs;

use chrono::NaiveDate;
use sigm_model::{Asil, Core, DataType, MemoryRegion, Project, Signal};
use sigm_persistence::{load_project, save_project, to_json_string};
use tempfile::tempdir;

fn sample_project() -> Project {
    let mut project = Project::new_template(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap());
    project.metadata.editor = "alice".to_string();
    project.metadata.description = "init".to_string();
    project.soc_type = "SocA".to_string();
    project.soc_list = vec!["SocA".to_string()];

    let cores = project.core_info.entry("SocA".to_string()).or_default();
    let mut master = Core::described("master core");
    master.is_master = true;
    cores.insert("Core0".to_string(), master);
    cores.insert("Core1".to_string(), Core::described("slave core"));

    let mut signal = Signal::new("sig1");
    signal.data_type = "UINT8".parse::<DataType>().unwrap();
    signal.source = "SocA.Core0".to_string();
    signal.set_destination("SocA.Core1", true);
    project.signals.insert("sig1".to_string(), signal);
    project
}

#[test]
fn saved_project_loads_back_equal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("s1.json");
    let project = sample_project();

    save_project(&project, &path).unwrap();
    let loaded = load_project(&path).unwrap();

    assert_eq!(loaded, project);
    assert!(loaded.invariant_violations().is_empty());
}

#[test]
fn resave_is_byte_identical() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    save_project(&sample_project(), &first).unwrap();
    save_project(&load_project(&first).unwrap(), &second).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn signal_keys_keep_file_spelling() {
    let text = to_json_string(&sample_project()).unwrap();
    assert!(text.contains("\"Memory Region\": \"DDR\""));
    assert!(text.contains("\"Buffer count_IPC\": 1"));
    assert!(text.contains("\"core_SocA_Core1\": true"));
    assert!(text.contains("\"Source\": \"SocA.Core0\""));
}

#[test]
fn legacy_document_loads_and_upgrades_on_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    fs::write(
        &path,
        r#"{
    "metadata": {"version": "1.2", "date": "2024-12-01", "editor": "bob", "description": "old"},
    "soc_type": "SocA",
    "build_type": "SMP",
    "soc_list": ["SocA"],
    "build_list": ["SMP"],
    "core_info": {"SocA": {"Core0": "first core"}},
    "signals": {}
}"#,
    )
    .unwrap();

    let project = load_project(&path).unwrap();
    assert_eq!(project.core_info["SocA"]["Core0"], Core::described("first core"));

    save_project(&project, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"soc_family\": \"Unknown\""));
}

#[test]
fn unreadable_signal_values_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hand_edited.json");
    fs::write(
        &path,
        r#"{
    "metadata": {"version": "1.0", "date": "2025-05-20", "editor": "bob", "description": ""},
    "soc_type": "SocA",
    "build_type": "SMP",
    "soc_list": ["SocA"],
    "build_list": ["SMP"],
    "core_info": {},
    "signals": {
        "speed": {
            "Memory Region": "SRAM",
            "ASIL": "",
            "Timeout": "",
            "Notifiers": "maybe",
            "Periodicity": 20
        }
    }
}"#,
    )
    .unwrap();

    let project = load_project(&path).unwrap();
    let signal = &project.signals["speed"];
    assert_eq!(signal.memory_region, MemoryRegion::Ddr);
    assert_eq!(signal.asil, Asil::Qm);
    assert_eq!(signal.timeout, 10);
    assert!(!signal.notifiers);
    assert_eq!(signal.periodicity, 20);
    assert_eq!(
        signal
            .unreadable
            .iter()
            .map(|(field, raw)| (field.as_str(), raw.as_str()))
            .collect::<Vec<_>>(),
        [
            ("Memory Region", "SRAM"),
            ("Notifiers", "maybe"),
            ("Timeout", ""),
            ("ASIL", ""),
        ]
    );

    save_project(&project, &path).unwrap();
    let reloaded = load_project(&path).unwrap();
    assert!(reloaded.signals["speed"].unreadable.is_empty());
    assert_eq!(reloaded.signals["speed"].memory_region, MemoryRegion::Ddr);
}

#[test]
fn every_top_level_key_is_written() {
    let mut project = sample_project();
    project.board_options.clear();
    project.selected_board.clear();
    let json: serde_json::Value =
        serde_json::from_str(&to_json_string(&project).unwrap()).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    for key in [
        "metadata",
        "soc_type",
        "build_type",
        "soc_list",
        "build_list",
        "core_info",
        "signals",
        "selected_board",
        "board_options",
        "project_specific",
        "script_paths",
        "export_sheet_name",
    ] {
        assert!(keys.contains(&key), "{key} missing from {keys:?}");
    }
}
