//! End-to-end editing sessions: build, save, reopen, import, generate.

use std::fs;

use chrono::NaiveDate;
use sigm_codegen::{GeneratorKind, HEADER_FILE, SOURCE_FILE};
use sigm_core::{Command, CommandError, Session, SessionError};
use sigm_model::{Core, DataType, InitValue, Signal};
use sigm_validate::IssueCode;
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn session() -> Session {
    let mut session = Session::new();
    session.set_reference_date(Some(today()));
    session.new_project();
    session
}

fn set_editor(session: &mut Session, editor: &str) {
    let mut metadata = session.snapshot().metadata.clone();
    metadata.editor = editor.to_string();
    metadata.description = "init".to_string();
    session.apply(Command::UpdateMetadata(metadata)).unwrap();
}

/// One SoC with a master and a remote core, one routed signal.
fn build_soc_a(session: &mut Session) {
    session.apply(Command::AddSoc("SocA".to_string())).unwrap();
    let mut master = Core::described("master core");
    master.is_master = true;
    session
        .apply(Command::AddCore {
            soc: "SocA".to_string(),
            core: "Core0".to_string(),
            props: master,
        })
        .unwrap();
    session
        .apply(Command::AddCore {
            soc: "SocA".to_string(),
            core: "Core1".to_string(),
            props: Core::described("remote core"),
        })
        .unwrap();
    session.apply(Command::SetSocType("SocA".to_string())).unwrap();

    let mut signal = Signal::new("sig1");
    signal.data_type = "UINT8".parse::<DataType>().unwrap();
    signal.source = "SocA.Core0".to_string();
    signal.set_destination("SocA.Core1", true);
    session
        .apply(Command::AddSignal {
            name: "sig1".to_string(),
            signal,
        })
        .unwrap();
}

#[test]
fn new_project_saves_and_reopens_equal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.json");
    let mut session = session();
    set_editor(&mut session, "alice");
    build_soc_a(&mut session);

    session.save_project(&path).unwrap();
    assert!(!session.is_modified());
    assert_eq!(session.current_file(), Some(path.as_path()));

    let mut reopened = Session::new();
    reopened.open_project(&path).unwrap();
    assert_eq!(reopened.snapshot(), session.snapshot());
    assert_eq!(reopened.baseline_version(), Some("1.0"));
    assert_eq!(
        reopened
            .available_cores()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        ["SocA.Core0", "SocA.Core1"]
    );
}

#[test]
fn legacy_string_core_is_promoted_on_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    fs::write(
        &path,
        r#"{
            "metadata": {"version": "1.0", "date": "2025-06-01", "editor": "bob", "description": ""},
            "soc_type": "SocA",
            "build_type": "SMP",
            "soc_list": ["SocA"],
            "build_list": ["SMP"],
            "core_info": {"SocA": {"Core0": "first core"}},
            "signals": {}
        }"#,
    )
    .unwrap();

    let mut session = Session::new();
    let project = session.open_project(&path).unwrap();
    let core = &project.core_info["SocA"]["Core0"];
    assert_eq!(core.description, "first core");
    assert_eq!((core.os.as_str(), core.soc_family.as_str()), ("Unknown", "Unknown"));
    assert!(!core.is_master && !core.is_qnx && !core.is_autosar && !core.is_sim);
}

#[test]
fn workbook_round_trip_keeps_routing() {
    let dir = tempdir().unwrap();
    let xlsx = dir.path().join("signal_data.xlsx");
    let mut session = session();
    set_editor(&mut session, "alice");
    session.apply(Command::AddSoc("SocA".to_string())).unwrap();
    session.apply(Command::AddSoc("SocB".to_string())).unwrap();
    for soc in ["SocA", "SocB"] {
        session
            .apply(Command::AddCore {
                soc: soc.to_string(),
                core: "Core0".to_string(),
                props: Core::described("core"),
            })
            .unwrap();
    }
    session.apply(Command::SetSocType("SocA".to_string())).unwrap();
    let mut signal = Signal::new("wheel");
    signal.source = "SocA.Core0".to_string();
    signal.set_destination("SocB.Core0", true);
    signal.timeout = 100;
    session
        .apply(Command::AddSignal {
            name: "wheel".to_string(),
            signal,
        })
        .unwrap();
    session.export_tabular(&xlsx).unwrap();

    let mut fresh = self::session();
    let outcome = fresh.import_tabular(&xlsx).unwrap();
    let imported = &fresh.snapshot().signals["wheel"];
    assert_eq!(imported.source, "SocA.Core0");
    assert_eq!(imported.destinations.get("core_SocB_Core0"), Some(&true));
    assert_eq!(imported.timeout, 100);
    assert_eq!(fresh.snapshot(), &outcome.project);

    // Import is one undoable step.
    assert!(fresh.is_modified());
    fresh.undo().unwrap();
    assert!(fresh.snapshot().signals.is_empty());
}

#[test]
fn repeated_paste_picks_fresh_names() {
    let mut session = session();
    session.apply(Command::add_signal("x")).unwrap();
    session.apply(Command::add_signal("x_copy")).unwrap();
    session
        .apply(Command::CopySignal {
            name: "x".to_string(),
        })
        .unwrap();
    for _ in 0..3 {
        session.apply(Command::PasteSignal).unwrap();
    }
    let names: Vec<&str> = session.snapshot().signals.keys().map(String::as_str).collect();
    assert_eq!(names, ["x", "x_copy", "x_copy1", "x_copy2", "x_copy3"]);
}

#[test]
fn invalid_project_is_not_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.json");
    fs::write(&path, "previous contents").unwrap();

    let mut session = session();
    set_editor(&mut session, "");
    let err = session.save_project(&path).unwrap_err();

    let codes: Vec<IssueCode> = err.issues().iter().map(|issue| issue.code).collect();
    assert_eq!(codes, [IssueCode::EditorEmpty]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous contents");
    assert!(session.is_modified());
    assert!(session.current_file().is_none());
}

#[test]
fn version_may_not_drop_below_the_opened_one() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.json");
    let mut session = session();
    set_editor(&mut session, "alice");
    let mut metadata = session.snapshot().metadata.clone();
    metadata.version = "2.0".to_string();
    session.apply(Command::UpdateMetadata(metadata.clone())).unwrap();
    session.save_project(&path).unwrap();

    metadata.version = "1.5".to_string();
    session.apply(Command::UpdateMetadata(metadata)).unwrap();
    let err = session.save_project(&path).unwrap_err();
    assert_eq!(err.issues()[0].code, IssueCode::VersionRegression);
}

#[test]
fn signal_manager_generation_is_repeatable() {
    let dir = tempdir().unwrap();
    let mut session = session();
    set_editor(&mut session, "alice");
    let mut signal = Signal::new("temperature");
    signal.init_value = InitValue::Custom;
    signal.custom_init_value = Some("42".to_string());
    session
        .apply(Command::AddSignal {
            name: "temperature".to_string(),
            signal,
        })
        .unwrap();

    let first = dir.path().join("first");
    let second = dir.path().join("second");
    let artifacts = session
        .generate(GeneratorKind::SignalMgr, &first, None)
        .unwrap();
    assert_eq!(artifacts, [first.join(SOURCE_FILE), first.join(HEADER_FILE)]);
    session
        .generate(GeneratorKind::SignalMgr, &second, None)
        .unwrap();

    let source = fs::read_to_string(first.join(SOURCE_FILE)).unwrap();
    assert!(source.contains(
        "static INT32 temperature_value = 42;\n\
INT32 get_temperature(void)\n\
{\n\
\x20   return temperature_value;\n\
}\n\
void set_temperature(INT32 value)\n\
{\n\
\x20   temperature_value = value;\n\
}\n"
    ));
    for file in [SOURCE_FILE, HEADER_FILE] {
        assert_eq!(
            fs::read(first.join(file)).unwrap(),
            fs::read(second.join(file)).unwrap()
        );
    }
}

#[test]
fn generation_refuses_an_invalid_project() {
    let dir = tempdir().unwrap();
    let mut session = session();
    let err = session
        .generate(GeneratorKind::SignalMgr, dir.path(), None)
        .unwrap_err();
    assert!(matches!(err, SessionError::Invalid(_)));
    assert!(!dir.path().join(SOURCE_FILE).exists());
}

#[test]
fn rejected_command_leaves_history_alone() {
    let mut session = session();
    session.apply(Command::add_signal("x")).unwrap();
    let err = session
        .apply(Command::RenameSignal {
            from: "missing".to_string(),
            to: "y".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, CommandError::UnknownTarget { kind: "signal", .. }));
    session.undo().unwrap();
    assert!(session.snapshot().signals.is_empty());
    assert!(session.undo().is_err());
}
