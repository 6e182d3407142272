//! Export -> import behaviour of complete projects.

use chrono::NaiveDate;
use proptest::prelude::*;
use sigm_model::{
    Asil, BaseType, Checksum, Core, DataType, EnumWidth, ImplApproach, MemoryRegion, Project,
    Signal, SignalType,
};
use sigm_workbook::{export_bytes, export_workbook, import_bytes, import_workbook};
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

/// Importing fills in a flag for every core column; do the same to the
/// original so the two can be compared.
fn with_all_destination_flags(mut project: Project) -> Project {
    let keys: Vec<String> = project
        .available_cores()
        .iter()
        .map(|id| id.destination_key())
        .collect();
    for signal in project.signals.values_mut() {
        let mut flags = indexmap::IndexMap::new();
        for key in &keys {
            flags.insert(key.clone(), signal.destinations.get(key).copied().unwrap_or(false));
        }
        signal.destinations = flags;
    }
    project
}

fn two_soc_project() -> Project {
    let mut project = Project::new_template(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
    project.metadata.editor = "alice".to_string();
    project.metadata.description = "two socs".to_string();
    project.soc_type = "SocA".to_string();
    project.soc_list = vec!["SocA".to_string(), "SocB".to_string()];

    let mut master = Core::described("main core");
    master.is_master = true;
    master.os = "QNX".to_string();
    master.soc_family = "TI".to_string();
    project
        .core_info
        .entry("SocA".to_string())
        .or_default()
        .insert("Core0".to_string(), master);
    let mut remote = Core::described("remote core");
    remote.is_autosar = true;
    project
        .core_info
        .entry("SocB".to_string())
        .or_default()
        .insert("Core0".to_string(), remote);

    let mut signal = Signal::new("wheel_speed");
    signal.source = "SocA.Core0".to_string();
    signal.set_destination("SocB.Core0", true);
    signal.data_type = DataType::Primitive(BaseType::Float32);
    signal.memory_region = MemoryRegion::NonCached;
    signal.timeout = 200;
    signal.periodicity = 50;
    signal.asil = Asil::B;
    signal.notifiers = true;
    signal.description = "speed of the front wheel".to_string();
    project.signals.insert("wheel_speed".to_string(), signal);
    project
}

#[test]
fn two_soc_project_survives_export_and_import() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("signal_data.xlsx");
    let project = two_soc_project();

    export_workbook(&project, &path).unwrap();
    let outcome = import_workbook(&path, today()).unwrap();
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);

    let imported = outcome.project;
    let signal = &imported.signals["wheel_speed"];
    assert_eq!(signal.source, "SocA.Core0");
    assert_eq!(signal.destinations.get("core_SocB_Core0"), Some(&true));
    assert_eq!(signal.destinations.get("core_SocA_Core0"), Some(&false));
    assert_eq!(imported, with_all_destination_flags(project));
}

#[test]
fn failed_export_keeps_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    std::fs::write(&path, b"previous").unwrap();

    // A directory squatting on the temp name makes the write fail.
    std::fs::create_dir(dir.path().join(".out.xlsx.tmp")).unwrap();
    assert!(export_workbook(&two_soc_project(), &path).is_err());
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
}

#[test]
fn import_of_garbage_is_an_archive_error() {
    let err = import_bytes(b"not a zip".to_vec(), today()).unwrap_err();
    assert!(matches!(err, sigm_workbook::WorkbookError::Archive { .. }));
}

fn data_type() -> impl Strategy<Value = DataType> {
    let base = prop::sample::select(BaseType::ALL.to_vec());
    prop_oneof![
        base.clone().prop_map(DataType::Primitive),
        (base, 1u32..=1000).prop_map(|(b, size)| DataType::Array {
            element: Box::new(DataType::Primitive(b)),
            size,
        }),
        (any::<bool>(), "[A-Z][a-zA-Z]{0,6}").prop_map(|(wide, name)| DataType::Enum {
            width: if wide { EnumWidth::FourBytes } else { EnumWidth::OneByte },
            name,
        }),
    ]
}

prop_compose! {
    fn platform_core()(
        flags in any::<[bool; 4]>(),
        os in prop::sample::select(sigm_model::RECOGNIZED_OS.to_vec()),
        family in prop::sample::select(sigm_model::RECOGNIZED_SOC_FAMILIES.to_vec()),
        description in "([A-Za-z]( ?[a-z]){0,8})?",
    ) -> Core {
        Core {
            description,
            is_master: flags[0],
            is_qnx: flags[1],
            is_autosar: flags[2],
            is_sim: flags[3],
            os: os.to_string(),
            soc_family: family.to_string(),
            ..Core::default()
        }
    }
}

prop_compose! {
    fn signal()(
        port in "[a-z][a-z0-9_]{0,10}",
        region in prop::sample::select(MemoryRegion::ALL.to_vec()),
        kind in prop::sample::select(SignalType::ALL.to_vec()),
        approach in prop::sample::select(ImplApproach::ALL.to_vec()),
        asil in prop::sample::select(Asil::ALL.to_vec()),
        checksum in prop::sample::select(Checksum::ALL.to_vec()),
        counts in (1u32..=10, 1u32..=10),
        timing in (1u32..=100, 1u32..=100),
        flags in any::<(bool, bool)>(),
        data_type in data_type(),
        description in "[A-Za-z]( ?[a-z]){0,12}",
    ) -> Signal {
        let mut signal = Signal::new(port);
        signal.memory_region = region;
        signal.signal_type = kind;
        signal.impl_approach = approach;
        signal.asil = asil;
        signal.checksum = checksum;
        signal.buffer_count_ipc = counts.0;
        signal.sm_buff_count = counts.1;
        signal.timeout = timing.0 * 10;
        signal.periodicity = timing.1 * 10;
        signal.notifiers = flags.0;
        signal.get_obj_ref = flags.1;
        signal.data_type = data_type;
        signal.description = description;
        signal
    }
}

prop_compose! {
    fn project()(
        socs in prop::collection::vec(prop::collection::vec(platform_core(), 1..3), 1..3),
        signals in prop::collection::vec((signal(), any::<prop::sample::Index>(), any::<[bool; 4]>()), 0..6),
        build in prop::sample::select(sigm_model::KNOWN_BUILD_TYPES.to_vec()),
        editor in "[a-z]{1,8}",
        version in (0u32..10, 0u32..10),
    ) -> Project {
        let mut project = Project::new_template(NaiveDate::from_ymd_opt(2024, 12, 24).unwrap());
        project.metadata.editor = editor;
        project.metadata.version = format!("{}.{}", version.0, version.1);
        project.metadata.description = "generated".to_string();
        project.build_type = build.to_string();
        project.build_list = vec![build.to_string()];
        project.soc_list.clear();
        for (s, cores) in socs.into_iter().enumerate() {
            let soc = format!("Soc{s}");
            project.soc_list.push(soc.clone());
            let entry = project.core_info.entry(soc).or_default();
            for (c, core) in cores.into_iter().enumerate() {
                entry.insert(format!("Core{c}"), core);
            }
        }
        project.soc_type = project.soc_list[0].clone();

        let cores = project.available_cores();
        for (n, (mut signal, source, destinations)) in signals.into_iter().enumerate() {
            let source = source.get(&cores);
            signal.source = source.to_string();
            for (id, enabled) in cores.iter().zip(destinations) {
                if id != source {
                    signal.set_destination(&id.to_string(), enabled);
                }
            }
            project.signals.insert(format!("sig{n}"), signal);
        }
        project
    }
}

proptest! {
    #[test]
    fn export_then_import_is_identity(project in project()) {
        let bytes = export_bytes(&project).unwrap();
        let outcome = import_bytes(bytes, today()).unwrap();
        prop_assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
        prop_assert_eq!(outcome.project, with_all_destination_flags(project));
    }
}
