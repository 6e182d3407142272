//! Project-level behaviour of the model: legacy promotion, unknown-key
//! preservation and data type canonicalization.

use chrono::NaiveDate;
use proptest::prelude::*;
use sigm_model::{BaseType, Core, DataType, EnumWidth, InvariantViolation, Project};

#[test]
fn legacy_core_strings_are_promoted() {
    let json = r#"{
        "metadata": {"version": "1.0", "date": "2025-01-01", "editor": "a", "description": ""},
        "soc_type": "SocA",
        "build_type": "SMP",
        "soc_list": ["SocA"],
        "build_list": ["SMP"],
        "core_info": {"SocA": {"Core0": "first core"}},
        "signals": {}
    }"#;
    let project: Project = serde_json::from_str(json).unwrap();
    let core = &project.core_info["SocA"]["Core0"];
    assert_eq!(
        *core,
        Core {
            description: "first core".to_string(),
            is_master: false,
            is_qnx: false,
            is_autosar: false,
            is_sim: false,
            os: "Unknown".to_string(),
            soc_family: "Unknown".to_string(),
            extra: serde_json::Map::new(),
        }
    );

    let saved = serde_json::to_value(&project).unwrap();
    assert_eq!(saved["core_info"]["SocA"]["Core0"]["os"], "Unknown");
}

#[test]
fn unknown_keys_survive_a_round_trip() {
    let json = r#"{
        "metadata": {"version": "2.0", "date": "2025-01-01", "editor": "a", "description": "", "reviewer": "qa"},
        "soc_type": "Windows",
        "build_type": "SMP",
        "soc_list": ["Windows"],
        "build_list": ["SMP"],
        "core_info": {},
        "signals": {"s": {"DataType": "UINT8", "Owner": "ecu"}},
        "tool_settings": {"theme": "dark"}
    }"#;
    let project: Project = serde_json::from_str(json).unwrap();
    assert_eq!(project.extra["tool_settings"]["theme"], "dark");
    assert_eq!(project.metadata.extra["reviewer"], "qa");

    let text = serde_json::to_string(&project).unwrap();
    let again: Project = serde_json::from_str(&text).unwrap();
    assert_eq!(again, project);
    assert_eq!(serde_json::to_string(&again).unwrap(), text);
}

#[test]
fn unreadable_date_falls_back_to_today() {
    let project: Project =
        serde_json::from_str(r#"{"metadata": {"version": "1.0", "date": "soon"}}"#).unwrap();
    assert_eq!(project.metadata.date, sigm_model::dates::today());
}

#[test]
fn soc_type_outside_list_is_reported() {
    let mut project = Project::new_template(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    project.soc_type = "Ghost".to_string();
    assert_eq!(
        project.invariant_violations(),
        [InvariantViolation::SocTypeNotListed("Ghost".to_string())]
    );
}

fn base_type() -> impl Strategy<Value = DataType> {
    proptest::sample::select(BaseType::ALL.to_vec()).prop_map(DataType::Primitive)
}

fn data_type() -> impl Strategy<Value = DataType> {
    prop_oneof![
        base_type(),
        Just(DataType::Struct),
        (base_type(), 1u32..=1000).prop_map(|(element, size)| DataType::Array {
            element: Box::new(element),
            size
        }),
        (any::<bool>(), "[A-Z][A-Za-z0-9_]{0,12}").prop_map(|(one, name)| DataType::Enum {
            width: if one {
                EnumWidth::OneByte
            } else {
                EnumWidth::FourBytes
            },
            name
        }),
    ]
}

proptest! {
    #[test]
    fn canonical_spelling_parses_back(ty in data_type()) {
        let text = ty.to_string();
        prop_assert_eq!(text.parse::<DataType>().unwrap(), ty);
    }
}
