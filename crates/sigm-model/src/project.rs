//! The project aggregate.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::dates;
use crate::error::InvariantViolation;
use crate::platform::{Core, CoreId};
use crate::signal::Signal;

/// Sheet name the configuration table is exported under unless overridden.
pub const DEFAULT_EXPORT_SHEET: &str = "Config";

/// SoC selected in a new project.
pub const DEFAULT_SOC: &str = "Windows";

/// Build type selected in a new project.
pub const DEFAULT_BUILD: &str = "SMP";

/// Version string of a new project.
pub const DEFAULT_VERSION: &str = "1.0";

/// Release metadata carried in the project header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default = "default_version", deserialize_with = "string_or_number")]
    pub version: String,
    #[serde(default = "dates::today", with = "dates::lenient")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "string_or_number")]
    pub editor: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            date,
            editor: String::new(),
            description: String::new(),
            extra: Map::new(),
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new(dates::today())
    }
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Strings, or numbers rendered as text (`1.1` is a common hand edit).
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!("expected a string, got {other}"))),
    }
}

/// Output and script directories chosen in the project settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub output_path: String,
    pub script_path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lock and core-id APIs for an SMP build.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmpApi {
    pub spinlock_api: String,
    pub spinunlock_api: String,
    pub spinlock_header: String,
    pub semaphore_lock_api: String,
    pub semaphore_unlock_api: String,
    pub semaphore_header: String,
    pub get_core_id_api: String,
    pub get_core_id_header: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lock APIs for one core of a multi-image build.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreApi {
    pub spinlock_api: String,
    pub spinunlock_api: String,
    pub spinlock_header: String,
    pub semaphore_lock_api: String,
    pub semaphore_unlock_api: String,
    pub semaphore_header: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// API configuration, stored but not interpreted by generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smp: Option<SmpApi>,
    /// Keyed `<SoC>_<Core>`, see [`api_core_key`].
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub multicore: IndexMap<String, CoreApi>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Key of a core in [`ApiConfig::multicore`].
pub fn api_core_key(soc: &str, core: &str) -> String {
    format!("{soc}_{core}")
}

/// Settings that only matter to a particular deployment of the project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSpecific {
    pub paths: Paths,
    pub api_config: ApiConfig,
    pub smp_config: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Root aggregate: platform description plus the signal catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub soc_type: String,
    #[serde(default)]
    pub build_type: String,
    #[serde(default)]
    pub soc_list: Vec<String>,
    #[serde(default)]
    pub build_list: Vec<String>,
    #[serde(default)]
    pub core_info: IndexMap<String, IndexMap<String, Core>>,
    #[serde(default)]
    pub signals: IndexMap<String, Signal>,
    #[serde(default)]
    pub selected_board: String,
    #[serde(default)]
    pub board_options: Vec<String>,
    #[serde(default)]
    pub project_specific: ProjectSpecific,
    #[serde(default)]
    pub script_paths: IndexMap<String, String>,
    #[serde(default = "default_export_sheet")]
    pub export_sheet_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_export_sheet() -> String {
    DEFAULT_EXPORT_SHEET.to_string()
}

impl Default for Project {
    fn default() -> Self {
        Self::new_template(dates::today())
    }
}

impl Project {
    /// The "New" template: one SoC, one build type, nothing else.
    pub fn new_template(today: NaiveDate) -> Self {
        Self {
            metadata: Metadata::new(today),
            soc_type: DEFAULT_SOC.to_string(),
            build_type: DEFAULT_BUILD.to_string(),
            soc_list: vec![DEFAULT_SOC.to_string()],
            build_list: vec![DEFAULT_BUILD.to_string()],
            core_info: IndexMap::new(),
            signals: IndexMap::new(),
            selected_board: String::new(),
            board_options: Vec::new(),
            project_specific: ProjectSpecific::default(),
            script_paths: IndexMap::new(),
            export_sheet_name: default_export_sheet(),
            extra: Map::new(),
        }
    }

    /// Repair list membership: drop repeated list entries, then append the
    /// selected SoC/build type and every `core_info` SoC that is missing.
    /// Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = (self.soc_list.clone(), self.build_list.clone());
        dedup_in_place(&mut self.soc_list);
        dedup_in_place(&mut self.build_list);
        if !self.soc_type.is_empty() && !self.soc_list.contains(&self.soc_type) {
            self.soc_list.push(self.soc_type.clone());
        }
        if !self.build_type.is_empty() && !self.build_list.contains(&self.build_type) {
            self.build_list.push(self.build_type.clone());
        }
        for soc in self.core_info.keys() {
            if !self.soc_list.contains(soc) {
                self.soc_list.push(soc.clone());
            }
        }
        before != (self.soc_list.clone(), self.build_list.clone())
    }

    /// Every `SoC.Core` in `core_info` order.
    pub fn available_cores(&self) -> Vec<CoreId> {
        self.core_info
            .iter()
            .flat_map(|(soc, cores)| cores.keys().map(move |core| CoreId::new(soc, core)))
            .collect()
    }

    pub fn core(&self, id: &CoreId) -> Option<&Core> {
        self.core_info.get(&id.soc)?.get(&id.core)
    }

    pub fn has_core(&self, id: &CoreId) -> bool {
        self.core(id).is_some()
    }

    /// Names of signals whose `Source` is one of the given SoC's cores.
    pub fn signals_sourced_from_soc<'a>(&'a self, soc: &'a str) -> impl Iterator<Item = &'a str> {
        self.signals.iter().filter_map(move |(name, signal)| {
            signal
                .source_id()
                .filter(|id| id.soc == soc)
                .map(|_| name.as_str())
        })
    }

    /// Names of signals whose `Source` is exactly `id`.
    pub fn signals_sourced_from<'a>(&'a self, id: &'a CoreId) -> impl Iterator<Item = &'a str> {
        self.signals.iter().filter_map(move |(name, signal)| {
            signal
                .source_id()
                .filter(|source| source == id)
                .map(|_| name.as_str())
        })
    }

    /// First free name among `base`, `base_copy`, `base_copy1`, `base_copy2`, ...
    pub fn unique_copy_name(&self, base: &str) -> String {
        if !self.signals.contains_key(base) {
            return base.to_string();
        }
        let first = format!("{base}_copy");
        if !self.signals.contains_key(&first) {
            return first;
        }
        (1..)
            .map(|n| format!("{base}_copy{n}"))
            .find(|candidate| !self.signals.contains_key(candidate))
            .unwrap_or(first)
    }

    /// Project-level invariants that a single signal cannot check alone.
    pub fn structural_violations(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        if !self.soc_list.contains(&self.soc_type) {
            violations.push(InvariantViolation::SocTypeNotListed(self.soc_type.clone()));
        }
        if !self.build_list.contains(&self.build_type) {
            violations.push(InvariantViolation::BuildTypeNotListed(
                self.build_type.clone(),
            ));
        }
        for duplicate in duplicates(&self.soc_list) {
            violations.push(InvariantViolation::DuplicateSoc(duplicate));
        }
        for duplicate in duplicates(&self.build_list) {
            violations.push(InvariantViolation::DuplicateBuildType(duplicate));
        }
        for soc in self.core_info.keys() {
            if !self.soc_list.contains(soc) {
                violations.push(InvariantViolation::CoreSocNotListed(soc.clone()));
            }
        }
        violations
    }

    /// Routing, struct-shape and range checks for one signal.
    pub fn signal_violations(&self, name: &str, signal: &Signal) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        if !signal.source.trim().is_empty() {
            let known = signal
                .source_id()
                .is_some_and(|id| self.has_core(&id));
            if !known {
                violations.push(InvariantViolation::UnknownSource {
                    signal: name.to_string(),
                    source_id: signal.source.clone(),
                });
            } else if signal.is_destination(signal.source.trim()) {
                violations.push(InvariantViolation::SourceIsDestination {
                    signal: name.to_string(),
                    source_id: signal.source.clone(),
                });
            }
        }
        violations.extend(signal.struct_violations(name));
        violations.extend(signal.range_violations(name));
        violations
    }

    /// Every broken invariant, project-level first, then signals in order.
    pub fn invariant_violations(&self) -> Vec<InvariantViolation> {
        let mut violations = self.structural_violations();
        for (name, signal) in &self.signals {
            violations.extend(self.signal_violations(name, signal));
        }
        violations
    }
}

fn dedup_in_place(list: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    list.retain(|item| seen.insert(item.clone()));
}

fn duplicates(list: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut repeated = Vec::new();
    for item in list {
        if !seen.insert(item.as_str()) && !repeated.contains(item) {
            repeated.push(item.clone());
        }
    }
    repeated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn with_cores() -> Project {
        let mut project = Project::new_template(day());
        project.soc_list.push("SocA".to_string());
        let cores = project.core_info.entry("SocA".to_string()).or_default();
        cores.insert("Core0".to_string(), Core::described("master"));
        cores.insert("Core1".to_string(), Core::described("slave"));
        project
    }

    #[test]
    fn template_satisfies_invariants() {
        let project = Project::new_template(day());
        assert_eq!(project.soc_list, ["Windows"]);
        assert_eq!(project.build_list, ["SMP"]);
        assert!(project.invariant_violations().is_empty());
    }

    #[test]
    fn template_serializes_every_key() {
        let json = serde_json::to_value(Project::new_template(day())).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
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
                "export_sheet_name"
            ]
        );
        assert_eq!(json["metadata"]["date"], "2025-06-01");
        assert_eq!(json["export_sheet_name"], "Config");
        assert_eq!(json["project_specific"]["paths"]["output_path"], "");
    }

    #[test]
    fn normalize_only_adds() {
        let mut project = with_cores();
        project.soc_list = vec!["Windows".to_string(), "Windows".to_string()];
        project.build_type = "MultiImage".to_string();
        assert!(project.normalize());
        assert_eq!(project.soc_list, ["Windows", "SocA"]);
        assert_eq!(project.build_list, ["SMP", "MultiImage"]);
        assert!(!project.normalize());
    }

    #[test]
    fn lists_cores_in_order() {
        let ids: Vec<String> = with_cores()
            .available_cores()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, ["SocA.Core0", "SocA.Core1"]);
    }

    #[test]
    fn detects_routing_violations() {
        let mut project = with_cores();
        let mut signal = Signal::new("s");
        signal.source = "SocA.Core0".to_string();
        signal.set_destination("SocA.Core0", true);
        project.signals.insert("s".to_string(), signal);
        let mut ghost = Signal::new("g");
        ghost.source = "SocZ.Core9".to_string();
        project.signals.insert("g".to_string(), ghost);

        let violations = project.invariant_violations();
        assert!(violations.contains(&InvariantViolation::SourceIsDestination {
            signal: "s".to_string(),
            source_id: "SocA.Core0".to_string()
        }));
        assert!(violations.contains(&InvariantViolation::UnknownSource {
            signal: "g".to_string(),
            source_id: "SocZ.Core9".to_string()
        }));
    }

    #[test]
    fn copy_names_skip_taken_suffixes() {
        let mut project = Project::new_template(day());
        assert_eq!(project.unique_copy_name("x"), "x");
        project.signals.insert("x".to_string(), Signal::new("x"));
        assert_eq!(project.unique_copy_name("x"), "x_copy");
        project.signals.insert("x_copy".to_string(), Signal::new("x"));
        assert_eq!(project.unique_copy_name("x"), "x_copy1");
    }

    #[test]
    fn metadata_accepts_numeric_version() {
        let metadata: Metadata =
            serde_json::from_str(r#"{"version": 1.5, "date": "2025-06-01", "editor": "bo"}"#)
                .unwrap();
        assert_eq!(metadata.version, "1.5");
        assert_eq!(metadata.date, day());
    }
}
