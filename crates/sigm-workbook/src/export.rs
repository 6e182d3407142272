//! Project -> interchange workbook.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sigm_model::dates::format_date;
use sigm_model::{Core, Project, Signal, destination_key};

use crate::error::{Result, WorkbookError};
use crate::layout::{LOOKUP_SHEET, VERSION_SHEET, config, lookup, version};
use crate::xlsx::{CellValue, Workbook, Worksheet, write_xlsx};

/// Lay out the three sheets for a project.
///
/// The Config sheet is named after `project.export_sheet_name`.
pub fn build_workbook(project: &Project) -> Workbook {
    Workbook {
        sheets: vec![
            version_sheet(project),
            config_sheet(project),
            lookup_sheet(project),
        ],
    }
}

/// Encode a project as xlsx bytes.
pub fn export_bytes(project: &Project) -> Result<Vec<u8>> {
    write_xlsx(&build_workbook(project))
}

/// Write the interchange workbook for a project.
///
/// The file is written next to the target and renamed into place, so an
/// existing workbook is left intact if anything fails.
pub fn export_workbook(project: &Project, path: &Path) -> Result<()> {
    let bytes = export_bytes(project)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| WorkbookError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_path_for(path);
    if let Err(err) = write_synced(&temp_path, &bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(WorkbookError::Io {
            operation: "replace",
            path: path.to_path_buf(),
            source: e,
        });
    }

    tracing::info!(
        path = %path.display(),
        cores = project.available_cores().len(),
        signals = project.signals.len(),
        "Exported workbook"
    );
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_error = |operation, source| WorkbookError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(|e| io_error("create", e))?;
    file.write_all(bytes).map_err(|e| io_error("write", e))?;
    file.sync_all().map_err(|e| io_error("sync", e))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "signal_data.xlsx".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

fn header_row(sheet: &mut Worksheet, col: usize, headers: &[&str]) {
    sheet.set_row(0, col, headers.iter().map(|h| CellValue::text(*h)));
}

fn version_sheet(project: &Project) -> Worksheet {
    let metadata = &project.metadata;
    let mut sheet = Worksheet::new(VERSION_SHEET);
    header_row(&mut sheet, 0, &version::HEADERS);
    sheet.set_row(
        1,
        0,
        [
            CellValue::text(metadata.version.as_str()),
            CellValue::text(format_date(metadata.date)),
            CellValue::text(metadata.editor.as_str()),
            CellValue::text(metadata.description.as_str()),
        ],
    );
    sheet
}

fn config_sheet(project: &Project) -> Worksheet {
    let mut sheet = Worksheet::new(project.export_sheet_name.as_str());
    header_row(&mut sheet, 0, &[config::SOC_NAME, config::TYPE_OF_BIN]);
    sheet.set_row(
        1,
        0,
        [
            CellValue::text(project.soc_type.as_str()),
            CellValue::text(project.build_type.as_str()),
        ],
    );

    header_row(&mut sheet, config::CORE_TABLE_COLUMN, &config::CORE_HEADERS);
    let rows = project
        .core_info
        .iter()
        .flat_map(|(soc, cores)| cores.iter().map(move |(name, core)| (soc, name, core)));
    for (offset, (soc, name, core)) in rows.enumerate() {
        sheet.set_row(offset + 1, config::CORE_TABLE_COLUMN, core_row(soc, name, core));
    }
    sheet
}

fn core_row(soc: &str, name: &str, core: &Core) -> [CellValue; 9] {
    [
        CellValue::text(soc),
        CellValue::text(name),
        CellValue::text(core.role()),
        CellValue::yes_no(core.is_qnx),
        CellValue::yes_no(core.is_autosar),
        CellValue::yes_no(core.is_sim),
        CellValue::text(core.os.as_str()),
        CellValue::text(core.soc_family.as_str()),
        CellValue::text(core.description.as_str()),
    ]
}

fn lookup_sheet(project: &Project) -> Worksheet {
    let cores: Vec<String> = project
        .available_cores()
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut sheet = Worksheet::new(LOOKUP_SHEET);
    header_row(&mut sheet, 0, &lookup::FIXED_HEADERS);
    sheet.set_row(
        0,
        lookup::FIXED_HEADERS.len(),
        cores.iter().map(|core| CellValue::text(core.as_str())),
    );

    for (offset, (name, signal)) in project.signals.iter().enumerate() {
        let row = offset + 1;
        sheet.set_row(row, 0, signal_row(name, signal));
        sheet.set_row(
            row,
            lookup::FIXED_HEADERS.len(),
            cores.iter().map(|core| {
                let enabled = signal
                    .destinations
                    .get(&destination_key(core))
                    .copied()
                    .unwrap_or(false);
                CellValue::yes_no(enabled)
            }),
        );
    }
    sheet
}

fn signal_row(name: &str, signal: &Signal) -> [CellValue; 17] {
    [
        CellValue::text(name),
        CellValue::text(signal.variable_port_name.as_str()),
        CellValue::text(signal.memory_region.as_str()),
        CellValue::Number(f64::from(signal.buffer_count_ipc)),
        CellValue::text(signal.signal_type.as_str()),
        CellValue::text(signal.init_value.as_str()),
        CellValue::yes_no(signal.notifiers),
        CellValue::text(signal.source.as_str()),
        CellValue::text(signal.impl_approach.as_str()),
        CellValue::yes_no(signal.get_obj_ref),
        CellValue::Number(f64::from(signal.sm_buff_count)),
        CellValue::Number(f64::from(signal.timeout)),
        CellValue::Number(f64::from(signal.periodicity)),
        CellValue::text(signal.asil.as_str()),
        CellValue::text(signal.checksum.as_str()),
        CellValue::text(signal.data_type.to_string()),
        CellValue::text(signal.description.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sigm_model::Checksum;

    fn project() -> Project {
        let mut project = Project::new_template(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        project.soc_type = "SocA".to_string();
        project.soc_list = vec!["SocA".to_string()];
        let mut master = Core::described("main");
        master.is_master = true;
        master.is_qnx = true;
        project
            .core_info
            .entry("SocA".to_string())
            .or_default()
            .insert("Core0".to_string(), master);
        project
            .core_info
            .entry("SocA".to_string())
            .or_default()
            .insert("Core1".to_string(), Core::described("aux"));

        let mut signal = Signal::new("speed");
        signal.source = "SocA.Core0".to_string();
        signal.checksum = Checksum::None;
        signal.set_destination("SocA.Core1", true);
        project.signals.insert("speed".to_string(), signal);
        project
    }

    #[test]
    fn config_sheet_places_core_table_at_column_e() {
        let sheet = config_sheet(&project());
        assert_eq!(sheet.name, "Config");
        assert_eq!(sheet.cell(0, 0), &CellValue::text("SOC Name"));
        assert_eq!(sheet.cell(1, 0), &CellValue::text("SocA"));
        assert_eq!(sheet.cell(1, 1), &CellValue::text("SMP"));
        assert_eq!(sheet.cell(0, 4), &CellValue::text("SOC"));
        assert_eq!(sheet.cell(1, 6), &CellValue::text("Master"));
        assert_eq!(sheet.cell(1, 7), &CellValue::text("Yes"));
        assert_eq!(sheet.cell(2, 5), &CellValue::text("Core1"));
        assert_eq!(sheet.cell(2, 6), &CellValue::text("Slave"));
    }

    #[test]
    fn lookup_sheet_appends_core_columns() {
        let sheet = lookup_sheet(&project());
        assert_eq!(sheet.cell(0, 0), &CellValue::text("Data_Type"));
        assert_eq!(sheet.cell(0, 16), &CellValue::text("description"));
        assert_eq!(sheet.cell(0, 17), &CellValue::text("SocA.Core0"));
        assert_eq!(sheet.cell(0, 18), &CellValue::text("SocA.Core1"));

        assert_eq!(sheet.cell(1, 0), &CellValue::text("speed"));
        assert_eq!(sheet.cell(1, 3), &CellValue::Number(1.0));
        assert_eq!(sheet.cell(1, 14), &CellValue::text("None"));
        assert_eq!(sheet.cell(1, 17), &CellValue::text("No"));
        assert_eq!(sheet.cell(1, 18), &CellValue::text("Yes"));
    }

    #[test]
    fn config_sheet_follows_export_sheet_name() {
        let mut project = project();
        project.export_sheet_name = "Platform".to_string();
        let workbook = build_workbook(&project);
        assert!(workbook.sheet("Platform").is_some());
        assert!(workbook.sheet("Config").is_none());
    }
}
