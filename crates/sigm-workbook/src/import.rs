//! Interchange workbook -> project.
//!
//! Each sheet is read independently. A sheet that cannot be parsed is
//! skipped with a [`SheetDiagnostic`] and the others are still used; cell
//! values that are out of range or unreadable are replaced by their default
//! (or clamped) and reported the same way.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use indexmap::IndexMap;
use sigm_model::dates::{from_serial, parse_date};
use sigm_model::project::{DEFAULT_BUILD, DEFAULT_SOC};
use sigm_model::{
    BUFFER_COUNT_RANGE, Checksum, Core, CoreId, DataType, FieldRange, PERIODICITY_RANGE, Project,
    SM_BUFF_COUNT_RANGE, Signal, TIMEOUT_RANGE, destination_key,
};

use crate::error::{Result, SheetDiagnostic, WorkbookError};
use crate::layout::{LOOKUP_SHEET, VERSION_SHEET, config, lookup, version};
use crate::xlsx::{CellValue, Worksheet, XlsxReader};

/// Metadata description used when the workbook carries none.
pub const IMPORTED_DESCRIPTION: &str = "Imported from Excel";

/// Signal description used when a row carries none.
pub const IMPORTED_SIGNAL_DESCRIPTION: &str = "Imported signal";

/// A successfully imported project plus everything that was adjusted or
/// skipped on the way.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub project: Project,
    pub diagnostics: Vec<SheetDiagnostic>,
}

/// Import a workbook file. `today` fills in a missing date.
pub fn import_workbook(path: &Path, today: NaiveDate) -> Result<ImportOutcome> {
    let bytes = fs::read(path).map_err(|e| WorkbookError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    let outcome = import_bytes(bytes, today)?;
    tracing::info!(
        path = %path.display(),
        signals = outcome.project.signals.len(),
        diagnostics = outcome.diagnostics.len(),
        "Imported workbook"
    );
    Ok(outcome)
}

/// Import a workbook from memory.
pub fn import_bytes(bytes: Vec<u8>, today: NaiveDate) -> Result<ImportOutcome> {
    let mut reader = XlsxReader::from_bytes(bytes)?;
    let mut importer = Importer::new(today);

    match load_sheet(&mut reader, VERSION_SHEET, &mut importer.diagnostics) {
        Some(sheet) => importer.read_version(&sheet),
        None => importer.project.metadata.description = IMPORTED_DESCRIPTION.to_string(),
    }

    if let Some(name) = config_sheet_name(&reader) {
        if let Some(sheet) = load_sheet(&mut reader, &name, &mut importer.diagnostics) {
            importer.read_config(&sheet);
        }
    }

    if let Some(sheet) = load_sheet(&mut reader, LOOKUP_SHEET, &mut importer.diagnostics) {
        importer.read_lookup(&sheet);
    }

    importer.finish()
}

/// Parse a sheet, turning a parse failure into a diagnostic.
fn load_sheet(
    reader: &mut XlsxReader,
    name: &str,
    diagnostics: &mut Vec<SheetDiagnostic>,
) -> Option<Worksheet> {
    if !reader.has_sheet(name) {
        return None;
    }
    match reader.read_sheet(name) {
        Ok(sheet) => Some(sheet),
        Err(err) => {
            tracing::warn!(sheet = name, error = %err, "Skipping unreadable sheet");
            diagnostics.push(SheetDiagnostic::skipped(name, err.to_string()));
            None
        }
    }
}

/// `Config` when present, otherwise the first sheet that is neither
/// `Version` nor `LookUpTable` (projects may rename the Config sheet).
fn config_sheet_name(reader: &XlsxReader) -> Option<String> {
    if reader.has_sheet(sigm_model::DEFAULT_EXPORT_SHEET) {
        return Some(sigm_model::DEFAULT_EXPORT_SHEET.to_string());
    }
    reader
        .sheet_names()
        .into_iter()
        .find(|name| name != VERSION_SHEET && name != LOOKUP_SHEET)
}

struct Importer {
    project: Project,
    diagnostics: Vec<SheetDiagnostic>,
}

impl Importer {
    fn new(today: NaiveDate) -> Self {
        let mut project = Project::new_template(today);
        project.soc_type.clear();
        project.build_type.clear();
        project.soc_list.clear();
        project.build_list.clear();
        Self {
            project,
            diagnostics: Vec::new(),
        }
    }

    fn adjusted(&mut self, sheet: &str, row: usize, message: String) {
        tracing::warn!(sheet, row = row + 1, "{message}");
        self.diagnostics
            .push(SheetDiagnostic::adjusted(sheet, row + 1, message));
    }

    fn read_version(&mut self, sheet: &Worksheet) {
        let column = |name: &str| sheet.find_header(name, 0);
        let text = |col: Option<usize>| col.and_then(|c| sheet.cell(1, c).as_text());

        if let Some(col) = column(version::DATE) {
            let cell = sheet.cell(1, col);
            let parsed = match cell {
                CellValue::Number(serial) => from_serial(*serial),
                other => other.as_text().as_deref().and_then(parse_date),
            };
            match parsed {
                Some(date) => self.project.metadata.date = date,
                None if !cell.is_blank() => {
                    let raw = cell.as_text().unwrap_or_default();
                    self.adjusted(&sheet.name, 1, format!("unreadable date '{raw}', using today"));
                }
                None => {}
            }
        }

        let metadata = &mut self.project.metadata;
        if let Some(value) = text(column(version::VERSION)) {
            metadata.version = value;
        }
        let editor = text(column(version::EDITOR)).or_else(|| text(column(version::EDITOR_ALIAS)));
        if let Some(editor) = editor {
            metadata.editor = editor;
        }
        let description = version::DESCRIPTION_ALIASES
            .iter()
            .find_map(|&alias| text(column(alias)));
        metadata.description = description.unwrap_or_else(|| IMPORTED_DESCRIPTION.to_string());
    }

    fn read_config(&mut self, sheet: &Worksheet) {
        self.project.export_sheet_name = sheet.name.clone();

        if let Some(soc) = sheet
            .find_header(config::SOC_NAME, 0)
            .and_then(|col| sheet.cell(1, col).as_text())
        {
            push_unique(&mut self.project.soc_list, &soc);
            self.project.soc_type = soc;
        }
        if let Some(build) = sheet
            .find_header(config::TYPE_OF_BIN, 0)
            .and_then(|col| sheet.cell(1, col).as_text())
        {
            push_unique(&mut self.project.build_list, &build);
            self.project.build_type = build;
        }

        let (Some(soc_col), Some(core_col)) = (
            sheet.find_header(config::SOC, 0),
            sheet.find_header(config::CORE, 0),
        ) else {
            return;
        };
        let column = |name: &str| sheet.find_header(name, 0);
        let role_col = column(config::ROLE);
        let qnx_col = column(config::IS_QNX);
        let autosar_col = column(config::IS_AUTOSAR);
        let sim_col = column(config::IS_SIM);
        let os_col = column(config::OS);
        let family_col = column(config::SOC_FAMILY);
        let description_col = column(config::DESCRIPTION);

        for row in 1..sheet.row_count() {
            let (Some(soc), Some(core_name)) = (
                sheet.cell(row, soc_col).as_text(),
                sheet.cell(row, core_col).as_text(),
            ) else {
                continue;
            };
            let text = |col: Option<usize>| col.and_then(|c| sheet.cell(row, c).as_text());
            let yes = |col: Option<usize>| text(col).is_some_and(|v| v.eq_ignore_ascii_case("yes"));

            let mut core = Core::described(text(description_col).unwrap_or_default());
            core.is_master = text(role_col).is_some_and(|v| v.eq_ignore_ascii_case("master"));
            core.is_qnx = yes(qnx_col);
            core.is_autosar = yes(autosar_col);
            core.is_sim = yes(sim_col);
            if let Some(os) = text(os_col) {
                core.os = os;
            }
            if let Some(family) = text(family_col) {
                core.soc_family = family;
            }

            push_unique(&mut self.project.soc_list, &soc);
            self.project
                .core_info
                .entry(soc)
                .or_default()
                .insert(core_name, core);
        }
    }

    fn read_lookup(&mut self, sheet: &Worksheet) {
        let Some(name_col) = sheet.find_header(lookup::NAME, 0) else {
            self.diagnostics.push(SheetDiagnostic::skipped(
                &sheet.name,
                format!("missing '{}' column", lookup::NAME),
            ));
            return;
        };

        let header = sheet.rows.first().cloned().unwrap_or_default();
        let columns: IndexMap<String, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(col, cell)| cell.as_text().map(|text| (text, col)))
            .fold(IndexMap::new(), |mut map, (text, col)| {
                map.entry(text).or_insert(col);
                map
            });
        let destination_cols: Vec<(String, usize)> = columns
            .iter()
            .filter(|(header, _)| !lookup::is_fixed(header))
            .map(|(header, col)| (destination_key(header), *col))
            .collect();

        for row in 1..sheet.row_count() {
            let Some(name) = sheet.cell(row, name_col).as_text() else {
                continue;
            };
            if self.project.signals.contains_key(&name) {
                self.adjusted(
                    &sheet.name,
                    row,
                    format!("duplicate signal '{name}', row ignored"),
                );
                continue;
            }
            let cells = RowCells {
                sheet,
                row,
                columns: &columns,
            };
            let signal = self.read_signal(&cells, &name, &destination_cols);
            self.project.signals.insert(name, signal);
        }
    }

    fn read_signal(
        &mut self,
        cells: &RowCells<'_>,
        name: &str,
        destination_cols: &[(String, usize)],
    ) -> Signal {
        let sheet = cells.sheet.name.as_str();
        let row = cells.row;
        let mut signal = Signal::new(name);
        signal.checksum = Checksum::None;
        signal.description = IMPORTED_SIGNAL_DESCRIPTION.to_string();

        if let Some(port) = cells.text(lookup::PORT_NAME) {
            signal.variable_port_name = port;
        }
        if let Some(description) = cells.text(lookup::DESCRIPTION) {
            signal.description = description;
        }
        if let Some(source) = cells.text(lookup::SOURCE) {
            signal.source = source;
        }
        signal.notifiers = cells.yes(lookup::NOTIFIERS);
        signal.get_obj_ref = cells.yes(lookup::GET_OBJ_REF);

        self.parse_into(cells, lookup::MEMORY_REGION, &mut signal.memory_region);
        self.parse_into(cells, lookup::TYPE, &mut signal.signal_type);
        self.parse_into(cells, lookup::INIT_VALUE, &mut signal.init_value);
        self.parse_into(cells, lookup::IMPL_APPROACH, &mut signal.impl_approach);
        self.parse_into(cells, lookup::ASIL, &mut signal.asil);
        self.parse_into(cells, lookup::CHECKSUM, &mut signal.checksum);
        self.parse_into::<DataType>(cells, lookup::DATA_TYPE, &mut signal.data_type);
        if signal.data_type.is_struct() {
            self.adjusted(
                sheet,
                row,
                format!("signal '{name}' is a STRUCT but the workbook carries no struct fields"),
            );
        }

        signal.buffer_count_ipc = self.ranged(cells, BUFFER_COUNT_RANGE, signal.buffer_count_ipc);
        signal.sm_buff_count = self.ranged(cells, SM_BUFF_COUNT_RANGE, signal.sm_buff_count);
        signal.timeout = self.ranged(cells, TIMEOUT_RANGE, signal.timeout);
        signal.periodicity = self.ranged(cells, PERIODICITY_RANGE, signal.periodicity);

        for (key, col) in destination_cols {
            let enabled = cells
                .sheet
                .cell(row, *col)
                .as_text()
                .is_some_and(|v| v.eq_ignore_ascii_case("yes"));
            signal.destinations.insert(key.clone(), enabled);
        }

        signal
    }

    /// Parse a cell into `target`; blank keeps the default, garbage keeps the
    /// default and is reported.
    fn parse_into<T: FromStr>(&mut self, cells: &RowCells<'_>, column: &str, target: &mut T)
    where
        T::Err: std::fmt::Display,
    {
        let Some(raw) = cells.text(column) else {
            return;
        };
        match raw.parse::<T>() {
            Ok(value) => *target = value,
            Err(err) => self.adjusted(
                &cells.sheet.name,
                cells.row,
                format!("{err}; keeping the default"),
            ),
        }
    }

    /// Read a numeric cell and clamp it into `range`.
    fn ranged(&mut self, cells: &RowCells<'_>, range: FieldRange, default: u32) -> u32 {
        let Some(col) = cells.columns.get(range.field).copied() else {
            return default;
        };
        let cell = cells.sheet.cell(cells.row, col);
        if cell.is_blank() {
            return default;
        }
        let Some(number) = cell.as_number() else {
            let raw = cell.as_text().unwrap_or_default();
            self.adjusted(
                &cells.sheet.name,
                cells.row,
                format!("{} '{raw}' is not a number; using {default}", range.field),
            );
            return default;
        };
        let clamped = range.clamp(number);
        if f64::from(clamped) != number {
            self.adjusted(
                &cells.sheet.name,
                cells.row,
                format!("{} {number} adjusted to {clamped}", range.field),
            );
        }
        clamped
    }

    /// Enforce the project invariants the workbook cannot express, then
    /// decide whether anything usable was found.
    fn finish(mut self) -> Result<ImportOutcome> {
        if self.project.soc_type.is_empty() && self.project.signals.is_empty() {
            return Err(WorkbookError::NoValidData {
                diagnostics: self.diagnostics,
            });
        }

        if self.project.soc_type.is_empty() {
            self.project.soc_type = self
                .project
                .soc_list
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_SOC.to_string());
        }
        if self.project.build_type.is_empty() {
            self.project.build_type = DEFAULT_BUILD.to_string();
        }
        self.project.normalize();

        let known: Vec<CoreId> = self.project.available_cores();
        let mut repairs = Vec::new();
        for (name, signal) in &mut self.project.signals {
            if signal.source.is_empty() {
                continue;
            }
            match signal.source_id().filter(|id| known.contains(id)) {
                Some(id) => {
                    let key = id.destination_key();
                    if signal.destinations.get(&key).copied().unwrap_or(false) {
                        signal.destinations.insert(key, false);
                        repairs.push(format!(
                            "signal '{name}' listed its source {id} as a destination; cleared"
                        ));
                    }
                }
                None => {
                    repairs.push(format!(
                        "signal '{name}' has unknown source '{}'; cleared",
                        signal.source
                    ));
                    signal.source.clear();
                }
            }
        }
        for message in repairs {
            tracing::warn!(sheet = LOOKUP_SHEET, "{message}");
            self.diagnostics.push(SheetDiagnostic {
                sheet: LOOKUP_SHEET.to_string(),
                row: None,
                kind: crate::error::DiagnosticKind::ValueAdjusted,
                message,
            });
        }

        Ok(ImportOutcome {
            project: self.project,
            diagnostics: self.diagnostics,
        })
    }
}

/// One LookUpTable row, addressed by header.
struct RowCells<'a> {
    sheet: &'a Worksheet,
    row: usize,
    columns: &'a IndexMap<String, usize>,
}

impl RowCells<'_> {
    fn text(&self, column: &str) -> Option<String> {
        let col = *self.columns.get(column)?;
        self.sheet.cell(self.row, col).as_text()
    }

    fn yes(&self, column: &str) -> bool {
        self.text(column)
            .is_some_and(|value| value.eq_ignore_ascii_case("yes"))
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}
