//! Table rendering for command results.

use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sigm_model::Project;
use sigm_validate::{Severity, ValidationIssue};
use sigm_workbook::DiagnosticKind;

use crate::commands::ImportSummary;

pub fn print_project(project: &Project) {
    let meta = &project.metadata;
    println!(
        "Version {} ({}) by {}",
        meta.version,
        meta.date,
        if meta.editor.is_empty() { "-" } else { &meta.editor }
    );
    if !meta.description.is_empty() {
        println!("{}", meta.description);
    }
    println!(
        "SoC: {}  Build: {}  Board: {}",
        project.soc_type,
        project.build_type,
        if project.selected_board.is_empty() {
            "-"
        } else {
            &project.selected_board
        }
    );
    println!("{}", core_table(project));
    println!("{}", signal_table(project));
}

/// One row per core, grouped by SoC in project order.
pub fn core_table(project: &Project) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("SoC"),
        header_cell("Core"),
        header_cell("Role"),
        header_cell("OS"),
        header_cell("Family"),
        header_cell("Signals"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 5, CellAlignment::Right);
    for id in project.available_cores() {
        let Some(core) = project.core(&id) else {
            continue;
        };
        let sourced = project.signals_sourced_from(&id).count();
        let soc_cell = if id.soc == project.soc_type {
            Cell::new(&id.soc).fg(Color::Cyan)
        } else {
            Cell::new(&id.soc)
        };
        table.add_row(vec![
            soc_cell,
            Cell::new(&id.core),
            Cell::new(core.role()),
            Cell::new(&core.os),
            Cell::new(&core.soc_family),
            count_cell(sourced, Color::Green),
            Cell::new(&core.description),
        ]);
    }
    table
}

/// One row per signal in catalog order.
pub fn signal_table(project: &Project) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Signal"),
        header_cell("Type"),
        header_cell("Source"),
        header_cell("Destinations"),
        header_cell("Timeout"),
        header_cell("Period"),
        header_cell("ASIL"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for (name, signal) in &project.signals {
        let destinations: Vec<String> = project
            .available_cores()
            .iter()
            .map(ToString::to_string)
            .filter(|id| signal.is_destination(id))
            .collect();
        table.add_row(vec![
            Cell::new(name).add_attribute(Attribute::Bold),
            Cell::new(signal.data_type.to_string()),
            if signal.source.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(&signal.source)
            },
            if destinations.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(destinations.join(", "))
            },
            Cell::new(signal.timeout),
            Cell::new(signal.periodicity),
            Cell::new(signal.asil.as_str()),
        ]);
    }
    table
}

pub fn print_issues(issues: &[ValidationIssue]) {
    if issues.is_empty() {
        println!("No issues found.");
        return;
    }
    println!("{}", issue_table(issues));
}

pub fn issue_table(issues: &[ValidationIssue]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Field"),
        header_cell("Message"),
    ]);
    apply_summary_table_style(&mut table);
    for issue in issues {
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(issue.code.as_str()),
            Cell::new(&issue.field),
            Cell::new(&issue.message),
        ]);
    }
    table
}

pub fn print_import(summary: &ImportSummary) {
    println!(
        "Imported {} signal(s) into {}",
        summary.signals,
        summary.saved_to.display()
    );
    if summary.diagnostics.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Row"),
        header_cell("Action"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for diagnostic in &summary.diagnostics {
        let action = match diagnostic.kind {
            DiagnosticKind::SheetSkipped => Cell::new("skipped").fg(Color::Red),
            DiagnosticKind::ValueAdjusted => Cell::new("adjusted").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&diagnostic.sheet),
            diagnostic.row.map_or_else(|| dim_cell("-"), Cell::new),
            action,
            Cell::new(&diagnostic.message),
        ]);
    }
    println!("{table}");
}

pub fn print_artifacts(artifacts: &[PathBuf]) {
    for path in artifacts {
        println!("Wrote {}", path.display());
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
