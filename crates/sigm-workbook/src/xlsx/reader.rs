//! xlsx reading with `zip` + `roxmltree`.

use std::io::{Cursor, Read};

use roxmltree::{Document, Node};

use super::{CellValue, MAX_COLS, MAX_ROWS, Worksheet, parse_cell_ref};
use crate::error::{Result, WorkbookError};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Sheet name plus the archive path of its XML part.
#[derive(Debug, Clone)]
struct SheetRef {
    name: String,
    part: String,
}

/// An opened workbook. Sheets are parsed on demand so one damaged sheet does
/// not prevent reading the others.
pub struct XlsxReader {
    archive: zip::ZipArchive<Cursor<Vec<u8>>>,
    sheets: Vec<SheetRef>,
    shared_strings: Vec<String>,
}

impl XlsxReader {
    /// Open a workbook from its raw bytes and read the sheet directory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

        let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?
            .ok_or_else(|| WorkbookError::MissingPart {
                part: WORKBOOK_PART.to_string(),
            })?;
        let rels_xml = read_part(&mut archive, WORKBOOK_RELS_PART)?;
        let sheets = sheet_directory(&workbook_xml, rels_xml.as_deref())?;

        let shared_strings = match read_part(&mut archive, SHARED_STRINGS_PART)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        Ok(Self {
            archive,
            sheets,
            shared_strings,
        })
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|sheet| sheet.name == name)
    }

    /// Parse one sheet into a cell grid.
    pub fn read_sheet(&mut self, name: &str) -> Result<Worksheet> {
        let sheet = self
            .sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .cloned()
            .ok_or_else(|| WorkbookError::MissingPart {
                part: format!("sheet '{name}'"),
            })?;
        let xml = read_part(&mut self.archive, &sheet.part)?.ok_or_else(|| {
            WorkbookError::MissingPart {
                part: sheet.part.clone(),
            }
        })?;
        parse_sheet(&sheet, &xml, &self.shared_strings)
    }
}

fn read_part(
    archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>,
    part: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(part) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| WorkbookError::xml(part, e))?;
    Ok(Some(text))
}

fn parse_document<'a>(part: &str, xml: &'a str) -> Result<Document<'a>> {
    Document::parse(xml).map_err(|e| WorkbookError::xml(part, e))
}

fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

/// Resolve `<sheet name=.. r:id=..>` entries through the relationships part.
fn sheet_directory(workbook_xml: &str, rels_xml: Option<&str>) -> Result<Vec<SheetRef>> {
    let workbook = parse_document(WORKBOOK_PART, workbook_xml)?;

    let mut targets = Vec::new();
    if let Some(rels_xml) = rels_xml {
        let rels = parse_document(WORKBOOK_RELS_PART, rels_xml)?;
        for rel in child_elements(rels.root_element(), "Relationship") {
            if let (Some(id), Some(target)) = (rel.attribute("Id"), rel.attribute("Target")) {
                targets.push((id.to_string(), resolve_target(target)));
            }
        }
    }

    let sheets_node = child_elements(workbook.root_element(), "sheets").next();
    let mut sheets = Vec::new();
    for (index, sheet) in sheets_node
        .into_iter()
        .flat_map(|node| child_elements(node, "sheet"))
        .enumerate()
    {
        let Some(name) = sheet.attribute("name") else {
            continue;
        };
        let part = sheet
            .attribute((REL_NS, "id"))
            .and_then(|id| {
                targets
                    .iter()
                    .find(|(rel_id, _)| rel_id == id)
                    .map(|(_, target)| target.clone())
            })
            // Writers without a rels part follow the sheetN naming convention.
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));
        sheets.push(SheetRef {
            name: name.to_string(),
            part,
        });
    }
    Ok(sheets)
}

/// Relationship targets are relative to `xl/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let doc = parse_document(SHARED_STRINGS_PART, xml)?;
    Ok(child_elements(doc.root_element(), "si")
        .map(rich_text)
        .collect())
}

/// Concatenate the `<t>` runs of a string item, skipping phonetic hints.
fn rich_text(node: Node<'_, '_>) -> String {
    let mut text = String::new();
    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "t" => text.push_str(child.text().unwrap_or_default()),
            "r" => {
                for run_text in child_elements(child, "t") {
                    text.push_str(run_text.text().unwrap_or_default());
                }
            }
            _ => {}
        }
    }
    text
}

fn parse_sheet(sheet: &SheetRef, xml: &str, shared_strings: &[String]) -> Result<Worksheet> {
    let doc = parse_document(&sheet.part, xml)?;
    let mut worksheet = Worksheet::new(sheet.name.clone());

    let Some(sheet_data) = child_elements(doc.root_element(), "sheetData").next() else {
        return Ok(worksheet);
    };

    let invalid = |detail: String| WorkbookError::xml(sheet.part.as_str(), detail);
    let mut next_row = 0usize;
    for row in child_elements(sheet_data, "row") {
        let row_index = match row.attribute("r") {
            Some(r) => r
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|r| (1..=MAX_ROWS).contains(r))
                .map(|r| r - 1)
                .ok_or_else(|| invalid(format!("bad row number '{r}'")))?,
            None => next_row,
        };
        if row_index >= MAX_ROWS {
            return Err(invalid(format!("more than {MAX_ROWS} rows")));
        }
        next_row = row_index + 1;

        let mut next_col = 0usize;
        for cell in child_elements(row, "c") {
            let col = match cell.attribute("r") {
                Some(r) => parse_cell_ref(r)
                    .map(|(_, col)| col)
                    .ok_or_else(|| invalid(format!("bad cell reference '{r}'")))?,
                None => next_col,
            };
            if col >= MAX_COLS {
                return Err(invalid(format!("more than {MAX_COLS} columns")));
            }
            next_col = col + 1;

            let value = cell_value(cell, shared_strings).map_err(invalid)?;
            if value != CellValue::Empty {
                worksheet.set(row_index, col, value);
            }
        }
    }
    Ok(worksheet)
}

fn cell_value(
    cell: Node<'_, '_>,
    shared_strings: &[String],
) -> std::result::Result<CellValue, String> {
    let raw = child_elements(cell, "v")
        .next()
        .and_then(|v| v.text())
        .map(str::to_string);

    match cell.attribute("t").unwrap_or("n") {
        "s" => {
            let Some(raw) = raw else {
                return Ok(CellValue::Empty);
            };
            let index: usize = raw
                .trim()
                .parse()
                .map_err(|_| format!("bad shared string index '{raw}'"))?;
            shared_strings
                .get(index)
                .map(|text| CellValue::Text(text.clone()))
                .ok_or_else(|| format!("shared string {index} out of range"))
        }
        "inlineStr" => Ok(child_elements(cell, "is")
            .next()
            .map(|is| CellValue::Text(rich_text(is)))
            .unwrap_or_default()),
        "str" => Ok(raw.map(CellValue::Text).unwrap_or_default()),
        "b" => Ok(raw
            .map(|v| CellValue::Bool(v.trim() == "1"))
            .unwrap_or_default()),
        "e" => Ok(CellValue::Empty),
        _ => match raw {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map(CellValue::Number)
                .map_err(|_| format!("bad numeric cell '{raw}'")),
            None => Ok(CellValue::Empty),
        },
    }
}
