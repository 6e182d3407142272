//! xlsx writing with `zip` + `quick-xml`.

use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::write::SimpleFileOptions;

use super::{CellValue, Workbook, Worksheet, column_letters};
use crate::error::{Result, WorkbookError};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const OFFICE_DOC_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const WORKSHEET_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const STYLES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const WORKBOOK_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const WORKSHEET_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const STYLES_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const RELS_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Style index of header cells (bold on light green, bordered, centred).
const HEADER_STYLE: &str = "1";
/// Style index of data cells (grey, bordered, centred).
const DATA_STYLE: &str = "2";

/// Fixed style sheet: default font plus a bold one, the two fills the
/// interchange sheets use, and a thin border.
const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="4"><fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill>"#,
    r#"<fill><patternFill patternType="solid"><fgColor rgb="FFC6EFCE"/><bgColor indexed="64"/></patternFill></fill>"#,
    r#"<fill><patternFill patternType="solid"><fgColor rgb="FFC0C0C0"/><bgColor indexed="64"/></patternFill></fill></fills>"#,
    r#"<borders count="2"><border><left/><right/><top/><bottom/><diagonal/></border>"#,
    r#"<border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="center"/></xf>"#,
    r#"<xf numFmtId="0" fontId="0" fillId="3" borderId="1" xfId="0" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="center"/></xf></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

/// Serialize a workbook to xlsx bytes.
///
/// Row 0 of every sheet is styled as a header; other non-empty cells get the
/// data style. Column widths fit the longest value plus two characters.
pub fn write_xlsx(workbook: &Workbook) -> Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

    put_part(&mut zip, "[Content_Types].xml", &content_types(workbook.sheets.len())?)?;
    put_part(&mut zip, "_rels/.rels", &root_rels()?)?;
    put_part(&mut zip, "xl/workbook.xml", &workbook_xml(workbook)?)?;
    put_part(
        &mut zip,
        "xl/_rels/workbook.xml.rels",
        &workbook_rels(workbook.sheets.len())?,
    )?;
    put_part(&mut zip, "xl/styles.xml", STYLES_XML.as_bytes())?;
    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let part = format!("xl/worksheets/sheet{}.xml", index + 1);
        put_part(&mut zip, &part, &sheet_xml(sheet, &part)?)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn put_part(zip: &mut zip::ZipWriter<Cursor<Vec<u8>>>, name: &str, bytes: &[u8]) -> Result<()> {
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip.start_file(name, options)?;
    zip.write_all(bytes)
        .map_err(|e| WorkbookError::Io {
            operation: "write archive entry",
            path: name.into(),
            source: e,
        })
}

/// Thin wrapper that tags every XML error with the part being written.
struct PartWriter {
    part: String,
    xml: Writer<Vec<u8>>,
}

impl PartWriter {
    fn new(part: &str) -> Result<Self> {
        let mut writer = Self {
            part: part.to_string(),
            xml: Writer::new(Vec::new()),
        };
        writer.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(writer)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.xml
            .write_event(event)
            .map_err(|e| WorkbookError::xml(self.part.as_str(), e))
    }

    fn start(&mut self, element: BytesStart<'_>) -> Result<()> {
        self.event(Event::Start(element))
    }

    fn empty(&mut self, element: BytesStart<'_>) -> Result<()> {
        self.event(Event::Empty(element))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn finish(self) -> Vec<u8> {
        self.xml.into_inner()
    }
}

fn content_types(sheet_count: usize) -> Result<Vec<u8>> {
    let mut out = PartWriter::new("[Content_Types].xml")?;
    let mut types = BytesStart::new("Types");
    types.push_attribute(("xmlns", CONTENT_TYPES_NS));
    out.start(types)?;

    for (extension, content_type) in [("rels", RELS_TYPE), ("xml", "application/xml")] {
        let mut default = BytesStart::new("Default");
        default.push_attribute(("Extension", extension));
        default.push_attribute(("ContentType", content_type));
        out.empty(default)?;
    }

    let mut overrides = vec![
        ("/xl/workbook.xml".to_string(), WORKBOOK_TYPE),
        ("/xl/styles.xml".to_string(), STYLES_TYPE),
    ];
    overrides.extend(
        (1..=sheet_count).map(|n| (format!("/xl/worksheets/sheet{n}.xml"), WORKSHEET_TYPE)),
    );
    for (part_name, content_type) in &overrides {
        let mut item = BytesStart::new("Override");
        item.push_attribute(("PartName", part_name.as_str()));
        item.push_attribute(("ContentType", *content_type));
        out.empty(item)?;
    }

    out.end("Types")?;
    Ok(out.finish())
}

fn relationships(part: &str, entries: &[(String, &str, String)]) -> Result<Vec<u8>> {
    let mut out = PartWriter::new(part)?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", PKG_REL_NS));
    out.start(root)?;
    for (id, rel_type, target) in entries {
        let mut rel = BytesStart::new("Relationship");
        rel.push_attribute(("Id", id.as_str()));
        rel.push_attribute(("Type", *rel_type));
        rel.push_attribute(("Target", target.as_str()));
        out.empty(rel)?;
    }
    out.end("Relationships")?;
    Ok(out.finish())
}

fn root_rels() -> Result<Vec<u8>> {
    relationships(
        "_rels/.rels",
        &[(
            "rId1".to_string(),
            OFFICE_DOC_REL,
            "xl/workbook.xml".to_string(),
        )],
    )
}

/// Sheets are `rId1..rIdN`; styles follow as `rId{N+1}`.
fn workbook_rels(sheet_count: usize) -> Result<Vec<u8>> {
    let mut entries: Vec<(String, &str, String)> = (1..=sheet_count)
        .map(|n| {
            (
                format!("rId{n}"),
                WORKSHEET_REL,
                format!("worksheets/sheet{n}.xml"),
            )
        })
        .collect();
    entries.push((
        format!("rId{}", sheet_count + 1),
        STYLES_REL,
        "styles.xml".to_string(),
    ));
    relationships("xl/_rels/workbook.xml.rels", &entries)
}

fn workbook_xml(workbook: &Workbook) -> Result<Vec<u8>> {
    let mut out = PartWriter::new("xl/workbook.xml")?;
    let mut root = BytesStart::new("workbook");
    root.push_attribute(("xmlns", MAIN_NS));
    root.push_attribute(("xmlns:r", REL_NS));
    out.start(root)?;
    out.start(BytesStart::new("sheets"))?;
    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let sheet_id = (index + 1).to_string();
        let rel_id = format!("rId{sheet_id}");
        let mut element = BytesStart::new("sheet");
        element.push_attribute(("name", sheet.name.as_str()));
        element.push_attribute(("sheetId", sheet_id.as_str()));
        element.push_attribute(("r:id", rel_id.as_str()));
        out.empty(element)?;
    }
    out.end("sheets")?;
    out.end("workbook")?;
    Ok(out.finish())
}

fn column_widths(sheet: &Worksheet) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in &sheet.rows {
        if widths.len() < row.len() {
            widths.resize(row.len(), 0);
        }
        for (col, cell) in row.iter().enumerate() {
            let len = cell.as_text().map_or(0, |text| text.chars().count());
            widths[col] = widths[col].max(len);
        }
    }
    widths
}

fn sheet_xml(sheet: &Worksheet, part: &str) -> Result<Vec<u8>> {
    let mut out = PartWriter::new(part)?;
    let mut root = BytesStart::new("worksheet");
    root.push_attribute(("xmlns", MAIN_NS));
    root.push_attribute(("xmlns:r", REL_NS));
    out.start(root)?;

    let widths = column_widths(sheet);
    if widths.iter().any(|w| *w > 0) {
        out.start(BytesStart::new("cols"))?;
        for (index, width) in widths.iter().enumerate().filter(|(_, w)| **w > 0) {
            let col = (index + 1).to_string();
            let width = format!("{}", width + 2);
            let mut element = BytesStart::new("col");
            element.push_attribute(("min", col.as_str()));
            element.push_attribute(("max", col.as_str()));
            element.push_attribute(("width", width.as_str()));
            element.push_attribute(("customWidth", "1"));
            out.empty(element)?;
        }
        out.end("cols")?;
    }

    out.start(BytesStart::new("sheetData"))?;
    for (row_index, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|cell| *cell == CellValue::Empty) {
            continue;
        }
        let row_ref = (row_index + 1).to_string();
        let mut row_element = BytesStart::new("row");
        row_element.push_attribute(("r", row_ref.as_str()));
        out.start(row_element)?;
        let style = if row_index == 0 { HEADER_STYLE } else { DATA_STYLE };
        for (col, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(col), row_index + 1);
            write_cell(&mut out, &reference, style, cell)?;
        }
        out.end("row")?;
    }
    out.end("sheetData")?;
    out.end("worksheet")?;
    Ok(out.finish())
}

fn write_cell(out: &mut PartWriter, reference: &str, style: &str, cell: &CellValue) -> Result<()> {
    let mut element = BytesStart::new("c");
    element.push_attribute(("r", reference));
    match cell {
        CellValue::Empty => Ok(()),
        CellValue::Text(text) => {
            element.push_attribute(("s", style));
            element.push_attribute(("t", "inlineStr"));
            out.start(element)?;
            out.start(BytesStart::new("is"))?;
            let mut t = BytesStart::new("t");
            if text.trim() != text {
                t.push_attribute(("xml:space", "preserve"));
            }
            out.start(t)?;
            out.text(text)?;
            out.end("t")?;
            out.end("is")?;
            out.end("c")
        }
        CellValue::Number(number) => {
            element.push_attribute(("s", style));
            out.start(element)?;
            out.start(BytesStart::new("v"))?;
            out.text(&number.to_string())?;
            out.end("v")?;
            out.end("c")
        }
        CellValue::Bool(flag) => {
            element.push_attribute(("s", style));
            element.push_attribute(("t", "b"));
            out.start(element)?;
            out.start(BytesStart::new("v"))?;
            out.text(if *flag { "1" } else { "0" })?;
            out.end("v")?;
            out.end("c")
        }
    }
}
