//! Minimal OOXML spreadsheet container.
//!
//! Only what the interchange format needs: named sheets holding a grid of
//! text, number and boolean cells. Reading understands shared strings,
//! inline strings and formula results written by Excel, LibreOffice and
//! xlsxwriter; writing produces inline-string cells with a bold header style.

mod reader;
mod writer;

pub use reader::XlsxReader;
pub use writer::write_xlsx;

/// One cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Yes/No rendering used by every boolean column.
    pub fn yes_no(flag: bool) -> Self {
        CellValue::text(if flag { "Yes" } else { "No" })
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }

    /// Trimmed text of a non-blank cell. Whole numbers render without a
    /// fraction (`3`, not `3.0`).
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Number(number) => Some(format_number(*number)),
            CellValue::Bool(flag) => Some(if *flag { "TRUE" } else { "FALSE" }.to_string()),
        }
    }

    /// Numeric value of a number cell or of numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) => Some(*number),
            CellValue::Text(text) => text.trim().parse().ok(),
            CellValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            CellValue::Empty => None,
        }
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// A named grid of cells. Rows and columns are 0-based.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Worksheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(EMPTY)
    }

    /// Write a cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, CellValue::default);
        }
        cells[col] = value;
    }

    /// Write a row of values starting at `col`.
    pub fn set_row(&mut self, row: usize, col: usize, values: impl IntoIterator<Item = CellValue>) {
        for (offset, value) in values.into_iter().enumerate() {
            self.set(row, col + offset, value);
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first column at or after `from` whose header (row 0)
    /// equals `name`. Matching is exact after trimming.
    pub fn find_header(&self, name: &str, from: usize) -> Option<usize> {
        let header = self.rows.first()?;
        header
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, cell)| cell.as_text().as_deref() == Some(name))
            .map(|(col, _)| col)
    }
}

/// An ordered set of worksheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

/// `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`.
pub(crate) fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Rows in a worksheet (`1..=1048576`).
pub(crate) const MAX_ROWS: usize = 1_048_576;

/// Columns in a worksheet (`A..=XFD`).
pub(crate) const MAX_COLS: usize = 16_384;

/// Parse an `A1`-style reference into 0-based `(row, col)`. References
/// outside the worksheet grid are rejected.
pub(crate) fn parse_cell_ref(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for letter in letters.chars() {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let digit = letter.to_ascii_uppercase() as usize - 'A' as usize + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
        if col > MAX_COLS {
            return None;
        }
    }
    let row: usize = digits.parse().ok()?;
    if row == 0 || row > MAX_ROWS {
        return None;
    }
    Some((row - 1, col - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(4), "E");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn parses_cell_refs() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("E2"), Some((1, 4)));
        assert_eq!(parse_cell_ref("AA10"), Some((9, 26)));
        assert_eq!(parse_cell_ref("10"), None);
        assert_eq!(parse_cell_ref("B0"), None);
    }

    #[test]
    fn cell_refs_stay_inside_the_grid() {
        assert_eq!(parse_cell_ref("XFD1048576"), Some((MAX_ROWS - 1, MAX_COLS - 1)));
        assert_eq!(parse_cell_ref("XFE1"), None);
        assert_eq!(parse_cell_ref("A1048577"), None);
        assert_eq!(parse_cell_ref("ZZZZZZZZZZZZZZZ1"), None);
        assert_eq!(parse_cell_ref("A99999999999999999999999"), None);
    }

    #[test]
    fn cell_text_forms() {
        assert_eq!(CellValue::Number(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(CellValue::Number(1.5).as_text().as_deref(), Some("1.5"));
        assert_eq!(CellValue::text("  x ").as_text().as_deref(), Some("x"));
        assert_eq!(CellValue::text("   ").as_text(), None);
    }

    #[test]
    fn set_grows_grid() {
        let mut sheet = Worksheet::new("S");
        sheet.set(2, 3, CellValue::text("x"));
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.cell(2, 3), &CellValue::text("x"));
        assert_eq!(sheet.cell(0, 0), &CellValue::Empty);
        assert_eq!(sheet.cell(9, 9), &CellValue::Empty);
    }
}
