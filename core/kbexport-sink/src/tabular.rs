//! Multi-sheet spreadsheet writer.

use crate::{ensure_parent, SinkError, SinkResult};
use kbexport_shape::flatten_record;
use rust_xlsxwriter::{ColNum, DocProperties, ExcelDateTime, RowNum, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Longest sheet name the format accepts.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// Longest text a single cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

/// A named row set destined for one worksheet.
#[derive(Debug, Clone)]
pub struct Sheet<'a> {
    name: String,
    columns: Vec<String>,
    rows: Cow<'a, [Value]>,
}

impl<'a> Sheet<'a> {
    /// Sheet over borrowed records.
    pub fn new(name: impl Into<String>, rows: &'a [Value]) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Cow::Borrowed(rows),
        }
    }

    /// Sheet over owned records.
    pub fn owned(name: impl Into<String>, rows: Vec<Value>) -> Sheet<'static> {
        Sheet {
            name: name.into(),
            columns: Vec::new(),
            rows: Cow::Owned(rows),
        }
    }

    /// Sheet over any serializable rows (summary projections, tallies).
    pub fn from_serialize<T: Serialize>(
        name: impl Into<String>,
        rows: &[T],
    ) -> SinkResult<Sheet<'static>> {
        let rows = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Sheet::owned(name, rows))
    }

    /// Seeds the header so it is written even when there are no rows.
    /// Columns discovered in the rows are appended after these.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }
}

/// Flattened view of a sheet: header plus sparse rows of `(column, leaf)`.
struct Grid {
    header: Vec<String>,
    rows: Vec<Vec<(usize, Value)>>,
}

impl Grid {
    fn build(sheet: &Sheet<'_>) -> Self {
        let mut header = sheet.columns.clone();
        let mut index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let rows = sheet
            .rows
            .iter()
            .map(|record| {
                flatten_record(record)
                    .into_iter()
                    .map(|(column, leaf)| {
                        let col = *index.entry(column).or_insert_with_key(|column| {
                            header.push(column.clone());
                            header.len() - 1
                        });
                        (col, leaf)
                    })
                    .collect()
            })
            .collect();

        Self { header, rows }
    }
}

/// Writes each sheet of `sheets` into one workbook at `path`.
///
/// Sheet names longer than [`MAX_SHEET_NAME_CHARS`] are truncated. Column
/// order is first occurrence across rows; absent columns are empty cells.
pub fn write_tabular(sheets: &[Sheet<'_>], path: &Path) -> SinkResult<()> {
    ensure_parent(path)?;

    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    for sheet in sheets {
        let grid = Grid::build(sheet);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&sheet.name))?;
        fill_worksheet(worksheet, &sheet.name, &grid)?;
        debug!(
            sheet = %sheet.name,
            rows = grid.rows.len(),
            columns = grid.header.len(),
            "filled sheet"
        );
    }

    workbook.save(path)?;
    debug!(path = %path.display(), sheets = sheets.len(), "wrote workbook");
    Ok(())
}

fn fill_worksheet(worksheet: &mut Worksheet, name: &str, grid: &Grid) -> SinkResult<()> {
    let limit = |reason: String| SinkError::SheetLimit {
        sheet: name.to_string(),
        reason,
    };

    let mut cols = Vec::with_capacity(grid.header.len());
    for (i, column) in grid.header.iter().enumerate() {
        let col =
            ColNum::try_from(i).map_err(|_| limit(format!("{} columns", grid.header.len())))?;
        worksheet.write_string(0, col, column.as_str())?;
        cols.push(col);
    }

    for (i, cells) in grid.rows.iter().enumerate() {
        let row =
            RowNum::try_from(i + 1).map_err(|_| limit(format!("{} rows", grid.rows.len())))?;
        for (col_index, leaf) in cells {
            write_cell(worksheet, row, cols[*col_index], leaf)?;
        }
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    leaf: &Value,
) -> Result<(), XlsxError> {
    match leaf {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64().filter(|f| f.is_finite()) {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, clip_cell(s, row, col))?;
        }
        other => {
            let text = other.to_string();
            worksheet.write_string(row, col, clip_cell(&text, row, col))?;
        }
    }
    Ok(())
}

fn clip_cell(text: &str, row: RowNum, col: ColNum) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(row, col, chars = text.chars().count(), "cell text truncated");
            &text[..cut]
        }
        None => text,
    }
}

fn sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME_CHARS).collect()
}
