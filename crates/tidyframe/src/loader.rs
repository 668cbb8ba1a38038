//! Dataset loading.
//!
//! The file format is picked from the extension and parsed with the matching
//! polars reader. Spreadsheets are read with calamine, first worksheet only.

use crate::error::{CleaningError, Result, ResultExt};
use crate::utils::MISSING_MARKERS;
use calamine::{Data as SheetCell, DataType as _, Reader as _, open_workbook_auto};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Number of rows used to infer column types of delimited text.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Tsv,
    /// A JSON array of records.
    Json,
    /// One JSON record per line.
    NdJson,
    Parquet,
    /// A spreadsheet workbook (xlsx, xlsm, xlsb, xls, ods).
    Excel,
}

impl DatasetFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::NdJson),
            "parquet" | "pq" => Ok(Self::Parquet),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Excel),
            "" => Err(CleaningError::UnsupportedFormat(format!(
                "'{}' has no file extension",
                path.display()
            ))),
            other => Err(CleaningError::UnsupportedFormat(format!(
                "unknown extension '.{}'",
                other
            ))),
        }
    }
}

/// Load a dataset from disk.
///
/// Delimited text and spreadsheets treat the usual spreadsheet and pandas
/// missing markers (`NA`, `N/A`, `null`, `NaN`, ...) as missing cells.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let format = DatasetFormat::from_path(path)?;
    debug!("Loading {} as {:?}", path.display(), format);

    let df = match format {
        DatasetFormat::Csv => read_delimited(path, b',')?,
        DatasetFormat::Tsv => read_delimited(path, b'\t')?,
        DatasetFormat::Json => JsonReader::new(File::open(path)?)
            .finish()
            .context(format!("Failed to read JSON file {}", path.display()))?,
        DatasetFormat::NdJson => JsonLineReader::from_path(path)
            .and_then(|reader| reader.finish())
            .context(format!("Failed to read NDJSON file {}", path.display()))?,
        DatasetFormat::Parquet => ParquetReader::new(File::open(path)?)
            .finish()
            .context(format!("Failed to read Parquet file {}", path.display()))?,
        DatasetFormat::Excel => read_workbook(path)?,
    };

    info!(
        "Loaded {}: {} rows x {} columns",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

fn read_delimited(path: &Path, separator: u8) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(MISSING_MARKERS.iter().map(|s| (*s).into()).collect());

    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .context(format!("Failed to read delimited file {}", path.display()))
}

// =============================================================================
// Spreadsheets
// =============================================================================

/// Column type picked from the observed cells of a worksheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

/// Read the first worksheet of a workbook. The first row holds the labels.
fn read_workbook(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)
        .context(format!("Failed to open workbook {}", path.display()))?;
    let sheet = workbook.sheet_names().first().cloned().ok_or_else(|| {
        CleaningError::UnsupportedFormat(format!("'{}' has no worksheets", path.display()))
    })?;
    let range = workbook.worksheet_range(&sheet)?;
    debug!("Reading worksheet '{}' ({:?} cells)", sheet, range.get_size());

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[SheetCell]> = rows.collect();

    let columns = sheet_labels(header)
        .into_iter()
        .enumerate()
        .map(|(idx, label)| {
            let cells: Vec<Option<&SheetCell>> = body
                .iter()
                .map(|row| row.get(idx).filter(|cell| !is_blank_cell(cell)))
                .collect();
            sheet_column(&label, &cells)
        })
        .collect::<Vec<Column>>();

    Ok(DataFrame::new(columns)?)
}

/// Header labels; blank labels get `column_<i>` and repeats get a suffix.
fn sheet_labels(header: &[SheetCell]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let text = render_cell(cell).trim().to_string();
            let base = if text.is_empty() {
                format!("column_{}", idx)
            } else {
                text
            };
            let mut label = base.clone();
            let mut suffix = 1;
            while !seen.insert(label.clone()) {
                label = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            label
        })
        .collect()
}

fn is_blank_cell(cell: &SheetCell) -> bool {
    match cell {
        SheetCell::Empty | SheetCell::Error(_) => true,
        SheetCell::String(text) => {
            let text = text.trim();
            text.is_empty() || MISSING_MARKERS.contains(&text)
        }
        _ => false,
    }
}

fn render_cell(cell: &SheetCell) -> String {
    match cell {
        SheetCell::Empty => String::new(),
        SheetCell::String(text) => text.clone(),
        SheetCell::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Integers stay integers, mixed int/float widens to float, anything else
/// (or a column with no observed cell) is text.
fn sheet_column_kind(cells: &[Option<&SheetCell>]) -> SheetColumnKind {
    let mut kind = None;
    for cell in cells.iter().flatten() {
        let cell_kind = match cell {
            SheetCell::Int(_) => SheetColumnKind::Int,
            SheetCell::Float(_) => SheetColumnKind::Float,
            SheetCell::Bool(_) => SheetColumnKind::Bool,
            _ => return SheetColumnKind::Text,
        };
        kind = match (kind, cell_kind) {
            (None, k) => Some(k),
            (Some(a), b) if a == b => Some(a),
            (Some(SheetColumnKind::Int), SheetColumnKind::Float)
            | (Some(SheetColumnKind::Float), SheetColumnKind::Int) => Some(SheetColumnKind::Float),
            _ => return SheetColumnKind::Text,
        };
    }
    kind.unwrap_or(SheetColumnKind::Text)
}

fn sheet_column(label: &str, cells: &[Option<&SheetCell>]) -> Column {
    let name = PlSmallStr::from_str(label);
    let series = match sheet_column_kind(cells) {
        SheetColumnKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Some(SheetCell::Int(v)) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        SheetColumnKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Some(SheetCell::Int(v)) => Some(*v as f64),
                    Some(SheetCell::Float(v)) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        SheetColumnKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Some(SheetCell::Bool(v)) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        SheetColumnKind::Text => {
            let values: Vec<Option<String>> =
                cells.iter().map(|cell| cell.map(render_cell)).collect();
            Series::new(name, values)
        }
    };
    series.into_column()
}
