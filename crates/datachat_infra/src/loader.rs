use std::io::{Cursor, Read};
use std::path::Path;

use anyhow::{Context, bail};
use calamine::{Data, DataType, Range, Reader, Xlsx};
use datachat_domain::{Record, Scalar};
use tracing::debug;

/// File formats the loader understands, selected by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Csv,
    /// A JSON array of objects
    Json,
    /// One JSON object per line
    JsonLines,
    /// An Excel workbook. Only the first sheet is read.
    Xlsx,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some("jsonl" | "ndjson") => Ok(Self::JsonLines),
            Some("xlsx") => Ok(Self::Xlsx),
            _ => bail!(
                "Unsupported file type for {}. Use .csv, .xlsx, .json, .jsonl or .ndjson",
                path.display()
            ),
        }
    }
}

/// Reads records from a CSV, Excel, JSON or JSON Lines file.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let format = RecordFormat::from_path(path)?;
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let records = parse_records(file, format)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "Loaded records");
    Ok(records)
}

pub fn parse_records(reader: impl Read, format: RecordFormat) -> anyhow::Result<Vec<Record>> {
    match format {
        RecordFormat::Csv => parse_csv(reader),
        RecordFormat::Json => Ok(serde_json::from_reader(reader)?),
        RecordFormat::JsonLines => parse_json_lines(reader),
        RecordFormat::Xlsx => parse_xlsx(reader),
    }
}

fn parse_json_lines(mut reader: impl Read) -> anyhow::Result<Vec<Record>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid record on line {}", index + 1))
        })
        .collect()
}

/// Parses CSV with a header row.
fn parse_csv(reader: impl Read) -> anyhow::Result<Vec<Record>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let rows = reader
        .records()
        .map(|row| row.map(|row| row.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()
        .context("Malformed CSV row")?;

    Ok(typed_records(&headers, &rows))
}

/// Reads the first sheet of a workbook. The first row holds the column
/// names and cells go through the same type inference as CSV.
fn parse_xlsx(mut reader: impl Read) -> anyhow::Result<Vec<Record>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let mut workbook = Xlsx::new(Cursor::new(bytes)).context("Not a valid .xlsx workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("The workbook has no sheets")??;
    Ok(sheet_records(&range))
}

fn sheet_records(range: &Range<Data>) -> Vec<Record> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };

    let headers = header_row
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell_text(cell) {
            name if name.trim().is_empty() => format!("column_{}", index + 1),
            name => name,
        })
        .collect::<Vec<_>>();
    let rows = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect::<Vec<Vec<String>>>();

    typed_records(&headers, &rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|datetime| datetime.to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Builds records from text cells. Each column gets the narrowest type that
/// fits all of its non-empty cells: integer, float, boolean, then text.
/// Empty cells become null.
fn typed_records(headers: &[String], rows: &[Vec<String>]) -> Vec<Record> {
    let kinds = (0..headers.len())
        .map(|column| {
            CellKind::infer(rows.iter().filter_map(|row| row.get(column).map(String::as_str)))
        })
        .collect::<Vec<_>>();

    rows.iter()
        .map(|row| {
            headers
                .iter()
                .zip(&kinds)
                .zip(row.iter())
                .map(|((header, kind), cell)| (header.clone(), kind.parse(cell)))
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Bool,
    Text,
}

impl CellKind {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let (mut int, mut float, mut boolean) = (true, true, true);

        for cell in cells.map(str::trim).filter(|cell| !cell.is_empty()) {
            int &= cell.parse::<i64>().is_ok();
            float &= cell.parse::<f64>().is_ok();
            boolean &= parse_bool(cell).is_some();
            if !(int || float || boolean) {
                break;
            }
        }

        if int {
            CellKind::Int
        } else if float {
            CellKind::Float
        } else if boolean {
            CellKind::Bool
        } else {
            CellKind::Text
        }
    }

    fn parse(self, cell: &str) -> Scalar {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Scalar::Null;
        }
        let parsed = match self {
            CellKind::Int => trimmed.parse::<i64>().ok().map(Scalar::Int),
            CellKind::Float => trimmed.parse::<f64>().ok().map(Scalar::Float),
            CellKind::Bool => parse_bool(trimmed).map(Scalar::Bool),
            CellKind::Text => None,
        };
        parsed.unwrap_or_else(|| Scalar::Text(cell.to_string()))
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn records(json: &str) -> Vec<Record> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_csv_columns_get_inferred_types() {
        let fixture = "name,price,rating,in_stock\nA,10,4.5,true\nB,60,3,FALSE\n";

        let actual = parse_records(fixture.as_bytes(), RecordFormat::Csv).unwrap();

        let expected = records(
            r#"[
                {"name": "A", "price": 10, "rating": 4.5, "in_stock": true},
                {"name": "B", "price": 60, "rating": 3.0, "in_stock": false}
            ]"#,
        );
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_csv_empty_cells_are_null() {
        let fixture = "name,price\nA,\nB,60\n";

        let actual = parse_records(fixture.as_bytes(), RecordFormat::Csv).unwrap();

        let expected = records(r#"[{"name": "A", "price": null}, {"name": "B", "price": 60}]"#);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_csv_mixed_column_falls_back_to_text() {
        let fixture = "code\n42\nX7\n";

        let actual = parse_records(fixture.as_bytes(), RecordFormat::Csv).unwrap();

        let expected = records(r#"[{"code": "42"}, {"code": "X7"}]"#);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_csv_keeps_header_order() {
        let fixture = "zeta,alpha\n1,2\n";

        let actual = parse_records(fixture.as_bytes(), RecordFormat::Csv).unwrap();

        assert_eq!(actual[0].keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_csv_ragged_row_is_an_error() {
        let fixture = "name,price\nA,10\nB\n";

        let actual = parse_records(fixture.as_bytes(), RecordFormat::Csv);

        assert!(actual.is_err());
    }

    #[test]
    fn test_json_array() {
        let fixture = r#"[{"name": "A", "price": 10}, {"name": "B", "price": 60}]"#;

        let actual = parse_records(fixture.as_bytes(), RecordFormat::Json).unwrap();

        assert_eq!(actual, records(fixture));
    }

    #[test]
    fn test_json_lines_skip_blank_lines() {
        let fixture = "{\"name\": \"A\"}\n\n{\"name\": \"B\"}\n";

        let actual = parse_records(fixture.as_bytes(), RecordFormat::JsonLines).unwrap();

        assert_eq!(actual, records(r#"[{"name": "A"}, {"name": "B"}]"#));
    }

    #[test]
    fn test_json_lines_report_bad_line() {
        let fixture = "{\"name\": \"A\"}\nnot json\n";

        let actual = parse_records(fixture.as_bytes(), RecordFormat::JsonLines).unwrap_err();

        assert!(actual.to_string().contains("line 2"));
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let fixture = r#"[{"name": "A", "tags": ["x"]}]"#;

        let actual = parse_records(fixture.as_bytes(), RecordFormat::Json);

        assert!(actual.is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RecordFormat::from_path(Path::new("a.CSV")).unwrap(), RecordFormat::Csv);
        assert_eq!(RecordFormat::from_path(Path::new("a.json")).unwrap(), RecordFormat::Json);
        assert_eq!(
            RecordFormat::from_path(Path::new("a.ndjson")).unwrap(),
            RecordFormat::JsonLines
        );
        assert_eq!(RecordFormat::from_path(Path::new("a.XLSX")).unwrap(), RecordFormat::Xlsx);
        assert!(RecordFormat::from_path(Path::new("a.xls")).is_err());
    }

    fn sheet(cells: Vec<Vec<Data>>) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.first().map_or(0, Vec::len) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (row, values) in cells.into_iter().enumerate() {
            for (column, value) in values.into_iter().enumerate() {
                range.set_value((row as u32, column as u32), value);
            }
        }
        range
    }

    #[test]
    fn test_sheet_rows_get_inferred_types() {
        let fixture = sheet(vec![
            vec![
                Data::String("name".to_string()),
                Data::String("price".to_string()),
                Data::String("rating".to_string()),
                Data::String("in_stock".to_string()),
            ],
            vec![
                Data::String("A".to_string()),
                Data::Float(10.0),
                Data::Float(4.5),
                Data::Bool(true),
            ],
            vec![
                Data::String("B".to_string()),
                Data::Float(60.0),
                Data::Empty,
                Data::Bool(false),
            ],
        ]);

        let actual = sheet_records(&fixture);

        let expected = records(
            r#"[
                {"name": "A", "price": 10, "rating": 4.5, "in_stock": true},
                {"name": "B", "price": 60, "rating": null, "in_stock": false}
            ]"#,
        );
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_sheet_blank_header_gets_a_column_name() {
        let fixture = sheet(vec![
            vec![Data::String("name".to_string()), Data::Empty],
            vec![Data::String("A".to_string()), Data::Int(3)],
        ]);

        let actual = sheet_records(&fixture);

        assert_eq!(actual, records(r#"[{"name": "A", "column_2": 3}]"#));
    }

    #[test]
    fn test_invalid_workbook_is_an_error() {
        let actual = parse_records("name,price\nA,10\n".as_bytes(), RecordFormat::Xlsx);

        assert!(actual.is_err());
    }

    #[test]
    fn test_load_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.csv");
        std::fs::write(&path, "name,price\nA,10\nB,60\n").unwrap();

        let actual = load_records(&path).unwrap();

        let expected = records(r#"[{"name": "A", "price": 10}, {"name": "B", "price": 60}]"#);
        assert_eq!(actual, expected);
    }
}
