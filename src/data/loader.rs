use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use super::error::{LoadError, LoadResult, RowIssue, SkippedRow};
use super::model::{
    Dataset, Transaction, COUNTRY_COL, DATE_COL, DATE_FORMAT, PRICE_COL, PRODUCT_COL,
    QUANTITY_COL, REQUIRED_COLUMNS, SALES_COL,
};

/// Cell values that count as "no value": blanks plus the NA spellings common
/// in spreadsheet and dataframe exports.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `[{ "Date": "01/31/2023", "Price": 9.5, ... }, ...]`
/// * anything else is read as CSV with a header row
pub fn load_file(path: &Path) -> LoadResult<Dataset> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io(e),
    })?;
    let reader = BufReader::new(file);

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "json" => load_json_reader(reader)?,
        _ => load_csv_reader(reader)?,
    };

    log::info!(
        "Loaded {} transactions from {} ({} skipped)",
        dataset.len(),
        path.display(),
        dataset.skipped.len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV from any stream. The header row must name every required column;
/// other columns are carried through untouched.
pub fn load_csv_reader<R: Read>(reader: R) -> LoadResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(LoadError::EmptySource);
    }

    let schema = Schema::resolve(&headers)?;
    let mut acc = Accumulator::default();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let values: Vec<Option<&str>> = record.iter().map(Some).collect();
        acc.push(&schema, row_no as u64 + 1, &values);
    }

    Ok(acc.finish(headers))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, one object per transaction:
///
/// ```json
/// [
///   { "Date": "01/01/2023", "Price": 10.0, "Quantity": 2,
///     "Country": "US", "ProductName": "Widget" },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys, in the order the JSON object exposes
/// them. `null` values count as missing.
pub fn load_json_reader<R: Read>(reader: R) -> LoadResult<Dataset> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Json("expected a top-level JSON array".to_string()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Json(format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    if headers.is_empty() {
        return Err(LoadError::EmptySource);
    }

    let schema = Schema::resolve(&headers)?;
    let mut acc = Accumulator::default();

    for (i, rec) in records.iter().enumerate() {
        // Checked above: every record is an object.
        let Some(obj) = rec.as_object() else {
            continue;
        };
        let cells: Vec<Option<String>> = headers
            .iter()
            .map(|h| obj.get(h).and_then(json_to_text))
            .collect();
        let values: Vec<Option<&str>> = cells.iter().map(|c| c.as_deref()).collect();
        acc.push(&schema, i as u64 + 1, &values);
    }

    Ok(acc.finish(headers))
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

/// Positions of the required columns within a header row.
struct Schema {
    headers: Vec<String>,
    date: usize,
    price: usize,
    quantity: usize,
    country: usize,
    product: usize,
}

impl Schema {
    fn resolve(headers: &[String]) -> LoadResult<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let index = |name: &str| {
            position(name).ok_or_else(|| LoadError::MissingColumns(vec![name.to_string()]))
        };
        Ok(Schema {
            headers: headers.to_vec(),
            date: index(DATE_COL)?,
            price: index(PRICE_COL)?,
            quantity: index(QUANTITY_COL)?,
            country: index(COUNTRY_COL)?,
            product: index(PRODUCT_COL)?,
        })
    }

    fn is_required(&self, ix: usize) -> bool {
        [self.date, self.price, self.quantity, self.country, self.product].contains(&ix)
    }

    /// Turn one row of raw cells into a transaction, or say why it cannot be.
    fn validate(&self, values: &[Option<&str>]) -> Result<Transaction, RowIssue> {
        // Any empty cell disqualifies the whole row, required column or not.
        for (ix, column) in self.headers.iter().enumerate() {
            let value = values.get(ix).copied().flatten();
            if is_missing(value) {
                return Err(RowIssue::MissingValue {
                    column: column.clone(),
                });
            }
        }
        let cell = |ix: usize| values.get(ix).copied().flatten().unwrap_or("");

        let date = parse_date(cell(self.date))?;
        let price = parse_price(cell(self.price))?;
        let quantity = parse_quantity(cell(self.quantity))?;

        if price.checked_mul(Decimal::from(quantity)).is_none() {
            return Err(RowIssue::InvalidNumber {
                column: SALES_COL.to_string(),
                value: format!("{price} × {quantity}"),
            });
        }

        let mut tx = Transaction::new(date, price, quantity, cell(self.country), cell(self.product));
        for (ix, column) in self.headers.iter().enumerate() {
            if self.is_required(ix) || column == SALES_COL {
                continue;
            }
            tx.extra.push(cell(ix).to_string());
        }
        Ok(tx)
    }
}

fn is_missing(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => MISSING_MARKERS.contains(&v.trim()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, RowIssue> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| RowIssue::DateParse {
        value: s.to_string(),
    })
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn parse_price(s: &str) -> Result<Decimal, RowIssue> {
    let price = parse_decimal(s).ok_or_else(|| RowIssue::InvalidNumber {
        column: PRICE_COL.to_string(),
        value: s.to_string(),
    })?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(RowIssue::Negative {
            column: PRICE_COL.to_string(),
            value: s.to_string(),
        });
    }
    Ok(price)
}

/// Quantities must be whole numbers; `"3.0"` is accepted as 3.
fn parse_quantity(s: &str) -> Result<u64, RowIssue> {
    if let Ok(q) = s.trim().parse::<u64>() {
        return Ok(q);
    }
    let invalid = || RowIssue::InvalidNumber {
        column: QUANTITY_COL.to_string(),
        value: s.to_string(),
    };
    let value = parse_decimal(s).ok_or_else(invalid)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(RowIssue::Negative {
            column: QUANTITY_COL.to_string(),
            value: s.to_string(),
        });
    }
    if !value.fract().is_zero() {
        return Err(invalid());
    }
    value.to_u64().ok_or_else(invalid)
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Accumulator {
    records: Vec<Transaction>,
    skipped: Vec<SkippedRow>,
}

impl Accumulator {
    fn push(&mut self, schema: &Schema, row: u64, values: &[Option<&str>]) {
        match schema.validate(values) {
            Ok(tx) => self.records.push(tx),
            Err(issue) => {
                log::debug!("Skipping row {row}: {issue}");
                self.skipped.push(SkippedRow { row, issue });
            }
        }
    }

    fn finish(self, headers: Vec<String>) -> Dataset {
        if !self.skipped.is_empty() {
            log::warn!(
                "Skipped {} incomplete or invalid rows (kept {})",
                self.skipped.len(),
                self.records.len()
            );
        }
        Dataset::from_records(headers, self.records, self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::aggregate::total_sales;
    use crate::data::filter::FilteredView;
    use crate::data::test_util::{date, dec};

    const EXAMPLE_CSV: &str = "\
Date,Price,Quantity,Country,ProductName
1/1/2023,10,2,US,Widget
2/1/2023,5,4,UK,Gadget
";

    fn load_str(csv: &str) -> Dataset {
        load_csv_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn loads_required_columns_and_derives_sales() {
        let ds = load_str(EXAMPLE_CSV);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].date, date(2023, 1, 1));
        assert_eq!(ds.records[0].sales, dec("20"));
        assert_eq!(ds.records[1].country, "UK");
        assert_eq!(total_sales(&FilteredView::all(&ds)), dec("40"));
        assert!(ds.skipped.is_empty());
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let err =
            load_csv_reader("Date,Quantity,ProductName\n1/1/2023,1,A\n".as_bytes()).unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => assert_eq!(cols, vec!["Price", "Country"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sales Transaction v.4a.csv");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound { .. }));
        assert!(err.to_string().contains("Sales Transaction v.4a.csv"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = load_csv_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::EmptySource));
    }

    #[test]
    fn rows_with_any_missing_value_are_dropped() {
        let ds = load_str(
            "\
Date,Price,Quantity,Country,ProductName,CustomerNo
1/1/2023,10,2,US,Widget,100
1/2/2023,,2,US,Widget,101
1/3/2023,10,2,US,Widget,
1/4/2023,10,2,NA,Widget,103
1/5/2023,10,2,US
",
        );
        assert_eq!(ds.len(), 1);
        let reasons: Vec<_> = ds.skipped.iter().map(|s| (s.row, s.issue.clone())).collect();
        assert_eq!(
            reasons,
            vec![
                (2, RowIssue::MissingValue { column: "Price".into() }),
                (3, RowIssue::MissingValue { column: "CustomerNo".into() }),
                (4, RowIssue::MissingValue { column: "Country".into() }),
                (5, RowIssue::MissingValue { column: "ProductName".into() }),
            ]
        );
    }

    #[test]
    fn unparseable_dates_drop_only_that_row() {
        let ds = load_str(
            "\
Date,Price,Quantity,Country,ProductName
2023-01-01,10,2,US,Widget
12/9/2019,5,4,UK,Gadget
13/40/2019,5,4,UK,Gadget
",
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].date, date(2019, 12, 9));
        assert_eq!(ds.skipped.len(), 2);
        assert!(matches!(ds.skipped[0].issue, RowIssue::DateParse { .. }));
    }

    #[test]
    fn invalid_and_negative_numbers_are_dropped() {
        let ds = load_str(
            "\
Date,Price,Quantity,Country,ProductName
1/1/2023,ten,2,US,Widget
1/1/2023,10,-2,US,Widget
1/1/2023,-1,2,US,Widget
1/1/2023,10,2.5,US,Widget
1/1/2023,10,3.0,US,Widget
1/1/2023,1.5e1,1,US,Widget
",
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].quantity, 3);
        assert_eq!(ds.records[1].price, dec("15"));
        let issues: Vec<_> = ds.skipped.iter().map(|s| &s.issue).collect();
        assert!(matches!(issues[0], RowIssue::InvalidNumber { column, .. } if column == "Price"));
        assert!(matches!(issues[1], RowIssue::Negative { column, .. } if column == "Quantity"));
        assert!(matches!(issues[2], RowIssue::Negative { column, .. } if column == "Price"));
        assert!(matches!(issues[3], RowIssue::InvalidNumber { column, .. } if column == "Quantity"));
    }

    #[test]
    fn extra_columns_pass_through_and_sales_is_recomputed() {
        let ds = load_str(
            "\
TransactionNo,Date,ProductName,Price,Quantity,Country,Sales
581482,12/9/2019,Popcorn Holder,21.47,12,United Kingdom,999
",
        );
        assert_eq!(
            ds.columns,
            vec!["TransactionNo", "Date", "ProductName", "Price", "Quantity", "Country"]
        );
        let tx = &ds.records[0];
        assert_eq!(tx.sales, dec("257.64"));
        assert_eq!(tx.extra, vec!["581482"]);
    }

    #[test]
    fn loads_csv_file_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(EXAMPLE_CSV.as_bytes()).unwrap();
        drop(file);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn loads_records_oriented_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        std::fs::write(
            &path,
            r#"[
                {"Date": "01/01/2023", "Price": 10.0, "Quantity": 2, "Country": "US", "ProductName": "Widget"},
                {"Date": "02/01/2023", "Price": 5, "Quantity": 4, "Country": "UK", "ProductName": "Gadget"},
                {"Date": "02/02/2023", "Price": null, "Quantity": 4, "Country": "UK", "ProductName": "Gadget"}
            ]"#,
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped.len(), 1);
        assert_eq!(total_sales(&FilteredView::all(&ds)), dec("40"));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let err = load_json_reader(r#"{"Date": "01/01/2023"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
        let err = load_json_reader(r#"[1, 2]"#.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }
}
