use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::SkippedRow;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const DATE_COL: &str = "Date";
pub const PRICE_COL: &str = "Price";
pub const QUANTITY_COL: &str = "Quantity";
pub const COUNTRY_COL: &str = "Country";
pub const PRODUCT_COL: &str = "ProductName";
/// Derived column, always recomputed at load time.
pub const SALES_COL: &str = "Sales";

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = [DATE_COL, PRICE_COL, QUANTITY_COL, COUNTRY_COL, PRODUCT_COL];

/// Format of the `Date` column, both on load and on export.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

// ---------------------------------------------------------------------------
// Transaction – one row of the source table
// ---------------------------------------------------------------------------

/// A single validated sales transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub price: Decimal,
    pub quantity: u64,
    pub country: String,
    pub product_name: String,
    /// `price × quantity`, fixed when the record is built.
    pub sales: Decimal,
    /// Raw text of the non-required source columns, in header order.
    pub extra: Vec<String>,
}

impl Transaction {
    /// Build a record and derive its sales value.
    ///
    /// The caller guarantees `price × quantity` fits in a `Decimal`; the loader
    /// checks this before constructing records from untrusted input.
    pub fn new(
        date: NaiveDate,
        price: Decimal,
        quantity: u64,
        country: impl Into<String>,
        product_name: impl Into<String>,
    ) -> Self {
        Self {
            date,
            price,
            quantity,
            country: country.into(),
            product_name: product_name.into(),
            sales: price * Decimal::from(quantity),
            extra: Vec::new(),
        }
    }

    /// Append the value of the next pass-through column.
    pub fn with_extra(mut self, value: impl Into<String>) -> Self {
        self.extra.push(value.into());
        self
    }

    fn cell_text(&self, cell: Cell) -> String {
        match cell {
            Cell::Date => self.date.format(DATE_FORMAT).to_string(),
            Cell::Price => self.price.to_string(),
            Cell::Quantity => self.quantity.to_string(),
            Cell::Country => self.country.clone(),
            Cell::Product => self.product_name.clone(),
            Cell::Extra(ix) => self.extra.get(ix).cloned().unwrap_or_default(),
        }
    }
}

/// Where the value of one source column lives in a [`Transaction`].
///
/// The first column carrying a required name is that field; every other
/// column (including repeated names) is the next entry of `extra`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Date,
    Price,
    Quantity,
    Country,
    Product,
    Extra(usize),
}

fn column_cells(columns: &[String]) -> Vec<Cell> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut extras = 0;
    columns
        .iter()
        .map(|column| {
            let required = match column.as_str() {
                DATE_COL => Some(Cell::Date),
                PRICE_COL => Some(Cell::Price),
                QUANTITY_COL => Some(Cell::Quantity),
                COUNTRY_COL => Some(Cell::Country),
                PRODUCT_COL => Some(Cell::Product),
                _ => None,
            };
            match required {
                Some(cell) if seen.insert(column.as_str()) => cell,
                _ => {
                    extras += 1;
                    Cell::Extra(extras - 1)
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full validated dataset with pre-computed category and range indices.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Source columns in header order (never contains `Sales`).
    pub columns: Vec<String>,
    /// All surviving records, in source order.
    pub records: Vec<Transaction>,
    /// Distinct countries in first-seen order.
    pub countries: Vec<String>,
    /// Distinct product names in first-seen order.
    pub products: Vec<String>,
    /// Records dropped during load.
    pub skipped: Vec<SkippedRow>,
    cells: Vec<Cell>,
    date_span: Option<(NaiveDate, NaiveDate)>,
    price_span: Option<(Decimal, Decimal)>,
    quantity_span: Option<(u64, u64)>,
}

impl Dataset {
    /// Build category and range indices from validated records.
    pub fn from_records(
        columns: Vec<String>,
        records: Vec<Transaction>,
        skipped: Vec<SkippedRow>,
    ) -> Self {
        let mut countries = Vec::new();
        let mut products = Vec::new();
        let mut seen_countries: HashSet<&str> = HashSet::new();
        let mut seen_products: HashSet<&str> = HashSet::new();

        let mut date_span: Option<(NaiveDate, NaiveDate)> = None;
        let mut price_span: Option<(Decimal, Decimal)> = None;
        let mut quantity_span: Option<(u64, u64)> = None;

        for tx in &records {
            if seen_countries.insert(&tx.country) {
                countries.push(tx.country.clone());
            }
            if seen_products.insert(&tx.product_name) {
                products.push(tx.product_name.clone());
            }
            date_span = Some(widen(date_span, tx.date));
            price_span = Some(widen(price_span, tx.price));
            quantity_span = Some(widen(quantity_span, tx.quantity));
        }

        let columns: Vec<String> = columns.into_iter().filter(|c| c != SALES_COL).collect();
        let cells = column_cells(&columns);

        Dataset {
            columns,
            cells,
            records,
            countries,
            products,
            skipped,
            date_span,
            price_span,
            quantity_span,
        }
    }

    /// Dataset with only the required columns, used when records are built in
    /// code rather than loaded.
    pub fn from_transactions(records: Vec<Transaction>) -> Self {
        let columns = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        Self::from_records(columns, records, Vec::new())
    }

    /// Earliest and latest transaction date.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_span
    }

    /// Lowest and highest price.
    pub fn price_span(&self) -> Option<(Decimal, Decimal)> {
        self.price_span
    }

    /// Lowest and highest quantity.
    pub fn quantity_span(&self) -> Option<(u64, u64)> {
        self.quantity_span
    }

    /// Header written on export: source columns followed by `Sales`.
    pub fn export_columns(&self) -> Vec<String> {
        let mut cols = self.columns.clone();
        cols.push(SALES_COL.to_string());
        cols
    }

    /// One export row for `tx`: its value for every source column, then its
    /// sales.
    pub fn export_row(&self, tx: &Transaction) -> Vec<String> {
        let mut row: Vec<String> = self.cells.iter().map(|&cell| tx.cell_text(cell)).collect();
        row.push(tx.sales.to_string());
        row
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn widen<T: PartialOrd + Copy>(span: Option<(T, T)>, value: T) -> (T, T) {
    match span {
        None => (value, value),
        Some((lo, hi)) => (
            if value < lo { value } else { lo },
            if value > hi { value } else { hi },
        ),
    }
}
