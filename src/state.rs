use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use sales_dashboard::data::cache::DatasetCache;
use sales_dashboard::data::calculator::predict;
use sales_dashboard::data::export::write_csv;
use sales_dashboard::data::filter::{Bounds, CategorySelection, FilterCriteria, FilteredView};
use sales_dashboard::data::model::Dataset;
use sales_dashboard::data::report::{recompute, DashboardReport};

use crate::args::Layout;
use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Widget state
// ---------------------------------------------------------------------------

/// Which category column a widget edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Country,
    Product,
}

/// Tabs of the tabbed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Summary,
    Visualizations,
    Download,
}

/// Raw values of the filter widgets. Turned into [`FilterCriteria`] on every
/// change.
#[derive(Debug, Clone)]
pub struct FilterInputs {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Multi-select values (classic layout). Start with everything selected.
    pub countries: CategorySelection,
    pub products: CategorySelection,
    /// Single-select values (tabbed layout). `None` means "All".
    pub country_choice: Option<String>,
    pub product_choice: Option<String>,
    /// Range sliders (tabbed layout), with the dataset extent they started at.
    pub price: (f64, f64),
    pub price_extent: (f64, f64),
    pub quantity: (u64, u64),
    pub quantity_extent: (u64, u64),
}

impl FilterInputs {
    /// Widgets positioned to select the whole dataset.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let today = chrono::Local::now().date_naive();
        let (start, end) = dataset.date_span().unwrap_or((today, today));
        let price_extent = dataset
            .price_span()
            .map(|(lo, hi)| (lo.to_f64().unwrap_or(0.0), hi.to_f64().unwrap_or(0.0)))
            .unwrap_or((0.0, 0.0));
        let quantity_extent = dataset.quantity_span().unwrap_or((0, 0));

        Self {
            start,
            end,
            countries: CategorySelection::only(dataset.countries.iter().cloned()),
            products: CategorySelection::only(dataset.products.iter().cloned()),
            country_choice: None,
            product_choice: None,
            price: price_extent,
            price_extent,
            quantity: quantity_extent,
            quantity_extent,
        }
    }

    /// Criteria for the given layout. Each layout only reads its own widgets.
    pub fn criteria(&self, layout: Layout) -> FilterCriteria {
        let base = FilterCriteria::default().with_date_endpoints(&[self.start, self.end]);
        match layout {
            Layout::Classic => FilterCriteria {
                countries: self.countries.clone(),
                products: self.products.clone(),
                ..base
            },
            Layout::Tabbed => FilterCriteria {
                countries: CategorySelection::only(self.country_choice.iter().cloned()),
                products: CategorySelection::only(self.product_choice.iter().cloned()),
                price: self.price_bounds(),
                quantity: self.quantity_bounds(),
                ..base
            },
        }
    }

    /// `None` while the slider covers the whole dataset, so slider rounding
    /// can never exclude the cheapest or dearest record.
    fn price_bounds(&self) -> Option<Bounds<Decimal>> {
        let (lo, hi) = self.price;
        if lo <= self.price_extent.0 && hi >= self.price_extent.1 {
            return None;
        }
        let lo = Decimal::from_f64(lo.max(0.0)).unwrap_or(Decimal::ZERO);
        let hi = Decimal::from_f64(hi.max(0.0)).unwrap_or(Decimal::MAX);
        Some(Bounds::new(lo, hi))
    }

    fn quantity_bounds(&self) -> Option<Bounds<u64>> {
        let (lo, hi) = self.quantity;
        if lo <= self.quantity_extent.0 && hi >= self.quantity_extent.1 {
            return None;
        }
        Some(Bounds::new(lo, hi))
    }
}

/// Inputs of the predictive sales calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatorInputs {
    pub price: f64,
    pub quantity: u64,
}

impl Default for CalculatorInputs {
    fn default() -> Self {
        Self {
            price: 10.0,
            quantity: 1,
        }
    }
}

impl CalculatorInputs {
    /// `None` when the price or the product is outside the `Decimal` range.
    pub fn predicted_sales(&self) -> Option<Decimal> {
        let price = Decimal::from_f64(self.price.max(0.0))?;
        predict(price, self.quantity)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub layout: Layout,
    pub top_n: usize,

    /// Path of the current (or last attempted) data source.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Fatal load error. While set, no dashboard is rendered.
    pub load_error: Option<String>,

    pub filters: Option<FilterInputs>,

    /// Metrics and chart series for the current filters (cached).
    pub report: DashboardReport,

    /// Country → colour for the scatter plot.
    pub country_colors: Option<ColorMap>,

    pub tab: Tab,

    pub calculator: CalculatorInputs,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(layout: Layout, top_n: usize) -> Self {
        Self {
            layout,
            top_n,
            source: None,
            dataset: None,
            load_error: None,
            filters: None,
            report: DashboardReport::default(),
            country_colors: None,
            tab: Tab::default(),
            calculator: CalculatorInputs::default(),
            status_message: None,
        }
    }

    /// Load `path` through the cache and show it, or show the load error.
    pub fn open(&mut self, cache: &mut DatasetCache, path: &Path) {
        self.source = Some(path.to_path_buf());
        match cache.get_or_load(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.dataset = None;
                self.filters = None;
                self.report = DashboardReport::default();
                self.country_colors = None;
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Drop the cached copy of the current source and load it again.
    pub fn reload(&mut self, cache: &mut DatasetCache) {
        if let Some(path) = self.source.clone() {
            cache.invalidate(&path);
            self.open(cache, &path);
        }
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.filters = Some(FilterInputs::for_dataset(&dataset));
        self.country_colors = Some(ColorMap::new(&dataset.countries));
        self.status_message = if dataset.skipped.is_empty() {
            None
        } else {
            Some(format!(
                "{} incomplete or invalid rows were skipped",
                dataset.skipped.len()
            ))
        };
        self.dataset = Some(dataset);
        self.load_error = None;
        self.refilter();
    }

    /// Recompute the report after a filter change.
    pub fn refilter(&mut self) {
        if let (Some(ds), Some(filters)) = (&self.dataset, &self.filters) {
            let criteria = filters.criteria(self.layout);
            self.report = recompute(ds, &criteria, self.top_n);
        }
    }

    /// The records behind the current report.
    pub fn filtered_view(&self) -> Option<FilteredView<'_>> {
        self.dataset.as_deref().map(|ds| self.report.view(ds))
    }

    /// Toggle one value of a multi-select filter.
    pub fn toggle_filter_value(&mut self, category: Category, value: &str) {
        if let Some(selected) = self.selection_mut(category) {
            if selected.contains(value) {
                selected.remove(value);
            } else {
                selected.insert(value);
            }
        }
        self.refilter();
    }

    /// Select all values of a multi-select filter.
    pub fn select_all(&mut self, category: Category) {
        let all = match (&self.dataset, category) {
            (Some(ds), Category::Country) => ds.countries.clone(),
            (Some(ds), Category::Product) => ds.products.clone(),
            (None, _) => return,
        };
        if let Some(selected) = self.selection_mut(category) {
            *selected = CategorySelection::only(all);
        }
        self.refilter();
    }

    /// Deselect all values. An empty selection filters nothing out.
    pub fn select_none(&mut self, category: Category) {
        if let Some(selected) = self.selection_mut(category) {
            selected.clear();
        }
        self.refilter();
    }

    fn selection_mut(&mut self, category: Category) -> Option<&mut CategorySelection> {
        let filters = self.filters.as_mut()?;
        Some(match category {
            Category::Country => &mut filters.countries,
            Category::Product => &mut filters.products,
        })
    }

    /// Write the filtered records to `path` as CSV.
    pub fn export_to(&mut self, path: &Path) -> Result<()> {
        let view = self.filtered_view().context("No dataset loaded")?;
        let rows = view.len();
        write_csv(&view, path)
            .with_context(|| format!("exporting filtered data to {}", path.display()))?;
        self.status_message = Some(format!("Exported {rows} rows to {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const CSV: &str = "\
TransactionNo,Date,ProductName,Price,Quantity,Country
1,1/1/2023,Widget,10,2,US
2,2/1/2023,Gadget,5,4,UK
3,2/15/2023,Widget,10,,UK
4,3/1/2023,Gizmo,2.50,20,France
";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn opened(layout: Layout) -> (tempfile::TempDir, DatasetCache, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, CSV).unwrap();
        let mut cache = DatasetCache::new();
        let mut state = AppState::new(layout, 10);
        state.open(&mut cache, &path);
        (dir, cache, state)
    }

    #[test]
    fn opening_a_file_shows_everything() {
        let (_dir, _cache, state) = opened(Layout::Classic);
        assert!(state.load_error.is_none());
        assert_eq!(state.report.metrics.transaction_count, 3);
        assert_eq!(state.report.metrics.total_sales, dec("90"));
        assert_eq!(
            state.status_message.as_deref(),
            Some("1 incomplete or invalid rows were skipped")
        );
    }

    #[test]
    fn missing_file_renders_no_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new();
        let mut state = AppState::new(Layout::Tabbed, 10);
        state.open(&mut cache, &dir.path().join("nope.csv"));
        assert!(state.dataset.is_none());
        assert!(state.filters.is_none());
        assert!(state.load_error.as_deref().unwrap_or("").contains("nope.csv"));
        assert_eq!(state.report, DashboardReport::default());
    }

    #[test]
    fn classic_multi_select() {
        let (_dir, _cache, mut state) = opened(Layout::Classic);
        state.toggle_filter_value(Category::Country, "US");
        assert_eq!(state.report.metrics.transaction_count, 2);

        state.select_none(Category::Country);
        assert_eq!(state.report.metrics.transaction_count, 3);

        state.toggle_filter_value(Category::Country, "France");
        assert_eq!(state.report.metrics.total_sales, dec("50"));

        state.select_all(Category::Country);
        assert_eq!(state.report.metrics.transaction_count, 3);
    }

    #[test]
    fn tabbed_single_select_and_ranges() {
        let (_dir, _cache, mut state) = opened(Layout::Tabbed);
        let filters = state.filters.as_mut().unwrap();
        assert_eq!(filters.price, (2.5, 10.0));
        assert_eq!(filters.quantity, (2, 20));

        filters.product_choice = Some("Widget".to_string());
        state.refilter();
        assert_eq!(state.report.metrics.transaction_count, 1);

        let filters = state.filters.as_mut().unwrap();
        filters.product_choice = None;
        filters.quantity = (3, 20);
        state.refilter();
        assert_eq!(state.report.metrics.transaction_count, 2);

        let filters = state.filters.as_mut().unwrap();
        filters.quantity = filters.quantity_extent;
        filters.price = (2.5, 5.0);
        state.refilter();
        assert_eq!(state.report.metrics.total_sales, dec("70"));
    }

    #[test]
    fn full_range_sliders_do_not_filter() {
        let (_dir, _cache, state) = opened(Layout::Tabbed);
        let criteria = state.filters.as_ref().unwrap().criteria(Layout::Tabbed);
        assert_eq!(criteria.price, None);
        assert_eq!(criteria.quantity, None);
        assert!(criteria.countries.is_unrestricted());
        assert!(criteria.dates.is_some());
    }

    #[test]
    fn date_widgets_narrow_the_report() {
        let (_dir, _cache, mut state) = opened(Layout::Classic);
        let filters = state.filters.as_mut().unwrap();
        assert_eq!(filters.start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(filters.end, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        filters.start = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        state.refilter();
        assert_eq!(state.report.metrics.transaction_count, 2);
    }

    #[test]
    fn calculator_prediction() {
        assert_eq!(CalculatorInputs::default().predicted_sales(), Some(dec("10")));
        let calc = CalculatorInputs {
            price: -3.0,
            quantity: 5,
        };
        assert_eq!(calc.predicted_sales(), Some(Decimal::ZERO));
    }

    #[test]
    fn calculator_extremes_are_out_of_range() {
        let huge_price = CalculatorInputs {
            price: f64::MAX,
            quantity: 1,
        };
        assert_eq!(huge_price.predicted_sales(), None);

        let huge_product = CalculatorInputs {
            price: 1e12,
            quantity: u64::MAX,
        };
        assert_eq!(huge_product.predicted_sales(), None);

        let max_quantity = CalculatorInputs {
            price: 0.0,
            quantity: u64::MAX,
        };
        assert_eq!(max_quantity.predicted_sales(), Some(Decimal::ZERO));
    }

    #[test]
    fn export_writes_the_filtered_rows() {
        let (dir, _cache, mut state) = opened(Layout::Classic);
        state.toggle_filter_value(Category::Country, "US");
        let out = dir.path().join("filtered_data.csv");
        state.export_to(&out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("TransactionNo,Date,ProductName,Price,Quantity,Country,Sales"));
    }

    #[test]
    fn reload_picks_up_changes() {
        let (dir, mut cache, mut state) = opened(Layout::Classic);
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, format!("{CSV}5,3/5/2023,Gizmo,1,1,Peru\n")).unwrap();

        state.open(&mut cache, &path);
        assert_eq!(state.report.metrics.transaction_count, 3);

        state.reload(&mut cache);
        assert_eq!(state.report.metrics.transaction_count, 4);
    }
}
