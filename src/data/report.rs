use rust_decimal::Decimal;

use super::aggregate::{
    sales_by_country, sales_over_time, scatter_points, seasonal_heatmap, top_products_by_sales,
    total_quantity, total_sales, transaction_count, DailySales, GroupTotal, HeatmapCell,
    ScatterPoint,
};
use super::filter::{apply, FilterCriteria, FilteredView};
use super::model::Dataset;

/// The three headline numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryMetrics {
    pub total_sales: Decimal,
    pub transaction_count: usize,
    pub total_quantity: u64,
}

/// Everything the dashboard renders for one set of criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardReport {
    /// Records of the filtered view, as dataset indices.
    pub visible_indices: Vec<usize>,
    pub metrics: SummaryMetrics,
    pub sales_over_time: Vec<DailySales>,
    pub top_products: Vec<GroupTotal>,
    pub sales_by_country: Vec<GroupTotal>,
    pub heatmap: Vec<HeatmapCell>,
    pub scatter: Vec<ScatterPoint>,
}

/// Filter the dataset and rebuild every metric and chart series.
///
/// Called by the presentation layer whenever the criteria change.
pub fn recompute(dataset: &Dataset, criteria: &FilterCriteria, top_n: usize) -> DashboardReport {
    let view = apply(dataset, criteria);
    let report = DashboardReport::from_view(&view, top_n);
    log::debug!(
        "Recomputed dashboard: {} of {} records visible",
        report.visible_indices.len(),
        dataset.len()
    );
    report
}

impl DashboardReport {
    pub fn from_view(view: &FilteredView, top_n: usize) -> Self {
        Self {
            visible_indices: view.indices().to_vec(),
            metrics: SummaryMetrics {
                total_sales: total_sales(view),
                transaction_count: transaction_count(view),
                total_quantity: total_quantity(view),
            },
            sales_over_time: sales_over_time(view),
            top_products: top_products_by_sales(view, top_n),
            sales_by_country: sales_by_country(view),
            heatmap: seasonal_heatmap(view),
            scatter: scatter_points(view),
        }
    }

    /// The filtered view this report was built from.
    pub fn view<'a>(&self, dataset: &'a Dataset) -> FilteredView<'a> {
        FilteredView::from_indices(dataset, self.visible_indices.clone())
    }
}
