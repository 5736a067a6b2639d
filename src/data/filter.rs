use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::model::{Dataset, Transaction};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Selected values of one category column (country or product).
///
/// An empty selection places no restriction: every record passes. Clearing a
/// multi-select therefore shows everything rather than nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection(BTreeSet<String>);

impl CategorySelection {
    /// No restriction.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to the given values.
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Whether a record with this value passes.
    pub fn allows(&self, value: &str) -> bool {
        self.0.is_empty() || self.0.contains(value)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn insert(&mut self, value: impl Into<String>) {
        self.0.insert(value.into());
    }

    pub fn remove(&mut self, value: &str) {
        self.0.remove(value);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An interval inclusive on both ends. `min > max` admits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: &T) -> bool {
        &self.min <= value && value <= &self.max
    }
}

/// The user's current selection. `Default` selects every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub dates: Option<Bounds<NaiveDate>>,
    pub countries: CategorySelection,
    pub products: CategorySelection,
    pub price: Option<Bounds<Decimal>>,
    pub quantity: Option<Bounds<u64>>,
}

impl FilterCriteria {
    /// Date filter from the endpoints a date-range picker reports. While the
    /// user has picked fewer than two dates there is no date filter.
    pub fn with_date_endpoints(mut self, endpoints: &[NaiveDate]) -> Self {
        self.dates = match endpoints {
            [start, end, ..] => Some(Bounds::new(*start, *end)),
            _ => None,
        };
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.dates = Some(Bounds::new(start, end));
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = CategorySelection::only(countries);
        self
    }

    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = CategorySelection::only(products);
        self
    }

    pub fn with_price(mut self, min: Decimal, max: Decimal) -> Self {
        self.price = Some(Bounds::new(min, max));
        self
    }

    pub fn with_quantity(mut self, min: u64, max: u64) -> Self {
        self.quantity = Some(Bounds::new(min, max));
        self
    }

    /// Whether a record passes every criterion.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.dates.map_or(true, |b| b.contains(&tx.date))
            && self.countries.allows(&tx.country)
            && self.products.allows(&tx.product_name)
            && self.price.map_or(true, |b| b.contains(&tx.price))
            && self.quantity.map_or(true, |b| b.contains(&tx.quantity))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Return indices of records that pass all criteria, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, tx)| criteria.matches(tx))
        .map(|(i, _)| i)
        .collect()
}

/// Apply `criteria` to the whole dataset.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    FilteredView {
        dataset,
        indices: filtered_indices(dataset, criteria),
    }
}

/// An ordered subset of a dataset, held as record indices.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Every record of the dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Rebuild a view from indices kept elsewhere (e.g. in UI state).
    /// Indices past the end of the dataset are dropped.
    pub fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        let indices = indices.into_iter().filter(|&i| i < dataset.len()).collect();
        Self { dataset, indices }
    }

    /// Narrow this view further, keeping relative order.
    pub fn refine(&self, criteria: &FilterCriteria) -> FilteredView<'a> {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| criteria.matches(&self.dataset.records[i]))
            .collect();
        FilteredView {
            dataset: self.dataset,
            indices,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_util::{date, dec, shop_dataset, two_row_dataset};

    fn products(view: &FilteredView) -> Vec<String> {
        view.iter().map(|tx| tx.product_name.clone()).collect()
    }

    #[test]
    fn default_criteria_keep_everything_in_order() {
        let ds = shop_dataset();
        let view = apply(&ds, &FilterCriteria::default());
        assert_eq!(view.indices(), FilteredView::all(&ds).indices());
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn country_filter_on_the_two_row_example() {
        let ds = two_row_dataset();
        let view = apply(&ds, &FilterCriteria::default().with_countries(["US"]));
        assert_eq!(products(&view), vec!["Widget"]);
    }

    #[test]
    fn empty_category_selection_passes_everything() {
        let ds = shop_dataset();
        let criteria = FilterCriteria {
            countries: CategorySelection::only(Vec::<String>::new()),
            products: CategorySelection::all(),
            ..FilterCriteria::default()
        };
        assert!(criteria.countries.is_unrestricted());
        assert_eq!(apply(&ds, &criteria).len(), ds.len());
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let ds = shop_dataset();
        let criteria = FilterCriteria::default().with_dates(date(2023, 1, 3), date(2023, 2, 1));
        let view = apply(&ds, &criteria);
        assert_eq!(products(&view), vec!["Card", "Clock", "Mug", "Lamp"]);
    }

    #[test]
    fn incomplete_date_endpoints_mean_no_date_filter() {
        let ds = shop_dataset();
        let one = FilterCriteria::default().with_date_endpoints(&[date(2023, 3, 1)]);
        assert_eq!(one.dates, None);
        assert_eq!(apply(&ds, &one).len(), ds.len());

        let none = FilterCriteria::default().with_date_endpoints(&[]);
        assert_eq!(none.dates, None);

        let two = FilterCriteria::default().with_date_endpoints(&[date(2023, 3, 1), date(2023, 3, 31)]);
        assert_eq!(apply(&ds, &two).len(), 3);
    }

    #[test]
    fn reversed_date_range_selects_nothing() {
        let ds = shop_dataset();
        let criteria = FilterCriteria::default().with_dates(date(2023, 3, 1), date(2023, 1, 1));
        assert!(apply(&ds, &criteria).is_empty());
    }

    #[test]
    fn numeric_ranges_are_inclusive() {
        let ds = shop_dataset();
        let by_price = FilterCriteria::default().with_price(dec("4.50"), dec("15"));
        assert_eq!(
            products(&apply(&ds, &by_price)),
            vec!["Mug", "Lamp", "Mug", "Lamp", "Vase"]
        );

        let by_quantity = FilterCriteria::default().with_quantity(10, 25);
        assert_eq!(products(&apply(&ds, &by_quantity)), vec!["Mug", "Card", "Mug"]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let ds = shop_dataset();
        let criteria = FilterCriteria::default()
            .with_countries(["UK", "France"])
            .with_products(["Card", "Lamp"])
            .with_dates(date(2023, 1, 1), date(2023, 12, 31));
        assert_eq!(products(&apply(&ds, &criteria)), vec!["Card", "Lamp", "Card"]);
    }

    #[test]
    fn refining_with_the_same_criteria_is_idempotent() {
        let ds = shop_dataset();
        let all_criteria = [
            FilterCriteria::default(),
            FilterCriteria::default().with_countries(["UK"]),
            FilterCriteria::default().with_price(dec("2"), dec("12")).with_quantity(2, 30),
            FilterCriteria::default().with_dates(date(2024, 1, 1), date(2024, 12, 31)),
        ];
        for criteria in &all_criteria {
            let once = apply(&ds, criteria);
            let twice = once.refine(criteria);
            assert_eq!(once.indices(), twice.indices(), "{criteria:?}");
        }
    }

    #[test]
    fn from_indices_drops_out_of_range() {
        let ds = two_row_dataset();
        let view = FilteredView::from_indices(&ds, vec![1, 7]);
        assert_eq!(view.indices(), &[1]);
    }
}
