use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};
use rust_decimal::Decimal;

use sales_dashboard::data::aggregate::{DailySales, GroupTotal, HeatmapCell, ScatterPoint};

use crate::color::{heat_color, ColorMap};
use crate::ui::{format_money, to_f64};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const CHART_HEIGHT: f32 = 280.0;

fn empty_chart(ui: &mut Ui) {
    ui.weak("No transactions match the current filters.");
}

// ---------------------------------------------------------------------------
// Sales over time
// ---------------------------------------------------------------------------

fn day_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Daily sales as a line chart with a date axis.
pub fn sales_over_time(ui: &mut Ui, id: &str, series: &[DailySales]) {
    if series.is_empty() {
        empty_chart(ui);
        return;
    }

    let points: PlotPoints = series
        .iter()
        .map(|d| [day_to_x(d.date), to_f64(d.sales)])
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Sales")
        .x_axis_formatter(|mark: GridMark, _range| x_to_label(mark.value))
        .label_formatter(|_name, point| format!("{}\n${:.2}", x_to_label(point.x), point.y))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Sales")
                    .color(Color32::from_rgb(31, 119, 180))
                    .width(1.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Ranked horizontal bars (top products, sales by country)
// ---------------------------------------------------------------------------

/// Horizontal bars, first row on top, coloured by their total.
pub fn ranked_bars(ui: &mut Ui, id: &str, value_label: &str, rows: &[GroupTotal]) {
    if rows.is_empty() {
        empty_chart(ui);
        return;
    }

    let n = rows.len();
    let max = rows.iter().map(|r| to_f64(r.sales)).fold(0.0_f64, f64::max);
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(rank, row)| {
            let value = to_f64(row.sales);
            let t = if max > 0.0 { (value / max) as f32 } else { 0.0 };
            Bar::new((n - 1 - rank) as f64, value)
                .name(&row.key)
                .fill(heat_color(t))
        })
        .collect();

    let labels: Vec<String> = rows.iter().rev().map(|r| r.key.clone()).collect();
    let height = (n as f32 * 24.0).max(CHART_HEIGHT);

    Plot::new(id)
        .height(height)
        .x_axis_label(value_label)
        .y_axis_formatter(move |mark: GridMark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > f64::EPSILON || pos < 0.0 {
                return String::new();
            }
            labels.get(pos as usize).cloned().unwrap_or_default()
        })
        .show_grid([true, false])
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
                        format!("{}\n${:.2}", bar.name, bar.value)
                    })),
            );
        });
}

// ---------------------------------------------------------------------------
// Seasonal heatmap
// ---------------------------------------------------------------------------

/// Year × month grid; each cell is shaded by its share of the busiest month.
pub fn seasonal_heatmap(ui: &mut Ui, id: &str, cells: &[HeatmapCell]) {
    if cells.is_empty() {
        empty_chart(ui);
        return;
    }

    let by_year: BTreeMap<i32, BTreeMap<u32, Decimal>> =
        cells.iter().fold(BTreeMap::new(), |mut acc, cell| {
            acc.entry(cell.year)
                .or_default()
                .insert(cell.month, cell.sales);
            acc
        });
    let max = cells.iter().map(|c| to_f64(c.sales)).fold(0.0_f64, f64::max);

    egui::Grid::new(id)
        .spacing([2.0, 2.0])
        .min_col_width(44.0)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for month in MONTHS {
                ui.strong(month);
            }
            ui.end_row();

            for (year, months) in &by_year {
                ui.strong(year.to_string());
                for month in 1..=12u32 {
                    match months.get(&month) {
                        Some(&sales) => {
                            let value = to_f64(sales);
                            let t = if max > 0.0 { (value / max) as f32 } else { 0.0 };
                            let text = if t > 0.5 { Color32::WHITE } else { Color32::BLACK };
                            ui.label(
                                RichText::new(format!("{:>6.0}", value))
                                    .monospace()
                                    .color(text)
                                    .background_color(heat_color(t)),
                            )
                            .on_hover_text(format!(
                                "{} {year}: {}",
                                MONTHS[(month - 1) as usize],
                                format_money(sales)
                            ));
                        }
                        None => {
                            ui.label("");
                        }
                    }
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Quantity vs. sales scatter
// ---------------------------------------------------------------------------

const SIZE_CLASSES: usize = 4;

/// Marker radius grows with the unit price.
fn radius_class(price: f64, max_price: f64) -> usize {
    if max_price <= 0.0 {
        return 0;
    }
    let class = (price / max_price * SIZE_CLASSES as f64) as usize;
    class.min(SIZE_CLASSES - 1)
}

/// Quantity against sales, one colour per country.
pub fn quantity_vs_sales(ui: &mut Ui, id: &str, points: &[ScatterPoint], colors: Option<&ColorMap>) {
    if points.is_empty() {
        empty_chart(ui);
        return;
    }

    let max_price = points.iter().map(|p| to_f64(p.price)).fold(0.0_f64, f64::max);

    // One series per (country, size class): egui_plot sizes a whole series.
    let mut series: BTreeMap<(&str, usize), Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        let class = radius_class(to_f64(p.price), max_price);
        series
            .entry((p.country.as_str(), class))
            .or_default()
            .push([p.quantity as f64, to_f64(p.sales)]);
    }

    Plot::new(id)
        .height(CHART_HEIGHT * 1.4)
        .legend(Legend::default())
        .x_axis_label("Quantity")
        .y_axis_label("Sales")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for ((country, class), coords) in series {
                let color = colors
                    .map(|c| c.color_for(country))
                    .unwrap_or(Color32::LIGHT_BLUE);
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(country)
                        .color(color)
                        .radius(2.0 + class as f32 * 1.5),
                );
            }
        });
}
