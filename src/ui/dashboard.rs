use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use sales_dashboard::data::export::{EXPORT_FILE_NAME, EXPORT_MIME};
use sales_dashboard::data::model::{Dataset, Transaction};
use sales_dashboard::data::report::SummaryMetrics;

use crate::args::Layout;
use crate::state::{AppState, Tab};
use crate::ui::{format_count, format_money, panels, plot};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the central panel for the configured layout.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if let Some(err) = &state.load_error {
        error_screen(ui, err);
        return;
    }
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales file to begin  (File → Open…)");
        });
        return;
    }

    match state.layout {
        Layout::Classic => classic_page(ui, state),
        Layout::Tabbed => tabbed_page(ui, state),
    }
}

fn error_screen(ui: &mut Ui, err: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading(RichText::new("Unable to load sales data").color(Color32::LIGHT_RED));
        ui.add_space(8.0);
        ui.label(err);
        ui.add_space(8.0);
        ui.weak("Use File → Open… to choose another file.");
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.heading(RichText::new(value).strong());
    });
}

fn metrics_row(ui: &mut Ui, m: &SummaryMetrics, layout: Layout) {
    ui.columns(3, |cols| match layout {
        Layout::Classic => {
            metric(&mut cols[0], "Total Sales", format_money(m.total_sales));
            metric(&mut cols[1], "Total Transactions", m.transaction_count.to_string());
            metric(&mut cols[2], "Total Quantity Sold", m.total_quantity.to_string());
        }
        Layout::Tabbed => {
            metric(&mut cols[0], "💰 Total Sales", format_money(m.total_sales));
            metric(
                &mut cols[1],
                "🛒 Total Transactions",
                format_count(m.transaction_count as u64),
            );
            metric(&mut cols[2], "📦 Total Quantity Sold", format_count(m.total_quantity));
        }
    });
}

// ---------------------------------------------------------------------------
// Classic layout: one scrolling page
// ---------------------------------------------------------------------------

fn classic_page(ui: &mut Ui, state: &mut AppState) {
    let mut export_clicked = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let report = &state.report;
            metrics_row(ui, &report.metrics, Layout::Classic);
            ui.separator();

            ui.heading("Sales Over Time");
            plot::sales_over_time(ui, "classic_time", &report.sales_over_time);

            ui.heading(format!("Top {} Products by Sales", state.top_n));
            plot::ranked_bars(ui, "classic_products", "Sales", &report.top_products);

            ui.heading("Sales by Country");
            plot::ranked_bars(ui, "classic_countries", "Sales", &report.sales_by_country);

            ui.heading("Seasonal Sales Heatmap");
            plot::seasonal_heatmap(ui, "classic_heatmap", &report.heatmap);

            ui.heading("Quantity vs. Sales");
            plot::quantity_vs_sales(
                ui,
                "classic_scatter",
                &report.scatter,
                state.country_colors.as_ref(),
            );

            ui.add_space(8.0);
            export_clicked = download_button(ui).clicked();
        });

    if export_clicked {
        panels::save_export_dialog(state);
    }
}

// ---------------------------------------------------------------------------
// Tabbed layout
// ---------------------------------------------------------------------------

fn tabbed_page(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.tab, Tab::Summary, "📈 Summary Metrics");
        ui.selectable_value(&mut state.tab, Tab::Visualizations, "📊 Visualizations");
        ui.selectable_value(&mut state.tab, Tab::Download, "📥 Data Download");
    });
    ui.separator();

    match state.tab {
        Tab::Summary => summary_tab(ui, state),
        Tab::Visualizations => visualizations_tab(ui, state),
        Tab::Download => download_tab(ui, state),
    }
}

fn summary_tab(ui: &mut Ui, state: &AppState) {
    ui.heading("🧾 Key Metrics");
    metrics_row(ui, &state.report.metrics, Layout::Tabbed);
    ui.separator();
    ui.heading("Sales Over Time");
    plot::sales_over_time(ui, "tabbed_time", &state.report.sales_over_time);
}

fn visualizations_tab(ui: &mut Ui, state: &AppState) {
    let report = &state.report;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("📊 Visualizations");
            ui.columns(2, |cols| {
                cols[0].strong(format!("Top {} Products by Sales", state.top_n));
                plot::ranked_bars(&mut cols[0], "tabbed_products", "Sales", &report.top_products);
                cols[1].strong("Sales by Country");
                plot::ranked_bars(&mut cols[1], "tabbed_countries", "Sales", &report.sales_by_country);
            });

            ui.separator();
            ui.heading("Seasonal Trends Heatmap");
            plot::seasonal_heatmap(ui, "tabbed_heatmap", &report.heatmap);

            ui.separator();
            ui.heading("Quantity vs Sales");
            plot::quantity_vs_sales(
                ui,
                "tabbed_scatter",
                &report.scatter,
                state.country_colors.as_ref(),
            );
        });
}

fn download_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📥 Download Filtered Data");
    if download_button(ui).clicked() {
        panels::save_export_dialog(state);
    }
    ui.add_space(8.0);

    let Some(view) = state.filtered_view() else {
        return;
    };
    let rows: Vec<&Transaction> = view.iter().collect();
    data_table(ui, view.dataset(), &rows);
}

fn download_button(ui: &mut Ui) -> egui::Response {
    ui.button("Download Filtered Data as CSV")
        .on_hover_text(format!("Saves {EXPORT_FILE_NAME} ({EXPORT_MIME})"))
}

/// Scrollable table of the filtered records.
fn data_table(ui: &mut Ui, dataset: &Dataset, rows: &[&Transaction]) {
    let columns = dataset.export_columns();
    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), columns.len())
            .header(20.0, |mut header| {
                for name in &columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    for value in dataset.export_row(rows[row.index()]) {
                        row.col(|ui: &mut Ui| {
                            ui.label(value);
                        });
                    }
                });
            });
    });
}
