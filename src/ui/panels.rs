use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use sales_dashboard::data::cache::DatasetCache;
use sales_dashboard::data::export::EXPORT_FILE_NAME;

use crate::args::Layout;
use crate::state::{AppState, Category, FilterInputs};
use crate::ui::{format_count, format_money};

/// A multi-select change, applied once the widgets release the state.
enum FilterAction {
    Toggle(Category, String),
    SelectAll(Category),
    SelectNone(Category),
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets and calculator
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.heading("Filters");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    };
    let layout = state.layout;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let Some(filters) = state.filters.as_mut() else {
                return;
            };
            let before = filters.criteria(layout);

            let mut actions = Vec::new();
            match layout {
                Layout::Classic => {
                    ui.heading("Filters");
                    ui.separator();
                    date_range(ui, filters);
                    ui.separator();
                    multi_select(ui, "Select Country", Category::Country, &dataset.countries, filters, &mut actions);
                    multi_select(ui, "Select Product", Category::Product, &dataset.products, filters, &mut actions);
                }
                Layout::Tabbed => {
                    ui.heading("🔍 Filters");
                    ui.separator();
                    egui::CollapsingHeader::new("📅 Date Range")
                        .default_open(true)
                        .show(ui, |ui: &mut Ui| date_range(ui, filters));
                    egui::CollapsingHeader::new("🌍 Country & Product Filters")
                        .default_open(false)
                        .show(ui, |ui: &mut Ui| {
                            single_select(ui, "Select Country", &dataset.countries, &mut filters.country_choice);
                            single_select(ui, "Select Product", &dataset.products, &mut filters.product_choice);
                        });
                    egui::CollapsingHeader::new("⚙️ Advanced Filters")
                        .default_open(false)
                        .show(ui, |ui: &mut Ui| range_sliders(ui, filters));
                }
            }

            let changed = filters.criteria(layout) != before;

            for action in actions {
                match action {
                    FilterAction::Toggle(category, value) => state.toggle_filter_value(category, &value),
                    FilterAction::SelectAll(category) => state.select_all(category),
                    FilterAction::SelectNone(category) => state.select_none(category),
                }
            }
            if changed {
                state.refilter();
            }

            ui.add_space(8.0);
            ui.separator();
            calculator(ui, state);
        });
}

fn date_range(ui: &mut Ui, filters: &mut FilterInputs) {
    ui.strong("Select Date Range");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("From");
        ui.add(DatePickerButton::new(&mut filters.start).id_salt("date_start"));
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("To");
        ui.add(DatePickerButton::new(&mut filters.end).id_salt("date_end"));
    });
}

/// Checkbox list with All / None buttons. Changes are queued in `actions`.
fn multi_select(
    ui: &mut Ui,
    title: &str,
    category: Category,
    values: &[String],
    filters: &FilterInputs,
    actions: &mut Vec<FilterAction>,
) {
    let selected = match category {
        Category::Country => &filters.countries,
        Category::Product => &filters.products,
    };
    let header_text = format!("{title}  ({}/{})", selected.len(), values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    actions.push(FilterAction::SelectAll(category));
                }
                if ui.small_button("None").clicked() {
                    actions.push(FilterAction::SelectNone(category));
                }
            });
            if selected.is_unrestricted() {
                ui.weak("Nothing selected: showing all");
            }
            for value in values {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    actions.push(FilterAction::Toggle(category, value.clone()));
                }
            }
        });
}

/// "All" followed by every value; `None` stands for "All".
fn single_select(ui: &mut Ui, title: &str, values: &[String], choice: &mut Option<String>) {
    ui.label(title);
    let current = choice.as_deref().unwrap_or("All").to_owned();
    egui::ComboBox::from_id_salt(title)
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(choice, None, "All");
            for value in values {
                ui.selectable_value(choice, Some(value.clone()), value.as_str());
            }
        });
}

fn range_sliders(ui: &mut Ui, filters: &mut FilterInputs) {
    let (price_lo, price_hi) = filters.price_extent;
    ui.strong("Price Range");
    ui.add(egui::Slider::new(&mut filters.price.0, price_lo..=price_hi).text("min"));
    ui.add(egui::Slider::new(&mut filters.price.1, price_lo..=price_hi).text("max"));
    if filters.price.0 > filters.price.1 {
        filters.price.1 = filters.price.0;
    }

    let (qty_lo, qty_hi) = filters.quantity_extent;
    ui.strong("Quantity Range");
    ui.add(egui::Slider::new(&mut filters.quantity.0, qty_lo..=qty_hi).text("min"));
    ui.add(egui::Slider::new(&mut filters.quantity.1, qty_lo..=qty_hi).text("max"));
    if filters.quantity.0 > filters.quantity.1 {
        filters.quantity.1 = filters.quantity.0;
    }
}

fn calculator(ui: &mut Ui, state: &mut AppState) {
    let title = match state.layout {
        Layout::Classic => "Predictive Sales Calculator",
        Layout::Tabbed => "🔮 Predictive Sales Calculator",
    };
    ui.heading(title);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Enter Product Price");
        ui.add(
            egui::DragValue::new(&mut state.calculator.price)
                .range(0.0..=f64::MAX)
                .speed(1.0)
                .prefix("$"),
        );
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Enter Quantity Sold");
        ui.add(
            egui::DragValue::new(&mut state.calculator.quantity)
                .range(0..=u64::MAX)
                .speed(1.0),
        );
    });
    let predicted = match state.calculator.predicted_sales() {
        Some(sales) => format_money(sales),
        None => "out of range".to_string(),
    };
    ui.label(RichText::new(format!("Predicted Sales: {predicted}")).strong());
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, cache: &mut DatasetCache) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, cache);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload(cache);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export filtered data…"))
                .clicked()
            {
                save_export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} transactions loaded, {} visible",
                format_count(ds.len() as u64),
                format_count(state.report.visible_indices.len() as u64)
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::YELLOW));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, cache: &mut DatasetCache) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open(cache, &path);
    }
}

/// Ask where to save the filtered rows and write them there.
pub fn save_export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data as CSV")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_to(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
