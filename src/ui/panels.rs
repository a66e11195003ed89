use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::EXPORT_FILE_NAME;
use crate::data::export;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔎 Filter Options");
    ui.separator();

    let Some(dataset) = state.dataset.as_ref().filter(|ds| !ds.is_empty()) else {
        if state.loading {
            ui.horizontal(|ui: &mut Ui| {
                ui.spinner();
                ui.label("Loading data…");
            });
        } else {
            ui.label("No dataset loaded.");
        }
        return;
    };

    // Clone what we need so we can mutate state below.
    let countries = dataset.countries.clone();
    let (first, last) = (dataset.first_date, dataset.last_date);

    // ---- Country selector ----
    ui.strong("Select Country");
    let mut country = state.country.clone();
    egui::ComboBox::from_id_salt("country")
        .selected_text(&country)
        .width(ui.available_width())
        .height(320.0)
        .show_ui(ui, |ui: &mut Ui| {
            for c in &countries {
                ui.selectable_value(&mut country, c.clone(), c.as_str());
            }
        });
    state.set_country(country);
    ui.add_space(6.0);

    // ---- Date range ----
    let mut start = state.range.start;
    let mut end = state.range.end;
    egui::Grid::new("date_range")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("Start Date");
            ui.add(DatePickerButton::new(&mut start).id_salt("start_date"));
            ui.end_row();
            ui.label("End Date");
            ui.add(DatePickerButton::new(&mut end).id_salt("end_date"));
            ui.end_row();
        });
    state.set_start(start);
    state.set_end(end);

    if ui
        .small_button("Full range")
        .on_hover_text(format!("{first} to {last}"))
        .clicked()
    {
        state.set_start(first);
        state.set_end(last);
    }
    ui.add_space(6.0);

    // ---- Download ----
    let n_rows = state.view.rows.len();
    if ui
        .add_enabled(n_rows > 0, egui::Button::new("📥 Download filtered data as CSV"))
        .clicked()
    {
        save_filtered_dialog(state);
    }
    ui.separator();

    // ---- Comparison multi-select ----
    let header = format!("Compare Countries  ({}/{})", state.compare.len(), countries.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("compare")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Search");
                ui.text_edit_singleline(&mut state.compare_search);
            });
            let needle = state.compare_search.to_lowercase();

            ScrollArea::vertical()
                .id_salt("compare_list")
                .max_height(280.0)
                .auto_shrink([false, true])
                .show(ui, |ui: &mut Ui| {
                    for c in &countries {
                        if !needle.is_empty() && !c.to_lowercase().contains(&needle) {
                            continue;
                        }
                        let mut checked = state.compare.contains(c);
                        let mut text = RichText::new(c);
                        if checked {
                            text = text.color(state.view.compare_colors.color_for(c));
                        }
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_compare(c);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.loading, egui::Button::new("Reload"))
                .clicked()
            {
                state.request_reload();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(!state.view.rows.is_empty(), egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                save_filtered_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading {
            ui.spinner();
            ui.label("Loading…");
        } else if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows, {} countries, {} in view",
                ds.len(),
                ds.countries.len(),
                state.view.rows.len()
            ));
            if let Some(origin) = &state.origin {
                ui.label(RichText::new(origin).weak().small());
            }
        }

        if let Some(msg) = &state.warning {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::from_rgb(230, 160, 30)));
        }
        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open countries-aggregated CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.request_file(path);
    }
}

pub fn save_filtered_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    let Some(path) = file else {
        return;
    };
    match export::export_to_path(&state.filtered_records(), &path) {
        Ok(_) => state.status_message = None,
        Err(e) => {
            log::error!("Failed to export: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
