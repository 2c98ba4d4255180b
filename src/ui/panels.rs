use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;
use sales_lens::data::export::EXPORT_FILE_NAME;

use crate::color::ColorMap;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the "Filter Options" panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let (Some(dataset), Some(criteria)) = (state.dataset.clone(), state.criteria.clone()) else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Regions ----
            match value_checklist(
                ui,
                "Region(s)",
                &dataset.regions,
                &criteria.regions,
                &state.region_colors,
            ) {
                Some(ListAction::Toggle(v)) => state.toggle_region(&v),
                Some(ListAction::All) => state.select_all_regions(true),
                Some(ListAction::None) => state.select_all_regions(false),
                None => {}
            }

            // ---- Items ----
            match value_checklist(
                ui,
                "Item(s)",
                &dataset.items,
                &criteria.items,
                &state.item_colors,
            ) {
                Some(ListAction::Toggle(v)) => state.toggle_item(&v),
                Some(ListAction::All) => state.select_all_items(true),
                Some(ListAction::None) => state.select_all_items(false),
                None => {}
            }

            // ---- Date range ----
            ui.separator();
            ui.strong("Date range");
            let mut start = criteria.date_range.start();
            let mut end = criteria.date_range.end();
            egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("From");
                ui.add(DatePickerButton::new(&mut start).id_salt("date_start"));
                ui.end_row();
                ui.label("To");
                ui.add(DatePickerButton::new(&mut end).id_salt("date_end"));
                ui.end_row();
            });
            if start != criteria.date_range.start() || end != criteria.date_range.end() {
                state.set_date_range(start, end);
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

enum ListAction {
    Toggle(String),
    All,
    None,
}

/// Collapsible checkbox list with All / None buttons. Returns the single
/// change made this frame, if any.
fn value_checklist(
    ui: &mut Ui,
    title: &str,
    all_values: &BTreeSet<String>,
    selected: &BTreeSet<String>,
    colors: &ColorMap,
) -> Option<ListAction> {
    let mut action = None;
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    action = Some(ListAction::All);
                }
                if ui.small_button("None").clicked() {
                    action = Some(ListAction::None);
                }
            });

            for val in all_values {
                let mut checked = selected.contains(val);
                let text = RichText::new(val).color(colors.color_for(val));
                if ui.checkbox(&mut checked, text).changed() {
                    action = Some(ListAction::Toggle(val.clone()));
                }
            }
        });

    action
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Upload…").clicked() {
                upload_file_dialog(state);
                ui.close_menu();
            }
            let has_default = state.default_source.is_some();
            if ui
                .add_enabled(has_default, egui::Button::new("Reload default"))
                .clicked()
            {
                state.load_default();
                ui.close_menu();
            }
            ui.separator();
            let has_data = state.dataset.is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            if let Some(label) = &state.source_label {
                ui.weak(label);
            }
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

fn sales_file_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
}

pub fn open_file_dialog(state: &mut AppState) {
    if let Some(path) = sales_file_dialog("Open sales data").pick_file() {
        state.load_source(sales_lens::Source::Path(path));
    }
}

/// Read a file's bytes and hand them over as an upload.
pub fn upload_file_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Upload your CSV file")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());

    match std::fs::read(&path) {
        Ok(bytes) => state.upload(name, bytes),
        Err(e) => {
            log::error!("Failed to read {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data as CSV")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Ok(()) => {
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
