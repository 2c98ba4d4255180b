use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesLensApp {
    pub state: AppState,
}

impl SalesLensApp {
    pub fn new(mut state: AppState) -> Self {
        state.load_default();
        Self { state }
    }
}

impl eframe::App for SalesLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

/// The report, top to bottom in the order the original dashboard used.
fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(view), Some(summary)) = (state.view(), state.summary.as_ref()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open or upload a sales file to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("📊 Office Supplies Sales Dashboard");
            ui.add_space(8.0);

            ui.strong(format!("Filtered Data (Showing {} rows):", view.len()));
            if view.is_empty() {
                ui.label(
                    RichText::new("The current selection matches no rows.")
                        .color(ui.visuals().warn_fg_color),
                );
            }
            tables::records_table(ui, &view);
            ui.add_space(12.0);

            section(ui, "Summary Statistics");
            tables::describe_table(ui, &summary.describe);

            section(ui, "Total Units Sold by Region");
            plot::units_by_region(ui, &summary.regional_totals, &state.region_colors);

            section(ui, "Sales Trends Over Time");
            plot::units_over_time(ui, &summary.monthly_totals);

            section(ui, "Distribution of Items Sold");
            plot::item_pie(ui, &summary.item_distribution, &state.item_colors);

            section(ui, "Correlation Heatmap");
            plot::correlation_heatmap(ui, &summary.correlation);

            ui.add_space(16.0);
            ui.separator();
            ui.label("Use File → Export filtered CSV… to download the rows above.");
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.separator();
    ui.heading(title);
}
