use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};
use sales_lens::data::aggregate::{ColumnStats, Describe};
use sales_lens::data::filter::FilteredView;
use sales_lens::data::model::COLUMNS;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable table of the filtered records.
pub fn records_table(ui: &mut Ui, view: &FilteredView<'_>) {
    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(320.0)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(40.0))
        .columns(Column::auto().at_least(80.0).resizable(true), COLUMNS.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for name in COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, view.len(), |mut row| {
                let i = row.index();
                let Some(rec) = view.get(i) else {
                    return;
                };
                row.col(|ui| {
                    ui.weak(i.to_string());
                });
                for c in 0..COLUMNS.len() {
                    row.col(|ui| {
                        ui.label(rec.cell(c));
                    });
                }
            });
        });
}

/// Descriptive statistics: one row per statistic, one column per
/// numeric field.
pub fn describe_table(ui: &mut Ui, stats: &Describe) {
    let columns: [(&str, &ColumnStats); 2] =
        [("Units", &stats.units), ("Unit Price", &stats.unit_price)];

    egui::Grid::new("describe_table")
        .striped(true)
        .num_columns(columns.len() + 1)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for (name, _) in &columns {
                ui.strong(*name);
            }
            ui.end_row();

            for (r, label) in ColumnStats::ROW_LABELS.iter().enumerate() {
                ui.strong(*label);
                for (_, col) in &columns {
                    ui.label(format_stat(col.rows()[r]));
                }
                ui.end_row();
            }
        });
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => "NaN".to_string(),
    }
}
