use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Shape, Stroke, Ui, Vec2, vec2};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};
use sales_lens::data::aggregate::{Correlation, ItemDistribution, YearMonth};

use crate::color::{ColorMap, coolwarm, contrast_text};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Bar chart: total units sold by region
// ---------------------------------------------------------------------------

pub fn units_by_region(ui: &mut Ui, totals: &BTreeMap<String, i64>, colors: &ColorMap) {
    let names: Vec<String> = totals.keys().cloned().collect();
    let bars: Vec<Bar> = totals
        .iter()
        .enumerate()
        .map(|(i, (region, &units))| {
            Bar::new(i as f64, units as f64)
                .name(region)
                .fill(colors.color_for(region))
                .width(0.6)
        })
        .collect();

    Plot::new("units_by_region")
        .height(CHART_HEIGHT)
        .x_axis_label("Region")
        .y_axis_label("Total Units Sold")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Units"));
        });
}

// ---------------------------------------------------------------------------
// Line chart: units sold per month
// ---------------------------------------------------------------------------

pub fn units_over_time(ui: &mut Ui, totals: &BTreeMap<YearMonth, i64>) {
    let points: Vec<[f64; 2]> = totals
        .iter()
        .map(|(month, &units)| [month.ordinal() as f64, units as f64])
        .collect();

    Plot::new("units_over_time")
        .height(CHART_HEIGHT)
        .x_axis_label("Order Month")
        .y_axis_label("Total Units Sold")
        .x_axis_formatter(|mark, _range| {
            let ordinal = mark.value.round();
            if (mark.value - ordinal).abs() > 1e-6 {
                return String::new();
            }
            YearMonth::from_ordinal(ordinal as i64).to_string()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Units")
                    .color(Color32::from_rgb(31, 119, 180))
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(4.0)
                    .color(Color32::from_rgb(31, 119, 180)),
            );
        });
}

// ---------------------------------------------------------------------------
// Pie chart: distribution of items
// ---------------------------------------------------------------------------

pub fn item_pie(ui: &mut Ui, dist: &ItemDistribution, colors: &ColorMap) {
    if dist.is_empty() {
        ui.label("No items in the current selection.");
        return;
    }

    let size = vec2(ui.available_width().min(420.0), CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.38;
    let text_color = ui.visuals().text_color();

    // Start at twelve o'clock and sweep clockwise.
    let mut angle = -FRAC_PI_2;
    for (item, count) in dist.ranked() {
        let sweep = TAU * count as f32 / dist.total as f32;
        let color = colors.color_for(item);

        // Fan of thin triangles so slices wider than 180° stay convex.
        let steps = ((sweep / 0.05).ceil() as usize).max(1);
        let rim: Vec<egui::Pos2> = (0..=steps)
            .map(|s| center + radius * Vec2::angled(angle + sweep * s as f32 / steps as f32))
            .collect();
        for edge in rim.windows(2) {
            painter.add(Shape::convex_polygon(
                vec![center, edge[0], edge[1]],
                color,
                Stroke::NONE,
            ));
        }

        let mid = Vec2::angled(angle + sweep / 2.0);
        painter.text(
            center + radius * 0.62 * mid,
            Align2::CENTER_CENTER,
            format!("{:.1}%", dist.share(item)),
            FontId::proportional(12.0),
            contrast_text(color),
        );
        let label_align = if mid.x >= 0.0 {
            Align2::LEFT_CENTER
        } else {
            Align2::RIGHT_CENTER
        };
        painter.text(
            center + radius * 1.08 * mid,
            label_align,
            item,
            FontId::proportional(13.0),
            text_color,
        );

        angle += sweep;
    }
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

pub fn correlation_heatmap(ui: &mut Ui, correlation: &Correlation) {
    let matrix = match correlation {
        Correlation::Matrix(m) => m,
        Correlation::NotComputable(reason) => {
            ui.label(format!("Correlation not computable: {reason}."));
            return;
        }
    };

    let cell = 90.0;
    let label_width = 90.0;
    let header_height = 22.0;
    let n = Correlation::LABELS.len();
    let size = vec2(label_width + cell * n as f32, header_height + cell * n as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + vec2(label_width, header_height);
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(13.0);

    for (i, label) in Correlation::LABELS.iter().enumerate() {
        painter.text(
            origin + vec2(cell * (i as f32 + 0.5), -header_height / 2.0),
            Align2::CENTER_CENTER,
            *label,
            font.clone(),
            text_color,
        );
        painter.text(
            origin + vec2(-6.0, cell * (i as f32 + 0.5)),
            Align2::RIGHT_CENTER,
            *label,
            font.clone(),
            text_color,
        );
    }

    for (i, row) in matrix.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let cell_rect = Rect::from_min_size(
                origin + vec2(cell * j as f32, cell * i as f32),
                Vec2::splat(cell),
            );
            let fill = coolwarm(value);
            painter.rect_filled(cell_rect.shrink(1.0), 0.0, fill);
            painter.text(
                cell_rect.center(),
                Align2::CENTER_CENTER,
                format!("{value:.2}"),
                FontId::proportional(15.0),
                contrast_text(fill),
            );
        }
    }
}
