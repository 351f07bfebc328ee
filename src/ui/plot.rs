use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::currency::{BASE_CURRENCY, format_currency};
use crate::stats::engine::FrequencyTable;
use crate::stats::outlier::OutlierSet;

// ---------------------------------------------------------------------------
// Tendency over time
// ---------------------------------------------------------------------------

/// Average salary per year as a line with markers.
///
/// Keys that do not read as numbers are placed at their rank.
pub fn tendency_plot(ui: &mut Ui, tendency: &[(String, f64)]) {
    let points: Vec<[f64; 2]> = tendency
        .iter()
        .enumerate()
        .map(|(i, (key, avg))| [key.trim().parse::<f64>().unwrap_or(i as f64), *avg])
        .collect();

    Plot::new("tendency_plot")
        .height(260.0)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Average salary (USD)")
        .label_formatter(|_, value| {
            format!("{:.0}\n{}", value.x, format_currency(value.y, BASE_CURRENCY))
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Average salary")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(4.0)
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

// ---------------------------------------------------------------------------
// Frequency bars
// ---------------------------------------------------------------------------

/// Horizontal bars, one per category, most frequent on top.
pub fn frequency_chart(ui: &mut Ui, id: &str, table: &FrequencyTable) {
    let colors = ColorMap::new(table.iter().map(|(label, _)| label.as_str()));
    let n = table.len();
    let bars: Vec<Bar> = table
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            Bar::new((n - i) as f64, *count as f64)
                .name(label)
                .fill(colors.color_for(label))
                .width(0.8)
        })
        .collect();

    Plot::new(id)
        .height((n as f32 * 22.0).clamp(120.0, 420.0))
        .x_axis_label("Count")
        .show_axes([true, false])
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Z-score scatter
// ---------------------------------------------------------------------------

/// Every salary against its row position; flagged rows in red.
pub fn outlier_scatter(ui: &mut Ui, column: &[f64], flagged: &OutlierSet) {
    let marked = flagged.indices();
    let (outliers, inliers): (Vec<[f64; 2]>, Vec<[f64; 2]>) = column
        .iter()
        .enumerate()
        .map(|(i, v)| [i as f64, *v])
        .partition(|p| marked.contains(&(p[0] as usize)));

    let upper = flagged.mean + flagged.threshold * flagged.std_dev;
    let lower = flagged.mean - flagged.threshold * flagged.std_dev;
    let width = column.len().max(1) as f64;

    Plot::new("outlier_scatter")
        .height(260.0)
        .legend(Legend::default())
        .x_axis_label("Record")
        .y_axis_label("Salary (USD)")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(inliers))
                    .name("within threshold")
                    .radius(1.5)
                    .color(Color32::LIGHT_BLUE),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(outliers))
                    .name("outlier")
                    .radius(3.0)
                    .color(Color32::RED),
            );
            for bound in [upper, lower] {
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![[0.0, bound], [width, bound]]))
                        .name("threshold")
                        .color(Color32::GRAY)
                        .style(egui_plot::LineStyle::dashed_loose()),
                );
            }
        });
}
