use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi, Points, Polygon,
    Text,
};

use crate::color::ContinuousScale;
use crate::data::geo;
use crate::data::metrics::{CORRELATION_COLUMNS, DerivedRow};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;
const LINE_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Date axis helpers
// ---------------------------------------------------------------------------

/// Dates are plotted as day numbers.
pub fn day_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn format_day(x: f64) -> String {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn date_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    format_day(mark.value)
}

/// Tick label for integer positions of a categorical axis.
fn category_label(names: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

/// Line chart over dates with the shared axis and hover formatting.
fn show_date_plot(ui: &mut Ui, id: &str, y_label: &str, legend: bool, add: impl FnOnce(&mut PlotUi)) {
    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label(y_label)
        .x_axis_formatter(date_axis)
        .label_formatter(|name, value| {
            let prefix = if name.is_empty() { String::new() } else { format!("{name}\n") };
            format!("{prefix}{}\n{:.2}", format_day(value.x), value.y)
        })
        .allow_scroll(false);
    if legend {
        plot = plot.legend(Legend::default());
    }
    plot.show(ui, add);
}

fn placeholder(ui: &mut Ui, message: &str) {
    ui.label(RichText::new(message).italics().weak());
}

fn series<F>(rows: &[DerivedRow], y: F) -> Vec<[f64; 2]>
where
    F: Fn(&DerivedRow) -> Option<f64>,
{
    rows.iter()
        .filter_map(|r| y(r).map(|v| [day_x(r.record.date), v]))
        .collect()
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// Confirmed cases of the selected country over the date range.
pub fn confirmed_over_time(ui: &mut Ui, state: &AppState) {
    ui.heading("📈 Confirmed Cases Over Time");
    if state.view.rows.is_empty() {
        placeholder(ui, "No rows in the selected range.");
        return;
    }
    let points = series(&state.view.rows, |r| Some(r.record.confirmed as f64));
    show_date_plot(ui, "confirmed_plot", "Confirmed", false, |plot_ui| {
        plot_ui.line(Line::new(points).name("Confirmed").color(LINE_COLOR).width(2.0));
    });
}

/// Time series with a range selector: an overview strip with the selected
/// window highlighted, two sliders, and the zoomed chart.
pub fn time_series_with_range_selector(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📈 Time Series with Range Selector");
    if state.view.rows.is_empty() {
        placeholder(ui, "No rows in the selected range.");
        return;
    }

    let window = state.windowed_rows();
    let zoomed = series(window, |r| Some(r.record.confirmed as f64));
    show_date_plot(ui, "range_zoomed_plot", "Confirmed", false, |plot_ui| {
        plot_ui.line(Line::new(zoomed).name("Confirmed").color(LINE_COLOR).width(2.0));
    });

    let all = series(&state.view.rows, |r| Some(r.record.confirmed as f64));
    let max_y = state
        .view
        .rows
        .iter()
        .map(|r| r.record.confirmed as f64)
        .fold(0.0, f64::max)
        .max(1.0);
    let (from_x, to_x) = match (window.first(), window.last()) {
        (Some(a), Some(b)) => (day_x(a.record.date) - 0.5, day_x(b.record.date) + 0.5),
        _ => (0.0, 0.0),
    };
    Plot::new("range_overview_plot")
        .height(70.0)
        .show_axes([true, false])
        .x_axis_formatter(date_axis)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(all).color(Color32::GRAY));
            plot_ui.polygon(
                Polygon::new(PlotPoints::from(vec![
                    [from_x, 0.0],
                    [to_x, 0.0],
                    [to_x, max_y],
                    [from_x, max_y],
                ]))
                .fill_color(LINE_COLOR.gamma_multiply(0.25))
                .stroke(Stroke::new(1.0, LINE_COLOR)),
            );
        });

    let dates: Vec<NaiveDate> = state.view.rows.iter().map(|r| r.record.date).collect();
    let last = dates.len() - 1;
    let (mut from, mut to) = state.range_window;
    let fmt = |v: f64, _: RangeInclusive<usize>| {
        dates
            .get(v.round() as usize)
            .map(|d| d.to_string())
            .unwrap_or_default()
    };
    ui.horizontal(|ui: &mut Ui| {
        ui.label("From");
        ui.add(egui::Slider::new(&mut from, 0..=last).custom_formatter(fmt));
        ui.label("To");
        ui.add(egui::Slider::new(&mut to, 0..=last).custom_formatter(fmt));
        if ui.small_button("Reset").clicked() {
            from = 0;
            to = last;
        }
    });
    if (from, to) != state.range_window {
        state.set_range_window(from, to);
    }
}

/// 7-day moving average of confirmed cases.
pub fn moving_average(ui: &mut Ui, state: &AppState) {
    ui.heading("📊 7-Day Moving Average of Confirmed Cases");
    let points = series(&state.view.rows, |r| r.ma_confirmed);
    if points.is_empty() {
        placeholder(ui, "Needs at least 7 days in the selected range.");
        return;
    }
    show_date_plot(ui, "ma_plot", "MA7 Confirmed", false, |plot_ui| {
        plot_ui.line(Line::new(points).name("MA7_Confirmed").color(LINE_COLOR).width(2.0));
    });
}

/// Day-over-day growth of confirmed cases, in percent.
pub fn growth_rate(ui: &mut Ui, state: &AppState) {
    ui.heading("📊 Daily Growth Rate (%)");
    if state.view.rows.is_empty() {
        placeholder(ui, "No rows in the selected range.");
        return;
    }
    let points = series(&state.view.rows, |r| r.growth_rate.map(|g| g * 100.0));
    show_date_plot(ui, "growth_plot", "Growth rate (%)", false, |plot_ui| {
        plot_ui.line(Line::new(points).name("GrowthRate").color(LINE_COLOR).width(1.5));
    });
}

/// One line per compared country.
pub fn comparison(ui: &mut Ui, state: &AppState) {
    ui.heading("📌 Confirmed Cases Comparison Across Countries");
    if state.view.compare.is_empty() {
        placeholder(ui, "Pick countries under \"Compare Countries\" in the side panel.");
        return;
    }
    show_date_plot(ui, "compare_plot", "Confirmed", true, |plot_ui| {
        for (country, rows) in &state.view.compare {
            let points: PlotPoints = rows
                .iter()
                .map(|r| [day_x(r.date), r.confirmed as f64])
                .collect();
            plot_ui.line(
                Line::new(points)
                    .name(country)
                    .color(state.view.compare_colors.color_for(country))
                    .width(1.5),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Histogram of daily new confirmed cases.
pub fn daily_histogram(ui: &mut Ui, state: &AppState) {
    ui.heading("📊 Daily Confirmed Case Distribution");
    let Some(hist) = &state.view.histogram else {
        placeholder(ui, "No rows in the selected range.");
        return;
    };
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            Bar::new(hist.bin_center(i), n as f64)
                .width(hist.bin_width)
                .fill(LINE_COLOR)
        })
        .collect();
    Plot::new("histogram_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("DailyConfirmed")
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars).name(format!("DailyConfirmed (n = {})", hist.total())),
            );
        });
}

/// Daily new cases against growth rate; hovering shows the date.
pub fn daily_vs_growth_scatter(ui: &mut Ui, state: &AppState) {
    ui.heading("📌 Daily Cases vs Growth Rate");
    let labelled: Vec<([f64; 2], NaiveDate)> = state
        .view
        .rows
        .iter()
        .filter_map(|r| r.growth_rate.map(|g| ([r.daily_confirmed, g], r.record.date)))
        .collect();
    if labelled.is_empty() {
        placeholder(ui, "No rows in the selected range.");
        return;
    }
    let points: Vec<[f64; 2]> = labelled.iter().map(|(p, _)| *p).collect();

    Plot::new("scatter_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("DailyConfirmed")
        .y_axis_label("GrowthRate")
        .allow_scroll(false)
        .label_formatter(move |_, value| {
            let date = nearest_date(&labelled, value)
                .map(|d| format!("Date: {d}\n"))
                .unwrap_or_default();
            format!("{date}DailyConfirmed: {:.0}\nGrowthRate: {:.4}", value.x, value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(points).radius(3.0).color(LINE_COLOR).name("rows"));
        });
}

/// Date of the labelled point closest to `value` in relative plot units.
fn nearest_date(points: &[([f64; 2], NaiveDate)], value: &PlotPoint) -> Option<NaiveDate> {
    let span = |axis: usize| {
        let (lo, hi) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (p, _)| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
        (hi - lo).max(f64::EPSILON)
    };
    let (sx, sy) = (span(0), span(1));
    points
        .iter()
        .map(|(p, d)| {
            let dx = (p[0] - value.x) / sx;
            let dy = (p[1] - value.y) / sy;
            (dx * dx + dy * dy, *d)
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, d)| d)
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// 4×4 correlation matrix with the coefficient printed in each cell.
pub fn correlation_heatmap(ui: &mut Ui, state: &AppState) {
    ui.heading("🔗 Correlation Matrix");
    if state.view.rows.len() < 2 {
        placeholder(ui, "Needs at least two rows in the selected range.");
        return;
    }

    let names: Vec<String> = CORRELATION_COLUMNS.iter().map(|s| s.to_string()).collect();
    let y_names: Vec<String> = names.iter().rev().cloned().collect();
    let scale = ContinuousScale::red_blue();
    let matrix = state.view.correlation;

    Plot::new("correlation_plot")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_x(false)
        .show_y(false)
        .x_axis_formatter(move |mark, _| category_label(&names, mark.value))
        .y_axis_formatter(move |mark, _| category_label(&y_names, mark.value))
        .show(ui, |plot_ui| {
            for (i, row) in matrix.iter().enumerate() {
                for (j, cell) in row.iter().enumerate() {
                    // Row 0 at the top.
                    let (x, y) = (j as f64, (3 - i) as f64);
                    let fill = cell.map_or(Color32::DARK_GRAY, |r| scale.for_value(r, -1.0, 1.0));
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(vec![
                            [x - 0.5, y - 0.5],
                            [x + 0.5, y - 0.5],
                            [x + 0.5, y + 0.5],
                            [x - 0.5, y + 0.5],
                        ]))
                        .fill_color(fill)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    let label = cell.map_or("n/a".to_string(), |r| format!("{r:.2}"));
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), RichText::new(label).strong())
                            .color(Color32::BLACK),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Latest-date snapshot charts
// ---------------------------------------------------------------------------

/// Countries on a lon/lat plane, coloured by confirmed cases on the latest date.
pub fn global_map(ui: &mut Ui, state: &AppState) {
    ui.heading("🗺 Global Map of Confirmed Cases");
    let Some(snapshot) = &state.snapshot else {
        placeholder(ui, "No data loaded.");
        return;
    };
    ui.label(format!("Confirmed Cases on {}", snapshot.date));

    let (placed, unmapped) = geo::place(&snapshot.rows);
    let max = placed.iter().map(|p| p.confirmed).max().unwrap_or(0) as f64;
    let scale = ContinuousScale::reds();

    Plot::new("map_plot")
        .height(CHART_HEIGHT + 80.0)
        .data_aspect(1.0)
        .include_x(-180.0)
        .include_x(180.0)
        .include_y(-60.0)
        .include_y(85.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_scroll(false)
        .label_formatter(|name, value| {
            if name.is_empty() {
                format!("{:.1}, {:.1}", value.y, value.x)
            } else {
                name.to_string()
            }
        })
        .show(ui, |plot_ui| {
            for p in &placed {
                let color = scale.for_value(p.confirmed as f64, 0.0, max);
                plot_ui.points(
                    Points::new(vec![[p.lon, p.lat]])
                        .radius(6.0)
                        .filled(true)
                        .color(color)
                        .name(format!("{}: {} confirmed", p.country, p.confirmed)),
                );
            }
        });

    if !unmapped.is_empty() {
        ui.label(
            RichText::new(format!("Not on the map: {}", unmapped.join(", ")))
                .small()
                .weak(),
        );
    }
}

/// Top countries by confirmed cases on the latest date.
pub fn top_countries(ui: &mut Ui, state: &AppState) {
    ui.heading("🔢 Top 10 Countries by Confirmed Cases");
    let Some(snapshot) = &state.snapshot else {
        placeholder(ui, "No data loaded.");
        return;
    };
    ui.label(format!(
        "Top 10 Countries by Confirmed Cases on {}",
        snapshot.date
    ));

    let names: Vec<String> = snapshot.top.iter().map(|r| r.country.clone()).collect();
    let (min, max) = snapshot
        .top
        .iter()
        .map(|r| r.confirmed as f64)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let scale = ContinuousScale::reds();
    let bars: Vec<Bar> = snapshot
        .top
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new(i as f64, r.confirmed as f64)
                .name(&r.country)
                .width(0.7)
                .fill(scale.for_value(r.confirmed as f64, min, max))
        })
        .collect();

    Plot::new("top_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("Country")
        .y_axis_label("Confirmed")
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _| category_label(&names, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Confirmed"));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_axis_round_trips() {
        let d = NaiveDate::from_ymd_opt(2021, 7, 4).unwrap();
        assert_eq!(format_day(day_x(d)), "2021-07-04");
        assert_eq!(format_day(day_x(d) + 0.3), "2021-07-04");
        assert_eq!(format_day(f64::NAN), "");
    }

    #[test]
    fn category_ticks_only_on_integers() {
        let names = vec!["A".to_string(), "B".to_string()];
        assert_eq!(category_label(&names, 1.0), "B");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, -1.0), "");
        assert_eq!(category_label(&names, 5.0), "");
    }

    #[test]
    fn nearest_date_picks_closest_point() {
        let d1 = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
        let pts = vec![([0.0, 0.0], d1), ([100.0, 1.0], d2)];
        assert_eq!(nearest_date(&pts, &PlotPoint::new(90.0, 0.8)), Some(d2));
        assert_eq!(nearest_date(&pts, &PlotPoint::new(5.0, 0.1)), Some(d1));
        assert_eq!(nearest_date(&[], &PlotPoint::new(0.0, 0.0)), None);
    }
}
