use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::config::PREVIEW_ROWS;
use crate::data::metrics::DerivedRow;

const HEADERS: [&str; 9] = [
    "Date",
    "Country",
    "Confirmed",
    "Recovered",
    "Deaths",
    "Active",
    "DailyConfirmed",
    "GrowthRate",
    "MA7_Confirmed",
];

/// Cell texts of one preview row, in `HEADERS` order.
fn cells(row: &DerivedRow) -> [String; 9] {
    let opt = |v: Option<f64>, digits: usize| v.map_or_else(|| "–".to_string(), |v| format!("{v:.digits$}"));
    [
        row.record.date.to_string(),
        row.record.country.clone(),
        row.record.confirmed.to_string(),
        row.record.recovered.to_string(),
        row.record.deaths.to_string(),
        row.active.to_string(),
        format!("{:.0}", row.daily_confirmed),
        opt(row.growth_rate, 4),
        opt(row.ma_confirmed, 1),
    ]
}

/// First rows of the filtered view with the derived columns.
pub fn preview(ui: &mut Ui, rows: &[DerivedRow]) {
    if rows.is_empty() {
        ui.label(RichText::new("No rows in the selected range.").italics().weak());
        return;
    }

    let shown = &rows[..rows.len().min(PREVIEW_ROWS)];
    ui.push_id("preview_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(70.0), HEADERS.len())
            .header(20.0, |mut header| {
                for h in HEADERS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for row in shown {
                    body.row(18.0, |mut table_row| {
                        for text in cells(row) {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(text);
                            });
                        }
                    });
                }
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::metrics::derive;
    use crate::data::model::tests::rec;

    #[test]
    fn cells_follow_header_order() {
        let rows = derive(
            &[
                rec("Peru", "2020-05-01", 100, 3, 40),
                rec("Peru", "2020-05-02", 130, 4, 55),
            ],
            7,
        );
        let c = cells(&rows[1]);
        assert_eq!(c[0], "2020-05-02");
        assert_eq!(c[2], "130");
        assert_eq!(c[3], "55");
        assert_eq!(c[4], "4");
        assert_eq!(c[5], "71");
        assert_eq!(c[6], "30");
        assert_eq!(c[7], "0.3000");
        assert_eq!(c[8], "–");
    }
}
