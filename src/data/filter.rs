use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{CovidDataset, CovidRecord};

// ---------------------------------------------------------------------------
// Date range selection
// ---------------------------------------------------------------------------

/// Inclusive date window chosen in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `None` when the range is usable, otherwise a message for the status line.
    pub fn validate(&self) -> Option<String> {
        if self.start > self.end {
            Some(format!(
                "Start date {} is after end date {}; nothing to show.",
                self.start, self.end
            ))
        } else {
            None
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Rows of one country inside the range, ascending by date.
///
/// An inverted range yields an empty view.
pub fn filter_country(dataset: &CovidDataset, country: &str, range: DateRange) -> Vec<CovidRecord> {
    dataset
        .country_records(country)
        .iter()
        .filter(|r| range.contains(r.date))
        .cloned()
        .collect()
}

/// Per-country views for the comparison chart. Unknown names are skipped.
pub fn filter_countries<'a, I>(
    dataset: &CovidDataset,
    countries: I,
    range: DateRange,
) -> BTreeMap<String, Vec<CovidRecord>>
where
    I: IntoIterator<Item = &'a String>,
{
    countries
        .into_iter()
        .map(|c| (c.clone(), filter_country(dataset, c, range)))
        .filter(|(_, rows)| !rows.is_empty())
        .collect()
}

/// Latest date of the whole table and every row recorded on it.
pub fn latest_snapshot(dataset: &CovidDataset) -> (NaiveDate, Vec<CovidRecord>) {
    let latest = dataset.last_date;
    let rows = dataset
        .records
        .iter()
        .filter(|r| r.date == latest)
        .cloned()
        .collect();
    (latest, rows)
}

/// The `n` rows with the most confirmed cases, largest first.
///
/// Ties keep alphabetical country order.
pub fn top_n(rows: &[CovidRecord], n: usize) -> Vec<CovidRecord> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        b.confirmed
            .cmp(&a.confirmed)
            .then_with(|| a.country.cmp(&b.country))
    });
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::rec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dataset() -> CovidDataset {
        CovidDataset::from_records(vec![
            rec("Italy", "2020-03-01", 10, 0, 0),
            rec("Italy", "2020-03-02", 20, 1, 0),
            rec("Italy", "2020-03-03", 40, 2, 1),
            rec("Spain", "2020-03-01", 5, 0, 0),
            rec("Spain", "2020-03-02", 15, 0, 0),
            rec("Spain", "2020-03-03", 45, 1, 0),
            rec("Chad", "2020-03-03", 1, 0, 0),
        ])
        .unwrap()
    }

    #[test]
    fn bounds_are_inclusive() {
        let ds = dataset();
        let view = filter_country(&ds, "Italy", DateRange::new(date("2020-03-02"), date("2020-03-03")));
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].confirmed, 20);
        assert_eq!(view[1].confirmed, 40);

        let single = filter_country(&ds, "Italy", DateRange::new(date("2020-03-01"), date("2020-03-01")));
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn inverted_range_is_empty_and_flagged() {
        let ds = dataset();
        let range = DateRange::new(date("2020-03-03"), date("2020-03-01"));
        assert!(filter_country(&ds, "Italy", range).is_empty());
        assert!(range.validate().is_some());
        assert!(DateRange::new(date("2020-03-01"), date("2020-03-01")).validate().is_none());
    }

    #[test]
    fn comparison_skips_unknown_countries() {
        let ds = dataset();
        let wanted = vec!["Spain".to_string(), "Narnia".to_string(), "Italy".to_string()];
        let views = filter_countries(&ds, &wanted, DateRange::new(ds.first_date, ds.last_date));
        assert_eq!(views.keys().collect::<Vec<_>>(), vec!["Italy", "Spain"]);
        assert_eq!(views["Spain"].len(), 3);
    }

    #[test]
    fn snapshot_and_ranking() {
        let ds = dataset();
        let (latest, rows) = latest_snapshot(&ds);
        assert_eq!(latest, date("2020-03-03"));
        assert_eq!(rows.len(), 3);

        let top = top_n(&rows, 2);
        let names: Vec<_> = top.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["Spain", "Italy"]);
        assert_eq!(top_n(&rows, 10).len(), 3);
    }
}
