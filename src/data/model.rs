use std::ops::Range;

use chrono::NaiveDate;

use super::error::DataError;

// ---------------------------------------------------------------------------
// CovidRecord – one row of the countries-aggregated table
// ---------------------------------------------------------------------------

/// Cumulative counts for one country on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CovidRecord {
    pub country: String,
    pub date: NaiveDate,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

impl CovidRecord {
    /// Confirmed − Recovered − Deaths.
    ///
    /// Can go negative where the source revised recoveries upward.
    pub fn active(&self) -> i64 {
        self.confirmed
            .saturating_sub(self.recovered)
            .saturating_sub(self.deaths)
    }
}

// ---------------------------------------------------------------------------
// CovidDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with a per-country index.
#[derive(Debug, Clone)]
pub struct CovidDataset {
    /// All rows, sorted by (country, date).
    pub records: Vec<CovidRecord>,
    /// Sorted unique country names.
    pub countries: Vec<String>,
    /// Earliest date anywhere in the table.
    pub first_date: NaiveDate,
    /// Latest date anywhere in the table.
    pub last_date: NaiveDate,
    /// Row range of each entry of `countries` inside `records`.
    spans: Vec<Range<usize>>,
}

impl CovidDataset {
    /// Sort the rows and build the country index.
    pub fn from_records(mut records: Vec<CovidRecord>) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::Empty);
        }

        records.sort_by(|a, b| a.country.cmp(&b.country).then(a.date.cmp(&b.date)));

        let mut countries: Vec<String> = Vec::new();
        let mut spans: Vec<Range<usize>> = Vec::new();
        for (i, rec) in records.iter().enumerate() {
            match countries.last() {
                Some(last) if *last == rec.country => {
                    if let Some(span) = spans.last_mut() {
                        span.end = i + 1;
                    }
                }
                _ => {
                    countries.push(rec.country.clone());
                    spans.push(i..i + 1);
                }
            }
        }

        let first_date = records.iter().map(|r| r.date).min().ok_or(DataError::Empty)?;
        let last_date = records.iter().map(|r| r.date).max().ok_or(DataError::Empty)?;

        Ok(CovidDataset {
            records,
            countries,
            first_date,
            last_date,
            spans,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty. Always false for a constructed dataset.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All rows of one country in date order (empty for unknown names).
    pub fn country_records(&self, country: &str) -> &[CovidRecord] {
        match self.countries.binary_search_by(|c| c.as_str().cmp(country)) {
            Ok(idx) => &self.records[self.spans[idx].clone()],
            Err(_) => &[],
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn rec(country: &str, date: &str, confirmed: i64, deaths: i64, recovered: i64) -> CovidRecord {
        CovidRecord {
            country: country.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            confirmed,
            deaths,
            recovered,
        }
    }

    #[test]
    fn active_closes_the_identity() {
        let rows = vec![
            rec("Italy", "2020-03-01", 1694, 34, 83),
            rec("Italy", "2020-03-02", 2036, 52, 149),
            rec("Chile", "2021-08-05", 1_630_000, 36_000, 0),
            rec("Norway", "2020-06-01", 8_000, 200, 9_000),
        ];
        for r in &rows {
            assert_eq!(r.active() + r.recovered + r.deaths, r.confirmed);
        }
        assert_eq!(rows[3].active(), -1_200);

        let extreme = rec("Nowhere", "2020-01-01", i64::MIN, 1, 1);
        assert_eq!(extreme.active(), i64::MIN);
    }

    #[test]
    fn from_records_sorts_and_indexes() {
        let ds = CovidDataset::from_records(vec![
            rec("Peru", "2020-01-23", 2, 0, 0),
            rec("Chad", "2020-01-22", 0, 0, 0),
            rec("Peru", "2020-01-22", 1, 0, 0),
            rec("Chad", "2020-01-23", 1, 0, 0),
        ])
        .unwrap();

        assert_eq!(ds.countries, vec!["Chad", "Peru"]);
        assert_eq!(ds.len(), 4);
        assert!(!ds.is_empty());
        assert_eq!(ds.first_date.to_string(), "2020-01-22");
        assert_eq!(ds.last_date.to_string(), "2020-01-23");

        let peru = ds.country_records("Peru");
        assert_eq!(peru.len(), 2);
        assert!(peru[0].date < peru[1].date);
        assert!(ds.country_records("Atlantis").is_empty());
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            CovidDataset::from_records(Vec::new()),
            Err(DataError::Empty)
        ));
    }
}
