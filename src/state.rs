use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::config::{DashboardConfig, HISTOGRAM_BINS, MOVING_AVERAGE_WINDOW, TOP_N};
use crate::data::filter::{self, DateRange};
use crate::data::metrics::{self, CorrelationMatrix, DerivedRow, Histogram};
use crate::data::model::{CovidDataset, CovidRecord};
use crate::data::source::{DataSource, LoadedData};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A load the UI asked for; picked up by the app on the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub source: DataSource,
    pub force_refresh: bool,
}

/// Everything derived from the current dataset and filter selections.
#[derive(Debug, Clone, Default)]
pub struct DerivedView {
    /// Selected country inside the date range, with derived columns.
    pub rows: Vec<DerivedRow>,
    /// Per-country rows for the comparison chart.
    pub compare: BTreeMap<String, Vec<CovidRecord>>,
    pub compare_colors: ColorMap,
    pub correlation: CorrelationMatrix,
    pub histogram: Option<Histogram>,
}

/// Rows on the latest date of the table, independent of the filters.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub rows: Vec<CovidRecord>,
    pub top: Vec<CovidRecord>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until the first load finishes).
    pub dataset: Option<CovidDataset>,

    /// Human-readable origin of the dataset (URL, cache or path).
    pub origin: Option<String>,

    pub country: String,
    pub range: DateRange,

    /// Countries drawn in the comparison chart.
    pub compare: BTreeSet<String>,

    /// Search box text of the comparison multi-select.
    pub compare_search: String,

    /// Inclusive row window of the range-selector chart.
    pub range_window: (usize, usize),

    pub view: DerivedView,
    pub snapshot: Option<Snapshot>,

    /// Error message shown in red in the top bar.
    pub status_message: Option<String>,

    /// Non-fatal notice (stale cache, inverted date range).
    pub warning: Option<String>,

    /// Whether a load is in progress.
    pub loading: bool,

    pub pending_load: Option<LoadRequest>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let today = chrono::Utc::now().date_naive();
        let pending_load = Some(LoadRequest {
            source: DataSource::from_config(&config),
            force_refresh: false,
        });
        Self {
            config,
            dataset: None,
            origin: None,
            country: String::new(),
            range: DateRange::new(today, today),
            compare: BTreeSet::new(),
            compare_search: String::new(),
            range_window: (0, 0),
            view: DerivedView::default(),
            snapshot: None,
            status_message: None,
            warning: None,
            loading: false,
            pending_load,
        }
    }

    /// Ingest a newly loaded table and reset the selections.
    ///
    /// A country that still exists keeps its selection across reloads.
    pub fn set_dataset(&mut self, loaded: LoadedData) {
        let LoadedData {
            dataset,
            origin,
            warning,
        } = loaded;

        if dataset.country_records(&self.country).is_empty() {
            self.country = dataset.countries.first().cloned().unwrap_or_default();
        }
        self.range = DateRange::new(dataset.first_date, dataset.last_date);
        self.compare = BTreeSet::from([self.country.clone()]);

        let (date, rows) = filter::latest_snapshot(&dataset);
        let top = filter::top_n(&rows, TOP_N);
        self.snapshot = Some(Snapshot { date, rows, top });

        self.dataset = Some(dataset);
        self.origin = Some(origin);
        self.status_message = None;
        self.loading = false;
        self.recompute();
        // Set after recompute so a load warning is not cleared by it.
        if warning.is_some() {
            self.warning = warning;
        }
    }

    /// Select a country; the comparison starts over from it.
    pub fn set_country(&mut self, country: String) {
        if self.country != country {
            self.country = country;
            self.compare = BTreeSet::from([self.country.clone()]);
            self.recompute();
        }
    }

    pub fn set_start(&mut self, start: NaiveDate) {
        if self.range.start != start {
            self.range.start = start;
            self.recompute();
        }
    }

    pub fn set_end(&mut self, end: NaiveDate) {
        if self.range.end != end {
            self.range.end = end;
            self.recompute();
        }
    }

    /// Add or remove a country from the comparison chart.
    pub fn toggle_compare(&mut self, country: &str) {
        if !self.compare.remove(country) {
            self.compare.insert(country.to_string());
        }
        self.recompute_compare();
    }

    /// Move the range-selector window; bounds are clamped to the view.
    pub fn set_range_window(&mut self, from: usize, to: usize) {
        let last = self.view.rows.len().saturating_sub(1);
        let from = from.min(last);
        let to = to.clamp(from, last);
        self.range_window = (from, to);
    }

    /// Rows of the range-selector chart.
    pub fn windowed_rows(&self) -> &[DerivedRow] {
        if self.view.rows.is_empty() {
            return &[];
        }
        let (from, to) = self.range_window;
        let to = to.min(self.view.rows.len() - 1);
        &self.view.rows[from.min(to)..=to]
    }

    /// Plain records of the current view, as offered for download.
    pub fn filtered_records(&self) -> Vec<CovidRecord> {
        self.view.rows.iter().map(|r| r.record.clone()).collect()
    }

    /// Re-derive everything that depends on the filters.
    pub fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };

        self.warning = self.range.validate();
        let records = filter::filter_country(ds, &self.country, self.range);
        let rows = metrics::derive(&records, MOVING_AVERAGE_WINDOW);

        let daily: Vec<f64> = rows.iter().map(|r| r.daily_confirmed).collect();
        self.view.histogram = (!daily.is_empty()).then(|| metrics::histogram(&daily, HISTOGRAM_BINS));
        self.view.correlation = metrics::correlation_matrix(&rows);
        self.view.rows = rows;
        self.range_window = (0, self.view.rows.len().saturating_sub(1));

        log::debug!(
            "View for {} {}..{}: {} rows",
            self.country,
            self.range.start,
            self.range.end,
            self.view.rows.len()
        );
        self.recompute_compare();
    }

    fn recompute_compare(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.view.compare = filter::filter_countries(ds, &self.compare, self.range);
        self.view.compare_colors = ColorMap::new(self.view.compare.keys());
    }

    /// Queue a reload of the configured source.
    pub fn request_reload(&mut self) {
        self.pending_load = Some(LoadRequest {
            source: DataSource::from_config(&self.config),
            force_refresh: true,
        });
    }

    /// Queue loading a local file picked by the user.
    pub fn request_file(&mut self, path: std::path::PathBuf) {
        self.config.file = Some(path.clone());
        self.pending_load = Some(LoadRequest {
            source: DataSource::File(path),
            force_refresh: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::rec;

    fn loaded() -> LoadedData {
        let mut records = Vec::new();
        for day in 1..=10 {
            let d = format!("2020-04-{day:02}");
            records.push(rec("Italy", &d, 100 * day, day, 10 * day));
            records.push(rec("Spain", &d, 90 * day, 2 * day, 5 * day));
            records.push(rec("Chad", &d, day, 0, 0));
        }
        LoadedData {
            dataset: CovidDataset::from_records(records).unwrap(),
            origin: "test".into(),
            warning: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn state() -> AppState {
        let mut s = AppState::new(DashboardConfig::default());
        s.set_dataset(loaded());
        s
    }

    #[test]
    fn new_state_requests_initial_load() {
        let s = AppState::new(DashboardConfig::default());
        let req = s.pending_load.unwrap();
        assert!(matches!(req.source, DataSource::Remote { .. }));
        assert!(!req.force_refresh);
    }

    #[test]
    fn load_selects_first_country_and_full_range() {
        let s = state();
        assert_eq!(s.country, "Chad");
        assert_eq!(s.range, DateRange::new(date("2020-04-01"), date("2020-04-10")));
        assert_eq!(s.view.rows.len(), 10);
        assert_eq!(s.compare, BTreeSet::from(["Chad".to_string()]));
        assert_eq!(s.range_window, (0, 9));

        let snap = s.snapshot.as_ref().unwrap();
        assert_eq!(snap.date, date("2020-04-10"));
        assert_eq!(snap.top[0].country, "Italy");
        assert_eq!(snap.top.len(), 3);
    }

    #[test]
    fn filter_changes_recompute_the_view() {
        let mut s = state();
        s.set_country("Italy".into());
        s.set_start(date("2020-04-03"));
        s.set_end(date("2020-04-05"));

        assert_eq!(s.view.rows.len(), 3);
        assert_eq!(s.view.rows[0].record.confirmed, 300);
        // Derivations restart at the window edge.
        assert_eq!(s.view.rows[0].daily_confirmed, 0.0);
        assert_eq!(s.view.rows[1].daily_confirmed, 100.0);
        assert_eq!(s.view.histogram.as_ref().unwrap().total(), 3);
        assert_eq!(s.filtered_records().len(), 3);
    }

    #[test]
    fn inverted_range_warns_and_empties_view() {
        let mut s = state();
        s.set_start(date("2020-04-08"));
        s.set_end(date("2020-04-02"));
        assert!(s.view.rows.is_empty());
        assert!(s.view.histogram.is_none());
        assert!(s.warning.is_some());
        assert!(s.windowed_rows().is_empty());

        s.set_end(date("2020-04-09"));
        assert!(s.warning.is_none());
        assert_eq!(s.view.rows.len(), 2);
    }

    #[test]
    fn comparison_toggles() {
        let mut s = state();
        s.toggle_compare("Spain");
        assert_eq!(s.view.compare.len(), 2);
        s.toggle_compare("Chad");
        assert_eq!(s.view.compare.keys().collect::<Vec<_>>(), vec!["Spain"]);
    }

    #[test]
    fn country_change_resets_comparison() {
        let mut s = state();
        s.toggle_compare("Spain");
        s.set_country("Italy".into());
        assert_eq!(s.compare, BTreeSet::from(["Italy".to_string()]));
        assert_eq!(s.view.compare.keys().collect::<Vec<_>>(), vec!["Italy"]);

        // Re-selecting the same country keeps manual additions.
        s.toggle_compare("Chad");
        s.set_country("Italy".into());
        assert_eq!(s.compare.len(), 2);
    }

    #[test]
    fn range_window_is_clamped() {
        let mut s = state();
        s.set_range_window(4, 100);
        assert_eq!(s.range_window, (4, 9));
        assert_eq!(s.windowed_rows().len(), 6);

        s.set_range_window(7, 2);
        assert_eq!(s.range_window, (7, 7));
    }

    #[test]
    fn reload_keeps_selected_country() {
        let mut s = state();
        s.set_country("Spain".into());
        s.set_dataset(loaded());
        assert_eq!(s.country, "Spain");
    }

    #[test]
    fn load_warning_survives_recompute() {
        let mut s = AppState::new(DashboardConfig::default());
        let mut data = loaded();
        data.warning = Some("stale".into());
        s.set_dataset(data);
        assert_eq!(s.warning.as_deref(), Some("stale"));
    }

    #[test]
    fn file_request_is_queued() {
        let mut s = state();
        s.pending_load = None;
        s.request_file("x.csv".into());
        assert_eq!(s.pending_load.as_ref().unwrap().source, DataSource::File("x.csv".into()));
        s.request_reload();
        let req = s.pending_load.unwrap();
        assert!(req.force_refresh);
        assert_eq!(req.source, DataSource::File("x.csv".into()));
    }
}
