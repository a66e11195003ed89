use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::loader;
use super::model::CovidDataset;
use crate::config::{DashboardConfig, HTTP_TIMEOUT};

// ---------------------------------------------------------------------------
// Where the table comes from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote { url: String },
    File(PathBuf),
}

impl DataSource {
    pub fn from_config(config: &DashboardConfig) -> Self {
        match &config.file {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Remote {
                url: config.url.clone(),
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Remote { url } => url.clone(),
            DataSource::File(path) => path.display().to_string(),
        }
    }
}

/// A parsed table plus where it came from.
#[derive(Debug)]
pub struct LoadedData {
    pub dataset: CovidDataset,
    pub origin: String,
    /// Non-fatal problem worth showing (e.g. stale cache used offline).
    pub warning: Option<String>,
}

// ---------------------------------------------------------------------------
// On-disk cache of the downloaded CSV
// ---------------------------------------------------------------------------

const CACHE_CSV: &str = "countries-aggregated.csv";
const CACHE_MANIFEST: &str = "manifest.json";

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    url: String,
    fetched_at: DateTime<Utc>,
}

/// Raw bytes of a previous download.
#[derive(Debug)]
pub struct CachedCsv {
    pub bytes: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    max_age: Duration,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
        }
    }

    /// The cached copy of `url`, if one exists. A copy of another URL is a miss.
    pub fn read(&self, url: &str) -> Result<Option<CachedCsv>> {
        let manifest_path = self.dir.join(CACHE_MANIFEST);
        if !manifest_path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("reading {}", manifest_path.display()))?;
        let manifest: Manifest =
            serde_json::from_str(&text).context("parsing cache manifest")?;
        if manifest.url != url {
            return Ok(None);
        }

        let csv_path = self.dir.join(CACHE_CSV);
        let bytes = std::fs::read(&csv_path)
            .with_context(|| format!("reading {}", csv_path.display()))?;
        Ok(Some(CachedCsv {
            bytes,
            fetched_at: manifest.fetched_at,
        }))
    }

    pub fn write(&self, url: &str, bytes: &[u8], fetched_at: DateTime<Utc>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        std::fs::write(self.dir.join(CACHE_CSV), bytes).context("writing cached CSV")?;
        let manifest = Manifest {
            url: url.to_string(),
            fetched_at,
        };
        std::fs::write(
            self.dir.join(CACHE_MANIFEST),
            serde_json::to_string_pretty(&manifest)?,
        )
        .context("writing cache manifest")?;
        Ok(())
    }

    pub fn is_fresh(&self, entry: &CachedCsv, now: DateTime<Utc>) -> bool {
        match (now - entry.fetched_at).to_std() {
            Ok(age) => age <= self.max_age,
            // Timestamp in the future: clock moved back, treat as fresh.
            Err(_) => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Download `url` with the blocking client.
pub fn http_fetch(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("covid-explorer/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url}"))?;
    let bytes = response.bytes().context("reading response body")?;
    Ok(bytes.to_vec())
}

/// Load the table from `source`.
///
/// `force_refresh` skips a fresh cache hit (the Reload action).
pub fn load<F>(
    source: &DataSource,
    cache: Option<&DiskCache>,
    force_refresh: bool,
    fetch: F,
) -> Result<LoadedData>
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    match source {
        DataSource::File(path) => load_local(path),
        DataSource::Remote { url } => load_remote(url, cache, force_refresh, fetch),
    }
}

fn load_local(path: &Path) -> Result<LoadedData> {
    let dataset = loader::load_file(path)
        .with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} rows for {} countries from {}",
        dataset.len(),
        dataset.countries.len(),
        path.display()
    );
    Ok(LoadedData {
        dataset,
        origin: path.display().to_string(),
        warning: None,
    })
}

fn load_remote<F>(
    url: &str,
    cache: Option<&DiskCache>,
    force_refresh: bool,
    fetch: F,
) -> Result<LoadedData>
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    let cached = match cache.map(|c| c.read(url)).transpose() {
        Ok(entry) => entry.flatten(),
        Err(e) => {
            log::warn!("Ignoring unreadable cache: {e:#}");
            None
        }
    };

    if let (Some(cache), Some(entry), false) = (cache, &cached, force_refresh) {
        if cache.is_fresh(entry, Utc::now()) {
            match loader::load_csv(entry.bytes.as_slice()) {
                Ok(dataset) => {
                    log::info!("Using cached download from {}", entry.fetched_at);
                    return Ok(LoadedData {
                        dataset,
                        origin: format!("{url} (cached {})", entry.fetched_at.format("%Y-%m-%d %H:%M UTC")),
                        warning: None,
                    });
                }
                Err(e) => log::warn!("Cached CSV is unusable, downloading again: {e}"),
            }
        }
    }

    log::info!("Downloading {url}");
    match fetch(url).and_then(|bytes| {
        let dataset = loader::load_csv(bytes.as_slice()).context("parsing downloaded CSV")?;
        Ok((bytes, dataset))
    }) {
        Ok((bytes, dataset)) => {
            log::info!(
                "Downloaded {} rows for {} countries",
                dataset.len(),
                dataset.countries.len()
            );
            if let Some(cache) = cache {
                if let Err(e) = cache.write(url, &bytes, Utc::now()) {
                    log::warn!("Could not update cache: {e:#}");
                }
            }
            Ok(LoadedData {
                dataset,
                origin: url.to_string(),
                warning: None,
            })
        }
        Err(fetch_err) => {
            let Some(entry) = cached else {
                return Err(fetch_err);
            };
            log::warn!("Download failed, falling back to cache: {fetch_err:#}");
            let dataset = match loader::load_csv(entry.bytes.as_slice()) {
                Ok(ds) => ds,
                Err(e) => bail!("{fetch_err:#}; cached copy unusable: {e}"),
            };
            Ok(LoadedData {
                dataset,
                origin: format!("{url} (cached {})", entry.fetched_at.format("%Y-%m-%d %H:%M UTC")),
                warning: Some(format!(
                    "Download failed ({fetch_err}); showing data cached on {}.",
                    entry.fetched_at.format("%Y-%m-%d")
                )),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Background loading
// ---------------------------------------------------------------------------

/// Runs a load on a background thread; the UI polls for the outcome.
#[derive(Default)]
pub struct LoadManager {
    rx: Option<mpsc::Receiver<Result<LoadedData>>>,
}

impl LoadManager {
    /// Start loading `source`. A load already in flight is abandoned.
    ///
    /// `notify` runs on the worker thread once the outcome is sent.
    pub fn start(
        &mut self,
        source: DataSource,
        cache: Option<DiskCache>,
        force_refresh: bool,
        notify: impl FnOnce() + Send + 'static,
    ) {
        let (tx, rx) = mpsc::channel();
        self.rx = Some(rx);

        log::info!("Loading from {}", source.describe());
        std::thread::spawn(move || {
            let outcome = load(&source, cache.as_ref(), force_refresh, http_fetch);
            // Receiver gone means the load was superseded.
            let _ = tx.send(outcome);
            notify();
        });
    }

    pub fn is_loading(&self) -> bool {
        self.rx.is_some()
    }

    /// Take the outcome if the worker has finished.
    pub fn poll(&mut self) -> Option<Result<LoadedData>> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(outcome) => {
                self.rx = None;
                Some(outcome)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.rx = None;
                Some(Err(anyhow::anyhow!("loader thread exited without a result")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;

    const SAMPLE: &str = "Date,Country,Confirmed,Recovered,Deaths\n\
                          2020-01-22,Italy,0,0,0\n\
                          2020-01-23,Italy,2,0,0\n";
    const URL: &str = "https://example.org/countries-aggregated.csv";

    fn cache_in(dir: &Path) -> DiskCache {
        DiskCache::new(dir, Duration::from_secs(3600))
    }

    #[test]
    fn download_populates_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let source = DataSource::Remote { url: URL.into() };

        let loaded = load(&source, Some(&cache), false, |_| Ok(SAMPLE.as_bytes().to_vec())).unwrap();
        assert_eq!(loaded.dataset.len(), 2);
        assert!(loaded.warning.is_none());

        let entry = cache.read(URL).unwrap().unwrap();
        assert_eq!(entry.bytes, SAMPLE.as_bytes());
        assert!(cache.read("https://example.org/other.csv").unwrap().is_none());
    }

    #[test]
    fn fresh_cache_skips_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        cache.write(URL, SAMPLE.as_bytes(), Utc::now()).unwrap();
        let source = DataSource::Remote { url: URL.into() };

        let calls = Cell::new(0);
        let loaded = load(&source, Some(&cache), false, |_| {
            calls.set(calls.get() + 1);
            bail!("offline")
        })
        .unwrap();
        assert_eq!(calls.get(), 0);
        assert!(loaded.origin.contains("cached"));

        // Reload forces a download attempt even with a fresh cache.
        let _ = load(&source, Some(&cache), true, |_| {
            calls.set(calls.get() + 1);
            Ok(SAMPLE.as_bytes().to_vec())
        })
        .unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn stale_cache_is_a_fallback_when_offline() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let old = Utc::now() - chrono::Duration::days(3);
        cache.write(URL, SAMPLE.as_bytes(), old).unwrap();
        assert!(!cache.is_fresh(&cache.read(URL).unwrap().unwrap(), Utc::now()));

        let source = DataSource::Remote { url: URL.into() };
        let loaded = load(&source, Some(&cache), false, |_| bail!("connection refused")).unwrap();
        assert_eq!(loaded.dataset.len(), 2);
        assert!(loaded.warning.unwrap().contains("connection refused"));
    }

    #[test]
    fn offline_without_cache_is_an_error() {
        let source = DataSource::Remote { url: URL.into() };
        let err = load(&source, None, false, |_| bail!("dns failure")).unwrap_err();
        assert!(format!("{err:#}").contains("dns failure"));
    }

    #[test]
    fn garbage_download_is_an_error() {
        let source = DataSource::Remote { url: URL.into() };
        let err = load(&source, None, false, |_| Ok(b"<html>404</html>".to_vec())).unwrap_err();
        assert!(format!("{err:#}").contains("parsing downloaded CSV"));
    }

    #[test]
    fn local_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let source = DataSource::File(file.path().to_path_buf());

        let loaded = load(&source, None, false, |_| bail!("must not fetch")).unwrap();
        assert_eq!(loaded.dataset.countries, vec!["Italy"]);
    }

    #[test]
    fn source_follows_config() {
        let mut cfg = DashboardConfig::default();
        assert!(matches!(DataSource::from_config(&cfg), DataSource::Remote { .. }));
        cfg.file = Some(PathBuf::from("local.csv"));
        assert_eq!(DataSource::from_config(&cfg), DataSource::File("local.csv".into()));
    }
}
