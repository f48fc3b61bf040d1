//! Bar sources: where quotes come from before the engine sees them.
//!
//! Three sources:
//! 1. CSV file (`timestamp,bid,ask[,mid]`, RFC 3339 timestamps)
//! 2. JSON array over HTTP GET (single attempt, no retry)
//! 3. Seeded random walk for development and tests
//!
//! Sources only produce bars. Validation (length, positivity, ordering) is
//! the engine's job and happens when the bars are run.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use fxlab_core::domain::Bar;

use crate::config::SyntheticConfig;

/// Errors from loading bars.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON bars: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid synthetic parameters: {0}")]
    Synthetic(String),
}

/// A producer of bars for one run.
pub trait BarSource: Send + Sync {
    /// Human-readable name (e.g., "csv:data/eurusd.csv").
    fn name(&self) -> &str;

    /// Load the whole series in source order.
    fn load(&self) -> Result<Vec<Bar>, LoadError>;
}

/// Load from `source`, logging what came back.
pub fn load_bars(source: &dyn BarSource) -> Result<Vec<Bar>, LoadError> {
    let bars = source.load()?;
    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => info!(
            source = source.name(),
            bars = bars.len(),
            first = %first.timestamp,
            last = %last.timestamp,
            "bars loaded"
        ),
        _ => warn!(source = source.name(), "source returned no bars"),
    }
    Ok(bars)
}

// ─── Wire rows ──────────────────────────────────────────────────────

/// One quote as it appears in CSV or JSON. `mid` is derived when absent.
#[derive(Debug, Deserialize)]
struct QuoteRow {
    timestamp: DateTime<Utc>,
    bid: f64,
    ask: f64,
    #[serde(default)]
    mid: Option<f64>,
}

impl From<QuoteRow> for Bar {
    fn from(row: QuoteRow) -> Self {
        match row.mid {
            Some(mid) => Bar::new(row.timestamp, row.bid, row.ask, mid),
            None => Bar::from_quote(row.timestamp, row.bid, row.ask),
        }
    }
}

// ─── CSV ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CsvBarSource {
    path: PathBuf,
    name: String,
}

impl CsvBarSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("csv:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BarSource for CsvBarSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Bar>, LoadError> {
        let file = std::fs::File::open(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        read_bars_csv(file)
    }
}

/// Parse bars from CSV with a header row.
pub fn read_bars_csv<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for row in rdr.deserialize::<QuoteRow>() {
        bars.push(row?.into());
    }
    Ok(bars)
}

/// Write bars as CSV (`timestamp,bid,ask,mid`), readable by [`read_bars_csv`].
pub fn write_bars_csv<W: Write>(bars: &[Bar], writer: W) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["timestamp", "bid", "ask", "mid"])?;
    for bar in bars {
        wtr.write_record([
            bar.timestamp.to_rfc3339(),
            bar.bid.to_string(),
            bar.ask.to_string(),
            bar.mid.to_string(),
        ])?;
    }
    wtr.flush().map_err(|e| LoadError::Csv(e.into()))?;
    Ok(())
}

// ─── HTTP JSON ──────────────────────────────────────────────────────

/// Blocking GET of a JSON array of `{timestamp, bid, ask[, mid]}` objects.
pub struct HttpJsonBarSource {
    url: String,
    name: String,
    client: reqwest::blocking::Client,
}

impl HttpJsonBarSource {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, LoadError> {
        let url = url.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("fxlab/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            name: format!("http:{url}"),
            url,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl BarSource for HttpJsonBarSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Bar>, LoadError> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        parse_bars_json(&body)
    }
}

/// Parse a JSON array of quote objects.
pub fn parse_bars_json(body: &str) -> Result<Vec<Bar>, LoadError> {
    let rows: Vec<QuoteRow> = serde_json::from_str(body)?;
    Ok(rows.into_iter().map(Bar::from).collect())
}

// ─── Synthetic ──────────────────────────────────────────────────────

/// Seeded multiplicative random walk with a fixed spread.
///
/// Deterministic: the same config always yields the same bars.
#[derive(Debug, Clone)]
pub struct SyntheticBarSource {
    config: SyntheticConfig,
    name: String,
}

impl SyntheticBarSource {
    pub fn new(config: SyntheticConfig) -> Self {
        let name = format!("synthetic:seed={}", config.seed);
        Self { config, name }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }
}

impl BarSource for SyntheticBarSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Bar>, LoadError> {
        let cfg = &self.config;
        cfg.validate().map_err(LoadError::Synthetic)?;

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let half_spread = cfg.spread / 2.0;
        let floor = cfg.spread.max(cfg.start_price * 1e-3);
        let step = chrono::Duration::seconds(cfg.interval_secs);

        let mut mid = cfg.start_price;
        let mut timestamp = cfg.start;
        let mut bars = Vec::with_capacity(cfg.bars);

        for i in 0..cfg.bars {
            if i > 0 {
                let shock = if cfg.volatility > 0.0 {
                    rng.gen_range(-cfg.volatility..cfg.volatility)
                } else {
                    0.0
                };
                mid = (mid * (1.0 + shock)).max(floor);
                timestamp += step;
            }
            bars.push(Bar::new(timestamp, mid - half_spread, mid + half_spread, mid));
        }

        Ok(bars)
    }
}
