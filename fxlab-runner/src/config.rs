//! Run configuration file: engine parameters plus a bar source.
//!
//! ```toml
//! [backtest]
//! channel_length = 10
//! take_profit_threshold = 1.0
//!
//! [data]
//! source = "synthetic"
//! bars = 5000
//! seed = 7
//! ```
//!
//! `[backtest]` maps onto [`BacktestConfig`]; omitted keys take their
//! defaults. `[data]` picks one of `csv`, `http` or `synthetic`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fxlab_core::config::{BacktestConfig, ConfigError};

use crate::data_loader::{BarSource, CsvBarSource, HttpJsonBarSource, SyntheticBarSource};

/// Why a config file could not be turned into a [`RunConfig`].
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [backtest] section: {0}")]
    Invalid(#[from] ConfigError),

    #[error("invalid [data] section: {0}")]
    Data(String),
}

/// Everything needed to reproduce one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub backtest: BacktestConfig,
    pub data: DataConfig,
}

impl RunConfig {
    /// Load and validate a run config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a run config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigFileError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.backtest.validate()?;
        self.data.validate().map_err(ConfigFileError::Data)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Where the bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case", deny_unknown_fields)]
pub enum DataConfig {
    /// CSV file with a `timestamp,bid,ask[,mid]` header.
    Csv { path: PathBuf },

    /// JSON array of bars served over HTTP GET.
    Http {
        url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// Seeded random walk.
    Synthetic(SyntheticConfig),
}

fn default_timeout_secs() -> u64 {
    30
}

impl DataConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            DataConfig::Csv { path } if path.as_os_str().is_empty() => {
                Err("csv path must not be empty".into())
            }
            DataConfig::Http { url, .. }
                if !(url.starts_with("http://") || url.starts_with("https://")) =>
            {
                Err(format!("http url must start with http:// or https://, got '{url}'"))
            }
            DataConfig::Http { timeout_secs: 0, .. } => Err("timeout_secs must be > 0".into()),
            DataConfig::Synthetic(s) => s.validate(),
            _ => Ok(()),
        }
    }

    /// Build the configured source. Relative CSV paths resolve against `base_dir`.
    pub fn source(&self, base_dir: Option<&Path>) -> Result<Box<dyn BarSource>, ConfigFileError> {
        Ok(match self {
            DataConfig::Csv { path } => {
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                Box::new(CsvBarSource::new(path))
            }
            DataConfig::Http { url, timeout_secs } => Box::new(
                HttpJsonBarSource::new(url.clone(), *timeout_secs)
                    .map_err(|e| ConfigFileError::Data(e.to_string()))?,
            ),
            DataConfig::Synthetic(s) => Box::new(SyntheticBarSource::new(s.clone())),
        })
    }
}

/// Parameters of the synthetic random walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    pub bars: usize,
    pub seed: u64,
    pub start_price: f64,
    /// Fixed ask − bid.
    pub spread: f64,
    /// Maximum relative move per bar, uniform in `[-volatility, volatility)`.
    pub volatility: f64,
    pub start: DateTime<Utc>,
    pub interval_secs: i64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            bars: 10_000,
            seed: 42,
            start_price: 1.10,
            spread: 0.0002,
            volatility: 0.0005,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            interval_secs: 60,
        }
    }
}

impl SyntheticConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.start_price.is_finite() && self.start_price > 0.0) {
            return Err(format!("start_price must be positive, got {}", self.start_price));
        }
        if !(self.spread.is_finite() && self.spread >= 0.0 && self.spread < self.start_price) {
            return Err(format!(
                "spread must be in [0, start_price), got {}",
                self.spread
            ));
        }
        if !(self.volatility.is_finite() && (0.0..1.0).contains(&self.volatility)) {
            return Err(format!("volatility must be in [0, 1), got {}", self.volatility));
        }
        if self.interval_secs <= 0 {
            return Err(format!("interval_secs must be > 0, got {}", self.interval_secs));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = RunConfig::from_toml(
            r#"
[data]
source = "synthetic"
"#,
        )
        .unwrap();
        assert_eq!(config.backtest, BacktestConfig::default());
        assert_eq!(config.data, DataConfig::Synthetic(SyntheticConfig::default()));
    }

    #[test]
    fn partial_backtest_section_keeps_other_defaults() {
        let config = RunConfig::from_toml(
            r#"
[backtest]
channel_length = 20
fee_per_trade = 1.5

[data]
source = "csv"
path = "quotes.csv"
"#,
        )
        .unwrap();
        assert_eq!(config.backtest.channel_length, 20);
        assert_eq!(config.backtest.fee_per_trade, 1.5);
        assert_eq!(config.backtest.ema_period, 200);
        assert_eq!(
            config.data,
            DataConfig::Csv {
                path: PathBuf::from("quotes.csv")
            }
        );
    }

    #[test]
    fn http_timeout_defaults() {
        let config = RunConfig::from_toml(
            r#"
[data]
source = "http"
url = "https://example.com/eurusd.json"
"#,
        )
        .unwrap();
        assert_eq!(
            config.data,
            DataConfig::Http {
                url: "https://example.com/eurusd.json".into(),
                timeout_secs: 30
            }
        );
    }

    #[test]
    fn invalid_backtest_values_are_rejected() {
        let err = RunConfig::from_toml(
            r#"
[backtest]
trade_amount = -5.0

[data]
source = "synthetic"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigFileError::Invalid(_)));
    }

    #[test]
    fn unknown_source_is_a_parse_error() {
        let err = RunConfig::from_toml(
            r#"
[data]
source = "parquet"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse(_)));
    }

    #[test]
    fn misspelled_table_is_a_parse_error() {
        let err = RunConfig::from_toml(
            r#"
[backest]
channel_length = 3

[data]
source = "synthetic"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse(_)));
    }

    #[test]
    fn misspelled_synthetic_key_is_a_parse_error() {
        let err = RunConfig::from_toml(
            r#"
[data]
source = "synthetic"
bar = 50
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse(_)));
    }

    #[test]
    fn unknown_csv_and_http_keys_are_parse_errors() {
        let csv = RunConfig::from_toml(
            r#"
[data]
source = "csv"
path = "quotes.csv"
delimiter = ";"
"#,
        );
        assert!(matches!(csv, Err(ConfigFileError::Parse(_))));

        let http = RunConfig::from_toml(
            r#"
[data]
source = "http"
url = "https://example.com/eurusd.json"
timeout = 5
"#,
        );
        assert!(matches!(http, Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn http_url_needs_a_scheme_separator() {
        for url in ["httpfoo", "http:/x", "ftp://example.com"] {
            let data = DataConfig::Http {
                url: url.into(),
                timeout_secs: 30,
            };
            assert!(data.validate().is_err(), "{url} should be rejected");
        }
        let ok = DataConfig::Http {
            url: "http://localhost:8080/bars".into(),
            timeout_secs: 30,
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn missing_data_section_is_a_parse_error() {
        let err = RunConfig::from_toml("[backtest]\nema_period = 5\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse(_)));
    }

    #[test]
    fn bad_synthetic_volatility_is_rejected() {
        let err = RunConfig::from_toml(
            r#"
[data]
source = "synthetic"
volatility = 1.5
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigFileError::Data(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = RunConfig {
            backtest: BacktestConfig {
                ema_period: 50,
                ..Default::default()
            },
            data: DataConfig::Synthetic(SyntheticConfig {
                bars: 500,
                ..Default::default()
            }),
        };
        let text = config.to_toml().unwrap();
        assert_eq!(RunConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn relative_csv_path_resolves_against_base_dir() {
        let data = DataConfig::Csv {
            path: PathBuf::from("bars.csv"),
        };
        let source = data.source(Some(Path::new("/tmp/run"))).unwrap();
        assert_eq!(source.name(), "csv:/tmp/run/bars.csv");
    }
}
