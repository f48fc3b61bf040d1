//! Integration tests for the runner: config file → bar source → engine → report.
//!
//! Uses synthetic walks and CSV files written to temp dirs, and checks the
//! accounting between the ledger, the equity curve, and the summary.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use fxlab_core::domain::CloseReason;
use fxlab_runner::config::{DataConfig, RunConfig, SyntheticConfig};
use fxlab_runner::data_loader::{write_bars_csv, BarSource, SyntheticBarSource};
use fxlab_runner::runner::{run_backtest_from_bars, run_from_config, RunError};
use proptest::prelude::*;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir =
        std::env::temp_dir().join(format!("fxlab_runner_backtest_{}_{id}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const SCALPER_TOML: &str = r#"
[backtest]
ema_period = 200
channel_length = 10
trade_amount = 100000.0
take_profit_threshold = 25.0
stop_loss_threshold = 40.0
initial_balance = 10000.0
fee_per_trade = 0.5

[data]
source = "synthetic"
bars = 5000
seed = 11
volatility = 0.0004
"#;

#[test]
fn synthetic_config_runs_end_to_end() {
    let run = RunConfig::from_toml(SCALPER_TOML).unwrap();
    let result = run_from_config(&run, None).unwrap();

    assert_eq!(result.bar_count, 5000);
    assert!(result.signal_count > 0);
    assert!(!result.trades.is_empty());
    assert!(result.trades.len() <= result.signal_count);
    for t in &result.trades {
        assert_eq!(t.fee, 0.5);
    }
}

#[test]
fn equity_curve_matches_ledger() {
    let run = RunConfig::from_toml(SCALPER_TOML).unwrap();
    let result = run_from_config(&run, None).unwrap();

    let curve = &result.equity_curve;
    assert_eq!(curve.len(), result.trades.len() + 1);
    assert_eq!(curve[0].balance, result.initial_balance);
    for (k, t) in result.trades.iter().enumerate() {
        assert_eq!(curve[k + 1].balance, curve[k].balance + t.pnl);
        assert_eq!(curve[k + 1].timestamp, t.exit_time);
    }
    assert_eq!(curve.last().unwrap().balance, result.final_balance);
}

#[test]
fn summary_matches_ledger() {
    let run = RunConfig::from_toml(SCALPER_TOML).unwrap();
    let result = run_from_config(&run, None).unwrap();
    let s = &result.summary;

    let wins = result.trades.iter().filter(|t| t.pnl > 0.0).count();
    let losses = result.trades.iter().filter(|t| t.pnl < 0.0).count();
    assert_eq!(s.total_trades, result.trades.len());
    assert_eq!(s.win_count, wins);
    assert_eq!(s.loss_count, losses);
    assert!((s.win_rate - wins as f64 / result.trades.len() as f64).abs() < 1e-12);

    let expected_return = (result.final_balance - result.initial_balance) / result.initial_balance;
    assert!((s.total_return - expected_return).abs() < 1e-12);
    assert!((s.total_return_pct - expected_return * 100.0).abs() < 1e-9);
    assert!(s.max_drawdown <= 0.0);
}

#[test]
fn only_last_trade_can_end_of_data() {
    let run = RunConfig::from_toml(SCALPER_TOML).unwrap();
    let result = run_from_config(&run, None).unwrap();
    for t in result.trades.iter().rev().skip(1) {
        assert_ne!(t.reason, CloseReason::EndOfData);
    }
}

#[test]
fn csv_source_matches_in_memory_run() {
    let dir = temp_dir();
    let synth = SyntheticConfig {
        bars: 1500,
        seed: 3,
        ..Default::default()
    };
    let bars = SyntheticBarSource::new(synth).load().unwrap();
    let file = std::fs::File::create(dir.join("quotes.csv")).unwrap();
    write_bars_csv(&bars, file).unwrap();

    let toml = r#"
[backtest]
trade_amount = 100000.0
take_profit_threshold = 20.0
stop_loss_threshold = 20.0

[data]
source = "csv"
path = "quotes.csv"
"#;
    std::fs::write(dir.join("run.toml"), toml).unwrap();
    let run = RunConfig::from_file(&dir.join("run.toml")).unwrap();

    let from_csv = run_from_config(&run, Some(dir.as_path())).unwrap();
    let in_memory = run_backtest_from_bars(&bars, &run.backtest, "memory").unwrap();

    assert_eq!(from_csv.fingerprint, in_memory.fingerprint);
    assert_eq!(from_csv.trades, in_memory.trades);
    assert_eq!(from_csv.final_balance, in_memory.final_balance);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unordered_csv_is_rejected_with_index() {
    let dir = temp_dir();
    let csv = "\
timestamp,bid,ask
2024-01-02T00:00:00Z,1.1000,1.1002
2024-01-02T00:02:00Z,1.1001,1.1003
2024-01-02T00:01:00Z,1.1002,1.1004
";
    std::fs::write(dir.join("bad.csv"), csv).unwrap();
    let run = RunConfig {
        backtest: Default::default(),
        data: DataConfig::Csv {
            path: dir.join("bad.csv"),
        },
    };
    let err = run_from_config(&run, None).unwrap_err();
    assert!(matches!(err, RunError::Backtest(_)));
    assert!(err.to_string().contains("bar 2"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_csv_is_a_data_error() {
    let run = RunConfig {
        backtest: Default::default(),
        data: DataConfig::Csv {
            path: PathBuf::from("/no/such/quotes.csv"),
        },
    };
    assert!(matches!(run_from_config(&run, None), Err(RunError::Data(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Same seed and config: identical ledger, summary and fingerprint.
    #[test]
    fn runs_are_idempotent(seed in any::<u64>(), bars in 2usize..800) {
        let run = RunConfig {
            backtest: fxlab_core::BacktestConfig {
                trade_amount: 100_000.0,
                take_profit_threshold: 15.0,
                stop_loss_threshold: 15.0,
                ..Default::default()
            },
            data: DataConfig::Synthetic(SyntheticConfig { bars, seed, ..Default::default() }),
        };
        let a = run_from_config(&run, None).unwrap();
        let b = run_from_config(&run, None).unwrap();
        prop_assert_eq!(a, b);
    }
}
