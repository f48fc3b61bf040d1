//! Reporting and export: JSON, CSV, and text artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade ledger and equity curve for external analysis tools
//! - **Text**: human-readable summary for the terminal
//!
//! All persisted artifacts include a `schema_version` field. Newer versions
//! are rejected on load.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use fxlab_core::domain::Trade;

use crate::report::EquityPoint;
use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade ledger as CSV.
///
/// Columns: side, size, entry_bar, entry_time, entry_price, exit_bar,
/// exit_time, exit_price, reason, gross_pnl, fee, pnl
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "size",
        "entry_bar",
        "entry_time",
        "entry_price",
        "exit_bar",
        "exit_time",
        "exit_price",
        "reason",
        "gross_pnl",
        "fee",
        "pnl",
    ])?;

    for t in trades {
        wtr.write_record([
            &format!("{:?}", t.side).to_lowercase(),
            &t.size.to_string(),
            &t.entry_bar.to_string(),
            &t.entry_time.to_rfc3339(),
            &format!("{:.6}", t.entry_price),
            &t.exit_bar.to_string(),
            &t.exit_time.to_rfc3339(),
            &format!("{:.6}", t.exit_price),
            &t.reason.to_string(),
            &format!("{:.2}", t.gross_pnl),
            &format!("{:.2}", t.fee),
            &format!("{:.2}", t.pnl),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the equity curve as CSV with timestamp and balance columns.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "balance"])?;
    for p in equity_curve {
        wtr.write_record([&p.timestamp.to_rfc3339(), &format!("{:.2}", p.balance)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one run into `output_dir`:
/// - `result.json`: the full `BacktestResult`
/// - `trades.csv`: trade ledger
/// - `equity.csv`: realized equity curve
///
/// Returns the directory written to.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create artifact dir: {}", output_dir.display()))?;

    let json = export_json(result)?;
    std::fs::write(output_dir.join("result.json"), json)
        .with_context(|| format!("failed to write result.json in {}", output_dir.display()))?;

    let trades_csv = export_trades_csv(&result.trades)?;
    std::fs::write(output_dir.join("trades.csv"), trades_csv)
        .with_context(|| format!("failed to write trades.csv in {}", output_dir.display()))?;

    let equity_csv = export_equity_csv(&result.equity_curve)?;
    std::fs::write(output_dir.join("equity.csv"), equity_csv)
        .with_context(|| format!("failed to write equity.csv in {}", output_dir.display()))?;

    Ok(output_dir.to_path_buf())
}

/// Load a `BacktestResult` from an artifact directory's result.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Text summary ───────────────────────────────────────────────────

/// Plain-text run summary for the terminal.
pub fn format_summary(result: &BacktestResult) -> String {
    let s = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "Source:          {}", result.source);
    let _ = writeln!(out, "Run ID:          {}", &result.run_id()[..16]);
    let _ = writeln!(out, "Bars:            {}", result.bar_count);
    let _ = writeln!(out, "Signals:         {}", result.signal_count);
    let _ = writeln!(out, "Trades:          {}", s.total_trades);
    let _ = writeln!(
        out,
        "Wins / Losses:   {} / {}  (win rate {:.1}%)",
        s.win_count,
        s.loss_count,
        s.win_rate * 100.0
    );
    let _ = writeln!(out, "Avg win / loss:  {:.2} / {:.2}", s.avg_win, s.avg_loss);
    let _ = writeln!(out, "Profit factor:   {:.2}", s.profit_factor);
    let _ = writeln!(out, "Max drawdown:    {:.2}%", s.max_drawdown * 100.0);
    let _ = writeln!(
        out,
        "Streaks (W/L):   {} / {}",
        s.max_consecutive_wins, s.max_consecutive_losses
    );
    let _ = writeln!(out, "Fees:            {:.2}", s.total_fees);
    let _ = writeln!(out, "Total P&L:       {:.2}", s.total_pnl);
    let _ = writeln!(
        out,
        "Balance:         {:.2} -> {:.2}  ({:+.2}%)",
        result.initial_balance, result.final_balance, s.total_return_pct
    );
    out
}
