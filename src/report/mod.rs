//! Human and machine output for an [`AnalysisReport`].

mod export;
mod sort_key;

pub use export::write_signals_csv;
pub use sort_key::SortKey;

use {
    crate::models::{AnalysisReport, DrillDown, SignalRecord, SweepResult},
    anyhow::{Context, Result},
    std::fmt::Write,
    tabled::{Table, Tabled, settings::Style},
};

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Short")]
    short: usize,
    #[tabled(rename = "Long")]
    long: usize,
    #[tabled(rename = "Cum. Profit")]
    profit: String,
    #[tabled(rename = "Win %")]
    win_pct: String,
    #[tabled(rename = "Trades")]
    trades: usize,
    #[tabled(rename = "Open")]
    open: &'static str,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Short SMA")]
    short_sma: String,
    #[tabled(rename = "Long SMA")]
    long_sma: String,
    #[tabled(rename = "Signal")]
    signal: i8,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Trade P/L")]
    trade_profit: String,
    #[tabled(rename = "Cum. Profit")]
    cumulative: String,
}

fn money(v: f64) -> String {
    format!("{:.4}", v)
}

fn maybe(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), money)
}

fn result_row(row: &SweepResult, is_best: bool) -> ResultRow {
    ResultRow {
        marker: if is_best { "*" } else { "" },
        short: row.short_window,
        long: row.long_window,
        profit: money(row.cumulative_profit),
        win_pct: format!("{:.1}", row.profit_percentage),
        trades: row.trade_count,
        open: if row.open_at_end { "yes" } else { "" },
    }
}

fn record_row(r: &SignalRecord) -> RecordRow {
    RecordRow {
        date: r.date.to_string(),
        price: money(r.price),
        short_sma: maybe(r.short_sma),
        long_sma: maybe(r.long_sma),
        signal: r.signal.value(),
        position: r.position.map_or_else(|| "-".to_string(), |p| format!("{:+}", p)),
        trade_profit: maybe(r.trade_profit),
        cumulative: money(r.cumulative_profit),
    }
}

/// Results table, best pair starred. `top` limits the row count after sorting.
pub fn results_table(
    report: &AnalysisReport,
    key: SortKey,
    reverse: bool,
    top: Option<usize>,
) -> String {
    let best = report.outcome.best_pair;
    let rows: Vec<ResultRow> = key
        .sorted(&report.outcome.results, reverse)
        .into_iter()
        .take(top.unwrap_or(usize::MAX))
        .map(|r| result_row(r, r.pair() == best))
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn best_summary(report: &AnalysisReport) -> String {
    let outcome = &report.outcome;
    match outcome.best() {
        Some(best) => {
            let mut out = format!(
                "Best pair {}: cumulative profit {} over {} closed trades ({:.1}% profitable)",
                outcome.best_pair,
                money(best.cumulative_profit),
                best.trade_count,
                best.profit_percentage
            );
            if best.open_at_end {
                out.push_str("\n  note: a position was still open at the last date and is not counted");
            }
            out
        }
        None => "No valid window combinations (every short window >= every long window).".to_string(),
    }
}

pub fn drill_down_table(drill: &DrillDown) -> String {
    let rows: Vec<RecordRow> = drill.records.iter().map(record_row).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Full plain-text rendering: header, results, best pair, optional drill-down.
pub fn render_text(
    report: &AnalysisReport,
    key: SortKey,
    reverse: bool,
    top: Option<usize>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} | {} .. {} | {} prices | short {} x long {} | {} pairs",
        report.ticker,
        report.start,
        report.end,
        report.series_len,
        report.short_range,
        report.long_range,
        report.outcome.results.len()
    );

    if report.outcome.has_valid_combinations() {
        let shown = top.map_or(report.outcome.results.len(), |n| n.min(report.outcome.results.len()));
        let label = if reverse { "Bottom" } else { "Top" };
        let _ = writeln!(out, "\n{} {} by {}:", label, shown, key);
        let _ = writeln!(out, "{}", results_table(report, key, reverse, top));
    }

    let _ = writeln!(out, "\n{}", best_summary(report));

    if let Some(drill) = &report.drill_down {
        let _ = writeln!(out, "\nSignals for {}:", drill.pair);
        let _ = writeln!(out, "{}", drill_down_table(drill));
    }

    out
}

pub fn render_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}
