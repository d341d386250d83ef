use {
    crate::models::{DrillDown, SignalRecord},
    anyhow::{Context, Result},
    chrono::NaiveDate,
    serde::Serialize,
    std::path::Path,
};

/// Flat CSV row; missing values are written as empty fields.
#[derive(Serialize)]
struct ExportRow {
    date: NaiveDate,
    price: f64,
    short_sma: Option<f64>,
    long_sma: Option<f64>,
    signal: i8,
    position: Option<i8>,
    trade_profit: Option<f64>,
    cumulative_profit: f64,
    holding: bool,
}

impl From<&SignalRecord> for ExportRow {
    fn from(r: &SignalRecord) -> Self {
        Self {
            date: r.date,
            price: r.price,
            short_sma: r.short_sma,
            long_sma: r.long_sma,
            signal: r.signal.value(),
            position: r.position,
            trade_profit: r.trade_profit,
            cumulative_profit: r.cumulative_profit,
            holding: r.holding,
        }
    }
}

/// Write the drill-down records to `path`, one row per date, with a header.
pub fn write_signals_csv(path: &Path, drill: &DrillDown) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    for record in &drill.records {
        writer
            .serialize(ExportRow::from(record))
            .with_context(|| format!("Failed to write {} row for {}", record.date, drill.pair))?;
    }
    writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;

    Ok(())
}
