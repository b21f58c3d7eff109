//! CSV input and output for signal generation.

use crate::stages::builtin::signals::schema::RawRow;
use anyhow::Context;
use fxp_protocol::signal_models::SignalRecord;
use std::path::Path;
use tracing::info;

/// Header of the signals file.
pub const SIGNALS_HEADER: [&str; 6] = ["row", "signal", "confidence", "p_sell", "p_hold", "p_buy"];

/// Parse CSV text with a header row into column-keyed rows.
pub fn parse_rows(content: &str) -> anyhow::Result<Vec<RawRow>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader.headers().context("Missing CSV header")?.clone();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", index + 1))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.trim().to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub async fn load_rows(path: &Path) -> anyhow::Result<Vec<RawRow>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rows = parse_rows(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "loaded market data");
    Ok(rows)
}

/// Render records as CSV text with the [`SIGNALS_HEADER`] header.
pub fn render_signals(records: &[SignalRecord]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SIGNALS_HEADER)?;
    for record in records {
        let [sell, hold, buy] = record.probabilities;
        writer.write_record([
            record.row.to_string(),
            record.signal.to_string(),
            record.confidence.to_string(),
            sell.to_string(),
            hold.to_string(),
            buy.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Failed to flush CSV writer: {}", err.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write records to `path`, creating parent directories. Nothing is written
/// for an empty slice; returns whether a file was written.
pub async fn write_signals(records: &[SignalRecord], path: &Path) -> anyhow::Result<bool> {
    if records.is_empty() {
        info!("no signals to write");
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, render_signals(records)?)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), rows = records.len(), "signals written");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxp_protocol::signal_models::Signal;
    use tempfile::tempdir;

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows("timestamp,symbol,price\n2026-02-06T10:00:00Z,EURUSD,1.08\n")
            .expect("valid CSV");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["symbol"], "EURUSD");
        assert_eq!(rows[0]["price"], "1.08");
    }

    #[test]
    fn test_parse_rows_rejects_ragged_records() {
        assert!(parse_rows("a,b\n1,2,3\n").is_err());
    }

    #[test]
    fn test_render_signals() {
        let records = vec![
            SignalRecord {
                row: 0,
                signal: Signal::Buy,
                confidence: 0.7,
                probabilities: [0.1, 0.2, 0.7],
            },
            SignalRecord {
                row: 1,
                signal: Signal::Hold,
                confidence: 0.34,
                probabilities: [0.33, 0.34, 0.33],
            },
        ];

        let csv = render_signals(&records).expect("render should succeed");

        assert_eq!(
            csv,
            "row,signal,confidence,p_sell,p_hold,p_buy\n0,BUY,0.7,0.1,0.2,0.7\n1,HOLD,0.34,0.33,0.34,0.33\n"
        );
    }

    #[tokio::test]
    async fn test_write_signals_skips_empty() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out").join("signals.csv");

        let written = write_signals(&[], &path).await.expect("write should succeed");

        assert!(!written);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_then_load_rows() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out").join("signals.csv");
        let records = vec![SignalRecord {
            row: 0,
            signal: Signal::Sell,
            confidence: 0.65,
            probabilities: [0.65, 0.2, 0.15],
        }];

        assert!(write_signals(&records, &path).await.expect("write should succeed"));

        let rows = load_rows(&path).await.expect("load should succeed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["signal"], "SELL");
        assert_eq!(rows[0]["p_sell"], "0.65");
    }
}
