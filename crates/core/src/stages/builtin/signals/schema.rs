//! The fixed 15-column market feature schema.

use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// Non-numeric context columns, carried through but not fed to the model.
pub const CONTEXT_COLUMNS: [&str; 2] = ["timestamp", "symbol"];

/// Model input columns, in model order.
pub const NUMERIC_FEATURES: [&str; 13] = [
    "price",
    "atr",
    "ema_diff",
    "rsi",
    "macd_diff",
    "vwap",
    "price_vwap_diff",
    "bb_position",
    "spread",
    "sentiment",
    "momentum",
    "volume_delta",
    "realized_vol",
];

pub const FEATURE_COUNT: usize = NUMERIC_FEATURES.len();

/// A raw input row: column name to cell text.
pub type RawRow = HashMap<String, String>;

/// Feature vector in [`NUMERIC_FEATURES`] order.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// One row mapped onto the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRow {
    pub timestamp: String,
    pub symbol: String,
    pub features: FeatureVector,
}

fn parse_numeric(cell: Option<&String>) -> f64 {
    cell.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Map raw rows onto the schema.
///
/// Missing or unparsable numeric cells become `0.0`; columns outside the
/// schema are dropped.
pub fn standardise(raw_rows: &[RawRow]) -> Vec<MarketRow> {
    let Some(first) = raw_rows.first() else {
        return Vec::new();
    };

    let schema: BTreeSet<&str> = CONTEXT_COLUMNS
        .iter()
        .chain(NUMERIC_FEATURES.iter())
        .copied()
        .collect();
    let present: Vec<&str> = schema
        .iter()
        .copied()
        .filter(|column| first.contains_key(*column))
        .collect();
    let missing: Vec<&str> = schema
        .iter()
        .copied()
        .filter(|column| !first.contains_key(*column))
        .collect();

    info!(?present, "standardised columns");
    if !missing.is_empty() {
        info!(?missing, "missing columns filled with 0.0");
    }

    raw_rows
        .iter()
        .map(|raw| {
            let mut features = [0.0; FEATURE_COUNT];
            for (slot, column) in features.iter_mut().zip(NUMERIC_FEATURES) {
                *slot = parse_numeric(raw.get(column));
            }
            MarketRow {
                timestamp: raw.get("timestamp").cloned().unwrap_or_default(),
                symbol: raw.get("symbol").cloned().unwrap_or_default(),
                features,
            }
        })
        .collect()
}

/// Deterministic sample rows used when no input file is configured.
///
/// The last three schema columns are left out, as a live feed typically
/// lacks them until enough bars have accumulated.
pub fn sample_rows(symbol: &str, count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| {
            let step = i as f64;
            let wave = (step * 1.3).sin();
            let cells: [(&str, String); 12] = [
                ("timestamp", format!("2026-02-06T10:{i:02}:00Z")),
                ("symbol", symbol.to_string()),
                ("price", format!("{:.5}", 1.08 + 0.004 * wave)),
                ("atr", format!("{:.5}", 0.0015 + 0.0002 * step)),
                ("ema_diff", format!("{:.5}", 0.0015 * wave)),
                ("rsi", format!("{:.2}", 50.0 + 15.0 * wave)),
                ("macd_diff", format!("{:.5}", 0.0008 * (step * 0.7).cos())),
                ("vwap", format!("{:.5}", 1.08 + 0.002 * (step * 0.9).cos())),
                ("price_vwap_diff", format!("{:.5}", 0.001 * wave)),
                ("bb_position", format!("{:.4}", 0.5 + 0.4 * wave)),
                ("spread", format!("{:.5}", 0.0001 + 0.00004 * step)),
                ("sentiment", format!("{:.4}", 0.8 * (step * 2.1).sin())),
            ];
            cells
                .into_iter()
                .map(|(column, value)| (column.to_string(), value))
                .collect()
        })
        .collect()
}
