//! Trading-signal types produced by the prediction stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete trading decision. Class order matches model output:
/// index 0 is SELL, 1 is HOLD, 2 is BUY.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
            Self::Buy => "BUY",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SignalRecord {
    /// Zero-based input row index.
    pub row: usize,
    pub signal: Signal,
    /// Winning probability, rounded to 6 decimals.
    pub confidence: f64,
    /// `[p_sell, p_hold, p_buy]`, rounded to 6 decimals.
    pub probabilities: [f64; 3],
}

/// Where the probabilities came from.
///
/// `Degraded` marks fallback output produced because no inference backend
/// was available; it must never be read as a genuine HOLD recommendation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMode {
    Model,
    Degraded,
}

impl InferenceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Degraded => "degraded",
        }
    }
}
