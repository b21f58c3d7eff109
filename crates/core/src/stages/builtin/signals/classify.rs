//! Probability-to-decision thresholding.

use fxp_protocol::signal_models::{Signal, SignalRecord};
use tracing::warn;

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Classify one `[p_sell, p_hold, p_buy]` row.
///
/// BUY wins when it is the maximum and reaches `threshold`; otherwise SELL
/// when it is the maximum and reaches `threshold`; otherwise HOLD. Rows with
/// fewer than three probabilities are HOLD with zero confidence.
///
/// # Example
///
/// ```
/// use fxp_core::stages::builtin::signals::classify::classify;
/// use fxp_protocol::signal_models::Signal;
///
/// let record = classify(0, &[0.10, 0.20, 0.70], 0.60);
/// assert_eq!(record.signal, Signal::Buy);
/// assert_eq!(record.confidence, 0.7);
/// ```
pub fn classify(row: usize, probabilities: &[f64], threshold: f64) -> SignalRecord {
    let [sell, hold, buy] = match probabilities {
        [sell, hold, buy, ..] => [*sell, *hold, *buy],
        short => {
            warn!(
                row,
                got = ?short,
                "expected 3 probabilities, defaulting to HOLD"
            );
            let mut padded = [0.0; 3];
            for (slot, value) in padded.iter_mut().zip(short) {
                *slot = *value;
            }
            return SignalRecord {
                row,
                signal: Signal::Hold,
                confidence: 0.0,
                probabilities: padded,
            };
        }
    };

    let max = sell.max(hold).max(buy);
    let signal = if max == buy && buy >= threshold {
        Signal::Buy
    } else if max == sell && sell >= threshold {
        Signal::Sell
    } else {
        Signal::Hold
    };

    SignalRecord {
        row,
        signal,
        confidence: round6(max),
        probabilities: [round6(sell), round6(hold), round6(buy)],
    }
}

/// Classify every row.
pub fn predictions_to_signals(probabilities: &[Vec<f64>], threshold: f64) -> Vec<SignalRecord> {
    probabilities
        .iter()
        .enumerate()
        .map(|(row, probs)| classify(row, probs, threshold))
        .collect()
}

/// Per-decision counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl SignalCounts {
    pub fn tally(records: &[SignalRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut counts, record| {
                match record.signal {
                    Signal::Buy => counts.buy += 1,
                    Signal::Sell => counts.sell += 1,
                    Signal::Hold => counts.hold += 1,
                }
                counts
            })
    }
}
