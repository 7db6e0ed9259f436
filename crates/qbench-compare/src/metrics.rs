//! Timing metrics derived from a successful comparison.

use serde::{Deserialize, Serialize};

/// How the warehouse fared against the normalized store.
///
/// All values are relative to the normalized backend: a positive
/// `time_saved_ms` means the warehouse was faster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    /// normalized time / warehouse time; 1.0 when the warehouse took no time.
    pub speedup: f64,

    /// Reduction of warehouse time relative to normalized time, in percent.
    /// Negative when the warehouse is slower.
    pub improvement_pct: f64,

    /// normalized time - warehouse time.
    pub time_saved_ms: f64,
}

impl ComparisonMetrics {
    /// Derive metrics from the two execution times.
    pub fn derive(warehouse_ms: f64, normalized_ms: f64) -> Self {
        let (speedup, improvement_pct) = if warehouse_ms > 0.0 {
            let improvement = if normalized_ms > 0.0 {
                (normalized_ms - warehouse_ms) / normalized_ms * 100.0
            } else {
                0.0
            };
            (normalized_ms / warehouse_ms, improvement)
        } else {
            (1.0, 0.0)
        };

        Self {
            speedup,
            improvement_pct,
            time_saved_ms: normalized_ms - warehouse_ms,
        }
    }

    /// Copy rounded for presentation: speedup and time saved to two
    /// decimals, improvement to one.
    pub fn rounded(&self) -> Self {
        Self {
            speedup: round_to(self.speedup, 2),
            improvement_pct: round_to(self.improvement_pct, 1),
            time_saved_ms: round_to(self.time_saved_ms, 2),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
