//! Level Extractor data model (§3, §4.6).

use serde::{Deserialize, Serialize};

/// Two disjoint ordered lists of prices, deduplicated within 0.1% relative
/// tolerance (§3). `supports` are below current price, `resistances` above;
/// both ordered by distance from current price (nearest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateLevels {
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
}

impl CandidateLevels {
    pub const DEDUP_TOLERANCE: f64 = 0.001;

    /// True if `price` is a member of either list within tolerance —
    /// invariant #2 (§8): every scenario price must be a candidate or within
    /// 0.1% of one.
    pub fn contains_within_tolerance(&self, price: f64) -> bool {
        self.supports
            .iter()
            .chain(self.resistances.iter())
            .any(|&c| ((price - c).abs() / c) <= Self::DEDUP_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_within_tolerance_accepts_near_misses() {
        let levels = CandidateLevels {
            supports: vec![93000.0],
            resistances: vec![96000.0],
        };
        assert!(levels.contains_within_tolerance(93000.0));
        assert!(levels.contains_within_tolerance(93050.0)); // ~0.05% away
        assert!(!levels.contains_within_tolerance(94000.0));
    }
}
