//! Swing high/low detection (§4.3): a local-peak finder with a minimum
//! separation of `swing_min_separation` (5) bars between accepted swings.
//!
//! Selection of the final `n_swings` is by **index** — i.e. the most recent
//! swings — never by price magnitude. Sorting by price would keep the
//! highest peaks in the window even if they are stale, silently discarding
//! whatever the market has done since (bug #2 in source notes).
use crate::models::{Candle, SwingPoint};

const MIN_SEPARATION: usize = 5;
const N_SWINGS: usize = 5;

/// A bar at `idx` is a swing high if its high is the maximum within
/// `±MIN_SEPARATION` bars on both sides, and symmetrically for swing lows.
fn is_local_high(candles: &[Candle], idx: usize) -> bool {
    let lo = idx.saturating_sub(MIN_SEPARATION);
    let hi = (idx + MIN_SEPARATION).min(candles.len() - 1);
    let pivot = candles[idx].high;
    (lo..=hi).all(|i| i == idx || candles[i].high <= pivot)
}

fn is_local_low(candles: &[Candle], idx: usize) -> bool {
    let lo = idx.saturating_sub(MIN_SEPARATION);
    let hi = (idx + MIN_SEPARATION).min(candles.len() - 1);
    let pivot = candles[idx].low;
    (lo..=hi).all(|i| i == idx || candles[i].low >= pivot)
}

/// Detect the last `N_SWINGS` swing highs and lows, ordered by increasing
/// `idx` (invariant #8, §8). `current_price` drives `distance_pct`.
pub fn detect_swings(candles: &[Candle], current_price: f64) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    if candles.len() < MIN_SEPARATION * 2 + 1 {
        return (Vec::new(), Vec::new());
    }

    let mut highs = Vec::new();
    let mut lows = Vec::new();

    for idx in MIN_SEPARATION..candles.len() - MIN_SEPARATION {
        if is_local_high(candles, idx) {
            highs.push((idx, candles[idx].high));
        }
        if is_local_low(candles, idx) {
            lows.push((idx, candles[idx].low));
        }
    }

    // Keep the most recent N_SWINGS by index, not the N_SWINGS with the
    // largest/smallest price.
    let recent_highs = highs.split_off(highs.len().saturating_sub(N_SWINGS));
    let recent_lows = lows.split_off(lows.len().saturating_sub(N_SWINGS));

    let to_points = |pts: Vec<(usize, f64)>| -> Vec<SwingPoint> {
        pts.into_iter()
            .map(|(idx, price)| SwingPoint {
                price,
                distance_pct: if current_price > 0.0 {
                    (price - current_price) / current_price * 100.0
                } else {
                    0.0
                },
                idx,
            })
            .collect()
    };

    (to_points(recent_highs), to_points(recent_lows))
}
