//! Liquidation Aggregator (§4.4): bins raw liquidation events by price,
//! classifies intensity and spike magnitude, and derives a directional bias.
//! Pure, synchronous — the event feed itself is fetched by the collectors.
use crate::models::{
    Intensity, LiqBias, LiquidationBin, LiquidationClusters, LiquidationEvent, LiquidationSide,
    SpikeMagnitude,
};
use std::collections::BTreeMap;

/// Relative bin width as a fraction of price (§6: `liq_bin_pct`, default
/// 0.005 = 0.5%).
pub const DEFAULT_BIN_PCT: f64 = 0.005;

/// `floor(price/bin_size)*bin_size` bins events, never `round()` — rounding
/// would let an event near a bin's upper edge land in the bin above it,
/// which breaks the "current price falls inside the nearest bin" reasoning
/// callers rely on (bug #3 in source notes).
fn bin_price(price: f64, bin_size: f64) -> f64 {
    (price / bin_size).floor() * bin_size
}

/// Aggregate raw events into clustered bins plus spike/bias summary.
/// `current_price` decides which side of the book a bin falls on;
/// `window_hours` is the span the event feed actually covers, used for
/// spike normalization.
pub fn aggregate(
    events: &[LiquidationEvent],
    current_price: f64,
    window_hours: f64,
) -> LiquidationClusters {
    if events.is_empty() {
        return LiquidationClusters::empty();
    }

    let bin_size = (current_price * DEFAULT_BIN_PCT).max(f64::EPSILON);

    let mut above: BTreeMap<i64, (f64, u32)> = BTreeMap::new();
    let mut below: BTreeMap<i64, (f64, u32)> = BTreeMap::new();
    let mut long_usd = 0.0;
    let mut short_usd = 0.0;

    for ev in events {
        let usd = ev.price * ev.qty;
        match ev.side {
            LiquidationSide::Long => long_usd += usd,
            LiquidationSide::Short => short_usd += usd,
        }

        let binned = bin_price(ev.price, bin_size);
        let key = (binned / bin_size).round() as i64;
        let target = if binned >= current_price {
            &mut above
        } else {
            &mut below
        };
        let entry = target.entry(key).or_insert((0.0, 0));
        entry.0 += usd;
        entry.1 += 1;
    }

    // Top-5 bins by USD volume (§3) — the book can have far more bins than
    // that once events spread across a wide price range, so this is a real
    // truncation, not a no-op on the common case.
    const MAX_CLUSTER_BINS: usize = 5;
    let to_bins = |map: BTreeMap<i64, (f64, u32)>| -> Vec<LiquidationBin> {
        let mut bins: Vec<LiquidationBin> = map
            .into_iter()
            .map(|(key, (volume_usd, _count))| LiquidationBin {
                price: key as f64 * bin_size,
                intensity: Intensity::from_volume_usd(volume_usd),
                volume_usd,
            })
            .collect();
        bins.sort_by(|a, b| b.volume_usd.partial_cmp(&a.volume_usd).unwrap_or(std::cmp::Ordering::Equal));
        bins.truncate(MAX_CLUSTER_BINS);
        bins
    };

    // `hours_in_data` floors at 1.0 so a very short data window never
    // inflates the per-hour baseline into an undetectable denominator
    // (bug #4 in source notes).
    let hours_in_data = window_hours.max(1.0);
    let total_usd: f64 = long_usd + short_usd;
    let per_hour_baseline = total_usd / hours_in_data;
    let last_hour_cutoff = events
        .iter()
        .map(|e| e.time)
        .max()
        .map(|latest| latest - chrono::Duration::hours(1));
    let last_hour_usd: f64 = last_hour_cutoff
        .map(|cutoff| {
            events
                .iter()
                .filter(|e| e.time >= cutoff)
                .map(|e| e.price * e.qty)
                .sum()
        })
        .unwrap_or(0.0);

    let spike_ratio = if per_hour_baseline > 0.0 {
        last_hour_usd / per_hour_baseline
    } else {
        0.0
    };
    let last_24h_liq_spike = spike_ratio >= 2.0;
    let spike_magnitude = if spike_ratio >= 4.0 {
        SpikeMagnitude::Large
    } else if spike_ratio >= 2.0 {
        SpikeMagnitude::Medium
    } else {
        SpikeMagnitude::Low
    };

    // Longs being liquidated more heavily than shorts is bearish pressure
    // (forced selling), so the bias points short, and symmetrically.
    let liq_pressure_bias = if short_usd > 0.0 && long_usd >= short_usd * 1.5 {
        LiqBias::Short
    } else if long_usd > 0.0 && short_usd >= long_usd * 1.5 {
        LiqBias::Long
    } else {
        LiqBias::Neutral
    };

    LiquidationClusters {
        clusters_above: to_bins(above),
        clusters_below: to_bins(below),
        last_24h_liq_spike,
        spike_magnitude,
        liq_pressure_bias,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn base_ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ev(price: f64, side: LiquidationSide, qty: f64, hours_ago: i64) -> LiquidationEvent {
        LiquidationEvent {
            price,
            side,
            qty,
            time: base_ts() + Duration::hours(24 - hours_ago),
        }
    }

    #[test]
    fn empty_events_yield_empty_with_neutral_bias() {
        let clusters = aggregate(&[], 100.0, 24.0);
        assert_eq!(clusters, LiquidationClusters::empty());
    }

    #[test]
    fn bin_never_rounds_up_across_boundary() {
        // bin_size = 0.5% of 100000 = 500. A price of 100_499 should land
        // in the 100_000 bin, not 100_500, under floor semantics.
        assert_eq!(bin_price(100_499.0, 500.0), 100_000.0);
    }

    #[test]
    fn heavy_long_liquidation_yields_short_bias() {
        let events = vec![
            ev(100_000.0, LiquidationSide::Long, 10.0, 0),
            ev(100_000.0, LiquidationSide::Long, 10.0, 0),
            ev(100_000.0, LiquidationSide::Short, 1.0, 0),
        ];
        let clusters = aggregate(&events, 100_000.0, 24.0);
        assert_eq!(clusters.liq_pressure_bias, LiqBias::Short);
    }

    #[test]
    fn clusters_are_truncated_to_top_five_by_volume() {
        // 8 distinct price bins above current price, each carrying a
        // different volume — only the 5 heaviest should survive, sorted
        // by volume_usd descending.
        let mut events = Vec::new();
        for i in 0..8u32 {
            let price = 101_000.0 + i as f64 * 1_000.0; // distinct bins, all above 100_000
            let qty = (i + 1) as f64; // 1..=8, so volume_usd is distinct per bin
            events.push(ev(price, LiquidationSide::Short, qty, 0));
        }
        let clusters = aggregate(&events, 100_000.0, 24.0);
        assert_eq!(clusters.clusters_above.len(), 5);
        for w in clusters.clusters_above.windows(2) {
            assert!(w[0].volume_usd >= w[1].volume_usd);
        }
        // heaviest bin (i=7, qty=8) must be first.
        assert_eq!(clusters.clusters_above[0].volume_usd, 8.0 * (101_000.0 + 7_000.0));
    }

    #[test]
    fn recent_concentration_triggers_spike() {
        let mut events: Vec<LiquidationEvent> = (0..20)
            .map(|_| ev(100_000.0, LiquidationSide::Long, 0.01, 12))
            .collect();
        // Small steady background over 24h, then a concentrated burst in
        // the last hour.
        for _ in 0..50 {
            events.push(ev(100_000.0, LiquidationSide::Long, 5.0, 0));
        }
        let clusters = aggregate(&events, 100_000.0, 24.0);
        assert!(clusters.last_24h_liq_spike);
    }
}
