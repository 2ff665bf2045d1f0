//! Scenario Adapter (§4.8): turns each `LlmScenario` into a full `Scenario`
//! by computing the adapter-owned fields, repairing or dropping invariant
//! violations, and applying the diversity/truncation policy. Pure,
//! synchronous.
use crate::generator::LlmScenario;
use crate::models::{Bias, CandidateLevels, Leverage, MarketContext, Scenario};
use crate::timeframe::Timeframe;
use uuid::Uuid;

/// How much a scenario's own bias agreeing (or not) with the context
/// scorer's bias scales `context.strength` into `confidence` (§3: "confidence
/// monotonically reflects the context scorer's agreement with the
/// scenario's bias", §9 open question (b)). Full strength when they match,
/// a partial factor when either side is neutral, the smallest factor when
/// a scenario directly contradicts a directional context (e.g. a short
/// scenario against a long-biased context).
fn bias_agreement_factor(context_bias: Bias, scenario_bias: Bias) -> f64 {
    if context_bias == scenario_bias {
        1.0
    } else if context_bias == Bias::Neutral || scenario_bias == Bias::Neutral {
        0.6
    } else {
        0.3
    }
}

/// Derive `confidence` from the context scorer's `strength`, never the raw
/// LLM-reported value — the LLM's self-reported confidence has no
/// traceable relationship to the context scorer and cannot be trusted to
/// be monotonic in bias agreement.
fn confidence_for(context: &MarketContext, scenario_bias: Bias) -> f64 {
    (context.strength * bias_agreement_factor(context.bias, scenario_bias)).clamp(0.0, 1.0)
}

/// `max_safe = clamp(floor(10/atr_percent), 1, 20)`; `recommended =
/// max(1, floor(max_safe*0.6))` (§4.8).
fn leverage_for(atr_percent: f64) -> Leverage {
    let max_safe = if atr_percent > 0.0 {
        (10.0 / atr_percent).floor().clamp(1.0, 20.0)
    } else {
        20.0
    };
    let recommended = (max_safe * 0.6).floor().max(1.0);

    Leverage {
        recommended: format!("1x-{}x", recommended as u32),
        max_safe: format!("{}x", max_safe as u32),
        volatility_adjusted: true,
        atr_pct: atr_percent,
    }
}

/// Extract `entry_trigger` from the first `conditions` entry and
/// `no_trade_conditions` from the first two `risks` entries (§4.8).
fn extract_trigger_and_no_trade(
    conditions: &[String],
    risks: &[String],
) -> (Option<String>, Option<Vec<String>>) {
    let trigger = conditions.first().cloned();
    let no_trade = if risks.is_empty() {
        None
    } else {
        Some(risks.iter().take(2).cloned().collect())
    };
    (trigger, no_trade)
}

/// Repair a scenario whose target ordering is broken by clamping each
/// target to be strictly further from entry than the previous one, in the
/// scenario's own direction. Returns `None` if repair cannot restore a
/// valid ordering (e.g. fewer than 3 targets).
fn repair_target_ordering(mut scenario: Scenario) -> Option<Scenario> {
    if scenario.price_ordering_holds() {
        return Some(scenario);
    }
    if scenario.targets.len() < 3 {
        return None;
    }

    let anchor = match scenario.bias {
        Bias::Long => scenario.entry.price_max,
        Bias::Short => scenario.entry.price_min,
        Bias::Neutral => return None,
    };

    let mut prev = anchor;
    for target in scenario.targets.iter_mut() {
        match scenario.bias {
            Bias::Long if target.price <= prev => target.price = prev * 1.001,
            Bias::Short if target.price >= prev => target.price = prev * 0.999,
            _ => {}
        }
        prev = target.price;
    }

    if scenario.stop_loss.recommended >= anchor && scenario.bias == Bias::Long {
        scenario.stop_loss.recommended = scenario.entry.price_min * 0.995;
    }
    if scenario.stop_loss.recommended <= anchor && scenario.bias == Bias::Short {
        scenario.stop_loss.recommended = scenario.entry.price_max * 1.005;
    }

    if scenario.price_ordering_holds() {
        Some(scenario)
    } else {
        None
    }
}

/// Repair a scenario whose `invalidation.price` isn't on the opposite side
/// of entry from the targets and tighter than `stop_loss.conservative`
/// (§3): clamp it to the midpoint of the `(conservative, entry)` gap on the
/// correct side. Returns `None` if that gap doesn't exist (conservative has
/// crossed entry), since there's nowhere valid to place it.
fn repair_invalidation(mut scenario: Scenario) -> Option<Scenario> {
    if scenario.invalidation_ordering_holds() {
        return Some(scenario);
    }
    match scenario.bias {
        Bias::Long => {
            let lo = scenario.stop_loss.conservative;
            let hi = scenario.entry.price_min;
            if lo >= hi {
                return None;
            }
            scenario.invalidation.price = (lo + hi) / 2.0;
        }
        Bias::Short => {
            let hi = scenario.stop_loss.conservative;
            let lo = scenario.entry.price_max;
            if lo >= hi {
                return None;
            }
            scenario.invalidation.price = (lo + hi) / 2.0;
        }
        Bias::Neutral => return None,
    }
    if scenario.invalidation_ordering_holds() {
        Some(scenario)
    } else {
        None
    }
}

/// Rescale `partial_close_pct` proportionally so it sums to exactly 100
/// (§8 invariant #3). Returns `None` if the targets summed to (near) zero,
/// since a proportional rescale has nothing to scale from.
fn repair_partial_close_sum(mut scenario: Scenario) -> Option<Scenario> {
    let sum: f64 = scenario.targets.iter().map(|t| t.partial_close_pct).sum();
    if (sum - 100.0).abs() < 0.01 {
        return Some(scenario);
    }
    if sum.abs() < f64::EPSILON {
        return None;
    }
    for target in scenario.targets.iter_mut() {
        target.partial_close_pct = target.partial_close_pct / sum * 100.0;
    }
    Some(scenario)
}

/// Adapt one `LlmScenario` into a full `Scenario` (§4.8). Returns `None` if
/// the scenario's invariants cannot be repaired — callers drop it.
pub fn adapt(
    raw: LlmScenario,
    timeframe: Timeframe,
    atr_percent: f64,
    context: &MarketContext,
) -> Option<Scenario> {
    let leverage = leverage_for(atr_percent);
    let (entry_trigger, no_trade_conditions) =
        extract_trigger_and_no_trade(&raw.conditions, &raw.why.risks);
    let confidence = confidence_for(context, raw.bias);

    let scenario = Scenario {
        id: Uuid::new_v4(),
        name: raw.name,
        bias: raw.bias,
        confidence,
        entry: raw.entry,
        stop_loss: raw.stop_loss,
        targets: raw.targets,
        leverage,
        invalidation: raw.invalidation,
        why: raw.why,
        conditions: raw.conditions,
        stop_pct_of_entry: None,
        atr_multiple_stop: None,
        time_valid_hours: Some(timeframe.time_valid_hours()),
        entry_trigger,
        no_trade_conditions,
    };

    let scenario = repair_target_ordering(scenario)?;
    let scenario = repair_partial_close_sum(scenario)?;
    let mut scenario = repair_invalidation(scenario)?;

    let entry_mid = scenario.entry.mid();
    scenario.stop_pct_of_entry =
        Some((entry_mid - scenario.stop_loss.recommended).abs() / entry_mid * 100.0);
    if atr_percent > 0.0 {
        // atr_percent is a percent; convert back to an absolute ATR in
        // price terms relative to entry_mid for the multiple computation.
        let atr_abs = entry_mid * atr_percent / 100.0;
        if atr_abs > 0.0 {
            scenario.atr_multiple_stop =
                Some((entry_mid - scenario.stop_loss.recommended).abs() / atr_abs);
        }
    }

    Some(scenario)
}

/// Diversity filter + truncation (§4.8, §9 open question (a)): after sorting
/// by confidence desc, ensure at least one `long` and one `short` survive
/// *if* either bias appears among the candidates — never fabricate the
/// missing side. Then truncate to `max(max_scenarios, 3)`. When a bias is
/// entirely absent from the candidate pool (not just the truncated set),
/// the caller is told via the returned warning list so it can surface
/// `"no_short_candidate_produced"` / `"no_long_candidate_produced"` on
/// `data_quality.warnings`, per the honest-diversity decision in DESIGN.md.
pub fn apply_diversity_and_truncate(
    mut scenarios: Vec<Scenario>,
    max_scenarios: usize,
) -> (Vec<Scenario>, Vec<String>) {
    scenarios.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));

    let limit = max_scenarios.max(3).min(scenarios.len());
    let mut kept: Vec<Scenario> = scenarios.iter().take(limit).cloned().collect();

    let has_long = |v: &[Scenario]| v.iter().any(|s| s.bias == Bias::Long);
    let has_short = |v: &[Scenario]| v.iter().any(|s| s.bias == Bias::Short);

    if !has_long(&kept) {
        if let Some(long_candidate) = scenarios.iter().find(|s| s.bias == Bias::Long) {
            if kept.len() >= limit && !kept.is_empty() {
                kept.pop();
            }
            kept.push(long_candidate.clone());
        }
    }
    if !has_short(&kept) {
        if let Some(short_candidate) = scenarios.iter().find(|s| s.bias == Bias::Short) {
            if kept.len() >= limit && !kept.is_empty() {
                kept.pop();
            }
            kept.push(short_candidate.clone());
        }
    }

    kept.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));

    let mut warnings = Vec::new();
    if !scenarios.is_empty() {
        if !has_long(&scenarios) {
            warnings.push("no_long_candidate_produced".to_string());
        }
        if !has_short(&scenarios) {
            warnings.push("no_short_candidate_produced".to_string());
        }
    }

    (kept, warnings)
}

/// Drop scenarios whose prices are not candidate levels within tolerance
/// (§8 invariant #2). Applied after repair, before diversity filtering.
pub fn drop_scenarios_off_candidate_levels(
    scenarios: Vec<Scenario>,
    levels: &CandidateLevels,
) -> Vec<Scenario> {
    scenarios
        .into_iter()
        .filter(|s| {
            let mut prices = vec![s.entry.price_min, s.entry.price_max, s.stop_loss.recommended];
            prices.extend(s.targets.iter().map(|t| t.price));
            prices.iter().all(|&p| levels.contains_within_tolerance(p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, Invalidation, LiqBias, OrderType, StopLoss, Target, Why};

    fn test_context(bias: Bias, strength: f64) -> MarketContext {
        MarketContext {
            trend: "bullish_weak".into(),
            bias,
            bias_score: 0,
            phase: "normal".into(),
            sentiment: "neutral".into(),
            volatility: "normal".into(),
            strength,
            rsi: None,
            funding_rate_pct: None,
            long_short_ratio: None,
            liq_pressure_bias: LiqBias::Neutral,
        }
    }

    fn raw_long(entry_min: f64, entry_max: f64, stop: f64, targets: [f64; 3], confidence: f64) -> LlmScenario {
        LlmScenario {
            name: "test".into(),
            bias: Bias::Long,
            confidence,
            entry: Entry {
                price_min: entry_min,
                price_max: entry_max,
                order_type: OrderType::LimitOrder,
                reason: "support".into(),
            },
            stop_loss: StopLoss {
                conservative: stop - 100.0,
                aggressive: stop,
                recommended: stop,
                reason: "below support".into(),
            },
            targets: (1..=3u8)
                .zip(targets)
                .map(|(level, price)| Target {
                    level,
                    price,
                    partial_close_pct: 100.0 / 3.0,
                    rr: 2.0,
                    reason: "resistance".into(),
                })
                .collect(),
            invalidation: Invalidation {
                price: stop - 50.0,
                condition: "close below invalidation".into(),
            },
            why: Why {
                bullish_factors: Some(vec!["trend".into()]),
                bearish_factors: None,
                risks: vec!["funding flip".into(), "liquidity gap".into(), "third risk".into()],
            },
            conditions: vec!["RSI reclaim".into(), "volume confirm".into()],
        }
    }

    #[test]
    fn adapt_fills_adapter_owned_fields() {
        let raw = raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.7);
        let scenario = adapt(raw, Timeframe::H4, 2.0, &test_context(Bias::Long, 0.8)).unwrap();

        assert!(scenario.stop_pct_of_entry.is_some());
        assert!(scenario.atr_multiple_stop.is_some());
        assert_eq!(scenario.time_valid_hours, Some(Timeframe::H4.time_valid_hours()));
        assert_eq!(scenario.entry_trigger, Some("RSI reclaim".to_string()));
        assert_eq!(
            scenario.no_trade_conditions,
            Some(vec!["funding flip".to_string(), "liquidity gap".to_string()])
        );
        assert!(scenario.price_ordering_holds());
    }

    #[test]
    fn leverage_cap_respects_atr_percent() {
        let leverage = leverage_for(5.0); // max_safe = floor(10/5)=2, recommended=floor(2*0.6)=1
        assert_eq!(leverage.max_safe, "2x");
        assert_eq!(leverage.recommended, "1x-1x");
    }

    #[test]
    fn leverage_never_exceeds_twenty() {
        let leverage = leverage_for(0.1); // floor(10/0.1)=100, clamp to 20
        assert_eq!(leverage.max_safe, "20x");
    }

    #[test]
    fn broken_target_ordering_is_repaired() {
        let raw = raw_long(93000.0, 93500.0, 92800.0, [92000.0, 96500.0, 97000.0], 0.7);
        let scenario = adapt(raw, Timeframe::H4, 2.0, &test_context(Bias::Long, 0.8)).unwrap();
        assert!(scenario.price_ordering_holds());
    }

    #[test]
    fn invalidation_on_the_wrong_side_of_entry_is_repaired() {
        let mut raw = raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.7);
        raw.invalidation.price = 95000.0; // same side as targets, should be below entry
        let scenario = adapt(raw, Timeframe::H4, 2.0, &test_context(Bias::Long, 0.8)).unwrap();
        assert!(scenario.invalidation_ordering_holds());
        assert!(scenario.invalidation.price < scenario.entry.price_min);
        assert!(scenario.invalidation.price > scenario.stop_loss.conservative);
    }

    #[test]
    fn invalidation_with_no_gap_to_repair_into_is_dropped() {
        let mut raw = raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.7);
        raw.stop_loss.conservative = 93000.0; // conservative has crossed entry.price_min
        raw.invalidation.price = 95000.0;
        assert!(adapt(raw, Timeframe::H4, 2.0, &test_context(Bias::Long, 0.8)).is_none());
    }

    #[test]
    fn partial_close_pct_not_summing_to_100_is_rescaled() {
        let mut raw = raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.7);
        raw.targets[0].partial_close_pct = 50.0;
        raw.targets[1].partial_close_pct = 50.0;
        raw.targets[2].partial_close_pct = 50.0; // sums to 150, not 100

        let scenario = adapt(raw, Timeframe::H4, 2.0, &test_context(Bias::Long, 0.8)).unwrap();
        let sum: f64 = scenario.targets.iter().map(|t| t.partial_close_pct).sum();
        assert!((sum - 100.0).abs() < 0.01, "sum was {sum}");
        // proportions preserved: all three were equal before rescale.
        assert!((scenario.targets[0].partial_close_pct - 100.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn zero_sum_partial_close_pct_cannot_be_rescaled_and_is_dropped() {
        let mut raw = raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.7);
        for target in raw.targets.iter_mut() {
            target.partial_close_pct = 0.0;
        }
        assert!(adapt(raw, Timeframe::H4, 2.0, &test_context(Bias::Long, 0.8)).is_none());
    }

    #[test]
    fn diversity_filter_keeps_both_sides_when_present() {
        let long_context = test_context(Bias::Long, 0.9);
        let mut long = adapt(
            raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.9),
            Timeframe::H4,
            2.0,
            &long_context,
        )
        .unwrap();
        long.name = "long-high-confidence".into();

        let mut short_raw = raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.8);
        short_raw.bias = Bias::Short;
        short_raw.entry.price_min = 93500.0;
        short_raw.entry.price_max = 93000.0;
        short_raw.stop_loss.recommended = 94000.0;
        short_raw.stop_loss.conservative = 94200.0;
        short_raw.invalidation.price = 93100.0;
        short_raw.targets = vec![
            Target { level: 1, price: 91000.0, partial_close_pct: 30.0, rr: 2.0, reason: "s1".into() },
            Target { level: 2, price: 90000.0, partial_close_pct: 40.0, rr: 2.6, reason: "s2".into() },
            Target { level: 3, price: 89000.0, partial_close_pct: 30.0, rr: 3.2, reason: "s3".into() },
        ];
        let short = adapt(short_raw, Timeframe::H4, 2.0, &test_context(Bias::Short, 0.8)).unwrap();

        let another_long = adapt(
            raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.85),
            Timeframe::H4,
            2.0,
            &long_context,
        )
        .unwrap();

        let (kept, warnings) = apply_diversity_and_truncate(vec![long, another_long, short], 3);
        assert!(kept.iter().any(|s| s.bias == Bias::Long));
        assert!(kept.iter().any(|s| s.bias == Bias::Short));
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_side_never_fabricated_but_warned_about() {
        let context = test_context(Bias::Long, 0.9);
        let long_a = adapt(
            raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.9),
            Timeframe::H4,
            2.0,
            &context,
        )
        .unwrap();
        let long_b = adapt(
            raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.8),
            Timeframe::H4,
            2.0,
            &context,
        )
        .unwrap();
        let long_c = adapt(
            raw_long(93000.0, 93500.0, 92800.0, [96000.0, 96500.0, 97000.0], 0.7),
            Timeframe::H4,
            2.0,
            &context,
        )
        .unwrap();

        let (kept, warnings) = apply_diversity_and_truncate(vec![long_a, long_b, long_c], 3);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|s| s.bias == Bias::Long));
        assert_eq!(warnings, vec!["no_short_candidate_produced".to_string()]);
    }
}
