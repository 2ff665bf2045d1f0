//! Quality Assessor (§4.9): turns the collectors' warning list and which
//! `CollectedData` fields are present into a weighted completeness score.
//! Pure, synchronous, the final stage before the response is assembled.
use crate::models::{CollectedData, DataQuality};

/// Weights sum to 100 (§4.9): primary OHLCV dominates since every other
/// component depends on it, MTF/liquidation are the next heaviest signals.
const WEIGHT_PRIMARY_OHLCV: f64 = 40.0;
const WEIGHT_MTF: f64 = 15.0;
const WEIGHT_FUNDING: f64 = 10.0;
const WEIGHT_OPEN_INTEREST: f64 = 10.0;
const WEIGHT_LONG_SHORT_RATIO: f64 = 5.0;
const WEIGHT_LIQUIDATION: f64 = 15.0;
const WEIGHT_SENTIMENT: f64 = 5.0;

const EXPECTED_MTF_COUNT: usize = 3;

/// Assess `CollectedData` completeness and list which sources fed the
/// response, merging in warnings the collectors already recorded.
pub fn assess(data: &CollectedData, collector_warnings: &[String]) -> DataQuality {
    let mut completeness = 0.0;
    let mut sources = Vec::new();
    let mut warnings = collector_warnings.to_vec();

    if !data.primary_ohlcv.is_empty() {
        completeness += WEIGHT_PRIMARY_OHLCV;
        sources.push("primary_ohlcv".to_string());
    }

    let mtf_fraction = (data.mtf_ohlcv.len() as f64 / EXPECTED_MTF_COUNT as f64).min(1.0);
    if mtf_fraction > 0.0 {
        completeness += WEIGHT_MTF * mtf_fraction;
        sources.push("mtf_ohlcv".to_string());
    }
    if data.mtf_ohlcv.len() < EXPECTED_MTF_COUNT {
        warnings.push("mtf_ohlcv_partial".to_string());
    }

    if data.funding.is_some() {
        completeness += WEIGHT_FUNDING;
        sources.push("funding".to_string());
    }
    if data.open_interest.is_some() {
        completeness += WEIGHT_OPEN_INTEREST;
        sources.push("open_interest".to_string());
    }
    if data.long_short_ratio.is_some() {
        completeness += WEIGHT_LONG_SHORT_RATIO;
        sources.push("long_short_ratio".to_string());
    }
    if data.liquidations.is_some() {
        completeness += WEIGHT_LIQUIDATION;
        sources.push("liquidations".to_string());
    }
    if data.sentiment.is_some() {
        completeness += WEIGHT_SENTIMENT;
        sources.push("sentiment".to_string());
    }

    DataQuality {
        completeness: completeness.min(100.0),
        sources,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FundingInfo, SentimentClassification, SentimentInfo};
    use crate::test_support::rising_series;

    #[test]
    fn full_data_scores_one_hundred() {
        let mut data = CollectedData {
            primary_ohlcv: rising_series(60, 100.0, 0.1),
            ..Default::default()
        };
        data.mtf_ohlcv.insert("1h".to_string(), rising_series(60, 100.0, 0.1));
        data.mtf_ohlcv.insert("4h".to_string(), rising_series(60, 100.0, 0.1));
        data.mtf_ohlcv.insert("1d".to_string(), rising_series(60, 100.0, 0.1));
        data.funding = Some(FundingInfo {
            rate: 0.0003,
            next_time: crate::test_support::base_ts(),
        });
        data.open_interest = Some(1_000_000.0);
        data.long_short_ratio = Some(1.1);
        data.liquidations = Some(Vec::new());
        data.sentiment = Some(SentimentInfo {
            value: 50,
            classification: SentimentClassification::Neutral,
        });

        let quality = assess(&data, &[]);
        assert_eq!(quality.completeness, 100.0);
        assert!(quality.warnings.is_empty());
    }

    #[test]
    fn missing_sources_lower_completeness_and_add_warnings() {
        let data = CollectedData {
            primary_ohlcv: rising_series(60, 100.0, 0.1),
            ..Default::default()
        };
        let quality = assess(&data, &["liquidation_data_unavailable".to_string()]);
        assert_eq!(quality.completeness, WEIGHT_PRIMARY_OHLCV);
        assert!(quality.warnings.contains(&"liquidation_data_unavailable".to_string()));
        assert!(quality.warnings.contains(&"mtf_ohlcv_partial".to_string()));
    }

    #[test]
    fn empty_primary_ohlcv_scores_zero() {
        let data = CollectedData::default();
        let quality = assess(&data, &[]);
        assert_eq!(quality.completeness, 0.0);
        assert!(quality.sources.is_empty());
    }
}
