/// Bollinger Bands: an SMA midline with upper/lower bands at
/// `± num_std_dev` standard deviations of price over `period`.
use super::moving_average::calculate_sma;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub bandwidth_pct: f64,
}

pub fn calculate_bollinger(prices: &[f64], period: usize, num_std_dev: f64) -> Option<BollingerBands> {
    if prices.len() < period {
        return None;
    }

    let middle = calculate_sma(prices, period)?;
    let window = &prices[prices.len() - period..];
    let variance: f64 =
        window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    let upper = middle + num_std_dev * std_dev;
    let lower = middle - num_std_dev * std_dev;
    let bandwidth_pct = if middle != 0.0 {
        (upper - lower) / middle * 100.0
    } else {
        0.0
    };

    Some(BollingerBands {
        upper,
        middle,
        lower,
        bandwidth_pct,
    })
}
