/// On-Balance Volume: a running total that adds a bar's volume when close
/// rises, subtracts it when close falls, and leaves it unchanged on a flat
/// close.
use crate::models::Candle;

pub fn calculate_obv(candles: &[Candle]) -> Option<f64> {
    if candles.len() < 2 {
        return None;
    }

    let mut obv = 0.0;
    for i in 1..candles.len() {
        let change = candles[i].close - candles[i - 1].close;
        if change > 0.0 {
            obv += candles[i].volume;
        } else if change < 0.0 {
            obv -= candles[i].volume;
        }
    }

    Some(obv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_ohlc;

    #[test]
    fn obv_accumulates_on_rises_and_falls() {
        let candles = series_from_ohlc(&[
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 102.0, 99.0, 101.0), // up
            (101.0, 102.0, 98.0, 99.0),  // down
        ]);
        let obv = calculate_obv(&candles).unwrap();
        // +1000 (bar 1 up) - 1000 (bar 2 down) = 0, both bars have volume 1000.
        assert_eq!(obv, 0.0);
    }

    #[test]
    fn insufficient_data_is_none() {
        let candles = series_from_ohlc(&[(100.0, 101.0, 99.0, 100.0)]);
        assert!(calculate_obv(&candles).is_none());
    }
}
