//! Timeframe parsing and the constants derived from it.
//!
//! Bug #7 (source notes): the static map of known timeframe strings must not
//! be the sole source of truth — a generic `<N><unit>` grammar has to back it
//! up so unlisted-but-valid strings like `"2h"` or `"3d"` still parse.

use std::fmt;

/// A candle interval understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    M15,
    H1,
    H4,
    H6,
    H8,
    H12,
    D1,
    W1,
    /// Any interval reached only through the generic grammar, in minutes.
    Other(u32),
}

impl Timeframe {
    const KNOWN: &'static [(&'static str, Timeframe)] = &[
        ("15m", Timeframe::M15),
        ("1h", Timeframe::H1),
        ("4h", Timeframe::H4),
        ("6h", Timeframe::H6),
        ("8h", Timeframe::H8),
        ("12h", Timeframe::H12),
        ("1d", Timeframe::D1),
        ("1w", Timeframe::W1),
    ];

    /// Parse a timeframe string. Checks the static map first (so canonical
    /// strings always resolve to the canonical variant, which callers match
    /// on), then falls back to a generic `<N><unit>` grammar where
    /// `unit ∈ {m, h, d, w}`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        for (name, tf) in Self::KNOWN {
            if s.eq_ignore_ascii_case(name) {
                return Some(*tf);
            }
        }
        Self::parse_generic(s)
    }

    fn parse_generic(s: &str) -> Option<Self> {
        if s.len() < 2 {
            return None;
        }
        let (digits, unit) = s.split_at(s.len() - 1);
        let n: u32 = digits.parse().ok()?;
        if n == 0 {
            return None;
        }
        let minutes = match unit.to_ascii_lowercase().as_str() {
            "m" => n,
            "h" => n.checked_mul(60)?,
            "d" => n.checked_mul(60 * 24)?,
            "w" => n.checked_mul(60 * 24 * 7)?,
            _ => return None,
        };
        Some(Self::canonicalize(minutes))
    }

    fn canonicalize(minutes: u32) -> Self {
        for (_, tf) in Self::KNOWN {
            if tf.minutes() == minutes {
                return *tf;
            }
        }
        Timeframe::Other(minutes)
    }

    pub fn minutes(&self) -> u32 {
        match self {
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::H6 => 360,
            Timeframe::H8 => 480,
            Timeframe::H12 => 720,
            Timeframe::D1 => 1440,
            Timeframe::W1 => 10080,
            Timeframe::Other(m) => *m,
        }
    }

    pub fn hours(&self) -> f64 {
        self.minutes() as f64 / 60.0
    }

    /// Intraday timeframes use a 50-bar range lookback; daily+ use 30 (§4.3).
    pub fn is_intraday(&self) -> bool {
        self.minutes() < Timeframe::D1.minutes()
    }

    pub fn range_lookback(&self) -> usize {
        if self.is_intraday() {
            50
        } else {
            30
        }
    }

    /// Dynamic sentiment `tf_multiplier` (§4.5).
    pub fn sentiment_tf_multiplier(&self) -> f64 {
        match self {
            Timeframe::D1 | Timeframe::W1 => 2.0,
            Timeframe::H4 | Timeframe::H6 | Timeframe::H8 | Timeframe::H12 => 1.5,
            _ if self.minutes() >= Timeframe::D1.minutes() => 2.0,
            _ if self.minutes() >= Timeframe::H4.minutes() => 1.5,
            _ => 0.5,
        }
    }

    /// `time_valid_hours` anchors (§4.8); values between anchors are linearly
    /// interpolated by `Timeframe::time_valid_hours`.
    fn anchor_hours(&self) -> Option<(f64, f64)> {
        match self.minutes() {
            m if m == Timeframe::M15.minutes() => Some((15.0, 4.0)),
            m if m == Timeframe::H1.minutes() => Some((60.0, 6.0)),
            m if m == Timeframe::H4.minutes() => Some((240.0, 48.0)),
            m if m == Timeframe::D1.minutes() => Some((1440.0, 168.0)),
            _ => None,
        }
    }

    pub fn time_valid_hours(&self) -> f64 {
        const ANCHORS: [(f64, f64); 4] = [(15.0, 4.0), (60.0, 6.0), (240.0, 48.0), (1440.0, 168.0)];
        if let Some((_, h)) = self.anchor_hours() {
            return h;
        }
        let m = self.minutes() as f64;
        if m <= ANCHORS[0].0 {
            return ANCHORS[0].1;
        }
        if m >= ANCHORS[ANCHORS.len() - 1].0 {
            return ANCHORS[ANCHORS.len() - 1].1;
        }
        for w in ANCHORS.windows(2) {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            if m >= x0 && m <= x1 {
                let t = (m - x0) / (x1 - x0);
                return y0 + t * (y1 - y0);
            }
        }
        ANCHORS[ANCHORS.len() - 1].1
    }

    pub fn as_str(&self) -> String {
        for (name, tf) in Self::KNOWN {
            if tf == self {
                return name.to_string();
            }
        }
        match self {
            Timeframe::Other(m) if m % (60 * 24 * 7) == 0 => format!("{}w", m / (60 * 24 * 7)),
            Timeframe::Other(m) if m % (60 * 24) == 0 => format!("{}d", m / (60 * 24)),
            Timeframe::Other(m) if m % 60 == 0 => format!("{}h", m / 60),
            Timeframe::Other(m) => format!("{}m", m),
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_strings() {
        assert_eq!(Timeframe::parse("4h"), Some(Timeframe::H4));
        assert_eq!(Timeframe::parse("1D"), Some(Timeframe::D1));
        assert_eq!(Timeframe::parse("1w"), Some(Timeframe::W1));
    }

    #[test]
    fn parses_generic_grammar_beyond_the_map() {
        assert_eq!(Timeframe::parse("2h").unwrap().minutes(), 120);
        assert_eq!(Timeframe::parse("3d").unwrap().minutes(), 3 * 1440);
        assert_eq!(Timeframe::parse("30m").unwrap().minutes(), 30);
    }

    #[test]
    fn generic_grammar_canonicalizes_known_durations() {
        assert_eq!(Timeframe::parse("240m"), Some(Timeframe::H4));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Timeframe::parse("").is_none());
        assert!(Timeframe::parse("4x").is_none());
        assert!(Timeframe::parse("0h").is_none());
    }

    #[test]
    fn sentiment_multiplier_by_horizon() {
        assert_eq!(Timeframe::H1.sentiment_tf_multiplier(), 0.5);
        assert_eq!(Timeframe::H4.sentiment_tf_multiplier(), 1.5);
        assert_eq!(Timeframe::D1.sentiment_tf_multiplier(), 2.0);
    }

    #[test]
    fn time_valid_hours_matches_anchors_and_interpolates() {
        assert_eq!(Timeframe::M15.time_valid_hours(), 4.0);
        assert_eq!(Timeframe::H1.time_valid_hours(), 6.0);
        assert_eq!(Timeframe::H4.time_valid_hours(), 48.0);
        assert_eq!(Timeframe::D1.time_valid_hours(), 168.0);
        // 12h sits strictly between the 4h and 1d anchors.
        let t = Timeframe::H12.time_valid_hours();
        assert!(t > 48.0 && t < 168.0);
    }
}
