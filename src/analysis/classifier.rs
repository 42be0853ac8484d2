use crate::models::signal::{CombinedRecord, Decision, JoinedSentiment};

/// 买入/卖出阈值，严格不等式触发
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub buy_above: f64,
    pub sell_below: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            buy_above: 0.2,
            sell_below: -0.2,
        }
    }
}

impl Thresholds {
    pub fn classify(&self, avg_compound: f64) -> Decision {
        if avg_compound > self.buy_above {
            Decision::Buy
        } else if avg_compound < self.sell_below {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }
}

/// Classifies with the default 0.2 / -0.2 policy. Boundaries are HOLD.
pub fn classify(avg_compound: f64) -> Decision {
    Thresholds::default().classify(avg_compound)
}

pub fn classify_all(rows: &[JoinedSentiment], thresholds: &Thresholds) -> Vec<CombinedRecord> {
    rows.iter()
        .map(|row| CombinedRecord {
            symbol: row.symbol.clone(),
            price: row.price,
            avg_compound: row.avg_compound,
            decision: thresholds.classify(row.avg_compound),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_resolve_to_hold() {
        assert_eq!(classify(0.2), Decision::Hold);
        assert_eq!(classify(0.2000001), Decision::Buy);
        assert_eq!(classify(-0.2), Decision::Hold);
        assert_eq!(classify(-0.2000001), Decision::Sell);
    }

    #[test]
    fn extremes_and_neutral() {
        assert_eq!(classify(1.0), Decision::Buy);
        assert_eq!(classify(-1.0), Decision::Sell);
        assert_eq!(classify(0.0), Decision::Hold);
        assert_eq!(classify(f64::NAN), Decision::Hold);
    }

    #[test]
    fn custom_thresholds() {
        let strict = Thresholds { buy_above: 0.5, sell_below: -0.5 };
        assert_eq!(strict.classify(0.4), Decision::Hold);
        assert_eq!(strict.classify(0.51), Decision::Buy);
        assert_eq!(strict.classify(-0.51), Decision::Sell);
    }

    #[test]
    fn classify_all_keeps_price_and_score() {
        let joined = vec![
            JoinedSentiment { symbol: "A".into(), avg_compound: 0.3, price: 10.0 },
            JoinedSentiment { symbol: "B".into(), avg_compound: -0.3, price: 20.0 },
        ];
        let records = classify_all(&joined, &Thresholds::default());
        assert_eq!(records[0].decision, Decision::Buy);
        assert_eq!(records[1].decision, Decision::Sell);
        assert_eq!(records[1].price, 20.0);
        assert_eq!(records[0].avg_compound, 0.3);
    }
}
