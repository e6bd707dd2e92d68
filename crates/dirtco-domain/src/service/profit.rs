//! Margin evaluation

use dirtco_types::QuoteError;

use super::round_tenth;
use crate::model::{MarginStatus, ProfitAnalysis};

const LOW_MARGIN_PERCENT: f64 = 30.0;
const EXCELLENT_MARGIN_PERCENT: f64 = 35.0;

pub fn evaluate_profit(
    final_price: i64,
    total_internal_cost: i64,
) -> Result<ProfitAnalysis, QuoteError> {
    if final_price <= 0 {
        return Err(QuoteError::DegenerateQuote { final_price });
    }

    let gross_profit = final_price - total_internal_cost;
    let margin = gross_profit as f64 / final_price as f64 * 100.0;
    let low_margin_flag = margin < LOW_MARGIN_PERCENT;
    let status = if low_margin_flag {
        MarginStatus::LowMargin
    } else if margin < EXCELLENT_MARGIN_PERCENT {
        MarginStatus::Acceptable
    } else {
        MarginStatus::Excellent
    };

    Ok(ProfitAnalysis {
        gross_profit,
        margin_percent: round_tenth(margin),
        low_margin_flag,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excellent_margin() {
        let profit = evaluate_profit(6600, 3570).unwrap();
        assert_eq!(profit.gross_profit, 3030);
        assert!((profit.margin_percent - 45.9).abs() < 1e-9);
        assert!(!profit.low_margin_flag);
        assert_eq!(profit.status, MarginStatus::Excellent);
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(evaluate_profit(1000, 710).unwrap().status, MarginStatus::LowMargin);
        assert_eq!(evaluate_profit(1000, 700).unwrap().status, MarginStatus::Acceptable);
        assert_eq!(evaluate_profit(1000, 651).unwrap().status, MarginStatus::Acceptable);
        assert_eq!(evaluate_profit(1000, 650).unwrap().status, MarginStatus::Excellent);
    }

    #[test]
    fn test_loss_is_low_margin() {
        let profit = evaluate_profit(500, 800).unwrap();
        assert_eq!(profit.gross_profit, -300);
        assert!((profit.margin_percent + 60.0).abs() < 1e-9);
        assert!(profit.low_margin_flag);
    }

    #[test]
    fn test_zero_price_is_degenerate() {
        assert_eq!(
            evaluate_profit(0, 100).unwrap_err(),
            QuoteError::DegenerateQuote { final_price: 0 }
        );
    }
}
