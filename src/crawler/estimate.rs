use crate::app::{HarvestError, Result};

/// Parse a displayed count, expanding a `k` (thousands) suffix.
///
/// `"2.4k"` → 2400, `"421"` → 421. Thousands separators are ignored.
pub fn parse_number(text: &str) -> Result<i64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();

    if let Some(thousands) = cleaned.strip_suffix(['k', 'K']) {
        let value: f64 = thousands
            .trim()
            .parse()
            .map_err(|_| HarvestError::Extraction(format!("Not a number: {text:?}")))?;
        let value = (value * 1000.0).round();
        // `as` saturates, so bounds are checked on the float
        if !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
            return Err(HarvestError::Extraction(format!(
                "Number out of range: {text:?}"
            )));
        }
        return Ok(value as i64);
    }

    cleaned
        .parse()
        .map_err(|_| HarvestError::Extraction(format!("Not a number: {text:?}")))
}

/// Estimate the vote count from the displayed rating and upvote percentage.
///
/// `votes = floor(50 * rating / (percentage - 50))`. At exactly 50% the
/// estimate is undefined and the entry is rejected. Below 50% the result is
/// negative and returned as is.
pub fn estimate_votes(rating: i64, percentage: i64) -> Result<i64> {
    let overflow = || {
        HarvestError::Extraction(format!(
            "Vote estimate out of range for rating {rating} at {percentage}%"
        ))
    };
    let divisor = percentage.checked_sub(50).ok_or_else(overflow)?;
    if divisor == 0 {
        return Err(HarvestError::VoteEstimationUndefined { rating });
    }
    let dividend = rating.checked_mul(50).ok_or_else(overflow)?;
    floor_div(dividend, divisor).ok_or_else(overflow)
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a.checked_rem(b)? != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}
