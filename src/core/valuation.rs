//! Future value of a purchase price if invested instead of spent

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValuationError {
    #[error("price must be a non-negative number")]
    InvalidPrice,
    #[error("expectedReturn must be a non-negative fraction")]
    InvalidReturn,
    #[error("targetYears must be at least 1")]
    InvalidYears,
}

/// Computes `price * (1 + expected_return) ^ target_years`.
///
/// `expected_return` is a fraction (0.07 for 7%), not a percentage. No
/// rounding is applied; presentation layers round for display only.
pub fn future_value(
    price: f64,
    expected_return: f64,
    target_years: u32,
) -> Result<f64, ValuationError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValuationError::InvalidPrice);
    }
    if !expected_return.is_finite() || expected_return < 0.0 {
        return Err(ValuationError::InvalidReturn);
    }
    if target_years == 0 {
        return Err(ValuationError::InvalidYears);
    }

    Ok(price * (1.0 + expected_return).powf(f64::from(target_years)))
}
