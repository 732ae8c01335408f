// Fixed-point helpers shared by vesting and staking
//
// All operations are done on U256 to avoid overflow of the intermediate
// product, then checked back into the u128 amount range.

use primitive_types::U256;

use crate::{
    error::{Result, TokenomicsError},
    ledger::Amount,
};

/// floor(value * numerator / denominator)
pub fn mul_div(value: Amount, numerator: u128, denominator: u128) -> Result<Amount> {
    if denominator == 0 {
        return Err(TokenomicsError::Overflow);
    }

    let product = U256::from(value) * U256::from(numerator);
    let quotient = product / U256::from(denominator);
    if quotient > U256::from(u128::MAX) {
        return Err(TokenomicsError::Overflow);
    }

    Ok(quotient.as_u128())
}

/// floor(value * percent / 100)
pub fn percent_of(value: Amount, percent: u8) -> Result<Amount> {
    mul_div(value, percent as u128, 100)
}

/// floor(value * permille / 1000)
pub fn permille_of(value: Amount, permille: u32) -> Result<Amount> {
    mul_div(value, permille as u128, 1_000)
}

/// Linear release curve: nothing before `start`, everything from
/// `start + duration`, floor(total * elapsed / duration) in between
pub fn linear_vested(
    total: Amount,
    start: u64,
    duration: u64,
    timestamp: u64,
) -> Result<Amount> {
    if timestamp < start {
        return Ok(0);
    }

    let elapsed = timestamp - start;
    if duration == 0 || elapsed >= duration {
        return Ok(total);
    }

    mul_div(total, elapsed as u128, duration as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floors() -> Result<()> {
        assert_eq!(mul_div(1000, 1, 12)?, 83);
        assert_eq!(mul_div(139, 1, 12)?, 11);
        assert_eq!(mul_div(0, 5, 7)?, 0);
        Ok(())
    }

    #[test]
    fn test_mul_div_wide_intermediate() -> Result<()> {
        // The product does not fit in u128 but the quotient does
        let big = u128::MAX / 2;
        assert_eq!(mul_div(big, 4, 4)?, big);
        Ok(())
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(mul_div(1, 1, 0), Err(TokenomicsError::Overflow));
        assert_eq!(mul_div(u128::MAX, 2, 1), Err(TokenomicsError::Overflow));
    }

    #[test]
    fn test_percent_helpers() -> Result<()> {
        assert_eq!(percent_of(100, 20)?, 20);
        assert_eq!(percent_of(99, 20)?, 19);
        assert_eq!(permille_of(1000, 63)?, 63);
        Ok(())
    }

    #[test]
    fn test_linear_vested_curve() -> Result<()> {
        assert_eq!(linear_vested(1000, 100, 10, 50)?, 0);
        assert_eq!(linear_vested(1000, 100, 10, 100)?, 0);
        assert_eq!(linear_vested(1000, 100, 10, 103)?, 300);
        assert_eq!(linear_vested(1000, 100, 10, 110)?, 1000);
        assert_eq!(linear_vested(1000, 100, 10, u64::MAX)?, 1000);
        Ok(())
    }
}
