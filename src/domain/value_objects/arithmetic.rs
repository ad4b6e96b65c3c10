//! # Checked Arithmetic
//!
//! Overflow-safe decimal arithmetic for monetary amounts.
//!
//! Settlement math never rounds. `Decimal`'s own checked operations quietly
//! round a result that needs more than 28 fractional digits or 96 bits of
//! mantissa; here that is reported as [`ArithmeticError::PrecisionLoss`].
//! A result is exact when it keeps the scale the operation implies: the
//! larger operand scale for `+` and `-`, the sum of both for `*`.
//!
//! # Examples
//!
//! ```
//! use spot_settlement::domain::value_objects::arithmetic::CheckedArithmetic;
//! use rust_decimal::Decimal;
//!
//! let notional = Decimal::new(29050, 0).safe_mul(Decimal::new(1, 2)).unwrap();
//! assert_eq!(notional, Decimal::new(29050, 2));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Settlement math that did not fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Result above `Decimal::MAX`.
    #[error("arithmetic overflow")]
    Overflow,

    /// Result below `Decimal::MIN`.
    #[error("arithmetic underflow")]
    Underflow,

    /// The exact result has more digits than a `Decimal` carries.
    #[error("arithmetic precision loss")]
    PrecisionLoss,
}

/// Result of a checked operation.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Non-panicking `+`, `-` and `*` for money amounts.
pub trait CheckedArithmetic: Sized {
    /// `self + rhs`.
    ///
    /// # Errors
    ///
    /// `ArithmeticError::Overflow` past `Decimal::MAX`,
    /// `ArithmeticError::PrecisionLoss` if the sum would be rounded.
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self>;

    /// `self - rhs`.
    ///
    /// # Errors
    ///
    /// `ArithmeticError::Underflow` past `Decimal::MIN`,
    /// `ArithmeticError::PrecisionLoss` if the difference would be rounded.
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self>;

    /// `self * rhs`, unrounded.
    ///
    /// # Errors
    ///
    /// `ArithmeticError::Overflow` if the product does not fit,
    /// `ArithmeticError::PrecisionLoss` if it would be rounded.
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self>;
}

impl CheckedArithmetic for Decimal {
    #[inline]
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self> {
        exact(self, rhs, Decimal::checked_add, u32::max, ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        exact(self, rhs, Decimal::checked_sub, u32::max, ArithmeticError::Underflow)
    }

    #[inline]
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self> {
        exact(
            self,
            rhs,
            Decimal::checked_mul,
            |a, b| a + b,
            ArithmeticError::Overflow,
        )
    }
}

/// Runs `op`, rejecting a result whose scale shows it was rounded.
///
/// Trailing zeros can force a spurious rescale, so a mismatch is retried on
/// the normalized operands before it counts as precision loss.
fn exact(
    lhs: Decimal,
    rhs: Decimal,
    op: fn(Decimal, Decimal) -> Option<Decimal>,
    result_scale: fn(u32, u32) -> u32,
    out_of_range: ArithmeticError,
) -> ArithmeticResult<Decimal> {
    let result = op(lhs, rhs).ok_or(out_of_range)?;
    // A zero operand is returned as is or yields zero, both exact.
    if lhs.is_zero()
        || rhs.is_zero()
        || result.scale() == result_scale(lhs.scale(), rhs.scale())
    {
        return Ok(result);
    }

    let (lhs, rhs) = (lhs.normalize(), rhs.normalize());
    let result = op(lhs, rhs).ok_or(out_of_range)?;
    if result.scale() == result_scale(lhs.scale(), rhs.scale()) {
        Ok(result)
    } else {
        Err(ArithmeticError::PrecisionLoss)
    }
}
