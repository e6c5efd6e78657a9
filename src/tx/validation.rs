//! Pass/fail gate for outgoing transfer parameters.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::AccountState;
use crate::address::resolve_recipient;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid recipient address: {0}")]
    InvalidAddress(String),
    #[error("amount must be positive")]
    NonPositiveAmount,
    #[error("amount {0} is not a whole number of wei")]
    FractionalAmount(Decimal),
    #[error("amount plus fee ({required}) exceeds balance ({available})")]
    ExceedsBalance { required: Decimal, available: Decimal },
}

/// Check a transfer against the wallet state and return the recipient in hex form.
pub fn validate_transfer(state: &AccountState, to: &str, value: Decimal) -> Result<String, ValidationError> {
    let recipient = resolve_recipient(to).map_err(|_| ValidationError::InvalidAddress(to.to_string()))?;

    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    if !value.fract().is_zero() {
        return Err(ValidationError::FractionalAmount(value));
    }

    let required = value.checked_add(state.default_fee()).unwrap_or(Decimal::MAX);
    if required > state.balance() {
        return Err(ValidationError::ExceedsBalance {
            required,
            available: state.balance(),
        });
    }
    Ok(recipient)
}
