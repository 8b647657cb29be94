//! Cents-precise monetary arithmetic.
//!
//! Amounts cross the wire and the database as `f64`, but every addition
//! and subtraction happens in integer minor units so that 2-decimal
//! amounts never accumulate binary floating-point drift.

/// Convert a decimal amount to integer cents, rounding at 2 decimals.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert integer cents back to a decimal amount. An exact zero is
/// normalized so `-0.0` never escapes.
pub fn from_cents(cents: i64) -> f64 {
    let amount = cents as f64 / 100.0;
    if amount == 0.0 {
        0.0
    } else {
        amount
    }
}

/// Round an amount to 2 decimals through the cents representation.
pub fn round2(amount: f64) -> f64 {
    from_cents(to_cents(amount))
}

pub fn add(a: f64, b: f64) -> f64 {
    from_cents(to_cents(a) + to_cents(b))
}

pub fn sub(a: f64, b: f64) -> f64 {
    from_cents(to_cents(a) - to_cents(b))
}

/// The derived amounts seeded onto a new bill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialAmounts {
    pub total_amount: f64,
    pub commission: f64,
    pub final_amount: f64,
    pub remaining_balance: f64,
}

/// `final = total + commission`, `remaining = max(0, final - initial)`,
/// all rounded to cents.
pub fn calculate_financial_amounts(
    total_amount: f64,
    commission: f64,
    initial_payment: f64,
) -> FinancialAmounts {
    let total_cents = to_cents(total_amount);
    let commission_cents = to_cents(commission);
    let final_cents = total_cents + commission_cents;
    let remaining_cents = (final_cents - to_cents(initial_payment)).max(0);

    FinancialAmounts {
        total_amount: from_cents(total_cents),
        commission: from_cents(commission_cents),
        final_amount: from_cents(final_cents),
        remaining_balance: from_cents(remaining_cents),
    }
}
