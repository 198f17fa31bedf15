//! Pure gap math.
//!
//! The comparison price is a synthetic markup on the reference price, not an
//! independent second feed. Everything here is synchronous and side-effect
//! free.

use crate::types::{DerivedGap, InvestmentAmount, Projection};

/// Derive the comparison price and percentage gap from a reference price and
/// the fixed premium.
pub fn derive(reference_price: f64, premium_pct: f64) -> DerivedGap {
    let comparison_price = reference_price * (1.0 + premium_pct / 100.0);
    let gap_percent = (comparison_price - reference_price) / reference_price * 100.0;
    DerivedGap {
        comparison_price,
        gap_percent,
    }
}

/// Recompute the gap from a stored price pair (used when rehydrating a cached
/// result, where the premium is already baked into the comparison price).
pub fn from_pair(reference_price: f64, comparison_price: f64) -> DerivedGap {
    DerivedGap {
        comparison_price,
        gap_percent: (comparison_price - reference_price) / reference_price * 100.0,
    }
}

/// Project the outcome of routing `investment` through the gap.
///
/// Defined only for `reference_price > 0`; a valid quote can never carry a
/// non-positive price, so callers guard at the point where the quote is made.
pub fn project(
    investment: InvestmentAmount,
    reference_price: f64,
    comparison_price: f64,
) -> Projection {
    debug_assert!(reference_price > 0.0);
    let investment = investment.get();
    let units_acquired = investment / reference_price;
    let final_amount = units_acquired * comparison_price;
    Projection {
        units_acquired,
        final_amount,
        profit: final_amount - investment,
    }
}
