//! Break-even analysis.
//!
//! Where [`crate::engine::break_even_guest_count`] answers "how many
//! guests do we need", [`sweep`] shows how revenue, cost and profit
//! move across a range of guest counts so the curve can be charted.
//! Every point is a full [`compute`] of the same input with only the
//! guest count changed, evaluated in parallel.

use crate::engine::compute;
use crate::models::EventFinancialInput;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the number of points a single sweep may produce.
pub const MAX_SWEEP_POINTS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    #[error("step must be at least 1")]
    ZeroStep,

    #[error("range start {from} is after range end {to}")]
    EmptyRange { from: u32, to: u32 },

    #[error("sweep would produce {points} points (limit {})", MAX_SWEEP_POINTS)]
    TooManyPoints { points: u64 },

    #[error("results overflow at {guest_count} guests")]
    Overflow { guest_count: u32 },
}

/// One guest count on the break-even curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenPoint {
    pub guest_count: u32,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub net_profit: f64,
    /// Revenue covers cost at this guest count.
    pub profitable: bool,
}

/// Recompute `input` at every guest count in `from..=to`, stepping by
/// `step`.  Points are returned in ascending guest-count order.
pub fn sweep(
    input: &EventFinancialInput,
    from: u32,
    to: u32,
    step: u32,
) -> Result<Vec<BreakEvenPoint>, SweepError> {
    if step == 0 {
        return Err(SweepError::ZeroStep);
    }
    if from > to {
        return Err(SweepError::EmptyRange { from, to });
    }
    let points = u64::from(to - from) / u64::from(step) + 1;
    if points > MAX_SWEEP_POINTS {
        return Err(SweepError::TooManyPoints { points });
    }

    let guest_counts: Vec<u32> = (from..=to).step_by(step as usize).collect();
    let points: Vec<BreakEvenPoint> = guest_counts
        .into_par_iter()
        .map(|guest_count| {
            let mut at = input.clone();
            at.guest_count = guest_count;
            let out = compute(&at);
            BreakEvenPoint {
                guest_count,
                total_revenue: out.total_revenue,
                total_cost: out.total_cost,
                net_profit: out.net_profit,
                profitable: out.total_revenue >= out.total_cost,
            }
        })
        .collect();

    if let Some(bad) = points.iter().find(|p| {
        !(p.total_revenue.is_finite() && p.total_cost.is_finite() && p.net_profit.is_finite())
    }) {
        return Err(SweepError::Overflow {
            guest_count: bad.guest_count,
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodCostItem, LaborRoleInput, PayType};

    fn event() -> EventFinancialInput {
        EventFinancialInput {
            guest_count: 0,
            price_per_guest: 75.0,
            gratuity_percent: 20.0,
            gratuity_enabled: true,
            labor_roles: vec![LaborRoleInput {
                name: "Chef".into(),
                pay: PayType::Fixed {
                    fixed_amount: 600.0,
                },
            }],
            food_cost_items: vec![FoodCostItem {
                kind: "Proteins".into(),
                cost: 400.0,
            }],
            misc_expenses: vec![],
            business_tax_percent: 10.0,
            max_labor_revenue_percent: 100.0,
        }
    }

    #[test]
    fn sweep_covers_inclusive_range_in_order() {
        let points = sweep(&event(), 0, 20, 5).unwrap();
        let counts: Vec<u32> = points.iter().map(|p| p.guest_count).collect();
        assert_eq!(counts, vec![0, 5, 10, 15, 20]);
    }

    #[test]
    fn step_that_overshoots_stops_before_end() {
        let points = sweep(&event(), 3, 10, 4).unwrap();
        let counts: Vec<u32> = points.iter().map(|p| p.guest_count).collect();
        assert_eq!(counts, vec![3, 7]);
    }

    #[test]
    fn profitability_flips_at_a_single_guest_count() {
        let points = sweep(&event(), 0, 30, 1).unwrap();
        let first = points.iter().position(|p| p.profitable).unwrap();
        assert!(points[first..].iter().all(|p| p.profitable));
        assert!(points[..first].iter().all(|p| !p.profitable));
        assert!(points.windows(2).all(|w| w[0].total_revenue <= w[1].total_revenue));
    }

    #[test]
    fn overflowing_point_is_an_error() {
        let mut huge = event();
        huge.price_per_guest = 1e306;
        assert_eq!(
            sweep(&huge, 0, 2000, 500),
            Err(SweepError::Overflow { guest_count: 500 })
        );
    }

    #[test]
    fn rejects_bad_ranges() {
        assert_eq!(sweep(&event(), 0, 10, 0), Err(SweepError::ZeroStep));
        assert_eq!(
            sweep(&event(), 10, 5, 1),
            Err(SweepError::EmptyRange { from: 10, to: 5 })
        );
        assert_eq!(
            sweep(&event(), 0, 20_000, 1),
            Err(SweepError::TooManyPoints { points: 20_001 })
        );
    }
}
