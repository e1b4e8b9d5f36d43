//! Event profit/cost allocation engine.
//!
//! The `engine` module turns an [`EventFinancialInput`] into an
//! [`EventFinancialOutput`].  [`compute`] is total and pure: it has no
//! hidden state, reads no clock and performs no I/O, so identical
//! inputs always yield identical outputs and any number of callers may
//! use it concurrently.  [`compute_batch`] leans on that to spread many
//! independent events across CPU cores with [`rayon`].
//!
//! Boundary checks live in [`crate::validation`]; [`evaluate`] runs
//! them before computing.

use crate::models::{
    Advisory, CostRatios, EventFinancialInput, EventFinancialOutput, LaborRoleResult,
    MiscCostType, PayType,
};
use crate::tax::{clamp_percent, BusinessTax};
use crate::validation::{check_output, validate, ValidationError};
use rayon::prelude::*;

/// Relative tolerance used when rounding the break-even quotient up.
const BREAK_EVEN_EPSILON: f64 = 1e-9;

/// Monetary values reaching the core are assumed validated; anything
/// negative or non-finite still counts as zero.
fn amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn percent_of(base: f64, percent: f64) -> f64 {
    base * clamp_percent(percent) / 100.0
}

fn ratio_percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Gratuity percent actually applied, honouring the on/off switch.
pub fn effective_gratuity_percent(input: &EventFinancialInput) -> f64 {
    if input.gratuity_enabled {
        clamp_percent(input.gratuity_percent)
    } else {
        0.0
    }
}

/// Smallest guest count whose revenue (gratuity included) covers
/// `total_cost`, holding the cost fixed.
///
/// Returns 0 when the price is zero or there is nothing to cover.
/// Treating cost as independent of guest count is a known
/// simplification: food and labor usually grow with the party.
pub fn break_even_guest_count(price_per_guest: f64, gratuity_percent: f64, total_cost: f64) -> u64 {
    let price = amount(price_per_guest);
    let cost = amount(total_cost);
    if price == 0.0 || cost == 0.0 {
        return 0;
    }
    let revenue_per_guest = price * (1.0 + clamp_percent(gratuity_percent) / 100.0);
    let guests = cost / revenue_per_guest;
    let nearest = guests.round();
    // 900 / 90 must give 10 even if the division lands a hair above it.
    let count = if (guests - nearest).abs() <= BREAK_EVEN_EPSILON * nearest.max(1.0) {
        nearest
    } else {
        guests.ceil()
    };
    count as u64
}

/// Compute the full revenue/cost/profit breakdown for one event.
pub fn compute(input: &EventFinancialInput) -> EventFinancialOutput {
    let price_per_guest = amount(input.price_per_guest);
    let base_revenue = f64::from(input.guest_count) * price_per_guest;
    let gratuity_percent = effective_gratuity_percent(input);
    let gratuity_amount = base_revenue * gratuity_percent / 100.0;
    let total_revenue = base_revenue + gratuity_amount;

    let role_count = input.labor_roles.len();
    let gratuity_per_role = if role_count == 0 {
        0.0
    } else {
        gratuity_amount / role_count as f64
    };
    let labor_role_results: Vec<LaborRoleResult> = input
        .labor_roles
        .iter()
        .map(|role| {
            let pay = match role.pay {
                PayType::Percentage { revenue_percent } => {
                    percent_of(base_revenue, revenue_percent)
                }
                PayType::Fixed { fixed_amount } => amount(fixed_amount),
            };
            LaborRoleResult {
                name: role.name.clone(),
                calculated_cost: pay + gratuity_per_role,
            }
        })
        .collect();
    let total_labor_cost: f64 = labor_role_results.iter().map(|r| r.calculated_cost).sum();
    let unallocated_gratuity = gratuity_amount - gratuity_per_role * role_count as f64;

    let total_food_cost: f64 = input.food_cost_items.iter().map(|i| amount(i.cost)).sum();
    let total_misc_cost: f64 = input
        .misc_expenses
        .iter()
        .map(|item| match item.cost_type {
            MiscCostType::Fixed => amount(item.cost),
            MiscCostType::Percentage => percent_of(base_revenue, item.cost),
        })
        .sum();
    let total_cost = total_labor_cost + total_food_cost + total_misc_cost;

    let gross_profit = base_revenue - total_cost + unallocated_gratuity;
    let business_tax = BusinessTax::new(input.business_tax_percent).assess(gross_profit);
    let net_profit = gross_profit - business_tax;
    let profit_margin_percent = ratio_percent(net_profit, total_revenue);

    let cost_ratios = CostRatios {
        labor_percent: ratio_percent(total_labor_cost, base_revenue),
        food_percent: ratio_percent(total_food_cost, base_revenue),
        misc_percent: ratio_percent(total_misc_cost, base_revenue),
        cost_per_guest: if input.guest_count > 0 {
            total_cost / f64::from(input.guest_count)
        } else {
            0.0
        },
    };

    let mut advisories = Vec::new();
    let ceiling_percent = clamp_percent(input.max_labor_revenue_percent);
    if cost_ratios.labor_percent > ceiling_percent {
        advisories.push(Advisory::LaborAboveCeiling {
            labor_percent: cost_ratios.labor_percent,
            ceiling_percent,
        });
    }

    EventFinancialOutput {
        base_revenue,
        gratuity_amount,
        total_revenue,
        gratuity_per_role,
        unallocated_gratuity,
        labor_role_results,
        total_labor_cost,
        total_food_cost,
        total_misc_cost,
        total_cost,
        gross_profit,
        business_tax,
        net_profit,
        profit_margin_percent,
        break_even_guest_count: break_even_guest_count(
            price_per_guest,
            gratuity_percent,
            total_cost,
        ),
        cost_ratios,
        advisories,
    }
}

/// Validate `input`, compute it, and reject results too large to represent.
pub fn evaluate(input: &EventFinancialInput) -> Result<EventFinancialOutput, ValidationError> {
    validate(input)?;
    let output = compute(input);
    check_output(&output)?;
    Ok(output)
}

/// Compute many independent events in parallel.  Output order matches
/// input order.
pub fn compute_batch(inputs: &[EventFinancialInput]) -> Vec<EventFinancialOutput> {
    inputs.par_iter().map(compute).collect()
}

/// Validate every input, then compute them in parallel.  Fails on the
/// first invalid input or overflowing result (by position).
pub fn evaluate_batch(
    inputs: &[EventFinancialInput],
) -> Result<Vec<EventFinancialOutput>, ValidationError> {
    for input in inputs {
        validate(input)?;
    }
    let outputs = compute_batch(inputs);
    for output in &outputs {
        check_output(output)?;
    }
    Ok(outputs)
}
