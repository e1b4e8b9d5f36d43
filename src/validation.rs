//! Input validation at the UI/engine boundary.
//!
//! Form state arrives loosely typed; [`validate`] turns it into a tagged
//! result so the engine core never sees a negative amount.  Errors name
//! the offending field with a path such as `laborRoles[1].fixedAmount`.

use crate::models::{Advisory, EventFinancialInput, EventFinancialOutput, MiscCostType, PayType};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be negative")]
    NegativeAmount { field: String },

    #[error("{field} must not be a negative percentage")]
    NegativePercent { field: String },

    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    #[error("{field} must not be blank")]
    BlankName { field: String },

    #[error("{field} is too large to compute")]
    Overflow { field: String },
}

impl ValidationError {
    /// Path of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::NegativeAmount { field }
            | ValidationError::NegativePercent { field }
            | ValidationError::NotFinite { field }
            | ValidationError::BlankName { field }
            | ValidationError::Overflow { field } => field,
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

fn check_amount(field: impl Into<String>, value: f64) -> ValidationResult {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.into(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeAmount {
            field: field.into(),
        });
    }
    Ok(())
}

// Values above 100 are accepted here and clamped by the engine.
fn check_percent(field: impl Into<String>, value: f64) -> ValidationResult {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.into(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativePercent {
            field: field.into(),
        });
    }
    Ok(())
}

/// Validate an input before handing it to the engine.
///
/// Fields are checked in declaration order and the first failure is
/// returned.
pub fn validate(input: &EventFinancialInput) -> ValidationResult {
    check_amount("pricePerGuest", input.price_per_guest)?;
    check_percent("gratuityPercent", input.gratuity_percent)?;

    for (i, role) in input.labor_roles.iter().enumerate() {
        if role.name.trim().is_empty() {
            return Err(ValidationError::BlankName {
                field: format!("laborRoles[{i}].name"),
            });
        }
        match role.pay {
            PayType::Percentage { revenue_percent } => {
                check_percent(format!("laborRoles[{i}].revenuePercent"), revenue_percent)?
            }
            PayType::Fixed { fixed_amount } => {
                check_amount(format!("laborRoles[{i}].fixedAmount"), fixed_amount)?
            }
        }
    }

    for (i, item) in input.food_cost_items.iter().enumerate() {
        check_amount(format!("foodCostItems[{i}].cost"), item.cost)?;
    }

    for (i, item) in input.misc_expenses.iter().enumerate() {
        let field = format!("miscExpenses[{i}].cost");
        match item.cost_type {
            MiscCostType::Fixed => check_amount(field, item.cost)?,
            MiscCostType::Percentage => check_percent(field, item.cost)?,
        }
    }

    check_percent("businessTaxPercent", input.business_tax_percent)?;
    check_percent("maxLaborRevenuePercent", input.max_labor_revenue_percent)?;
    Ok(())
}

fn check_result(field: impl Into<String>, value: f64) -> ValidationResult {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::Overflow {
            field: field.into(),
        })
    }
}

/// Check that every number in a computed breakdown is finite.
///
/// Inputs that are individually in range can still multiply past `f64::MAX`
/// (e.g. a huge price times many guests).  Such a result cannot be written
/// as JSON, so it is rejected here naming the first overflowing output field.
pub fn check_output(output: &EventFinancialOutput) -> ValidationResult {
    check_result("baseRevenue", output.base_revenue)?;
    check_result("gratuityAmount", output.gratuity_amount)?;
    check_result("totalRevenue", output.total_revenue)?;
    check_result("gratuityPerRole", output.gratuity_per_role)?;
    check_result("unallocatedGratuity", output.unallocated_gratuity)?;
    for (i, role) in output.labor_role_results.iter().enumerate() {
        check_result(
            format!("laborRoleResults[{i}].calculatedCost"),
            role.calculated_cost,
        )?;
    }
    check_result("totalLaborCost", output.total_labor_cost)?;
    check_result("totalFoodCost", output.total_food_cost)?;
    check_result("totalMiscCost", output.total_misc_cost)?;
    check_result("totalCost", output.total_cost)?;
    check_result("grossProfit", output.gross_profit)?;
    check_result("businessTax", output.business_tax)?;
    check_result("netProfit", output.net_profit)?;
    check_result("profitMarginPercent", output.profit_margin_percent)?;

    let ratios = &output.cost_ratios;
    check_result("costRatios.laborPercent", ratios.labor_percent)?;
    check_result("costRatios.foodPercent", ratios.food_percent)?;
    check_result("costRatios.miscPercent", ratios.misc_percent)?;
    check_result("costRatios.costPerGuest", ratios.cost_per_guest)?;

    for (i, advisory) in output.advisories.iter().enumerate() {
        match *advisory {
            Advisory::LaborAboveCeiling {
                labor_percent,
                ceiling_percent,
            } => {
                check_result(format!("advisories[{i}].laborPercent"), labor_percent)?;
                check_result(format!("advisories[{i}].ceilingPercent"), ceiling_percent)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodCostItem, LaborRoleInput, MiscExpense};

    fn input() -> EventFinancialInput {
        EventFinancialInput {
            guest_count: 10,
            price_per_guest: 55.0,
            gratuity_percent: 20.0,
            gratuity_enabled: true,
            labor_roles: vec![LaborRoleInput {
                name: "Chef".into(),
                pay: PayType::Percentage {
                    revenue_percent: 20.0,
                },
            }],
            food_cost_items: vec![FoodCostItem {
                kind: "Proteins".into(),
                cost: 100.0,
            }],
            misc_expenses: vec![],
            business_tax_percent: 8.0,
            max_labor_revenue_percent: 35.0,
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert_eq!(validate(&input()), Ok(()));
    }

    #[test]
    fn percent_above_hundred_is_left_for_clamping() {
        let mut input = input();
        input.gratuity_percent = 250.0;
        assert_eq!(validate(&input), Ok(()));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut input = input();
        input.price_per_guest = -1.0;
        let err = validate(&input).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NegativeAmount {
                field: "pricePerGuest".into()
            }
        );
        assert_eq!(err.to_string(), "pricePerGuest must not be negative");
    }

    #[test]
    fn names_the_offending_role_field() {
        let mut input = input();
        input.labor_roles.push(LaborRoleInput {
            name: "Server".into(),
            pay: PayType::Fixed {
                fixed_amount: -20.0,
            },
        });
        let err = validate(&input).unwrap_err();
        assert_eq!(err.field(), "laborRoles[1].fixedAmount");
    }

    #[test]
    fn blank_role_name_is_rejected() {
        let mut input = input();
        input.labor_roles[0].name = "   ".into();
        assert_eq!(validate(&input).unwrap_err().field(), "laborRoles[0].name");
    }

    #[test]
    fn misc_cost_checked_according_to_cost_type() {
        let mut input = input();
        input.misc_expenses.push(MiscExpense {
            kind: "Venue".into(),
            cost: -5.0,
            cost_type: MiscCostType::Percentage,
        });
        assert_eq!(
            validate(&input),
            Err(ValidationError::NegativePercent {
                field: "miscExpenses[0].cost".into()
            })
        );
    }

    #[test]
    fn nan_is_not_finite() {
        let mut input = input();
        input.food_cost_items[0].cost = f64::NAN;
        assert_eq!(
            validate(&input),
            Err(ValidationError::NotFinite {
                field: "foodCostItems[0].cost".into()
            })
        );
    }

    #[test]
    fn overflowing_output_names_the_first_bad_field() {
        let mut output = crate::engine::compute(&input());
        assert_eq!(check_output(&output), Ok(()));

        output.cost_ratios.cost_per_guest = f64::INFINITY;
        output.labor_role_results[0].calculated_cost = f64::NAN;
        assert_eq!(
            check_output(&output),
            Err(ValidationError::Overflow {
                field: "laborRoleResults[0].calculatedCost".into()
            })
        );
    }

    #[test]
    fn first_failure_wins() {
        let mut input = input();
        input.price_per_guest = -1.0;
        input.business_tax_percent = -3.0;
        assert_eq!(validate(&input).unwrap_err().field(), "pricePerGuest");
    }
}
