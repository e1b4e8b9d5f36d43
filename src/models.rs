//! Data models for the Catering Engine.
//!
//! The `models` module defines the serialisable structs and enums
//! describing one event's financial configuration and the breakdown
//! the engine derives from it.  They derive `Serialize` and
//! `Deserialize` (camelCase on the wire) so the presentation layer can
//! post them as JSON and the snapshot store can persist them verbatim.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Input to the allocation engine.
///
/// An `EventFinancialInput` is built fresh from form state for every
/// calculation and owned by the caller.  The engine only borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFinancialInput {
    /// Number of guests attending the event.
    pub guest_count: u32,
    /// Price charged per guest, before gratuity.
    pub price_per_guest: f64,
    /// Gratuity added on top of base revenue, in percent.
    pub gratuity_percent: f64,
    /// Master switch for gratuity.  When `false` the effective gratuity
    /// percent is zero regardless of `gratuity_percent`.
    #[serde(default = "default_true")]
    pub gratuity_enabled: bool,
    /// Pay lines, in display order.  Gratuity is split evenly across them.
    #[serde(default)]
    pub labor_roles: Vec<LaborRoleInput>,
    #[serde(default)]
    pub food_cost_items: Vec<FoodCostItem>,
    #[serde(default)]
    pub misc_expenses: Vec<MiscExpense>,
    /// Tax on post-expense profit, in percent.  Never applied to a loss.
    #[serde(default)]
    pub business_tax_percent: f64,
    /// Administrative ceiling on labor cost as a share of base revenue.
    /// Advisory only: exceeding it yields an [`Advisory`], nothing more.
    #[serde(default = "default_labor_ceiling")]
    pub max_labor_revenue_percent: f64,
}

fn default_labor_ceiling() -> f64 {
    100.0
}

/// A named pay line such as "Chef" or "Server".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborRoleInput {
    pub name: String,
    #[serde(flatten)]
    pub pay: PayType,
}

/// How a labor role is compensated, excluding its gratuity share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payType", rename_all = "lowercase")]
pub enum PayType {
    /// A percentage of base revenue.
    Percentage {
        #[serde(rename = "revenuePercent")]
        revenue_percent: f64,
    },
    /// A flat amount for the event.
    Fixed {
        #[serde(rename = "fixedAmount")]
        fixed_amount: f64,
    },
}

/// A flat food cost line, e.g. `{ "type": "Proteins", "cost": 100 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCostItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub cost: f64,
}

/// A miscellaneous expense, either a flat amount or a share of base revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscExpense {
    #[serde(rename = "type")]
    pub kind: String,
    /// Dollars for [`MiscCostType::Fixed`], percent for [`MiscCostType::Percentage`].
    pub cost: f64,
    #[serde(default)]
    pub cost_type: MiscCostType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiscCostType {
    #[default]
    Fixed,
    Percentage,
}

/// Cost of a single labor role, gratuity share included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborRoleResult {
    pub name: String,
    pub calculated_cost: f64,
}

/// Cost lines expressed relative to the event size.
///
/// Percentages are of base revenue.  Every ratio is zero when its
/// denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRatios {
    pub labor_percent: f64,
    pub food_percent: f64,
    pub misc_percent: f64,
    pub cost_per_guest: f64,
}

/// Non-blocking warnings attached to a computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advisory {
    /// Labor cost exceeds the configured share of base revenue.
    #[serde(rename_all = "camelCase")]
    LaborAboveCeiling {
        labor_percent: f64,
        ceiling_percent: f64,
    },
}

/// The derived, immutable result of one computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFinancialOutput {
    pub base_revenue: f64,
    pub gratuity_amount: f64,
    /// Always `base_revenue + gratuity_amount`.
    pub total_revenue: f64,
    /// Gratuity added to each labor role; zero when there are no roles.
    pub gratuity_per_role: f64,
    /// Gratuity not handed to any role.  It flows straight into profit.
    pub unallocated_gratuity: f64,
    /// One entry per input role, in input order.
    pub labor_role_results: Vec<LaborRoleResult>,
    pub total_labor_cost: f64,
    pub total_food_cost: f64,
    pub total_misc_cost: f64,
    pub total_cost: f64,
    pub gross_profit: f64,
    pub business_tax: f64,
    pub net_profit: f64,
    pub profit_margin_percent: f64,
    /// Guests needed for revenue to cover `total_cost`, with cost held fixed.
    pub break_even_guest_count: u64,
    pub cost_ratios: CostRatios,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labor_role_wire_format_is_tagged_by_pay_type() {
        let roles: Vec<LaborRoleInput> = serde_json::from_value(json!([
            {"name": "Chef", "payType": "percentage", "revenuePercent": 20},
            {"name": "Server", "payType": "fixed", "fixedAmount": 150.5}
        ]))
        .unwrap();
        assert_eq!(
            roles[0].pay,
            PayType::Percentage {
                revenue_percent: 20.0
            }
        );
        assert_eq!(roles[1].pay, PayType::Fixed { fixed_amount: 150.5 });

        let back = serde_json::to_value(&roles[1]).unwrap();
        assert_eq!(
            back,
            json!({"name": "Server", "payType": "fixed", "fixedAmount": 150.5})
        );
    }

    #[test]
    fn optional_fields_take_defaults() {
        let input: EventFinancialInput = serde_json::from_value(json!({
            "guestCount": 15,
            "pricePerGuest": 60,
            "gratuityPercent": 20,
            "miscExpenses": [{"type": "Rentals", "cost": 40}]
        }))
        .unwrap();
        assert!(input.gratuity_enabled);
        assert!(input.labor_roles.is_empty());
        assert_eq!(input.business_tax_percent, 0.0);
        assert_eq!(input.max_labor_revenue_percent, 100.0);
        assert_eq!(input.misc_expenses[0].cost_type, MiscCostType::Fixed);
    }

    #[test]
    fn advisory_serialises_with_kind_tag() {
        let advisory = Advisory::LaborAboveCeiling {
            labor_percent: 40.0,
            ceiling_percent: 30.0,
        };
        assert_eq!(
            serde_json::to_value(advisory).unwrap(),
            json!({"kind": "laborAboveCeiling", "laborPercent": 40.0, "ceilingPercent": 30.0})
        );
    }
}
