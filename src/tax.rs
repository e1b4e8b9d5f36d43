//! Business tax assessment.
//!
//! Catering events are taxed on post-expense profit at a flat rate.
//! The `tax` module keeps that rule in one place so the calculator,
//! the break-even sweep and the financial summary cannot drift apart.

/// Clamp a percentage to `[0, 100]`.  Non-finite values become 0.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// A flat business tax on profit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusinessTax {
    percent: f64,
}

impl BusinessTax {
    /// Build a tax at `percent`, clamped to `[0, 100]`.
    pub fn new(percent: f64) -> Self {
        Self {
            percent: clamp_percent(percent),
        }
    }

    /// Tax owed on `gross_profit`.  A loss or break-even owes nothing.
    pub fn assess(&self, gross_profit: f64) -> f64 {
        if gross_profit > 0.0 {
            gross_profit * self.percent / 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_business_tax() {
        let tax = BusinessTax::new(8.0);
        assert!((tax.assess(230.0) - 18.4).abs() < 1e-9);
    }

    #[test]
    fn losses_are_not_taxed() {
        let tax = BusinessTax::new(25.0);
        assert_eq!(tax.assess(-500.0), 0.0);
        assert_eq!(tax.assess(0.0), 0.0);
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(BusinessTax::new(140.0), BusinessTax::new(100.0));
        assert_eq!(BusinessTax::new(140.0).assess(250.0), 250.0);
        assert_eq!(BusinessTax::new(-3.0).assess(250.0), 0.0);
        assert_eq!(BusinessTax::new(f64::NAN).assess(250.0), 0.0);
    }
}
