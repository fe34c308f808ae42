//! Prices

/// Result of a price lookup for one line item, in pence/cents.
///
/// Produced by a price resolver and owned by exactly one line item; it is
/// replaced wholesale on re-resolution, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    unit_price: u64,
    original_price: u64,
}

impl ResolvedPrice {
    /// Creates a new resolved price from unit and original prices in minor units.
    #[must_use]
    pub fn new(unit_price: u64, original_price: u64) -> Self {
        ResolvedPrice {
            unit_price,
            original_price,
        }
    }

    /// Creates a resolved price whose original price equals the unit price.
    #[must_use]
    pub fn from_unit(unit_price: u64) -> Self {
        Self::new(unit_price, unit_price)
    }

    /// The unit price in minor units.
    #[must_use]
    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    /// The pre-discount price in minor units.
    #[must_use]
    pub fn original_price(&self) -> u64 {
        self.original_price
    }

    /// Difference between original and unit price, saturating at zero.
    #[must_use]
    pub fn savings(&self) -> u64 {
        self.original_price.saturating_sub(self.unit_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_resolved_price() {
        let price = ResolvedPrice::new(1000, 1200);

        assert_eq!(price.unit_price(), 1000);
        assert_eq!(price.original_price(), 1200);
    }

    #[test]
    fn from_unit_sets_both_prices() {
        let price = ResolvedPrice::from_unit(450);

        assert_eq!(price.unit_price(), 450);
        assert_eq!(price.original_price(), 450);
    }

    #[test]
    fn savings_is_difference() {
        let price = ResolvedPrice::new(800, 1000);

        assert_eq!(price.savings(), 200);
    }

    #[test]
    fn savings_saturates_at_zero() {
        let price = ResolvedPrice::new(1000, 800);

        assert_eq!(price.savings(), 0);
    }
}
