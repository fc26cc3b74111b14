//! Capacity policy — the (min, max) group-size bounds of a product.

use cohort_core::Product;

use crate::error::{BalancerError, BalancerResult};

/// Validated group-size bounds. `1 <= min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    min: usize,
    max: usize,
}

impl CapacityPolicy {
    pub fn new(min: u32, max: u32) -> BalancerResult<Self> {
        if min == 0 || max < min {
            return Err(BalancerError::InvalidCapacityConfig { min, max });
        }
        Ok(Self {
            min: min as usize,
            max: max as usize,
        })
    }

    pub fn from_product(product: &Product) -> BalancerResult<Self> {
        Self::new(product.min_group_capacity, product.max_group_capacity)
    }

    /// Fewest members a group may be activated with.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Most members a group may hold.
    pub fn max(&self) -> usize {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_equal_bounds() {
        let policy = CapacityPolicy::new(3, 3).unwrap();
        assert_eq!(policy.min(), 3);
        assert_eq!(policy.max(), 3);
    }

    #[test]
    fn rejects_max_below_min() {
        assert_eq!(
            CapacityPolicy::new(4, 3),
            Err(BalancerError::InvalidCapacityConfig { min: 4, max: 3 })
        );
    }

    #[test]
    fn rejects_zero_min() {
        assert!(CapacityPolicy::new(0, 4).is_err());
    }

    #[test]
    fn reads_product_bounds() {
        let product = Product::new("p", "P").with_capacity(2, 5);
        let policy = CapacityPolicy::from_product(&product).unwrap();
        assert_eq!((policy.min(), policy.max()), (2, 5));
    }
}
