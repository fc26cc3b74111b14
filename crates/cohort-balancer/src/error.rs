//! Balancer error types.

use thiserror::Error;

/// Errors that can occur while balancing an enrollment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalancerError {
    #[error("invalid capacity config: min_group_capacity={min}, max_group_capacity={max}")]
    InvalidCapacityConfig { min: u32, max: u32 },
}

pub type BalancerResult<T> = Result<T, BalancerError>;
