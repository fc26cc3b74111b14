//! Enrollment service error types.

use thiserror::Error;

/// Errors that can occur while enrolling a user.
#[derive(Debug, Error)]
pub enum EnrollError {
    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("user {user} is already enrolled in product {product}")]
    DuplicateEnrollment { user: String, product: String },

    #[error("balancer error: {0}")]
    Balancer(#[from] cohort_balancer::BalancerError),

    #[error("state store error: {0}")]
    State(#[from] cohort_state::StateError),
}

pub type EnrollResult<T> = Result<T, EnrollError>;
