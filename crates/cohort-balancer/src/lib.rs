//! Cohortgrid enrollment balancer — capacity policy, activation, rebalancing.
//!
//! This crate decides where a single enrolling user goes. It does NOT touch
//! storage (that's `cohort-state`) or serialize concurrent events (that's
//! `cohort-enroll`). Given a snapshot of a product's waiting pool and groups,
//! it returns the complete next state for the caller to persist atomically.
//!
//! # Components
//!
//! - **`policy`** — Min/max group capacity validation
//! - **`balancer`** — `process_enrollment`, the per-event decision
//! - **`redistribute`** — Target sizes and deterministic member moves
//! - **`invariants`** — Post-event consistency checks

pub mod balancer;
pub mod error;
pub mod invariants;
pub mod policy;
pub mod redistribute;

pub use balancer::{EnrollmentOutcome, Placement, process_enrollment};
pub use error::{BalancerError, BalancerResult};
pub use invariants::{Violation, check_invariants};
pub use policy::CapacityPolicy;
pub use redistribute::{balanced_targets, redistribute};
