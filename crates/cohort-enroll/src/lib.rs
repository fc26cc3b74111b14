//! cohort-enroll — runs enrollment events against the state store.
//!
//! Wraps the pure balancer (`cohort-balancer`) with everything an
//! enrollment event needs around it:
//!
//! - Serializes events per product, so two enrollments into the same
//!   product never balance against the same snapshot
//! - Rejects duplicate (user, product) enrollments
//! - Loads the snapshot and commits the outcome in one write transaction
//! - Serves read projections: lesson access and product statistics
//!
//! # Architecture
//!
//! ```text
//! EnrollmentService
//!   ├── per-product async locks
//!   ├── StateStore::begin_enrollment (snapshot + atomic write-back)
//!   └── process_enrollment (pure decision)
//! ```

pub mod error;
pub mod service;
pub mod stats;

pub use error::{EnrollError, EnrollResult};
pub use service::{EnrollmentReceipt, EnrollmentService};
pub use stats::{ProductStatistics, ProductSummary};
