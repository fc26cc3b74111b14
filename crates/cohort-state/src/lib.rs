//! cohort-state — embedded state store for cohortgrid.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for products, lessons, enrollment records and groups.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Everything owned by a product is keyed `{product_id}:{...}` so a prefix
//! scan loads one product's records. The waiting pool is not stored on its
//! own; it is the enrollment records with `is_waiting` set.
//!
//! An enrollment event runs inside one [`EnrollmentTxn`]: the snapshot is
//! read and the balanced result written back under the same redb write
//! transaction, so it commits all-or-nothing.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| $crate::error::StateError::$variant(e.to_string())
    };
}

pub mod error;
pub mod store;
pub mod tables;
pub mod txn;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use txn::EnrollmentTxn;
