//! redb table definitions for the cohortgrid state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).
//! Per-product records are keyed `{product_id}:{child_id}`.

use redb::TableDefinition;

/// Products keyed by `{product_id}`.
pub const PRODUCTS: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Lessons keyed by `{product_id}:{lesson_id}`.
pub const LESSONS: TableDefinition<&str, &[u8]> = TableDefinition::new("lessons");

/// Enrollment records keyed by `{product_id}:{user_id}`.
pub const ENROLLMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("enrollments");

/// Groups keyed by `{product_id}:{ordinal:06}`.
pub const GROUPS: TableDefinition<&str, &[u8]> = TableDefinition::new("groups");

/// Shape shared by every table above.
pub(crate) type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;
