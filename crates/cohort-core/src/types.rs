//! Shared domain types used across cohortgrid crates.
//!
//! These are plain data: products with their capacity bounds, lessons,
//! per-user enrollment records, and the groups users are balanced into.
//! All types serialize to JSON for storage and CLI output.

use serde::{Deserialize, Serialize};

/// Unique identifier for a product.
pub type ProductId = String;

/// Opaque user identity.
pub type UserId = String;

/// Unique identifier for a group, `{product_id}:{ordinal:06}`.
pub type GroupId = String;

/// Default minimum group size for new products.
pub const DEFAULT_MIN_GROUP_CAPACITY: u32 = 3;

/// Default maximum group size for new products.
pub const DEFAULT_MAX_GROUP_CAPACITY: u32 = 4;

// ── Product ───────────────────────────────────────────────────────

/// A product users enroll into (e.g. a course).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unix timestamp (seconds) when the product starts.
    pub start: u64,
    pub price_cents: u64,
    pub creator: String,
    /// Fewest members a group may be activated with.
    pub min_group_capacity: u32,
    /// Most members a group may hold.
    pub max_group_capacity: u32,
}

impl Product {
    /// A product with default capacity bounds.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start: 0,
            price_cents: 0,
            creator: String::new(),
            min_group_capacity: DEFAULT_MIN_GROUP_CAPACITY,
            max_group_capacity: DEFAULT_MAX_GROUP_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, min: u32, max: u32) -> Self {
        self.min_group_capacity = min;
        self.max_group_capacity = max;
        self
    }
}

// ── Lesson ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub product_id: ProductId,
    pub name: String,
    pub video_url: String,
}

impl Lesson {
    /// Build the composite key for the lessons table.
    pub fn table_key(&self) -> String {
        format!("{}:{}", self.product_id, self.id)
    }
}

// ── Enrollment ────────────────────────────────────────────────────

/// One user's access to one product.
///
/// A waiting record belongs to no group; a non-waiting record belongs to
/// exactly one group of its product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrollmentRecord {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub is_waiting: bool,
    /// Unix timestamp (seconds) of the enrollment request.
    pub requested_at: u64,
}

impl EnrollmentRecord {
    /// A freshly admitted record, not yet waiting.
    pub fn new(user_id: impl Into<String>, product_id: impl Into<String>, requested_at: u64) -> Self {
        Self {
            user_id: user_id.into(),
            product_id: product_id.into(),
            is_waiting: false,
            requested_at,
        }
    }

    /// Build the composite key for the enrollments table.
    pub fn table_key(&self) -> String {
        enrollment_key(&self.product_id, &self.user_id)
    }
}

/// Composite key for an enrollment record.
pub fn enrollment_key(product_id: &str, user_id: &str) -> String {
    format!("{product_id}:{user_id}")
}

// ── Group ─────────────────────────────────────────────────────────

/// A capacity-bounded bucket of users belonging to one product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub product_id: ProductId,
    /// Creation order within the product, starting at 1.
    pub ordinal: u32,
    pub name: String,
    /// Members in join order; the last entry joined most recently.
    pub members: Vec<UserId>,
}

impl Group {
    /// An empty group with an id derived from the product and ordinal.
    pub fn new(product_id: &str, ordinal: u32) -> Self {
        Self {
            id: group_key(product_id, ordinal),
            product_id: product_id.to_string(),
            ordinal,
            name: format!("Group {ordinal}"),
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Composite key for a group. The zero-padded ordinal keeps a product's
/// groups in creation order under a lexicographic scan.
pub fn group_key(product_id: &str, ordinal: u32) -> GroupId {
    format!("{product_id}:{ordinal:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_keys_sort_by_creation_order() {
        let mut keys = vec![group_key("p", 10), group_key("p", 2), group_key("p", 1)];
        keys.sort();
        assert_eq!(keys, vec!["p:000001", "p:000002", "p:000010"]);
    }

    #[test]
    fn new_record_is_not_waiting() {
        let record = EnrollmentRecord::new("alice", "rust-101", 1000);
        assert!(!record.is_waiting);
        assert_eq!(record.table_key(), "rust-101:alice");
    }

    #[test]
    fn product_defaults() {
        let product = Product::new("rust-101", "Rust 101");
        assert_eq!(product.min_group_capacity, 3);
        assert_eq!(product.max_group_capacity, 4);
    }
}
