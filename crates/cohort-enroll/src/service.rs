//! EnrollmentService — admits users into products one event at a time.
//!
//! Each `enroll` call:
//! - Takes the product's lock, so events on one product run one after another
//! - Opens a store write transaction and loads the waiting pool and groups
//! - Runs the balancer on that snapshot
//! - Writes the changed records and all groups back, then commits
//!
//! Events on different products hold different locks and only meet at the
//! store's commit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use cohort_balancer::{CapacityPolicy, Placement, check_invariants, process_enrollment};
use cohort_core::{EnrollmentRecord, Group, GroupId, Lesson, Product};
use cohort_state::StateStore;

use crate::error::{EnrollError, EnrollResult};
use crate::stats::{self, ProductStatistics, ProductSummary};

/// Result of one successful enrollment.
#[derive(Debug, Clone)]
pub struct EnrollmentReceipt {
    /// The user's record as committed.
    pub record: EnrollmentRecord,
    /// The group the user ended up in, if not waiting.
    pub group: Option<GroupId>,
    /// What the balancer decided.
    pub placement: Placement,
    /// Size of every group of the product after the event.
    pub group_sizes: Vec<usize>,
    /// Size of the waiting pool after the event.
    pub waiting: usize,
}

/// Runs enrollment events and read projections over a `StateStore`.
pub struct EnrollmentService {
    state: StateStore,
    /// One lock per product id, created on first use.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EnrollmentService {
    pub fn new(state: StateStore) -> Self {
        Self {
            state,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying state store.
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    async fn product_lock(&self, product_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(product_id.to_string()).or_default().clone()
    }

    // ── Catalogue ──────────────────────────────────────────────────

    /// Create or update a product after validating its capacity bounds.
    pub async fn put_product(&self, product: &Product) -> EnrollResult<()> {
        CapacityPolicy::from_product(product)?;

        // Capacity edits must not interleave with an enrollment on the product.
        let lock = self.product_lock(&product.id).await;
        let _guard = lock.lock().await;
        self.state.put_product(product)?;
        info!(
            product = %product.id,
            min = product.min_group_capacity,
            max = product.max_group_capacity,
            "product saved"
        );
        Ok(())
    }

    /// Add a lesson to an existing product.
    pub fn put_lesson(&self, lesson: &Lesson) -> EnrollResult<()> {
        if self.state.get_product(&lesson.product_id)?.is_none() {
            return Err(EnrollError::ProductNotFound(lesson.product_id.clone()));
        }
        self.state.put_lesson(lesson)?;
        Ok(())
    }

    // ── Enrollment ─────────────────────────────────────────────────

    /// Enroll a user into a product and rebalance its groups.
    ///
    /// Fails with `DuplicateEnrollment` if the user already holds a record
    /// for the product; nothing is written on any error.
    pub async fn enroll(&self, product_id: &str, user_id: &str) -> EnrollResult<EnrollmentReceipt> {
        let lock = self.product_lock(product_id).await;
        let _guard = lock.lock().await;

        let txn = self.state.begin_enrollment(product_id)?;
        let product = txn
            .product()?
            .ok_or_else(|| EnrollError::ProductNotFound(product_id.to_string()))?;

        if txn.enrollment(user_id)?.is_some() {
            return Err(EnrollError::DuplicateEnrollment {
                user: user_id.to_string(),
                product: product_id.to_string(),
            });
        }

        let waiting = txn.waiting()?;
        let groups = txn.groups()?;
        debug!(
            product = %product_id,
            user = %user_id,
            waiting = waiting.len(),
            groups = groups.len(),
            "snapshot loaded"
        );

        let mut record = EnrollmentRecord::new(user_id, product_id, epoch_secs());
        let outcome = process_enrollment(&product, waiting, groups, record.clone())?;

        let policy = CapacityPolicy::from_product(&product)?;
        for violation in check_invariants(&policy, &outcome.waiting, &outcome.groups) {
            warn!(product = %product_id, %violation, "invariant violated after enrollment");
        }

        txn.write_records(outcome.changed_records())?;
        txn.write_groups(&outcome.groups)?;
        txn.commit()?;

        let group = outcome
            .groups
            .iter()
            .find(|g| g.contains(user_id))
            .map(|g| g.id.clone());
        record.is_waiting = group.is_none();

        info!(
            product = %product_id,
            user = %user_id,
            waiting = record.is_waiting,
            group = group.as_deref().unwrap_or("-"),
            "enrollment committed"
        );

        Ok(EnrollmentReceipt {
            record,
            group,
            placement: outcome.placement,
            group_sizes: outcome.groups.iter().map(Group::len).collect(),
            waiting: outcome.waiting.len(),
        })
    }

    // ── Read projections ───────────────────────────────────────────

    /// Groups of a product, in creation order.
    pub fn groups(&self, product_id: &str) -> EnrollResult<Vec<Group>> {
        Ok(self.state.list_groups_for_product(product_id)?)
    }

    /// Lessons the user may watch.
    ///
    /// Without a product: lessons of every product the user holds a
    /// non-waiting record for. With a product: its lessons if the user has
    /// non-waiting access to it, otherwise none. Unknown products yield none.
    pub fn lessons_for_user(&self, user_id: &str, product_id: Option<&str>) -> EnrollResult<Vec<Lesson>> {
        match product_id {
            Some(product_id) => {
                if self.state.get_product(product_id)?.is_none() {
                    return Ok(Vec::new());
                }
                let has_access = self
                    .state
                    .get_enrollment(product_id, user_id)?
                    .is_some_and(|r| !r.is_waiting);
                if !has_access {
                    return Ok(Vec::new());
                }
                Ok(self.state.list_lessons_for_product(product_id)?)
            }
            None => {
                let mut lessons = Vec::new();
                for record in self.state.list_enrollments_for_user(user_id)? {
                    if !record.is_waiting {
                        lessons.extend(self.state.list_lessons_for_product(&record.product_id)?);
                    }
                }
                Ok(lessons)
            }
        }
    }

    /// Every product with its lesson count.
    pub fn products(&self) -> EnrollResult<Vec<ProductSummary>> {
        Ok(stats::product_summaries(&self.state)?)
    }

    /// Per-product lesson, user, group and waiting counts.
    pub fn statistics(&self) -> EnrollResult<Vec<ProductStatistics>> {
        Ok(stats::product_statistics(&self.state)?)
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
