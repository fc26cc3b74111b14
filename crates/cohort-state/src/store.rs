//! StateStore — redb-backed state persistence for cohortgrid.
//!
//! Provides typed operations over products, lessons, enrollment records and
//! groups. All values are JSON-serialized into redb's `&[u8]` value
//! columns. The store supports both on-disk and in-memory backends (the
//! latter for testing).

use std::path::Path;
use std::sync::Arc;

use cohort_core::{EnrollmentRecord, Group, Lesson, Product, enrollment_key};
use redb::{Database, ReadableDatabase, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::txn::EnrollmentTxn;

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(PRODUCTS).map_err(map_err!(Table))?;
        txn.open_table(LESSONS).map_err(map_err!(Table))?;
        txn.open_table(ENROLLMENTS).map_err(map_err!(Table))?;
        txn.open_table(GROUPS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Begin the write transaction for one enrollment event on a product.
    ///
    /// redb admits a single writer at a time; the transaction aborts if it
    /// is dropped without [`EnrollmentTxn::commit`].
    pub fn begin_enrollment(&self, product_id: &str) -> StateResult<EnrollmentTxn> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        Ok(EnrollmentTxn::new(txn, product_id))
    }

    fn put<T: Serialize>(&self, def: JsonTable, key: &str, value: &T) -> StateResult<()> {
        let value = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, def: JsonTable, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        get_json(&table, key)
    }

    fn scan<T: DeserializeOwned>(&self, def: JsonTable, prefix: &str) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        scan_prefix(&table, prefix)
    }

    // ── Products ───────────────────────────────────────────────────

    /// Insert or update a product.
    pub fn put_product(&self, product: &Product) -> StateResult<()> {
        check_segment(&product.id)?;
        self.put(PRODUCTS, &product.id, product)?;
        debug!(product = %product.id, "product stored");
        Ok(())
    }

    /// Get a product by ID.
    pub fn get_product(&self, product_id: &str) -> StateResult<Option<Product>> {
        self.get(PRODUCTS, product_id)
    }

    /// List all products.
    pub fn list_products(&self) -> StateResult<Vec<Product>> {
        self.scan(PRODUCTS, "")
    }

    // ── Lessons ────────────────────────────────────────────────────

    /// Insert or update a lesson.
    pub fn put_lesson(&self, lesson: &Lesson) -> StateResult<()> {
        check_segment(&lesson.id)?;
        let key = lesson.table_key();
        self.put(LESSONS, &key, lesson)?;
        debug!(%key, "lesson stored");
        Ok(())
    }

    /// List all lessons of a product.
    pub fn list_lessons_for_product(&self, product_id: &str) -> StateResult<Vec<Lesson>> {
        self.scan(LESSONS, &format!("{product_id}:"))
    }

    // ── Enrollments ────────────────────────────────────────────────

    /// Get one user's enrollment record for a product.
    pub fn get_enrollment(&self, product_id: &str, user_id: &str) -> StateResult<Option<EnrollmentRecord>> {
        self.get(ENROLLMENTS, &enrollment_key(product_id, user_id))
    }

    /// List all enrollment records of a product.
    pub fn list_enrollments_for_product(&self, product_id: &str) -> StateResult<Vec<EnrollmentRecord>> {
        self.scan(ENROLLMENTS, &format!("{product_id}:"))
    }

    /// The waiting pool of a product.
    pub fn list_waiting_for_product(&self, product_id: &str) -> StateResult<Vec<EnrollmentRecord>> {
        let mut records = self.list_enrollments_for_product(product_id)?;
        records.retain(|r| r.is_waiting);
        Ok(records)
    }

    /// List every enrollment record held by a user, across products.
    pub fn list_enrollments_for_user(&self, user_id: &str) -> StateResult<Vec<EnrollmentRecord>> {
        let mut records: Vec<EnrollmentRecord> = self.scan(ENROLLMENTS, "")?;
        records.retain(|r| r.user_id == user_id);
        Ok(records)
    }

    // ── Groups ─────────────────────────────────────────────────────

    /// List all groups of a product, in creation order.
    pub fn list_groups_for_product(&self, product_id: &str) -> StateResult<Vec<Group>> {
        self.scan(GROUPS, &format!("{product_id}:"))
    }
}

/// Reject ids that would break the `{parent}:{child}` key layout.
fn check_segment(id: &str) -> StateResult<()> {
    if id.is_empty() || id.contains(':') {
        return Err(StateError::InvalidKey(id.to_string()));
    }
    Ok(())
}

pub(crate) fn get_json<T, Tbl>(table: &Tbl, key: &str) -> StateResult<Option<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key).map_err(map_err!(Read))? {
        Some(guard) => {
            let value: T = serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Deserialize every value whose key starts with `prefix`, in key order.
pub(crate) fn scan_prefix<T, Tbl>(table: &Tbl, prefix: &str) -> StateResult<Vec<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<&'static str, &'static [u8]>,
{
    let mut results = Vec::new();
    for entry in table.iter().map_err(map_err!(Read))? {
        let (key, value) = entry.map_err(map_err!(Read))?;
        if key.value().starts_with(prefix) {
            let item: T = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(item);
        }
    }
    Ok(results)
}
