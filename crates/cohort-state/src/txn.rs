//! EnrollmentTxn — one product's snapshot read and write-back under a
//! single redb write transaction.

use cohort_core::{EnrollmentRecord, Group, Product, enrollment_key};
use redb::WriteTransaction;
use tracing::debug;

use crate::error::StateResult;
use crate::store::{get_json, scan_prefix};
use crate::tables::*;

/// Write transaction scoped to the records of one product.
///
/// Reads see the state as of the start of the transaction plus anything
/// written through it. Nothing is visible to other readers until
/// [`commit`](Self::commit); dropping the value aborts.
pub struct EnrollmentTxn {
    txn: WriteTransaction,
    product_id: String,
}

impl EnrollmentTxn {
    pub(crate) fn new(txn: WriteTransaction, product_id: &str) -> Self {
        Self {
            txn,
            product_id: product_id.to_string(),
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    fn prefix(&self) -> String {
        format!("{}:", self.product_id)
    }

    pub fn product(&self) -> StateResult<Option<Product>> {
        let table = self.txn.open_table(PRODUCTS).map_err(map_err!(Table))?;
        get_json(&table, &self.product_id)
    }

    /// The user's existing record for this product, if any.
    pub fn enrollment(&self, user_id: &str) -> StateResult<Option<EnrollmentRecord>> {
        let table = self.txn.open_table(ENROLLMENTS).map_err(map_err!(Table))?;
        get_json(&table, &enrollment_key(&self.product_id, user_id))
    }

    /// The product's waiting pool.
    pub fn waiting(&self) -> StateResult<Vec<EnrollmentRecord>> {
        let table = self.txn.open_table(ENROLLMENTS).map_err(map_err!(Table))?;
        let mut records: Vec<EnrollmentRecord> = scan_prefix(&table, &self.prefix())?;
        records.retain(|r| r.is_waiting);
        Ok(records)
    }

    /// All groups of the product, in creation order.
    pub fn groups(&self) -> StateResult<Vec<Group>> {
        let table = self.txn.open_table(GROUPS).map_err(map_err!(Table))?;
        scan_prefix(&table, &self.prefix())
    }

    /// Insert or overwrite enrollment records.
    pub fn write_records<'a>(&self, records: impl IntoIterator<Item = &'a EnrollmentRecord>) -> StateResult<()> {
        let mut table = self.txn.open_table(ENROLLMENTS).map_err(map_err!(Table))?;
        let mut count = 0usize;
        for record in records {
            let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
            table
                .insert(record.table_key().as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
            count += 1;
        }
        debug!(product = %self.product_id, count, "enrollment records staged");
        Ok(())
    }

    /// Insert or overwrite groups.
    pub fn write_groups(&self, groups: &[Group]) -> StateResult<()> {
        let mut table = self.txn.open_table(GROUPS).map_err(map_err!(Table))?;
        for group in groups {
            let value = serde_json::to_vec(group).map_err(map_err!(Serialize))?;
            table
                .insert(group.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        debug!(product = %self.product_id, count = groups.len(), "groups staged");
        Ok(())
    }

    /// Make every staged write visible atomically.
    pub fn commit(self) -> StateResult<()> {
        self.txn.commit().map_err(map_err!(Transaction))?;
        debug!(product = %self.product_id, "enrollment committed");
        Ok(())
    }
}
