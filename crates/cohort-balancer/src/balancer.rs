//! Enrollment balancer — places one enrolling user per call.
//!
//! Given a product's capacity policy, its current waiting pool and groups,
//! and one new enrollment record, the balancer decides whether the user:
//! 1. Waits in the pool until enough users accumulate to activate a group
//! 2. Joins an existing group that still has room
//! 3. Opens a new group, after which all groups are rebalanced
//!
//! The decision is a pure function of the snapshot. Persisting the outcome
//! and serializing events per product is the caller's job.

use cohort_core::{EnrollmentRecord, Group, GroupId, Product};
use tracing::{debug, info};

use crate::error::BalancerResult;
use crate::policy::CapacityPolicy;
use crate::redistribute::{balanced_targets, redistribute};

/// The complete next state of a product after one enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentOutcome {
    /// Records still waiting, oldest request first. Includes the new record
    /// if it was parked.
    pub waiting: Vec<EnrollmentRecord>,
    /// Every group of the product, in creation order.
    pub groups: Vec<Group>,
    /// Records that are now grouped and were waiting or new before the call.
    pub admitted: Vec<EnrollmentRecord>,
    /// What happened to the new record.
    pub placement: Placement,
}

impl EnrollmentOutcome {
    /// Every record whose waiting flag must be written back.
    pub fn changed_records(&self) -> impl Iterator<Item = &EnrollmentRecord> {
        self.waiting.iter().chain(self.admitted.iter())
    }
}

/// Summary of the decision taken for the new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Parked in the waiting pool, which now holds `pool` users.
    Waiting { pool: usize },
    /// Added to an existing group.
    Joined { group: GroupId },
    /// The waiting pool was activated into new groups; `moved` members were
    /// shifted between groups afterwards.
    Activated { groups: Vec<GroupId>, moved: usize },
    /// Every group was full: a new group was opened with the user and
    /// `moved` members were shifted into balance.
    Split { group: GroupId, moved: usize },
}

/// Process one enrollment event against a product snapshot.
///
/// `waiting` must be the product's waiting records and `groups` all of its
/// groups; `new_record` must not duplicate an existing enrollment. Fails
/// only when the product's capacity bounds are malformed, in which case
/// nothing is produced.
pub fn process_enrollment(
    product: &Product,
    waiting: Vec<EnrollmentRecord>,
    groups: Vec<Group>,
    new_record: EnrollmentRecord,
) -> BalancerResult<EnrollmentOutcome> {
    let policy = CapacityPolicy::from_product(product)?;
    let mut event = Event::new(product, policy, waiting, groups);

    let (min, max) = (policy.min(), policy.max());
    let total = event.total_users();
    let count = event.groups.len();

    // Averages compared exactly: avg = total / count, avg_next = (total + 1) / (count + 1).
    let avg_below_max = total < max * count;
    let avg_next_at_most_min = total + 1 <= min * (count + 1);
    let avg_next_is_min = total + 1 == min * (count + 1);

    debug!(
        product = %product.id,
        user = %new_record.user_id,
        total,
        groups = count,
        waiting = event.waiting.len(),
        "balancing enrollment"
    );

    let placement = if count == 0 || total < min {
        event.park(new_record);
        if event.waiting.len() >= min {
            event.activate_pool()
        } else {
            event.waiting_placement()
        }
    } else if avg_next_at_most_min {
        if avg_below_max {
            event.join_smallest(new_record)
        } else {
            event.park(new_record);
            if avg_next_is_min {
                event.activate_pool_and_rebalance()
            } else {
                event.waiting_placement()
            }
        }
    } else if avg_below_max {
        event.join_smallest(new_record)
    } else {
        event.split(new_record)
    };

    Ok(event.finish(placement))
}

/// Working state for a single enrollment event.
struct Event<'a> {
    product: &'a Product,
    policy: CapacityPolicy,
    waiting: Vec<EnrollmentRecord>,
    groups: Vec<Group>,
    admitted: Vec<EnrollmentRecord>,
}

impl<'a> Event<'a> {
    fn new(
        product: &'a Product,
        policy: CapacityPolicy,
        mut waiting: Vec<EnrollmentRecord>,
        mut groups: Vec<Group>,
    ) -> Self {
        // Oldest request first; activation takes users in this order.
        waiting.sort_by(|a, b| {
            a.requested_at
                .cmp(&b.requested_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        groups.sort_by_key(|g| g.ordinal);
        Self {
            product,
            policy,
            waiting,
            groups,
            admitted: Vec::new(),
        }
    }

    fn total_users(&self) -> usize {
        self.waiting.len() + self.groups.iter().map(Group::len).sum::<usize>()
    }

    fn next_ordinal(&self) -> u32 {
        self.groups.iter().map(|g| g.ordinal).max().unwrap_or(0) + 1
    }

    fn open_group(&mut self) -> usize {
        let group = Group::new(&self.product.id, self.next_ordinal());
        self.groups.push(group);
        self.groups.len() - 1
    }

    fn park(&mut self, mut record: EnrollmentRecord) {
        record.is_waiting = true;
        self.waiting.push(record);
    }

    fn waiting_placement(&self) -> Placement {
        debug!(product = %self.product.id, pool = self.waiting.len(), "user waiting");
        Placement::Waiting {
            pool: self.waiting.len(),
        }
    }

    fn admit(&mut self, mut record: EnrollmentRecord, group_idx: usize) {
        record.is_waiting = false;
        self.groups[group_idx].members.push(record.user_id.clone());
        self.admitted.push(record);
    }

    /// Add the user to the smallest group, lowest ordinal on ties.
    ///
    /// Only called while the average is below `max`, so the smallest group
    /// has room, and its size never exceeds `floor(avg)`.
    fn join_smallest(&mut self, record: EnrollmentRecord) -> Placement {
        let smallest = self
            .groups
            .iter()
            .enumerate()
            .min_by_key(|(i, g)| (g.len(), *i))
            .map(|(i, _)| i);
        let idx = match smallest {
            Some(idx) => idx,
            None => self.open_group(),
        };
        self.admit(record, idx);

        let group = self.groups[idx].id.clone();
        debug!(product = %self.product.id, %group, size = self.groups[idx].len(), "user joined group");
        Placement::Joined { group }
    }

    /// Turn the waiting pool into as many new groups as it can fill.
    ///
    /// Normally the pool holds exactly `min` users and becomes one group.
    /// A larger pool (capacity bounds edited between events) is cut into
    /// `pool / min` groups, admitting at most `max` users each; whoever does
    /// not fit keeps waiting.
    fn activate_pool(&mut self) -> Placement {
        let (min, max) = (self.policy.min(), self.policy.max());
        let new_groups = self.waiting.len() / min;
        let admitted = self.waiting.len().min(new_groups * max);

        let rest = self.waiting.split_off(admitted);
        let batch = std::mem::replace(&mut self.waiting, rest);

        let first = self.groups.len();
        for _ in 0..new_groups {
            self.open_group();
        }
        let targets = balanced_targets(admitted, new_groups, &[]);

        let mut batch = batch.into_iter();
        for (offset, target) in targets.into_iter().enumerate() {
            for record in batch.by_ref().take(target) {
                self.admit(record, first + offset);
            }
        }

        let ids: Vec<GroupId> = self.groups[first..].iter().map(|g| g.id.clone()).collect();
        info!(
            product = %self.product.id,
            groups = ?ids,
            admitted,
            still_waiting = self.waiting.len(),
            "waiting pool activated"
        );
        Placement::Activated { groups: ids, moved: 0 }
    }

    /// Activate the whole pool as one group, then level every group to
    /// `floor(avg_next)` members.
    fn activate_pool_and_rebalance(&mut self) -> Placement {
        let idx = self.open_group();
        for record in std::mem::take(&mut self.waiting) {
            self.admit(record, idx);
        }

        let moved = self.rebalance(idx);
        let group = self.groups[idx].id.clone();
        info!(product = %self.product.id, %group, moved, "waiting pool activated with rebalance");
        Placement::Activated {
            groups: vec![group],
            moved,
        }
    }

    /// Every group is full: open a new group for the user and rebalance.
    fn split(&mut self, record: EnrollmentRecord) -> Placement {
        let idx = self.open_group();
        self.admit(record, idx);

        let moved = self.rebalance(idx);
        let group = self.groups[idx].id.clone();
        info!(
            product = %self.product.id,
            %group,
            moved,
            groups = self.groups.len(),
            "groups full, split into new group"
        );
        Placement::Split { group, moved }
    }

    /// Level all groups to `total / count` members. Leftover members are
    /// kept by the newest group first, then by older groups in creation
    /// order.
    fn rebalance(&mut self, newest: usize) -> usize {
        let total: usize = self.groups.iter().map(Group::len).sum();
        let extra_order: Vec<usize> = std::iter::once(newest)
            .chain((0..self.groups.len()).filter(|&i| i != newest))
            .collect();
        let targets = balanced_targets(total, self.groups.len(), &extra_order);
        redistribute(&mut self.groups, &targets)
    }

    fn finish(self, placement: Placement) -> EnrollmentOutcome {
        EnrollmentOutcome {
            waiting: self.waiting,
            groups: self.groups,
            admitted: self.admitted,
            placement,
        }
    }
}
