//! Consistency checks over a product's waiting pool and groups.

use std::collections::HashSet;

use cohort_core::{EnrollmentRecord, Group, GroupId, UserId};
use thiserror::Error;

use crate::policy::CapacityPolicy;

/// A broken invariant found in a product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("group {group} holds {size} members, above max {max}")]
    OverCapacity { group: GroupId, size: usize, max: usize },

    #[error("group {group} holds {size} members, below min {min}")]
    UnderMinimum { group: GroupId, size: usize, min: usize },

    #[error("user {user} belongs to more than one group")]
    DuplicateMember { user: UserId },

    #[error("user {user} is waiting but also belongs to a group")]
    WaitingAndGrouped { user: UserId },

    #[error("record for user {user} is not flagged as waiting")]
    WaitingFlagCleared { user: UserId },

    #[error("group sizes range from {smallest} to {largest}")]
    Spread { smallest: usize, largest: usize },
}

/// Check every invariant a product must satisfy between enrollment events.
///
/// Returns all violations found; an empty list means the snapshot is
/// consistent.
pub fn check_invariants(
    policy: &CapacityPolicy,
    waiting: &[EnrollmentRecord],
    groups: &[Group],
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut grouped: HashSet<&str> = HashSet::new();
    for group in groups {
        let size = group.len();
        if size > policy.max() {
            violations.push(Violation::OverCapacity {
                group: group.id.clone(),
                size,
                max: policy.max(),
            });
        }
        if size < policy.min() {
            violations.push(Violation::UnderMinimum {
                group: group.id.clone(),
                size,
                min: policy.min(),
            });
        }
        for member in &group.members {
            if !grouped.insert(member.as_str()) {
                violations.push(Violation::DuplicateMember {
                    user: member.clone(),
                });
            }
        }
    }

    for record in waiting {
        if !record.is_waiting {
            violations.push(Violation::WaitingFlagCleared {
                user: record.user_id.clone(),
            });
        }
        if grouped.contains(record.user_id.as_str()) {
            violations.push(Violation::WaitingAndGrouped {
                user: record.user_id.clone(),
            });
        }
    }

    let smallest = groups.iter().map(Group::len).min();
    let largest = groups.iter().map(Group::len).max();
    if let (Some(smallest), Some(largest)) = (smallest, largest) {
        if largest - smallest > 1 {
            violations.push(Violation::Spread { smallest, largest });
        }
    }

    violations
}
