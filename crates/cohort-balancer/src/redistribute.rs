//! Deterministic redistribution of members across groups.
//!
//! Rebalancing is split in two steps: first decide how many members each
//! group should end with ([`balanced_targets`]), then move members until
//! every group matches its target ([`redistribute`]). Both are pure
//! functions of their inputs, so the same snapshot always produces the same
//! memberships.

use cohort_core::{Group, UserId};
use tracing::debug;

/// Spread `total` members over `count` groups as evenly as possible.
///
/// Every group gets `total / count`; the `total % count` leftover members go
/// one each to the group indices in `extra_order`, first come first served.
/// Indices in `extra_order` that are out of range are ignored. If
/// `extra_order` runs out before the leftover does, the remaining extras go
/// to the lowest indices not yet served.
pub fn balanced_targets(total: usize, count: usize, extra_order: &[usize]) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }

    let base = total / count;
    let mut extra = total % count;
    let mut targets = vec![base; count];
    let mut served = vec![false; count];

    let fallback = 0..count;
    for idx in extra_order.iter().copied().chain(fallback) {
        if extra == 0 {
            break;
        }
        if idx >= count || served[idx] {
            continue;
        }
        served[idx] = true;
        targets[idx] += 1;
        extra -= 1;
    }

    targets
}

/// Move members so that `groups[i].len() == targets[i]` for every group.
///
/// Donors are visited largest first (ties: lower index first) and give up
/// their most recently joined members. Receivers are filled from the highest
/// index down, so a newly appended group is topped up before older ones.
/// Returns the number of members moved.
///
/// `targets` must have one entry per group and sum to the current member
/// count.
pub fn redistribute(groups: &mut [Group], targets: &[usize]) -> usize {
    debug_assert_eq!(groups.len(), targets.len());
    debug_assert_eq!(
        groups.iter().map(Group::len).sum::<usize>(),
        targets.iter().sum::<usize>()
    );

    let mut donors: Vec<usize> = (0..groups.len())
        .filter(|&i| groups[i].len() > targets[i])
        .collect();
    donors.sort_by(|&a, &b| groups[b].len().cmp(&groups[a].len()).then(a.cmp(&b)));

    let mut surplus: Vec<UserId> = Vec::new();
    for i in donors {
        let keep = targets[i];
        let moved = groups[i].members.split_off(keep);
        debug!(group = %groups[i].id, count = moved.len(), "releasing members");
        surplus.extend(moved);
    }

    let moved = surplus.len();
    let mut surplus = surplus.into_iter();
    for i in (0..groups.len()).rev() {
        let missing = targets[i].saturating_sub(groups[i].len());
        if missing == 0 {
            continue;
        }
        groups[i].members.extend(surplus.by_ref().take(missing));
        debug!(group = %groups[i].id, count = missing, "receiving members");
    }

    moved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ordinal: u32, members: &[&str]) -> Group {
        let mut g = Group::new("p", ordinal);
        g.members = members.iter().map(|m| m.to_string()).collect();
        g
    }

    fn sizes(groups: &[Group]) -> Vec<usize> {
        groups.iter().map(Group::len).collect()
    }

    #[test]
    fn targets_even_split() {
        assert_eq!(balanced_targets(9, 3, &[]), vec![3, 3, 3]);
    }

    #[test]
    fn targets_follow_extra_order() {
        // 10 over 4: base 2, two extras → newest first, then oldest.
        assert_eq!(balanced_targets(10, 4, &[3, 0, 1, 2]), vec![3, 2, 2, 3]);
    }

    #[test]
    fn targets_fall_back_to_lowest_indices() {
        assert_eq!(balanced_targets(5, 3, &[7]), vec![2, 2, 1]);
    }

    #[test]
    fn targets_for_no_groups() {
        assert!(balanced_targets(5, 0, &[]).is_empty());
    }

    #[test]
    fn moves_most_recent_members_into_newest_group() {
        let mut groups = vec![group(1, &["a", "b", "c", "d"]), group(2, &["e"])];
        let moved = redistribute(&mut groups, &[2, 3]);

        assert_eq!(moved, 2);
        assert_eq!(groups[0].members, vec!["a", "b"]);
        assert_eq!(groups[1].members, vec!["e", "c", "d"]);
    }

    #[test]
    fn largest_donor_gives_first() {
        let mut groups = vec![
            group(1, &["a", "b", "c"]),
            group(2, &["d", "e", "f", "g"]),
            group(3, &[]),
        ];
        let moved = redistribute(&mut groups, &[2, 3, 2]);

        assert_eq!(moved, 2);
        assert_eq!(sizes(&groups), vec![2, 3, 2]);
        assert_eq!(groups[2].members, vec!["g", "c"]);
    }

    #[test]
    fn matching_targets_move_nothing() {
        let mut groups = vec![group(1, &["a", "b"]), group(2, &["c", "d"])];
        assert_eq!(redistribute(&mut groups, &[2, 2]), 0);
        assert_eq!(groups[0].members, vec!["a", "b"]);
    }
}
