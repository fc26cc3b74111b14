use cohort_balancer::{CapacityPolicy, Placement, check_invariants, process_enrollment};
use cohort_core::{EnrollmentRecord, Group, Product};

use super::describe_placement;

/// State after one simulated enrollment.
pub struct Step {
    pub user: String,
    pub placement: Placement,
    pub group_sizes: Vec<usize>,
    pub waiting: usize,
}

/// Enroll `users` users one after another into an in-memory product.
pub fn run(min: u32, max: u32, users: usize) -> anyhow::Result<Vec<Step>> {
    let product = Product::new("sim", "Simulation").with_capacity(min, max);
    let policy = CapacityPolicy::from_product(&product)?;

    let mut waiting: Vec<EnrollmentRecord> = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut steps = Vec::with_capacity(users);

    for i in 0..users {
        let user = format!("user-{:03}", i + 1);
        let record = EnrollmentRecord::new(user.as_str(), product.id.as_str(), i as u64);
        let outcome = process_enrollment(&product, waiting, groups, record)?;

        let violations = check_invariants(&policy, &outcome.waiting, &outcome.groups);
        if let Some(violation) = violations.first() {
            anyhow::bail!("after {user}: {violation}");
        }

        steps.push(Step {
            user,
            placement: outcome.placement,
            group_sizes: outcome.groups.iter().map(Group::len).collect(),
            waiting: outcome.waiting.len(),
        });
        waiting = outcome.waiting;
        groups = outcome.groups;
    }

    Ok(steps)
}

pub fn simulate(min: u32, max: u32, users: usize, format: &str) -> anyhow::Result<()> {
    let steps = run(min, max, users)?;

    match format {
        "json" => {
            let value: Vec<serde_json::Value> = steps
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "user": s.user,
                        "placement": describe_placement(&s.placement),
                        "group_sizes": s.group_sizes,
                        "waiting": s.waiting,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => {
            for s in &steps {
                println!(
                    "{:<9} {:<44} groups {:?} waiting {}",
                    s.user,
                    describe_placement(&s.placement),
                    s.group_sizes,
                    s.waiting
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(steps: &[Step]) -> Vec<(Vec<usize>, usize)> {
        steps.iter().map(|s| (s.group_sizes.clone(), s.waiting)).collect()
    }

    #[test]
    fn default_bounds_first_six() {
        let steps = run(3, 4, 6).unwrap();
        assert_eq!(
            sizes(&steps),
            vec![
                (vec![], 1),
                (vec![], 2),
                (vec![3], 0),
                (vec![4], 0),
                (vec![4], 1),
                (vec![3, 3], 0),
            ]
        );
    }

    #[test]
    fn min_two_splits_on_overflow() {
        let steps = run(2, 4, 5).unwrap();
        assert_eq!(steps[3].group_sizes, vec![4]);
        assert!(matches!(steps[4].placement, Placement::Split { .. }));
        assert_eq!(steps[4].group_sizes, vec![2, 3]);
    }

    #[test]
    fn invalid_bounds_rejected() {
        assert!(run(4, 3, 1).is_err());
        assert!(run(0, 3, 1).is_err());
    }

    #[test]
    fn no_users_no_steps() {
        assert!(run(3, 4, 0).unwrap().is_empty());
    }
}
