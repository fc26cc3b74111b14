pub mod enroll;
pub mod lesson;
pub mod product;
pub mod report;
pub mod simulate;

use cohort_balancer::Placement;
use cohort_core::CohortConfig;
use cohort_enroll::EnrollmentService;
use cohort_state::StateStore;

/// Open the configured store and wrap it in a service.
pub fn open_service(config: &CohortConfig) -> anyhow::Result<EnrollmentService> {
    let state = StateStore::open(&config.store.path)?;
    Ok(EnrollmentService::new(state))
}

/// One-line description of a balancer decision.
pub fn describe_placement(placement: &Placement) -> String {
    match placement {
        Placement::Waiting { pool } => format!("waiting (pool of {pool})"),
        Placement::Joined { group } => format!("joined {group}"),
        Placement::Activated { groups, moved } => {
            format!("activated {} (moved {moved})", groups.join(", "))
        }
        Placement::Split { group, moved } => format!("split into {group} (moved {moved})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_descriptions() {
        assert_eq!(
            describe_placement(&Placement::Waiting { pool: 2 }),
            "waiting (pool of 2)"
        );
        assert_eq!(
            describe_placement(&Placement::Activated {
                groups: vec!["rust:000001".into(), "rust:000002".into()],
                moved: 1,
            }),
            "activated rust:000001, rust:000002 (moved 1)"
        );
    }
}
