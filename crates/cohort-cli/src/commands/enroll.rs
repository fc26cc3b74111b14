use cohort_core::CohortConfig;

use super::{describe_placement, open_service};

pub async fn enroll(config: &CohortConfig, product: &str, user: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let receipt = service.enroll(product, user).await?;

    match &receipt.group {
        Some(group) => println!("✓ {user} enrolled in {product}, group {group}"),
        None => println!("✓ {user} enrolled in {product}, waiting for a group"),
    }
    println!("  Placement: {}", describe_placement(&receipt.placement));
    println!("  Groups:    {:?}", receipt.group_sizes);
    println!("  Waiting:   {}", receipt.waiting);

    // Show the user's group mates when placed.
    if let Some(group_id) = &receipt.group {
        let groups = service.groups(product)?;
        if let Some(group) = groups.iter().find(|g| &g.id == group_id) {
            println!("  Members:   {}", group.members.join(", "));
        }
    }
    Ok(())
}
