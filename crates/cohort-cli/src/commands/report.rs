use cohort_core::CohortConfig;

use super::open_service;

pub fn groups(config: &CohortConfig, product: &str, format: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let groups = service.groups(product)?;
    let waiting = service.state().list_waiting_for_product(product)?;

    match format {
        "json" => {
            let waiting: Vec<&str> = waiting.iter().map(|r| r.user_id.as_str()).collect();
            let value = serde_json::json!({
                "product": product,
                "groups": groups,
                "waiting": waiting,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => {
            for group in &groups {
                println!("{:<10} ({}) {}", group.name, group.len(), group.members.join(", "));
            }
            if groups.is_empty() {
                println!("No groups yet.");
            }
            if !waiting.is_empty() {
                let users: Vec<&str> = waiting.iter().map(|r| r.user_id.as_str()).collect();
                println!("Waiting    ({}) {}", users.len(), users.join(", "));
            }
        }
    }

    Ok(())
}

pub fn lessons(config: &CohortConfig, user: &str, product: Option<&str>) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let lessons = service.lessons_for_user(user, product)?;

    if lessons.is_empty() {
        println!("No lessons available for {user}.");
    }
    for lesson in &lessons {
        println!("{:<12} {:<12} {:<32} {}", lesson.product_id, lesson.id, lesson.name, lesson.video_url);
    }
    Ok(())
}

pub fn stats(config: &CohortConfig, format: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let stats = service.statistics()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        _ => {
            println!(
                "{:<16} {:>7} {:>6} {:>6} {:>7}",
                "PRODUCT", "LESSONS", "USERS", "GROUPS", "WAITING"
            );
            for s in &stats {
                println!(
                    "{:<16} {:>7} {:>6} {:>6} {:>7}",
                    s.id, s.lessons_count, s.users_count, s.groups_count, s.waiting_count
                );
            }
        }
    }

    Ok(())
}
