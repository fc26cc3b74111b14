use cohort_core::{CohortConfig, Lesson};

use super::open_service;

pub fn add(config: &CohortConfig, product: &str, id: &str, name: &str, video_url: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    service.put_lesson(&Lesson {
        id: id.to_string(),
        product_id: product.to_string(),
        name: name.to_string(),
        video_url: video_url.to_string(),
    })?;
    println!("✓ Added lesson {id} to {product}");
    Ok(())
}
