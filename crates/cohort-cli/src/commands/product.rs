use cohort_core::{CohortConfig, Product};

use super::open_service;

pub struct AddArgs {
    pub id: String,
    pub name: String,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub price_cents: u64,
    pub creator: String,
    pub start: u64,
}

pub async fn add(config: &CohortConfig, args: AddArgs) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let product = Product {
        id: args.id,
        name: args.name,
        start: args.start,
        price_cents: args.price_cents,
        creator: args.creator,
        min_group_capacity: args.min.unwrap_or(config.defaults.min_group_capacity),
        max_group_capacity: args.max.unwrap_or(config.defaults.max_group_capacity),
    };
    service.put_product(&product).await?;
    println!(
        "✓ Saved product {} (groups of {}..={})",
        product.id, product.min_group_capacity, product.max_group_capacity
    );
    Ok(())
}

pub fn list(config: &CohortConfig, format: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let products = service.products()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&products)?);
        }
        _ => {
            if products.is_empty() {
                println!("No products.");
            }
            for p in &products {
                println!("{:<16} {:<32} {:>3} lessons", p.id, p.name, p.lessons_count);
            }
        }
    }

    Ok(())
}
