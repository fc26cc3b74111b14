//! Read-side projections over the product catalogue.

use cohort_core::{Group, ProductId};
use cohort_state::{StateResult, StateStore};
use serde::Serialize;

/// A product as listed to users.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub start: u64,
    pub price_cents: u64,
    pub creator: String,
    pub lessons_count: usize,
}

/// Enrollment counts for one product.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductStatistics {
    pub id: ProductId,
    pub name: String,
    pub start: u64,
    pub price_cents: u64,
    pub creator: String,
    pub lessons_count: usize,
    /// Users holding a group seat.
    pub users_count: usize,
    pub groups_count: usize,
    pub waiting_count: usize,
}

pub fn product_summaries(state: &StateStore) -> StateResult<Vec<ProductSummary>> {
    state
        .list_products()?
        .into_iter()
        .map(|p| {
            let lessons_count = state.list_lessons_for_product(&p.id)?.len();
            Ok(ProductSummary {
                id: p.id,
                name: p.name,
                start: p.start,
                price_cents: p.price_cents,
                creator: p.creator,
                lessons_count,
            })
        })
        .collect()
}

pub fn product_statistics(state: &StateStore) -> StateResult<Vec<ProductStatistics>> {
    state
        .list_products()?
        .into_iter()
        .map(|p| {
            let groups = state.list_groups_for_product(&p.id)?;
            Ok(ProductStatistics {
                lessons_count: state.list_lessons_for_product(&p.id)?.len(),
                users_count: groups.iter().map(Group::len).sum(),
                groups_count: groups.len(),
                waiting_count: state.list_waiting_for_product(&p.id)?.len(),
                id: p.id,
                name: p.name,
                start: p.start,
                price_cents: p.price_cents,
                creator: p.creator,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_core::{EnrollmentRecord, Lesson, Product};

    #[test]
    fn statistics_count_seats_and_pool() {
        let state = StateStore::open_in_memory().unwrap();
        state.put_product(&Product::new("rust", "Rust")).unwrap();
        state.put_product(&Product::new("go", "Go")).unwrap();
        state
            .put_lesson(&Lesson {
                id: "intro".to_string(),
                product_id: "rust".to_string(),
                name: "Intro".to_string(),
                video_url: "https://videos.example.com/intro".to_string(),
            })
            .unwrap();

        let mut group = Group::new("rust", 1);
        group.members = vec!["a".into(), "b".into(), "c".into()];
        let mut waiting = EnrollmentRecord::new("d", "rust", 4);
        waiting.is_waiting = true;

        let txn = state.begin_enrollment("rust").unwrap();
        txn.write_records([&waiting]).unwrap();
        txn.write_groups(&[group]).unwrap();
        txn.commit().unwrap();

        let stats = product_statistics(&state).unwrap();
        let rust = stats.iter().find(|s| s.id == "rust").unwrap();
        assert_eq!(rust.lessons_count, 1);
        assert_eq!(rust.users_count, 3);
        assert_eq!(rust.groups_count, 1);
        assert_eq!(rust.waiting_count, 1);

        let go = stats.iter().find(|s| s.id == "go").unwrap();
        assert_eq!((go.users_count, go.lessons_count), (0, 0));
    }

    #[test]
    fn summaries_include_lesson_count() {
        let state = StateStore::open_in_memory().unwrap();
        state.put_product(&Product::new("rust", "Rust")).unwrap();

        let summaries = product_summaries(&state).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].lessons_count, 0);
        assert_eq!(
            serde_json::to_value(&summaries[0]).unwrap()["name"],
            serde_json::json!("Rust")
        );
    }
}
