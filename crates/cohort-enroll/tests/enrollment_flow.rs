//! End-to-end enrollment flow over an in-memory store.
//!
//! Drives the service the way the CLI does, including concurrent
//! enrollments into the same and different products.

use std::sync::Arc;

use cohort_balancer::{CapacityPolicy, check_invariants};
use cohort_core::{Group, Product};
use cohort_enroll::{EnrollError, EnrollmentService};
use cohort_state::StateStore;

fn test_service() -> Arc<EnrollmentService> {
    Arc::new(EnrollmentService::new(StateStore::open_in_memory().unwrap()))
}

fn assert_consistent(service: &EnrollmentService, product: &Product, enrolled: usize) {
    let policy = CapacityPolicy::from_product(product).unwrap();
    let waiting = service.state().list_waiting_for_product(&product.id).unwrap();
    let groups = service.state().list_groups_for_product(&product.id).unwrap();

    let violations = check_invariants(&policy, &waiting, &groups);
    assert!(violations.is_empty(), "{violations:?}");

    let grouped: usize = groups.iter().map(Group::len).sum();
    assert_eq!(grouped + waiting.len(), enrolled);

    // Every grouped user's record must be flagged as not waiting.
    for group in &groups {
        for member in &group.members {
            let record = service
                .state()
                .get_enrollment(&product.id, member)
                .unwrap()
                .unwrap();
            assert!(!record.is_waiting, "{member} grouped but flagged waiting");
        }
    }
}

#[tokio::test]
async fn sequential_enrollments_stay_balanced() {
    let service = test_service();
    let product = Product::new("rust", "Rust").with_capacity(3, 4);
    service.put_product(&product).await.unwrap();

    for i in 0..40 {
        service.enroll("rust", &format!("user-{i:02}")).await.unwrap();
        assert_consistent(&service, &product, i + 1);
    }

    let stats = service.statistics().unwrap();
    assert_eq!(stats[0].users_count + stats[0].waiting_count, 40);
}

#[tokio::test]
async fn group_of_four_waits_for_sixth_user() {
    let service = test_service();
    let product = Product::new("rust", "Rust").with_capacity(3, 4);
    service.put_product(&product).await.unwrap();

    for user in ["a", "b", "c", "d"] {
        service.enroll("rust", user).await.unwrap();
    }
    assert_eq!(service.groups("rust").unwrap()[0].len(), 4);

    let fifth = service.enroll("rust", "e").await.unwrap();
    assert!(fifth.record.is_waiting);
    assert_eq!(fifth.group_sizes, vec![4]);

    let sixth = service.enroll("rust", "f").await.unwrap();
    assert_eq!(sixth.group_sizes, vec![3, 3]);
    assert_eq!(sixth.waiting, 0);
    let e = service.state().get_enrollment("rust", "e").unwrap().unwrap();
    assert!(!e.is_waiting);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enrollments_into_one_product() {
    let service = test_service();
    let product = Product::new("rust", "Rust").with_capacity(3, 4);
    service.put_product(&product).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..50 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.enroll("rust", &format!("user-{i:02}")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_consistent(&service, &product, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enrollments_across_products() {
    let service = test_service();
    let products = [
        Product::new("rust", "Rust").with_capacity(3, 4),
        Product::new("go", "Go").with_capacity(2, 5),
        Product::new("zig", "Zig").with_capacity(1, 1),
    ];
    for product in &products {
        service.put_product(product).await.unwrap();
    }

    let mut handles = Vec::new();
    for product in &products {
        for i in 0..20 {
            let service = service.clone();
            let product_id = product.id.clone();
            handles.push(tokio::spawn(async move {
                service.enroll(&product_id, &format!("user-{i:02}")).await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for product in &products {
        assert_consistent(&service, product, 20);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicates_admit_once() {
    let service = test_service();
    let product = Product::new("rust", "Rust").with_capacity(3, 4);
    service.put_product(&product).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.enroll("rust", "alice").await }));
    }

    let mut admitted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(EnrollError::DuplicateEnrollment { .. }) => duplicates += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!((admitted, duplicates), (1, 7));
    assert_consistent(&service, &product, 1);
}
