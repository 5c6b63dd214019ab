//! Service-level integration tests for concurrent order placement.

use std::sync::Arc;

use catalog::{CatalogError, CatalogStore, InMemoryCatalogStore, NewProduct, seed_catalog};
use common::{Money, ProductId};
use orders::{InMemoryOrderRepository, LineRequest, OrderError, OrderService, PlaceOrder};

type Service = OrderService<InMemoryCatalogStore, InMemoryOrderRepository>;

async fn seeded_service() -> (Arc<Service>, Arc<InMemoryCatalogStore>) {
    let store = Arc::new(InMemoryCatalogStore::new());
    seed_catalog(store.as_ref()).await.unwrap();
    let service = Arc::new(OrderService::new(
        store.clone(),
        InMemoryOrderRepository::new(),
    ));
    (service, store)
}

fn request(lines: Vec<(&str, u32)>) -> PlaceOrder {
    PlaceOrder {
        buyer_name: "Grace Hopper".to_string(),
        contact_number: "555-0199".to_string(),
        delivery_address: "1 Compiler Court".to_string(),
        lines: lines
            .into_iter()
            .map(|(id, quantity)| LineRequest {
                product_id: ProductId::new(id),
                quantity,
            })
            .collect(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_buyers_one_unit_exactly_one_wins() {
    let store = Arc::new(InMemoryCatalogStore::new());
    store
        .create(NewProduct {
            id: Some(ProductId::new("last-crate")),
            name: "Last Crate of Strawberries".to_string(),
            description: String::new(),
            category: "Fruits".to_string(),
            unit: "kg".to_string(),
            price: Money::from_cents(599),
            stock: 1,
        })
        .await
        .unwrap();
    let service = Arc::new(OrderService::new(
        store.clone(),
        InMemoryOrderRepository::new(),
    ));

    let s1 = service.clone();
    let s2 = service.clone();
    let t1 = tokio::spawn(async move { s1.place_order(request(vec![("last-crate", 1)])).await });
    let t2 = tokio::spawn(async move { s2.place_order(request(vec![("last-crate", 1)])).await });

    let r1 = t1.await.unwrap();
    let r2 = t2.await.unwrap();

    assert!(r1.is_ok() != r2.is_ok(), "exactly one order must succeed");
    let loser = if r1.is_err() { r1 } else { r2 };
    assert!(matches!(
        loser,
        Err(OrderError::Catalog(CatalogError::InsufficientStock { .. }))
    ));

    let product = store.get(&ProductId::new("last-crate")).await.unwrap();
    assert_eq!(product.stock, 0);

    let orders = service.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_orders_never_oversell() {
    let (service, store) = seeded_service().await;

    // Product "9" has 200 in stock; 30 buyers asking for 10 each want
    // 300 total, so exactly 20 can win.
    let mut tasks = Vec::new();
    for _ in 0..30 {
        let s = service.clone();
        tasks.push(tokio::spawn(async move {
            s.place_order(request(vec![("9", 10)])).await
        }));
    }

    let mut won = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            won += 1;
        }
    }

    assert_eq!(won, 20);
    assert_eq!(store.get(&ProductId::new("9")).await.unwrap().stock, 0);
    assert_eq!(service.list_orders().await.unwrap().len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_multi_line_orders_do_not_deadlock() {
    let (service, store) = seeded_service().await;

    // Same two products requested in opposite line order; fixed global
    // acquisition order means both must complete.
    let s1 = service.clone();
    let s2 = service.clone();
    let t1 = tokio::spawn(async move {
        s1.place_order(request(vec![("1", 5), ("2", 5)])).await
    });
    let t2 = tokio::spawn(async move {
        s2.place_order(request(vec![("2", 5), ("1", 5)])).await
    });

    let r1 = tokio::time::timeout(std::time::Duration::from_secs(10), t1)
        .await
        .expect("first order deadlocked")
        .unwrap();
    let r2 = tokio::time::timeout(std::time::Duration::from_secs(10), t2)
        .await
        .expect("second order deadlocked")
        .unwrap();

    assert!(r1.is_ok() && r2.is_ok());
    assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 490);
    assert_eq!(store.get(&ProductId::new("2")).await.unwrap().stock, 990);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_placement_and_cancellation_balance_out() {
    let (service, store) = seeded_service().await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let s = service.clone();
        tasks.push(tokio::spawn(async move {
            let order = s.place_order(request(vec![("4", 3)])).await.unwrap();
            s.cancel_order(order.id).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // Every debit was matched by a cancellation credit.
    assert_eq!(store.get(&ProductId::new("4")).await.unwrap().stock, 800);
}

#[tokio::test]
async fn placement_example_from_the_order_form() {
    let (service, store) = seeded_service().await;

    let order = service
        .place_order(request(vec![("1", 10)]))
        .await
        .unwrap();

    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 10);
    assert_eq!(order.items[0].unit_price.cents(), 299);
    assert_eq!(order.items[0].line_total(), Money::from_cents(2990));
    assert_eq!(order.items[0].line_total().to_string(), "$29.90");
    assert_eq!(store.get(&ProductId::new("1")).await.unwrap().stock, 490);
}
