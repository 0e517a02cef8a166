//! Store order management

mod common;

use petstore_harness::prelude::*;
use std::collections::HashMap;

#[tokio::test]
async fn test_place_order() {
    let target = common::target().await;

    TestContext::run(&target.provider, |ctx| {
        Box::pin(async move {
            let new_order = factory::random_order();

            let response = ctx.store().place_order(&new_order).await.unwrap();
            assert_eq!(response.status_code(), 200);

            let placed: Order = response.json().unwrap();
            ctx.track_order(placed.id.unwrap());
            assert_eq!(placed.id, new_order.id);
            assert_eq!(placed.status, Some(OrderStatus::Placed));
        })
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_get_order_by_id() {
    let target = common::target().await;

    TestContext::run(&target.provider, |ctx| {
        Box::pin(async move {
            let order = factory::random_order();
            let order_id = order.id.unwrap();
            ctx.store().place_order(&order).await.unwrap().error_for_status().unwrap();
            ctx.track_order(order_id);

            let response = ctx.store().get_order(order_id).await.unwrap();
            assert_eq!(response.status_code(), 200);

            let retrieved: Order = response.json().unwrap();
            assert_eq!(retrieved.id, Some(order_id));
            assert!(retrieved.complete);
        })
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_delete_order() {
    let target = common::target().await;

    TestContext::run(&target.provider, |ctx| {
        Box::pin(async move {
            let order = factory::random_order();
            let order_id = order.id.unwrap();
            ctx.store().place_order(&order).await.unwrap().error_for_status().unwrap();
            ctx.track_order(order_id);

            let response = ctx.store().delete_order(order_id).await.unwrap();
            assert_eq!(response.status_code(), 200);

            let response = ctx.store().get_order(order_id).await.unwrap();
            assert_eq!(response.status_code(), 404);
        })
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_get_inventory() {
    let target = common::target().await;

    TestContext::run(&target.provider, |ctx| {
        Box::pin(async move {
            let response = ctx.store().inventory().await.unwrap();
            assert_eq!(response.status_code(), 200);

            let inventory: HashMap<String, i64> = response.json().unwrap();
            assert!(!inventory.is_empty());
        })
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_order_for_created_pet() {
    let target = common::target().await;

    let (pet_id, order_id) = TestContext::run(&target.provider, |ctx| {
        Box::pin(async move {
            let pet = factory::random_pet();
            let pet_id = pet.id.unwrap();
            ctx.pets().create(&pet).await.unwrap().error_for_status().unwrap();
            ctx.track_pet(pet_id);

            let order = factory::order_for_pet(pet_id);
            let order_id = order.id.unwrap();
            let response = ctx.store().place_order(&order).await.unwrap();
            assert_eq!(response.status_code(), 200);
            ctx.track_order(order_id);

            let placed: Order = response.json().unwrap();
            assert_eq!(placed.pet_id, Some(pet_id));
            assert_eq!(ctx.tracker().len(), 2);
            (pet_id, order_id)
        })
    })
    .await
    .unwrap();

    if let Some(fake) = &target.fake {
        assert!(!fake.has_pet(pet_id));
        assert!(!fake.has_order(order_id));
    }
}
