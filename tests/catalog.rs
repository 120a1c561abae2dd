mod common;

use axum_shop_api::{
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::AppError,
    models::Product,
    routes::params::{OrderListQuery, Pagination, ProductQuery, ProductSortBy, SortOrder},
    services::{cart_service, order_service, product_service},
    state::AppState,
};

async fn names(state: &AppState, query: ProductQuery) -> anyhow::Result<Vec<String>> {
    let listed = product_service::list_products(state, query).await?;
    let items: Vec<Product> = listed.data.expect("product list").items;
    Ok(items.into_iter().map(|p| p.name).collect())
}

#[tokio::test]
async fn list_sorts_and_filters() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, _) = common::register(&state, "alice").await?;
    let (bob, _) = common::register(&state, "bob").await?;
    common::create_product(&state, &alice, "Ferris Mug", 1200).await?;
    common::create_product(&state, &alice, "Axum Hoodie", 5500).await?;
    common::create_product(&state, &bob, "Rust Sticker", 500).await?;

    let by_price = names(
        &state,
        ProductQuery {
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(by_price, ["Rust Sticker", "Ferris Mug", "Axum Hoodie"]);

    let by_name_desc = names(
        &state,
        ProductQuery {
            sort_by: Some(ProductSortBy::Name),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(by_name_desc, ["Rust Sticker", "Ferris Mug", "Axum Hoodie"]);

    let ranged = names(
        &state,
        ProductQuery {
            min_price: Some(1000),
            max_price: Some(6000),
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(ranged, ["Ferris Mug", "Axum Hoodie"]);

    let owned_by_bob = names(
        &state,
        ProductQuery {
            owner_id: Some(bob.user_id),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(owned_by_bob, ["Rust Sticker"]);

    // Case-insensitive, matched against name or description.
    let searched = names(
        &state,
        ProductQuery {
            q: Some("HOODIE".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(searched, ["Axum Hoodie"]);
    Ok(())
}

#[tokio::test]
async fn in_stock_filter_uses_stock_quantity() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, _) = common::register(&state, "alice").await?;
    common::create_product(&state, &alice, "Stocked", 100).await?;
    product_service::create_product(
        &state,
        &alice,
        CreateProductRequest {
            name: "Sold Out".into(),
            description: String::new(),
            price: 100,
            stock_quantity: 0,
        },
    )
    .await?;

    let in_stock = names(
        &state,
        ProductQuery {
            in_stock: Some(true),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(in_stock, ["Stocked"]);

    let sold_out = names(
        &state,
        ProductQuery {
            in_stock: Some(false),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(sold_out, ["Sold Out"]);
    Ok(())
}

#[tokio::test]
async fn pagination_reports_meta() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, _) = common::register(&state, "alice").await?;
    for i in 0..5 {
        common::create_product(&state, &alice, &format!("Item {i}"), 100 + i).await?;
    }

    let page = product_service::list_products(
        &state,
        ProductQuery {
            page: Some(2),
            per_page: Some(2),
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await?;
    let meta = page.meta.clone().expect("meta");
    assert_eq!(meta.page, Some(2));
    assert_eq!(meta.per_page, Some(2));
    assert_eq!(meta.total, Some(5));

    let prices: Vec<i64> = page
        .data
        .expect("product list")
        .items
        .iter()
        .map(|p| p.price)
        .collect();
    assert_eq!(prices, [102, 103]);

    let capped = product_service::list_products(
        &state,
        ProductQuery {
            per_page: Some(10_000),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(capped.meta.and_then(|m| m.per_page), Some(100));
    Ok(())
}

#[tokio::test]
async fn product_changes_are_owner_only() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, _) = common::register(&state, "alice").await?;
    let (bob, _) = common::register(&state, "bob").await?;
    let mug = common::create_product(&state, &alice, "Mug", 1200).await?;

    let err = product_service::update_product(
        &state,
        &bob,
        mug.id,
        UpdateProductRequest {
            price: Some(1),
            ..Default::default()
        },
    )
    .await
    .expect_err("bob does not own the mug");
    assert!(matches!(err, AppError::Forbidden));

    let err = product_service::delete_product(&state, &bob, mug.id)
        .await
        .expect_err("bob does not own the mug");
    assert!(matches!(err, AppError::Forbidden));

    let err = product_service::update_product(
        &state,
        &alice,
        mug.id + 50,
        UpdateProductRequest::default(),
    )
    .await
    .expect_err("missing product");
    assert!(matches!(err, AppError::NotFound));

    let err = product_service::update_product(
        &state,
        &alice,
        mug.id,
        UpdateProductRequest {
            price: Some(-1),
            ..Default::default()
        },
    )
    .await
    .expect_err("negative price");
    assert!(matches!(err, AppError::BadRequest(_)));

    let updated = product_service::update_product(
        &state,
        &alice,
        mug.id,
        UpdateProductRequest {
            name: Some("Big Mug".into()),
            ..Default::default()
        },
    )
    .await?;
    let updated = updated.data.expect("product");
    assert_eq!(updated.name, "Big Mug");
    assert_eq!(updated.price, 1200);

    let mine = product_service::list_my_products(&state, &alice).await?;
    assert_eq!(mine.data.expect("product list").items, vec![updated]);
    let theirs = product_service::list_my_products(&state, &bob).await?;
    assert!(theirs.data.expect("product list").items.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_validates_input() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, _) = common::register(&state, "alice").await?;

    for (name, price, stock) in [("  ", 100, 1), ("Mug", -5, 1), ("Mug", 100, -1)] {
        let err = product_service::create_product(
            &state,
            &alice,
            CreateProductRequest {
                name: name.into(),
                description: String::new(),
                price,
                stock_quantity: stock,
            },
        )
        .await
        .expect_err("invalid product");
        assert!(matches!(err, AppError::BadRequest(_)));
    }
    Ok(())
}

#[tokio::test]
async fn deleting_product_removes_it_from_carts() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, _) = common::register(&state, "alice").await?;
    let (bob, _) = common::register(&state, "bob").await?;
    let mug = common::create_product(&state, &alice, "Mug", 1200).await?;
    let hoodie = common::create_product(&state, &alice, "Hoodie", 5500).await?;

    cart_service::add_item(&state, &bob, mug.id, Some(2)).await?;
    cart_service::add_item(&state, &bob, hoodie.id, None).await?;

    product_service::delete_product(&state, &alice, mug.id).await?;

    let err = product_service::get_product(&state, mug.id)
        .await
        .expect_err("deleted");
    assert!(matches!(err, AppError::NotFound));

    let cart = cart_service::get_cart(&state, &bob).await?;
    let product_ids: Vec<i32> = cart
        .data
        .expect("cart data")
        .items
        .iter()
        .map(|item| item.product_id)
        .collect();
    assert_eq!(product_ids, vec![hoodie.id]);
    Ok(())
}

#[tokio::test]
async fn huge_page_number_yields_empty_page() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, _) = common::register(&state, "alice").await?;
    common::create_product(&state, &alice, "Mug", 1200).await?;

    let (page, per_page, offset) = Pagination {
        page: Some(i64::MAX),
        per_page: Some(20),
    }
    .normalize();
    assert_eq!((page, per_page, offset), (i64::MAX, 20, i64::MAX));

    let listed = product_service::list_products(
        &state,
        ProductQuery {
            page: Some(i64::MAX),
            ..Default::default()
        },
    )
    .await?;
    let meta = listed.meta.clone().expect("meta");
    assert_eq!(meta.page, Some(i64::MAX));
    assert_eq!(meta.total, Some(1));
    assert!(listed.data.expect("product list").items.is_empty());

    let orders = order_service::list_orders(
        &state,
        &alice,
        OrderListQuery {
            page: Some(i64::MAX / 2),
            per_page: Some(100),
            ..Default::default()
        },
    )
    .await?;
    assert!(orders.data.expect("order list").items.is_empty());
    Ok(())
}
