use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderRequest},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::product_service::find_product,
    state::AppState,
};

pub const INITIAL_STATUS: &str = "created";

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt).order_by_asc(OrderCol::Id),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt).order_by_desc(OrderCol::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Places an order for one unit of each listed product.
///
/// Prices are read and the order plus its items are written inside a single
/// transaction: an unknown product or any failed insert leaves no order
/// behind. Each item keeps the unit price read here, so later catalog price
/// changes never alter the order. Stock is not reserved or decremented.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.product_ids.is_empty() {
        return Err(AppError::BadRequest("product_ids must not be empty".into()));
    }

    let txn = state.orm.begin().await?;

    let mut products = Vec::with_capacity(payload.product_ids.len());
    for product_id in &payload.product_ids {
        products.push(find_product(&txn, *product_id).await?);
    }

    let total_amount = products
        .iter()
        .try_fold(0_i64, |acc, p| acc.checked_add(p.price))
        .ok_or_else(|| AppError::BadRequest("order total overflows".into()))?;

    let now = Utc::now();
    let order = OrderActive {
        id: NotSet,
        user_id: Set(user.user_id),
        total_amount: Set(total_amount),
        status: Set(INITIAL_STATUS.into()),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(products.len());
    for product in &products {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(1),
            price: Set(product.price),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        order_items.push(OrderItem::from(item));
    }

    txn.commit().await?;
    tracing::info!(
        order_id = order.id,
        user_id = user.user_id,
        total_amount,
        items = order_items.len(),
        "order created"
    );

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: Order::from(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

/// Any authenticated caller may read any order by id; there is no ownership
/// filter here.
pub async fn get_order(state: &AppState, id: i32) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Only the status changes; total and items are fixed at creation.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let status = payload.status.trim();
    if status.is_empty() {
        return Err(AppError::BadRequest("status is required".into()));
    }

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(user, order.user_id)?;

    let mut active: OrderActive = order.into();
    active.status = Set(status.to_string());
    let order = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

/// Deletes the order together with its items.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(user, order.user_id)?;

    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(order.id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(order_id = id, user_id = user.user_id, "order deleted");

    Ok(ApiResponse::ack("Order deleted"))
}
