//! Per-user cart.
//!
//! A cart is simply the set of `cart_items` rows carrying the user's id.
//! Lookups by product scan that set linearly, which is O(items) and fine for
//! cart-sized collections. Concurrent writers to the same cart are not
//! serialized against each other: the last write wins.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    dto::cart::{CartLine, CartList},
    entity::cart_items::{
        ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    response::{ApiResponse, Meta},
    services::product_service::find_product,
    state::AppState,
};

pub const DEFAULT_QUANTITY: i32 = 1;

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let items: Vec<CartItem> = load_cart(&state.orm, user.user_id)
        .await?
        .into_iter()
        .map(CartItem::from)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Inserts a new row for the product. Repeated adds produce separate rows
/// unless the state enables merge-on-add, in which case the quantity is added
/// to the first existing row for that product.
pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    quantity: Option<i32>,
) -> AppResult<ApiResponse<CartItem>> {
    let quantity = quantity.unwrap_or(DEFAULT_QUANTITY);
    validate_quantity(quantity)?;
    find_product(&state.orm, product_id).await?;

    if state.cart_merge_on_add {
        let existing = load_cart(&state.orm, user.user_id)
            .await?
            .into_iter()
            .find(|item| item.product_id == product_id);
        if let Some(item) = existing {
            let merged = item.quantity.saturating_add(quantity);
            let mut active: CartActive = item.into();
            active.quantity = Set(merged);
            let item = active.update(&state.orm).await?;
            tracing::debug!(user_id = user.user_id, product_id, merged, "cart add merged");
            return Ok(ApiResponse::success("OK", CartItem::from(item), None));
        }
    }

    let item = CartActive {
        id: NotSet,
        user_id: Set(user.user_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::debug!(user_id = user.user_id, product_id, quantity, "cart item added");
    Ok(ApiResponse::success("Added to cart", CartItem::from(item), None))
}

/// Overwrites the quantity of the cart entry for `product_id`; values below 1
/// are raised to 1.
pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    quantity: i32,
) -> AppResult<ApiResponse<CartItem>> {
    let quantity = quantity.max(DEFAULT_QUANTITY);

    let item = load_cart(&state.orm, user.user_id)
        .await?
        .into_iter()
        .find(|item| item.product_id == product_id)
        .ok_or(AppError::NotFound)?;

    let mut active: CartActive = item.into();
    active.quantity = Set(quantity);
    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Updated", CartItem::from(item), None))
}

/// Drops the first entry for `product_id` and writes the rest back as the
/// user's complete cart, all inside one transaction.
pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
) -> AppResult<ApiResponse<CartList>> {
    let txn = state.orm.begin().await?;

    let mut cart = load_cart(&txn, user.user_id).await?;
    let Some(target) = cart.iter().position(|item| item.product_id == product_id) else {
        return Err(AppError::NotFound);
    };
    cart.remove(target);

    let lines: Vec<CartLine> = cart
        .iter()
        .map(|item| CartLine {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    clear_cart(&txn, user.user_id).await?;
    let items = insert_lines(&txn, user.user_id, &lines).await?;
    txn.commit().await?;

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Removed from cart",
        CartList { items },
        Some(meta),
    ))
}

/// Replaces the whole cart. Either every line is written or the previous
/// cart is left untouched.
pub async fn replace_cart(
    state: &AppState,
    user: &AuthUser,
    lines: Vec<CartLine>,
) -> AppResult<ApiResponse<CartList>> {
    for line in &lines {
        validate_quantity(line.quantity)?;
    }

    let txn = state.orm.begin().await?;

    clear_cart(&txn, user.user_id).await?;
    for line in &lines {
        find_product(&txn, line.product_id).await?;
    }
    let items = insert_lines(&txn, user.user_id, &lines).await?;

    txn.commit().await?;
    tracing::info!(user_id = user.user_id, lines = items.len(), "cart replaced");

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Cart replaced", CartList { items }, Some(meta)))
}

async fn load_cart<C>(db: &C, user_id: i32) -> AppResult<Vec<CartModel>>
where
    C: ConnectionTrait,
{
    let items = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::Id)
        .all(db)
        .await?;
    Ok(items)
}

async fn clear_cart<C>(db: &C, user_id: i32) -> AppResult<()>
where
    C: ConnectionTrait,
{
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn insert_lines<C>(db: &C, user_id: i32, lines: &[CartLine]) -> AppResult<Vec<CartItem>>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = CartActive {
            id: NotSet,
            user_id: Set(user_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            created_at: Set(now.into()),
        }
        .insert(db)
        .await?;
        items.push(CartItem::from(item));
    }
    Ok(items)
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
