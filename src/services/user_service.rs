use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, TransactionTrait,
};

use crate::{
    dto::users::UpdateProfileRequest,
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    services::auth_service::{hash_password, required, unique_violation},
    state::AppState,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let found = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Profile", User::from(found), None))
}

pub async fn get_public_profile(state: &AppState, username: &str) -> AppResult<ApiResponse<User>> {
    let found = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Profile", User::from(found), None))
}

/// Changing the username invalidates tokens issued for the old one.
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let username = payload.username.map(|v| required("username", v)).transpose()?;
    let email = payload.email.map(|v| required("email", v)).transpose()?;

    let mut clash = Condition::any();
    if let Some(username) = username.as_deref() {
        clash = clash.add(UserCol::Username.eq(username));
    }
    if let Some(email) = email.as_deref() {
        clash = clash.add(UserCol::Email.eq(email));
    }
    if username.is_some() || email.is_some() {
        let taken = Users::find()
            .filter(clash)
            .filter(UserCol::Id.ne(existing.id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "User with this username or email already exists".into(),
            ));
        }
    }

    let mut active: UserActive = existing.clone().into();
    if let Some(username) = username {
        active.username = Set(username);
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        if password.is_empty() {
            return Err(AppError::BadRequest("password is required".into()));
        }
        active.password_hash = Set(hash_password(&password)?);
    }

    let updated = if active.is_changed() {
        active.update(&state.orm).await.map_err(unique_violation)?
    } else {
        existing
    };
    Ok(ApiResponse::success(
        "Profile updated",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

/// Removes the account and its cart. Orders and listed products stay behind
/// as historical records.
pub async fn delete_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;
    let result = Users::delete_by_id(user.user_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    txn.commit().await?;
    tracing::info!(user_id = user.user_id, "user deleted");

    Ok(ApiResponse::ack("Profile deleted"))
}
