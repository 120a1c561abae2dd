use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header},
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::{
    entity::users::{Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    state::AppState,
    token::TokenService,
};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl From<UserModel> for AuthUser {
    fn from(user: UserModel) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
        }
    }
}

/// Ownership rule shared by products and orders.
pub fn ensure_owner(user: &AuthUser, owner_id: i32) -> Result<(), AppError> {
    if user.user_id != owner_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Map an `Authorization` header to the stored user it names.
///
/// A missing or malformed header, a token that fails verification and a
/// username with no matching row all resolve to `Ok(None)`; callers treat
/// every one of them as "unauthenticated". Only storage failures are errors.
/// Nothing is cached: each call verifies the token and queries again.
pub async fn resolve_identity<C>(
    db: &C,
    tokens: &TokenService,
    authorization: Option<&HeaderValue>,
) -> AppResult<Option<UserModel>>
where
    C: ConnectionTrait,
{
    let Some(token) = authorization.and_then(bearer_token) else {
        return Ok(None);
    };

    let username = match tokens.verify(token) {
        Ok(username) => username,
        Err(err) => {
            tracing::debug!(error = %err, "bearer token rejected");
            return Ok(None);
        }
    };

    let user = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(db)
        .await?;
    Ok(user)
}

fn bearer_token(value: &HeaderValue) -> Option<&str> {
    let token = value.to_str().ok()?.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_identity(
            &state.orm,
            &state.tokens,
            parts.headers.get(header::AUTHORIZATION),
        )
        .await?;

        user.map(AuthUser::from).ok_or(AppError::Unauthorized)
    }
}
