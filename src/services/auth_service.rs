use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let username = required("username", payload.username)?;
    let email = required("email", payload.email)?;
    if payload.password.is_empty() {
        return Err(AppError::BadRequest("password is required".into()));
    }

    let exist = Users::find()
        .filter(
            Condition::any()
                .add(UserCol::Username.eq(username.as_str()))
                .add(UserCol::Email.eq(email.as_str())),
        )
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict(
            "User with this username or email already exists".into(),
        ));
    }

    let user = UserActive {
        id: NotSet,
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(unique_violation)?;

    let session = issue_session(state, &user.username)?;
    tracing::info!(user_id = user.id, "user registered");

    Ok(ApiResponse::success(
        "User created",
        RegisterResponse {
            user: User::from(user),
            session,
        },
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let user = Users::find()
        .filter(UserCol::Username.eq(username.trim()))
        .one(&state.orm)
        .await?;

    // Unknown user and wrong password are indistinguishable to the caller.
    let user = match user {
        Some(u) if verify_password(&password, &u.password_hash)? => u,
        _ => return Err(AppError::Unauthorized),
    };

    let session = issue_session(state, &user.username)?;
    Ok(ApiResponse::success("Logged in", session, Some(Meta::empty())))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Trimmed, non-empty value of a required text field.
pub(crate) fn required(field: &str, value: String) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// A concurrent registration can still lose the race at the unique index.
pub(crate) fn unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("User with this username or email already exists".into())
        }
        _ => AppError::OrmError(err),
    }
}

fn issue_session(state: &AppState, username: &str) -> AppResult<LoginResponse> {
    let token = state.tokens.issue(username)?;
    Ok(LoginResponse {
        token,
        token_type: "Bearer".into(),
        expires_in: state.tokens.ttl().num_seconds(),
    })
}
