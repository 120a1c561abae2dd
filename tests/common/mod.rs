#![allow(dead_code)]

use axum_shop_api::{
    db::{create_orm_conn, run_migrations},
    dto::{auth::RegisterRequest, products::CreateProductRequest},
    middleware::auth::AuthUser,
    models::Product,
    services::{auth_service, product_service},
    state::AppState,
    token::TokenService,
};
use sea_orm::ConnectOptions;
use secrecy::SecretString;

pub const TEST_SECRET: &str = "integration-test-signing-secret-0123456789";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

pub fn test_secret() -> SecretString {
    SecretString::from(TEST_SECRET)
}

/// Fresh in-memory database with the production schema.
///
/// One pooled connection keeps every query on the same in-memory database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = create_orm_conn(options).await?;
    run_migrations(&orm).await?;

    Ok(AppState::new(orm, TokenService::new(&test_secret())))
}

/// Registers `username` and returns the authenticated identity plus its token.
pub async fn register(state: &AppState, username: &str) -> anyhow::Result<(AuthUser, String)> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        },
    )
    .await?;
    let data = resp.data.expect("register data");

    Ok((
        AuthUser {
            user_id: data.user.id,
            username: data.user.username,
        },
        data.session.token,
    ))
}

pub async fn create_product(
    state: &AppState,
    owner: &AuthUser,
    name: &str,
    price: i64,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        owner,
        CreateProductRequest {
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            stock_quantity: 10,
        },
    )
    .await?;
    Ok(resp.data.expect("product data"))
}
