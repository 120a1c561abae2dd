mod common;

use axum::http::HeaderValue;
use axum_shop_api::{
    dto::{
        auth::{LoginRequest, RegisterRequest},
        users::UpdateProfileRequest,
    },
    error::AppError,
    middleware::auth::resolve_identity,
    services::{auth_service, cart_service, user_service},
    state::AppState,
};

fn login(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.into(),
        password: password.into(),
    }
}

async fn resolves(state: &AppState, token: &str) -> anyhow::Result<bool> {
    let header = HeaderValue::from_str(&format!("Bearer {token}"))?;
    Ok(resolve_identity(&state.orm, &state.tokens, Some(&header))
        .await?
        .is_some())
}

#[tokio::test]
async fn register_returns_session_without_credential() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let resp = auth_service::register_user(
        &state,
        RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: common::TEST_PASSWORD.into(),
        },
    )
    .await?;
    let data = resp.data.expect("register data");
    assert_eq!(data.user.username, "alice");
    assert_eq!(data.session.token_type, "Bearer");
    assert_eq!(data.session.expires_in, 24 * 3600);
    assert_eq!(state.tokens.verify(&data.session.token)?, "alice");

    let body = serde_json::to_value(&data)?;
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].is_string());
    Ok(())
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    common::register(&state, "alice").await?;

    for (username, email) in [
        ("alice", "other@example.com"),
        ("other", "alice@example.com"),
    ] {
        let err = auth_service::register_user(
            &state,
            RegisterRequest {
                username: username.into(),
                email: email.into(),
                password: "pw".into(),
            },
        )
        .await
        .expect_err("duplicate account");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            username: "   ".into(),
            email: "blank@example.com".into(),
            password: "pw".into(),
        },
    )
    .await
    .expect_err("blank username");
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    common::register(&state, "alice").await?;

    let session = auth_service::login_user(&state, login("alice", common::TEST_PASSWORD)).await?;
    assert!(resolves(&state, &session.data.expect("session").token).await?);

    for request in [login("alice", "wrong"), login("nobody", common::TEST_PASSWORD)] {
        let err = auth_service::login_user(&state, request)
            .await
            .expect_err("bad credentials");
        assert!(matches!(err, AppError::Unauthorized));
    }
    Ok(())
}

#[tokio::test]
async fn profile_update_changes_identity() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, old_token) = common::register(&state, "alice").await?;
    common::register(&state, "bob").await?;

    let err = user_service::update_profile(
        &state,
        &alice,
        UpdateProfileRequest {
            username: Some("bob".into()),
            ..Default::default()
        },
    )
    .await
    .expect_err("username taken");
    assert!(matches!(err, AppError::Conflict(_)));

    let updated = user_service::update_profile(
        &state,
        &alice,
        UpdateProfileRequest {
            username: Some("alicia".into()),
            password: Some("new password".into()),
            ..Default::default()
        },
    )
    .await?;
    let updated = updated.data.expect("user");
    assert_eq!(updated.username, "alicia");
    assert_eq!(updated.email, "alice@example.com");

    // Tokens name the username, so the old one no longer resolves.
    assert!(!resolves(&state, &old_token).await?);

    let err = auth_service::login_user(&state, login("alicia", common::TEST_PASSWORD))
        .await
        .expect_err("old password");
    assert!(matches!(err, AppError::Unauthorized));
    let session = auth_service::login_user(&state, login("alicia", "new password")).await?;
    assert!(resolves(&state, &session.data.expect("session").token).await?);

    let unchanged =
        user_service::update_profile(&state, &alice, UpdateProfileRequest::default()).await?;
    assert_eq!(unchanged.data.expect("user"), updated);
    Ok(())
}

#[tokio::test]
async fn public_profile_lookup() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, _) = common::register(&state, "alice").await?;

    let own = user_service::get_profile(&state, &alice).await?;
    let public = user_service::get_public_profile(&state, "alice").await?;
    assert_eq!(own.data, public.data);

    let err = user_service::get_public_profile(&state, "ghost")
        .await
        .expect_err("unknown user");
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn deleting_profile_clears_cart() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (seller, _) = common::register(&state, "seller").await?;
    let (alice, token) = common::register(&state, "alice").await?;
    let mug = common::create_product(&state, &seller, "Mug", 1200).await?;
    cart_service::add_item(&state, &alice, mug.id, Some(2)).await?;

    user_service::delete_profile(&state, &alice).await?;
    assert!(!resolves(&state, &token).await?);

    // A stale identity sees an empty cart rather than orphaned rows.
    let cart = cart_service::get_cart(&state, &alice).await?;
    assert!(cart.data.expect("cart data").items.is_empty());

    let err = user_service::delete_profile(&state, &alice)
        .await
        .expect_err("already deleted");
    assert!(matches!(err, AppError::NotFound));

    // The username is free again.
    common::register(&state, "alice").await?;
    Ok(())
}
