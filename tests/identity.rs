mod common;

use axum::http::HeaderValue;
use axum_shop_api::{
    middleware::auth::resolve_identity, services::user_service, token::TokenService,
};
use chrono::Duration;
use secrecy::SecretString;

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).expect("header value")
}

#[tokio::test]
async fn valid_token_resolves_to_stored_user() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, token) = common::register(&state, "alice").await?;

    let header = bearer(&token);
    let user = resolve_identity(&state.orm, &state.tokens, Some(&header))
        .await?
        .expect("identity");
    assert_eq!(user.id, alice.user_id);
    assert_eq!(user.username, "alice");
    Ok(())
}

#[tokio::test]
async fn unusable_credentials_resolve_to_none() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (_, token) = common::register(&state, "alice").await?;

    let expired = TokenService::with_ttl(&common::test_secret(), Duration::hours(-1))
        .issue("alice")?;
    let foreign = TokenService::new(&SecretString::from("a-completely-different-signing-secret"))
        .issue("alice")?;
    let unknown_user = state.tokens.issue("nobody")?;

    let headers = [
        HeaderValue::from_static(""),
        HeaderValue::from_str(&token)?,
        HeaderValue::from_str(&format!("Basic {token}"))?,
        HeaderValue::from_static("Bearer "),
        bearer("garbage"),
        bearer(&expired),
        bearer(&foreign),
        bearer(&unknown_user),
    ];

    assert!(
        resolve_identity(&state.orm, &state.tokens, None)
            .await?
            .is_none()
    );
    for header in &headers {
        let resolved = resolve_identity(&state.orm, &state.tokens, Some(header)).await?;
        assert!(resolved.is_none(), "header {header:?} should not resolve");
    }
    Ok(())
}

#[tokio::test]
async fn deleted_user_no_longer_resolves() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (alice, token) = common::register(&state, "alice").await?;
    let header = bearer(&token);

    assert!(
        resolve_identity(&state.orm, &state.tokens, Some(&header))
            .await?
            .is_some()
    );

    user_service::delete_profile(&state, &alice).await?;

    assert!(
        resolve_identity(&state.orm, &state.tokens, Some(&header))
            .await?
            .is_none()
    );
    Ok(())
}
