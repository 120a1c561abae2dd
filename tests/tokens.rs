mod common;

use axum_shop_api::token::{Claims, TokenError, TokenService};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::SecretString;

use common::{TEST_SECRET, test_secret};

// base64url of {"alg":"none","typ":"JWT"}
const NONE_HEADER: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";

#[test]
fn issued_token_verifies_to_username() {
    let tokens = TokenService::new(&test_secret());
    let token = tokens.issue("alice").expect("issue");

    assert_eq!(tokens.verify(&token).expect("verify"), "alice");
    assert_eq!(tokens.ttl(), Duration::hours(24));
}

#[test]
fn expired_token_is_rejected() {
    let expired = TokenService::with_ttl(&test_secret(), Duration::hours(-1));
    let token = expired.issue("alice").expect("issue");

    let err = TokenService::new(&test_secret())
        .verify(&token)
        .expect_err("expired token must fail");
    assert!(matches!(err, TokenError::InvalidToken(_)));
}

#[test]
fn token_signed_with_other_secret_is_rejected() {
    let other = TokenService::new(&SecretString::from("another-secret-that-is-long-enough-123"));
    let token = other.issue("alice").expect("issue");

    assert!(TokenService::new(&test_secret()).verify(&token).is_err());
}

#[test]
fn token_signed_with_other_algorithm_is_rejected() {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "alice".into(),
        iat: now,
        exp: now + 3600,
    };
    // Same secret, different HMAC algorithm.
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode");

    assert!(TokenService::new(&test_secret()).verify(&token).is_err());
}

#[test]
fn unsigned_token_is_rejected() {
    let tokens = TokenService::new(&test_secret());
    let valid = tokens.issue("alice").expect("issue");
    let payload = valid.split('.').nth(1).expect("payload segment");
    let forged = format!("{NONE_HEADER}.{payload}.");

    assert!(tokens.verify(&forged).is_err());
}

#[test]
fn garbage_is_rejected() {
    let tokens = TokenService::new(&test_secret());
    assert!(tokens.verify("").is_err());
    assert!(tokens.verify("not.a.token").is_err());
}
