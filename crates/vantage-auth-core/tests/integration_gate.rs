//! End-to-end gate tests against a mock JWKS endpoint

mod common;

use chrono::Utc;
use common::jwks_mock::{JwksMockServer, TEST_KEY_ID, TestKeyPair, sign_hs256_with_public_key};
use serde_json::json;
use std::time::Duration;
use vantage_auth_core::{AuthConfig, AuthError, AuthGate, KeySetCache};

const ISSUER: &str = "https://vantage.outseta.com";
const SECRET: &str = "integration-test-session-secret-32b";

fn config(server: &JwksMockServer) -> AuthConfig {
    AuthConfig::new(server.jwks_url(), ISSUER).with_session_secret(SECRET)
}

fn valid_claims() -> serde_json::Value {
    let now = Utc::now().timestamp();
    json!({
        "sub": "sub_abc123",
        "email": "owner@acme.example",
        "iss": ISSUER,
        "iat": now,
        "exp": now + 3600,
    })
}

#[tokio::test]
async fn test_valid_token_yields_context() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let token = keypair.sign(&valid_claims());
    let context = gate
        .authenticate(Some(&format!("Bearer {token}")), None)
        .await
        .unwrap();

    assert_eq!(context.subject_id, "sub_abc123");
    assert_eq!(context.email.as_deref(), Some("owner@acme.example"));
}

#[tokio::test]
async fn test_cookie_fallback() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let token = keypair.sign(&valid_claims());
    let cookies = format!("theme=dark; outseta_access_token={token}");
    let context = gate.authenticate(None, Some(&cookies)).await.unwrap();

    assert_eq!(context.subject_id, "sub_abc123");
}

#[tokio::test]
async fn test_expired_token_rejected_despite_valid_signature() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let mut claims = valid_claims();
    claims["exp"] = json!(Utc::now().timestamp() - 3600);
    let token = keypair.sign(&claims);

    let result = gate.authenticate_token(&token).await;
    assert!(matches!(result, Err(AuthError::TokenExpired)));
}

#[tokio::test]
async fn test_token_inside_skew_window_accepted() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let mut claims = valid_claims();
    claims["exp"] = json!(Utc::now().timestamp() - 30);
    let token = keypair.sign(&claims);

    assert!(gate.authenticate_token(&token).await.is_ok());
}

#[tokio::test]
async fn test_unknown_kid_rejected() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let token = keypair.sign_with_kid(&valid_claims(), "rotated-away-kid");
    let result = gate.authenticate_token(&token).await;
    assert!(matches!(result, Err(AuthError::NoMatchingKey)));
}

#[tokio::test]
async fn test_tampered_payload_rejected() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let token = keypair.sign(&valid_claims());

    // Swap the payload for a different (validly encoded) one
    let parts: Vec<&str> = token.split('.').collect();
    let evil_payload = {
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        let mut claims = valid_claims();
        claims["sub"] = json!("sub_attacker");
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap())
    };
    let tampered = format!("{}.{}.{}", parts[0], evil_payload, parts[2]);

    let result = gate.authenticate_token(&tampered).await;
    assert!(matches!(result, Err(AuthError::InvalidSignature)));
}

#[tokio::test]
async fn test_declared_hs256_alg_not_honored() {
    let server = JwksMockServer::start().await;
    let gate = AuthGate::new(config(&server));

    // HMAC-signed over the published modulus, header claiming HS256 and
    // the real key ID; verification stays RS256 so this must fail
    let token = sign_hs256_with_public_key(&valid_claims());
    let result = gate.authenticate_token(&token).await;
    assert!(matches!(result, Err(AuthError::InvalidSignature)));
}

#[tokio::test]
async fn test_declared_none_alg_not_honored() {
    let server = JwksMockServer::start().await;
    let gate = AuthGate::new(config(&server));

    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    let header = json!({"alg": "none", "kid": TEST_KEY_ID});
    let token = format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap()),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&valid_claims()).unwrap()),
    );

    let result = gate.authenticate_token(&token).await;
    assert!(matches!(result, Err(AuthError::InvalidSignature)));
}

#[tokio::test]
async fn test_issuer_mismatch_rejected() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let mut claims = valid_claims();
    claims["iss"] = json!("https://someone-else.outseta.com");
    let token = keypair.sign(&claims);

    let result = gate.authenticate_token(&token).await;
    assert!(matches!(result, Err(AuthError::IssuerMismatch)));
}

#[tokio::test]
async fn test_missing_subject_rejected() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let mut claims = valid_claims();
    claims.as_object_mut().unwrap().remove("sub");
    let token = keypair.sign(&claims);

    let result = gate.authenticate_token(&token).await;
    assert!(matches!(result, Err(AuthError::MissingIdentifier)));
}

#[tokio::test]
async fn test_nameid_fallback_subject() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let mut claims = valid_claims();
    claims.as_object_mut().unwrap().remove("sub");
    claims["nameid"] = json!("person_99");
    let token = keypair.sign(&claims);

    let context = gate.authenticate_token(&token).await.unwrap();
    assert_eq!(context.subject_id, "person_99");
}

#[tokio::test]
async fn test_authenticate_and_mint_roundtrip() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let token = keypair.sign(&valid_claims());
    let (context, session) = gate
        .authenticate_and_mint(Some(&format!("Bearer {token}")), None)
        .await
        .unwrap();

    assert_eq!(context.subject_id, "sub_abc123");
    assert_eq!(session.expires_in, 4 * 3600);

    // The minted token verifies with the configured secret and carries
    // the external subject both as sub and as the custom claim
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["authenticated"]);
    let decoded = decode::<serde_json::Value>(
        &session.token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &validation,
    )
    .unwrap();
    assert_eq!(decoded.claims["sub"], "sub_abc123");
    assert_eq!(decoded.claims["outseta_sub"], "sub_abc123");
    assert_eq!(decoded.claims["role"], "authenticated");
}

#[tokio::test]
async fn test_mint_without_secret_is_500_class() {
    let server = JwksMockServer::start().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(AuthConfig::new(server.jwks_url(), ISSUER));

    let token = keypair.sign(&valid_claims());
    let result = gate
        .authenticate_and_mint(Some(&format!("Bearer {token}")), None)
        .await;

    match result {
        Err(e @ AuthError::MissingSigningSecret) => assert_eq!(e.status_code(), 500),
        other => panic!("expected MissingSigningSecret, got {other:?}"),
    }
}

#[tokio::test]
async fn test_key_set_fetched_once_within_ttl() {
    let server = JwksMockServer::start_bare().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let guard = server.expect_jwks_calls(1).await;

    let token = keypair.sign(&valid_claims());
    gate.authenticate_token(&token).await.unwrap();
    gate.authenticate_token(&token).await.unwrap();

    drop(guard);
}

#[tokio::test]
async fn test_stale_key_set_served_when_refresh_fails() {
    let server = JwksMockServer::start_bare().await;
    let keypair = TestKeyPair::load();

    // Zero TTL forces a refresh attempt on every request
    let config = config(&server).with_key_cache_ttl(Duration::from_secs(0));
    let cache = KeySetCache::new(&config);
    let gate = AuthGate::with_key_cache(config, cache);

    let token = keypair.sign(&valid_claims());

    {
        let _guard = server.expect_jwks_calls(1).await;
        gate.authenticate_token(&token).await.unwrap();
    }

    // Endpoint now errors; the stale set must still verify the token
    let _error_guard = server.error_response_scoped(500).await;
    gate.authenticate_token(&token).await.unwrap();
}

#[tokio::test]
async fn test_fetch_failure_with_empty_cache_is_no_matching_key() {
    let server = JwksMockServer::start_bare().await;
    let keypair = TestKeyPair::load();
    let gate = AuthGate::new(config(&server));

    let _error_guard = server.error_response_scoped(500).await;

    let token = keypair.sign(&valid_claims());
    let result = gate.authenticate_token(&token).await;
    assert!(matches!(result, Err(AuthError::NoMatchingKey)));
}
