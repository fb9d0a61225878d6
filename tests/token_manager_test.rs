// ABOUTME: Integration tests for the CRM token lifecycle manager
// ABOUTME: Valid-token fast path, refresh, serialized concurrent refresh, and failure handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::{
    create_test_database, create_token_manager, seed_credential, seed_valid_credential,
    stored_credential, token_response, TEST_LOCATION, TEST_NAMESPACE, TOKEN_PATH,
};
use outreach_core::errors::OutreachError;
use outreach_intel::database::{Database, RefreshedCredential};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_valid_token_makes_no_network_call() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("x", "y")))
        .expect(0)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_valid_credential(&database, user_id).await?;
    let before = stored_credential(&database, user_id).await?;

    let manager = create_token_manager(&database, &server.uri());
    let token = manager.get_valid_token(user_id, TEST_NAMESPACE).await?;

    assert_eq!(token.access_token, "valid-access");
    assert_eq!(token.location_id.as_deref(), Some(TEST_LOCATION));
    assert_eq!(token.expires_at, before.expires_at);
    assert_eq!(stored_credential(&database, user_id).await?.generation, before.generation);
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_persisted() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .and(body_string_contains("client_id=test-client"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response("new-access", "refresh-2")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    let old_expiry = Utc::now() - Duration::minutes(5);
    seed_credential(&database, user_id, "old-access", Some("refresh-1"), old_expiry).await?;
    let before = stored_credential(&database, user_id).await?;

    let manager = create_token_manager(&database, &server.uri());
    let token = manager.get_valid_token(user_id, TEST_NAMESPACE).await?;

    assert_eq!(token.access_token, "new-access");
    assert!(token.expires_at > old_expiry);

    let after = stored_credential(&database, user_id).await?;
    assert_eq!(after.access_token, "new-access");
    assert_eq!(after.refresh_token.as_deref(), Some("refresh-2"));
    assert_eq!(after.generation, before.generation + 1);
    Ok(())
}

#[tokio::test]
async fn test_token_expiring_now_is_refreshed() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response("fresh", "refresh-2")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_credential(&database, user_id, "stale", Some("refresh-1"), Utc::now()).await?;

    let manager = create_token_manager(&database, &server.uri());
    let token = manager.get_valid_token(user_id, TEST_NAMESPACE).await?;
    assert_eq!(token.access_token, "fresh");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_response("shared-access", "refresh-2"))
                .set_delay(StdDuration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_credential(
        &database,
        user_id,
        "old",
        Some("refresh-1"),
        Utc::now() - Duration::hours(1),
    )
    .await?;

    let manager = create_token_manager(&database, &server.uri());
    let (first, second) = tokio::join!(
        manager.get_valid_token(user_id, TEST_NAMESPACE),
        manager.get_valid_token(user_id, TEST_NAMESPACE),
    );

    assert_eq!(first?.access_token, "shared-access");
    assert_eq!(second?.access_token, "shared-access");
    Ok(())
}

#[tokio::test]
async fn test_missing_refresh_token_fails_without_network() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_credential(&database, user_id, "old", None, Utc::now() - Duration::hours(1)).await?;

    let manager = create_token_manager(&database, &server.uri());
    let error = manager
        .get_valid_token(user_id, TEST_NAMESPACE)
        .await
        .unwrap_err();
    assert!(matches!(error, OutreachError::RefreshTokenMissing { .. }));
    Ok(())
}

#[tokio::test]
async fn test_unknown_credential_is_not_connected() -> Result<()> {
    let server = MockServer::start().await;
    let database = create_test_database().await?;
    let manager = create_token_manager(&database, &server.uri());

    let error = manager
        .get_valid_token(Uuid::new_v4(), TEST_NAMESPACE)
        .await
        .unwrap_err();
    assert!(matches!(error, OutreachError::IntegrationNotConnected { .. }));
    Ok(())
}

#[tokio::test]
async fn test_rejected_refresh_leaves_credential_unchanged() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid refresh token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_credential(
        &database,
        user_id,
        "old",
        Some("refresh-1"),
        Utc::now() - Duration::hours(1),
    )
    .await?;
    let before = stored_credential(&database, user_id).await?;

    let manager = create_token_manager(&database, &server.uri());
    let error = manager
        .get_valid_token(user_id, TEST_NAMESPACE)
        .await
        .unwrap_err();

    match error {
        OutreachError::RefreshFailed { status, reason, .. } => {
            assert_eq!(status, Some(400));
            assert!(reason.contains("Invalid refresh token"));
        }
        other => panic!("expected RefreshFailed, got {other:?}"),
    }

    let after = stored_credential(&database, user_id).await?;
    assert_eq!(after.access_token, before.access_token);
    assert_eq!(after.refresh_token, before.refresh_token);
    assert_eq!(after.expires_at, before.expires_at);
    assert_eq!(after.generation, before.generation);
    assert_eq!(after.updated_at, before.updated_at);
    Ok(())
}

/// Write a refreshed token the way another process would, bumping the generation
async fn store_competing_refresh(
    database: &Database,
    user_id: Uuid,
    expected_generation: i64,
) -> Result<()> {
    let stored = database
        .update_refreshed_credential(
            user_id,
            TEST_NAMESPACE,
            expected_generation,
            &RefreshedCredential {
                access_token: "winner-access",
                refresh_token: Some("winner-refresh"),
                expires_at: Utc::now() + Duration::hours(1),
                location_id: Some(TEST_LOCATION),
            },
        )
        .await?;
    assert!(stored, "competing write should win");
    Ok(())
}

#[tokio::test]
async fn test_lost_write_race_returns_stored_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_response("late-access", "late-refresh"))
                .set_delay(StdDuration::from_millis(400)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_credential(
        &database,
        user_id,
        "old",
        Some("refresh-1"),
        Utc::now() - Duration::hours(1),
    )
    .await?;
    let before = stored_credential(&database, user_id).await?;

    let manager = create_token_manager(&database, &server.uri());
    let (token, competing) = tokio::join!(
        manager.get_valid_token(user_id, TEST_NAMESPACE),
        async {
            tokio::time::sleep(StdDuration::from_millis(100)).await;
            store_competing_refresh(&database, user_id, before.generation).await
        },
    );
    competing?;

    assert_eq!(token?.access_token, "winner-access");
    let after = stored_credential(&database, user_id).await?;
    assert_eq!(after.access_token, "winner-access");
    assert_eq!(after.refresh_token.as_deref(), Some("winner-refresh"));
    assert_eq!(after.generation, before.generation + 1);
    Ok(())
}

#[tokio::test]
async fn test_rejected_refresh_uses_token_rotated_elsewhere() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "invalid_grant" }))
                .set_delay(StdDuration::from_millis(400)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_credential(
        &database,
        user_id,
        "old",
        Some("refresh-1"),
        Utc::now() - Duration::hours(1),
    )
    .await?;
    let before = stored_credential(&database, user_id).await?;

    let manager = create_token_manager(&database, &server.uri());
    let (token, competing) = tokio::join!(
        manager.get_valid_token(user_id, TEST_NAMESPACE),
        async {
            tokio::time::sleep(StdDuration::from_millis(100)).await;
            store_competing_refresh(&database, user_id, before.generation).await
        },
    );
    competing?;

    assert_eq!(token?.access_token, "winner-access");
    let after = stored_credential(&database, user_id).await?;
    assert_eq!(after.access_token, "winner-access");
    assert_eq!(after.generation, before.generation + 1);
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_expiry_fails_refresh() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "refresh-2",
            "expires_in": 9_000_000_000_000_000_u64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_credential(
        &database,
        user_id,
        "old",
        Some("refresh-1"),
        Utc::now() - Duration::hours(1),
    )
    .await?;
    let before = stored_credential(&database, user_id).await?;

    let manager = create_token_manager(&database, &server.uri());
    let error = manager
        .get_valid_token(user_id, TEST_NAMESPACE)
        .await
        .unwrap_err();

    match error {
        OutreachError::RefreshFailed { status, reason, .. } => {
            assert_eq!(status, None);
            assert!(reason.contains("out of range"));
        }
        other => panic!("expected RefreshFailed, got {other:?}"),
    }
    let after = stored_credential(&database, user_id).await?;
    assert_eq!(after.access_token, before.access_token);
    assert_eq!(after.generation, before.generation);
    Ok(())
}

#[tokio::test]
async fn test_refresh_without_rotation_keeps_refresh_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_credential(
        &database,
        user_id,
        "old",
        Some("refresh-1"),
        Utc::now() - Duration::hours(1),
    )
    .await?;

    let manager = create_token_manager(&database, &server.uri());
    let token = manager.get_valid_token(user_id, TEST_NAMESPACE).await?;

    assert_eq!(token.location_id.as_deref(), Some(TEST_LOCATION));
    let after = stored_credential(&database, user_id).await?;
    assert_eq!(after.refresh_token.as_deref(), Some("refresh-1"));
    Ok(())
}

#[tokio::test]
async fn test_connect_status_and_disconnect() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response("first", "refresh-1")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    let manager = create_token_manager(&database, &server.uri());

    let status = manager.connection_status(user_id, TEST_NAMESPACE).await?;
    assert!(!status.connected);

    let status = manager.connect(user_id, TEST_NAMESPACE, "auth-code").await?;
    assert!(status.connected);
    assert!(status.token_valid);
    assert!(status.can_refresh);
    assert_eq!(status.location_id.as_deref(), Some(TEST_LOCATION));
    let first_generation = stored_credential(&database, user_id).await?.generation;

    manager.connect(user_id, TEST_NAMESPACE, "auth-code").await?;
    assert!(stored_credential(&database, user_id).await?.generation > first_generation);

    assert!(manager.disconnect(user_id, TEST_NAMESPACE).await?);
    assert!(!manager.disconnect(user_id, TEST_NAMESPACE).await?);
    assert!(!manager.connection_status(user_id, TEST_NAMESPACE).await?.connected);
    Ok(())
}

#[tokio::test]
async fn test_connect_rejects_empty_code() -> Result<()> {
    let server = MockServer::start().await;
    let database = create_test_database().await?;
    let manager = create_token_manager(&database, &server.uri());

    let error = manager
        .connect(Uuid::new_v4(), TEST_NAMESPACE, "  ")
        .await
        .unwrap_err();
    assert!(matches!(error, OutreachError::InvalidInput(_)));
    Ok(())
}

#[tokio::test]
async fn test_tokens_are_encrypted_at_rest() -> Result<()> {
    let database = create_test_database().await?;
    let user_id = Uuid::new_v4();
    seed_valid_credential(&database, user_id).await?;

    let raw: (String,) = sqlx::query_as(
        "SELECT access_token FROM integration_credentials WHERE user_id = $1",
    )
    .bind(user_id.to_string())
    .fetch_one(database.pool())
    .await?;

    assert_ne!(raw.0, "valid-access");
    assert_eq!(stored_credential(&database, user_id).await?.access_token, "valid-access");
    Ok(())
}
