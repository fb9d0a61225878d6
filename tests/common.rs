// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory database, token manager wiring, seeded credentials, and a scripted LLM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `outreach_intel`

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use outreach_core::errors::AppError;
use outreach_core::models::{IntegrationCredential, OutreachReport, ReportContent};
use outreach_intel::database::{Database, NewCredential};
use outreach_intel::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};
use outreach_intel::oauth2_client::{OAuth2Client, OAuth2Config, TokenLifecycleManager};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

pub const TEST_NAMESPACE: &str = "crm";
pub const TEST_LOCATION: &str = "loc-123";
pub const TOKEN_PATH: &str = "/oauth/token";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:", [42u8; 32]).await?)
}

/// OAuth settings pointing at a mock token endpoint
pub fn test_oauth_config(server_uri: &str) -> OAuth2Config {
    OAuth2Config {
        client_id: "test-client".to_owned(),
        client_secret: "test-secret".to_owned(),
        auth_url: "https://crm.example.com/oauth/chooselocation".to_owned(),
        token_url: format!("{server_uri}{TOKEN_PATH}"),
        redirect_uri: Some("http://localhost:8080/callback".to_owned()),
        scopes: vec!["contacts.readonly".to_owned()],
    }
}

/// Token manager over `database` using a mock token endpoint
pub fn create_token_manager(database: &Database, server_uri: &str) -> Arc<TokenLifecycleManager> {
    Arc::new(TokenLifecycleManager::new(
        database.clone(),
        OAuth2Client::new(test_oauth_config(server_uri)),
    ))
}

/// Store a credential directly, bypassing the OAuth exchange
pub async fn seed_credential(
    database: &Database,
    user_id: Uuid,
    access_token: &str,
    refresh_token: Option<&str>,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    database
        .upsert_integration_credential(&NewCredential {
            user_id,
            namespace: TEST_NAMESPACE,
            access_token,
            refresh_token,
            expires_at,
            location_id: Some(TEST_LOCATION),
        })
        .await?;
    Ok(())
}

/// Seed a credential valid for another hour
pub async fn seed_valid_credential(database: &Database, user_id: Uuid) -> Result<()> {
    seed_credential(
        database,
        user_id,
        "valid-access",
        Some("refresh-1"),
        Utc::now() + Duration::hours(1),
    )
    .await
}

/// Read back the stored credential
pub async fn stored_credential(database: &Database, user_id: Uuid) -> Result<IntegrationCredential> {
    Ok(database
        .get_integration_credential(user_id, TEST_NAMESPACE)
        .await?
        .expect("credential stored"))
}

/// Token endpoint success body
pub fn token_response(access_token: &str, refresh_token: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 86_399,
        "refresh_token": refresh_token,
        "scope": "contacts.readonly",
        "locationId": TEST_LOCATION,
    })
}

/// A complete, well-formed model answer
pub const REPORT_JSON: &str = r#"{
  "insights": ["Acme Foundation reduces hunger across three counties", "Volunteer-led distribution"],
  "subjectLines": ["An idea for [Organization Name]", "Quick question, [First Name]"],
  "emailBody": "Hi [First Name],\n\nI met your CEO at the conference and loved hearing how Acme Foundation reduces hunger.\n\nBest,\n[Your Name]",
  "followUpSubjectLines": ["Following up, [First Name]"],
  "followUpBody": "Hi [First Name], just following up on my note.\n\n[Your Name]",
  "linkedinConnectionNote": "Hi [First Name], great to see Acme's work on hunger.",
  "linkedinFollowUp": "Thanks for connecting, [First Name]!",
  "callScript": "Hi [First Name], this is [Your Name]. I'm calling about Acme's hunger programs."
}"#;

/// One scripted provider answer
pub enum Script {
    Reply(String),
    Fail,
}

/// LLM test double replaying scripted answers and recording requests
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn replying(content: &str) -> Arc<Self> {
        Self::new(vec![Script::Reply(content.to_owned())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Test Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::structured()
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        match self.script.lock().unwrap().pop_front() {
            Some(Script::Reply(content)) => Ok(ChatResponse {
                content,
                model: request
                    .model
                    .clone()
                    .unwrap_or_else(|| "scripted-model".to_owned()),
                usage: Some(TokenUsage {
                    prompt_tokens: 100,
                    completion_tokens: 50,
                    total_tokens: 150,
                }),
                finish_reason: Some("stop".to_owned()),
            }),
            Some(Script::Fail) | None => Err(AppError::external_unavailable(
                "scripted",
                "service unavailable",
            )),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// A stored-report fixture for (user, contact)
pub fn sample_report(user_id: Uuid, contact_id: &str) -> OutreachReport {
    let now = Utc::now();
    OutreachReport {
        user_id,
        contact_id: contact_id.to_owned(),
        organization_identifier: None,
        country: None,
        website_url: "https://acme.org".to_owned(),
        specific_url: None,
        content: ReportContent {
            insights: vec!["Feeds 5,000 families".to_owned()],
            subject_lines: vec!["Hello".to_owned()],
            email_body: "original email".to_owned(),
            follow_up_subject_lines: vec!["Checking in".to_owned()],
            follow_up_body: "original follow-up".to_owned(),
            linkedin_connection_note: "note".to_owned(),
            linkedin_follow_up: "follow".to_owned(),
            call_script: "script".to_owned(),
        },
        financial_data: None,
        created_at: now,
        updated_at: now,
    }
}
