// ABOUTME: Authenticated CRM resource API client
// ABOUTME: Obtains a valid token per call and issues versioned REST requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use outreach_core::constants::crm;
use outreach_core::errors::{OutreachError, OutreachResult};
use outreach_core::models::ValidToken;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};
use urlencoding::encode;
use uuid::Uuid;

use super::models::{
    Contact, ContactEnvelope, ContactUpdate, ContactsEnvelope, CustomField, CustomFieldsEnvelope,
    NewContact, NewOpportunity, Note, NoteEnvelope, NotesEnvelope, OpportunitiesEnvelope,
    Opportunity, OpportunityEnvelope, Pipeline, PipelinesEnvelope,
};
use crate::config::CrmConfig;
use crate::oauth2_client::TokenLifecycleManager;
use crate::utils::http_client::shared_client;

/// CRM API client configuration
#[derive(Debug, Clone)]
pub struct CrmClientConfig {
    /// Resource API base URL
    pub base_url: String,
    /// Value of the `Version` header
    pub api_version: String,
}

impl Default for CrmClientConfig {
    fn default() -> Self {
        Self {
            base_url: crm::API_BASE_URL.to_owned(),
            api_version: crm::API_VERSION.to_owned(),
        }
    }
}

impl From<&CrmConfig> for CrmClientConfig {
    fn from(config: &CrmConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            api_version: config.api_version.clone(),
        }
    }
}

/// Thin typed wrapper over the CRM resource API
///
/// Every call awaits [`TokenLifecycleManager::get_valid_token`] before the
/// request is built, so a refreshed token is always persisted first.
#[derive(Clone)]
pub struct CrmClient {
    config: CrmClientConfig,
    tokens: Arc<TokenLifecycleManager>,
    http: Client,
}

impl CrmClient {
    /// Create a client sharing the process-wide HTTP client
    #[must_use]
    pub fn new(config: CrmClientConfig, tokens: Arc<TokenLifecycleManager>) -> Self {
        Self {
            config,
            tokens,
            http: shared_client().clone(),
        }
    }

    /// Token manager backing this client
    #[must_use]
    pub fn token_manager(&self) -> &TokenLifecycleManager {
        &self.tokens
    }

    /// Fetch a single contact
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn get_contact(
        &self,
        user_id: Uuid,
        namespace: &str,
        contact_id: &str,
    ) -> OutreachResult<Contact> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = format!("/contacts/{}", encode(contact_id));
        let envelope: ContactEnvelope = self.execute(&token, &path, self.get(&path)).await?;
        Ok(envelope.contact)
    }

    /// Search contacts in the credential's location
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn search_contacts(
        &self,
        user_id: Uuid,
        namespace: &str,
        query: &str,
        limit: Option<u32>,
    ) -> OutreachResult<Vec<Contact>> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = "/contacts/";
        let location_id = Self::location(&token, path)?;
        let limit = limit.unwrap_or(crm::DEFAULT_CONTACT_SEARCH_LIMIT).to_string();
        let request = self.get(path).query(&[
            ("locationId", location_id),
            ("query", query),
            ("limit", limit.as_str()),
        ]);

        let envelope: ContactsEnvelope = self.execute(&token, path, request).await?;
        Ok(envelope.contacts)
    }

    /// Create a contact in the credential's location
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self, contact), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn create_contact(
        &self,
        user_id: Uuid,
        namespace: &str,
        contact: &NewContact,
    ) -> OutreachResult<Contact> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = "/contacts/";
        let body = with_location(contact, Self::location(&token, path)?, path)?;
        let request = self.http.post(self.url(path)).json(&body);

        let envelope: ContactEnvelope = self.execute(&token, path, request).await?;
        Ok(envelope.contact)
    }

    /// Update fields of a contact
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self, update), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn update_contact(
        &self,
        user_id: Uuid,
        namespace: &str,
        contact_id: &str,
        update: &ContactUpdate,
    ) -> OutreachResult<Contact> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = format!("/contacts/{}", encode(contact_id));
        let request = self.http.put(self.url(&path)).json(update);

        let envelope: ContactEnvelope = self.execute(&token, &path, request).await?;
        Ok(envelope.contact)
    }

    /// List the location's pipelines with their stages
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn list_pipelines(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> OutreachResult<Vec<Pipeline>> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = "/opportunities/pipelines";
        let request = self
            .get(path)
            .query(&[("locationId", Self::location(&token, path)?)]);

        let envelope: PipelinesEnvelope = self.execute(&token, path, request).await?;
        Ok(envelope.pipelines)
    }

    /// Search opportunities, optionally within one pipeline
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn search_opportunities(
        &self,
        user_id: Uuid,
        namespace: &str,
        pipeline_id: Option<&str>,
    ) -> OutreachResult<Vec<Opportunity>> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = "/opportunities/search";
        let mut query = vec![("location_id", Self::location(&token, path)?)];
        if let Some(pipeline_id) = pipeline_id {
            query.push(("pipeline_id", pipeline_id));
        }
        let request = self.get(path).query(&query);

        let envelope: OpportunitiesEnvelope = self.execute(&token, path, request).await?;
        Ok(envelope.opportunities)
    }

    /// Create an opportunity in the credential's location
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self, opportunity), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn create_opportunity(
        &self,
        user_id: Uuid,
        namespace: &str,
        opportunity: &NewOpportunity,
    ) -> OutreachResult<Opportunity> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = "/opportunities/";
        let body = with_location(opportunity, Self::location(&token, path)?, path)?;
        let request = self.http.post(self.url(path)).json(&body);

        let envelope: OpportunityEnvelope = self.execute(&token, path, request).await?;
        Ok(envelope.opportunity)
    }

    /// Move an opportunity to another stage
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn update_opportunity_stage(
        &self,
        user_id: Uuid,
        namespace: &str,
        opportunity_id: &str,
        stage_id: &str,
    ) -> OutreachResult<Opportunity> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = format!("/opportunities/{}", encode(opportunity_id));
        let request = self
            .http
            .put(self.url(&path))
            .json(&json!({ "pipelineStageId": stage_id }));

        let envelope: OpportunityEnvelope = self.execute(&token, &path, request).await?;
        Ok(envelope.opportunity)
    }

    /// List the location's custom field definitions
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn list_custom_fields(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> OutreachResult<Vec<CustomField>> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let location_id = Self::location(&token, "/locations/{locationId}/customFields")?;
        let path = format!("/locations/{}/customFields", encode(location_id));

        let envelope: CustomFieldsEnvelope = self.execute(&token, &path, self.get(&path)).await?;
        Ok(envelope.custom_fields)
    }

    /// List notes attached to a contact
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn list_notes(
        &self,
        user_id: Uuid,
        namespace: &str,
        contact_id: &str,
    ) -> OutreachResult<Vec<Note>> {
        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = format!("/contacts/{}/notes", encode(contact_id));

        let envelope: NotesEnvelope = self.execute(&token, &path, self.get(&path)).await?;
        Ok(envelope.notes)
    }

    /// Attach a note to a contact
    ///
    /// # Errors
    ///
    /// Returns a credential error or `CrmRequestFailed`
    #[instrument(skip(self, body), fields(user.id = %user_id, crm.namespace = %namespace))]
    pub async fn add_note(
        &self,
        user_id: Uuid,
        namespace: &str,
        contact_id: &str,
        body: &str,
    ) -> OutreachResult<Note> {
        if body.trim().is_empty() {
            return Err(OutreachError::InvalidInput(
                "note body must not be empty".to_owned(),
            ));
        }

        let token = self.tokens.get_valid_token(user_id, namespace).await?;
        let path = format!("/contacts/{}/notes", encode(contact_id));
        let request = self.http.post(self.url(&path)).json(&json!({ "body": body }));

        let envelope: NoteEnvelope = self.execute(&token, &path, request).await?;
        Ok(envelope.note)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    fn location<'a>(token: &'a ValidToken, endpoint: &str) -> OutreachResult<&'a str> {
        token
            .location_id
            .as_deref()
            .ok_or_else(|| OutreachError::CrmRequestFailed {
                endpoint: endpoint.to_owned(),
                status: None,
                message: "credential is not scoped to a location".to_owned(),
            })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        token: &ValidToken,
        endpoint: &str,
        request: RequestBuilder,
    ) -> OutreachResult<T> {
        let response = request
            .bearer_auth(&token.access_token)
            .header(crm::VERSION_HEADER, &self.config.api_version)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| OutreachError::CrmRequestFailed {
                endpoint: endpoint.to_owned(),
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("request failed").to_owned()
            });
            warn!(http.status = status.as_u16(), endpoint, "CRM request rejected: {message}");
            return Err(OutreachError::CrmRequestFailed {
                endpoint: endpoint.to_owned(),
                status: Some(status.as_u16()),
                message,
            });
        }

        debug!(http.status = status.as_u16(), endpoint, "CRM request succeeded");
        response
            .json::<T>()
            .await
            .map_err(|e| OutreachError::CrmRequestFailed {
                endpoint: endpoint.to_owned(),
                status: Some(status.as_u16()),
                message: format!("invalid response body: {e}"),
            })
    }
}

/// Serialize `payload` and add the `locationId` field
fn with_location<T: Serialize>(
    payload: &T,
    location_id: &str,
    endpoint: &str,
) -> OutreachResult<serde_json::Value> {
    let mut body = serde_json::to_value(payload).map_err(|e| OutreachError::CrmRequestFailed {
        endpoint: endpoint.to_owned(),
        status: None,
        message: format!("request body could not be encoded: {e}"),
    })?;
    if let Some(object) = body.as_object_mut() {
        object.insert("locationId".to_owned(), json!(location_id));
    }
    Ok(body)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<ErrorMessage>,
    error: Option<String>,
}

fn error_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let message = match parsed.message {
            Some(ErrorMessage::One(message)) => Some(message),
            Some(ErrorMessage::Many(messages)) => Some(messages.join("; ")),
            None => parsed.error,
        };
        if message.is_some() {
            return message;
        }
    }
    let snippet: String = body.trim().chars().take(200).collect();
    (!snippet.is_empty()).then_some(snippet)
}
