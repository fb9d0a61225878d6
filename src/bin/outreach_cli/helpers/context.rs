// ABOUTME: Runtime context for outreach-cli commands
// ABOUTME: Loads configuration, opens the database, and builds pipeline components
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use outreach_core::errors::{AppError, AppResult, OutreachError};
use outreach_intel::config::OutreachConfig;
use outreach_intel::crm::{CrmClient, CrmClientConfig};
use outreach_intel::database::Database;
use outreach_intel::external::{FinancialRegistryClient, WebsiteExtractor, WebsiteExtractorConfig};
use outreach_intel::intelligence::ReportSynthesizer;
use outreach_intel::llm::ChatProvider;
use outreach_intel::oauth2_client::{OAuth2Client, OAuth2Config, TokenLifecycleManager};
use outreach_intel::services::ReportGenerationService;
use outreach_intel::utils::http_client::initialize_shared_client;
use tracing::info;

/// Configuration plus an open database
pub struct CliContext {
    pub config: OutreachConfig,
    pub database: Database,
}

impl CliContext {
    /// Load configuration and open the database
    pub async fn load(database_url: Option<String>) -> AppResult<Self> {
        let mut config = OutreachConfig::from_env()?;
        if let Some(url) = database_url {
            config.database.url = url;
        }
        initialize_shared_client(config.http.clone());

        info!("Connecting to database: {}", config.database.url);
        let database = Database::new(&config.database.url, config.database.encryption_key)
            .await
            .map_err(|e| OutreachError::persistence("open database", e))?;

        Ok(Self { config, database })
    }

    /// OAuth client for the CRM token endpoint
    pub fn oauth_client(&self) -> AppResult<OAuth2Client> {
        Ok(OAuth2Client::new(OAuth2Config::from_crm_config(
            &self.config.crm,
        )?))
    }

    /// Token manager over the CLI database
    pub fn token_manager(&self) -> AppResult<Arc<TokenLifecycleManager>> {
        Ok(Arc::new(TokenLifecycleManager::new(
            self.database.clone(),
            self.oauth_client()?,
        )))
    }

    /// Report pipeline; CRM access only when `with_crm` is set
    pub fn report_service(&self, with_crm: bool) -> AppResult<ReportGenerationService> {
        let provider = ChatProvider::from_config(&self.config.llm)?;
        let service = ReportGenerationService::new(
            WebsiteExtractor::new(WebsiteExtractorConfig::from(&self.config.extraction)),
            FinancialRegistryClient::from_config(&self.config.registry),
            ReportSynthesizer::new(Arc::new(provider)),
            Arc::new(self.database.clone()),
        );

        if !with_crm {
            return Ok(service);
        }
        let crm = CrmClient::new(
            CrmClientConfig::from(&self.config.crm),
            self.token_manager()?,
        );
        Ok(service.with_crm(crm))
    }

    /// Report store access without an LLM provider
    pub fn reports(&self) -> &Database {
        &self.database
    }
}

/// Map a URL building failure into a config error
pub fn invalid_url(error: &url::ParseError) -> AppError {
    AppError::config(format!("CRM authorization URL is invalid: {error}"))
}
