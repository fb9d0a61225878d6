// ABOUTME: CRM credential commands for outreach-cli
// ABOUTME: Status, connect, disconnect, authorization URL, and forced token validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use outreach_core::errors::AppResult;
use tracing::info;
use uuid::Uuid;

use crate::helpers::context::{invalid_url, CliContext};
use crate::helpers::display::display_connection_status;

/// Show the connection status of an integration
pub async fn status(context: &CliContext, user: Uuid, namespace: &str) -> AppResult<()> {
    let status = context
        .token_manager()?
        .connection_status(user, namespace)
        .await?;
    display_connection_status(&status);
    Ok(())
}

/// Exchange an authorization code and store the credential
pub async fn connect(
    context: &CliContext,
    user: Uuid,
    namespace: &str,
    code: &str,
) -> AppResult<()> {
    let status = context
        .token_manager()?
        .connect(user, namespace, code)
        .await?;
    info!(user.id = %user, crm.namespace = %namespace, "Integration connected");
    display_connection_status(&status);
    Ok(())
}

/// Remove a stored credential
pub async fn disconnect(context: &CliContext, user: Uuid, namespace: &str) -> AppResult<()> {
    let removed = context
        .token_manager()?
        .disconnect(user, namespace)
        .await?;
    if removed {
        println!("Integration '{namespace}' disconnected");
    } else {
        println!("Integration '{namespace}' was not connected");
    }
    Ok(())
}

/// Print the authorization page URL
pub fn authorize_url(context: &CliContext, state: &str) -> AppResult<()> {
    let url = context
        .oauth_client()?
        .get_authorization_url(state)
        .map_err(|e| invalid_url(&e))?;
    println!("{url}");
    Ok(())
}

/// Get a valid token, refreshing if needed; never prints the token itself
pub async fn token(context: &CliContext, user: Uuid, namespace: &str) -> AppResult<()> {
    let token = context
        .token_manager()?
        .get_valid_token(user, namespace)
        .await?;
    println!("Token valid until {}", token.expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "Location: {}",
        token.location_id.as_deref().unwrap_or("(none)")
    );
    Ok(())
}
