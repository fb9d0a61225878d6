// ABOUTME: Outreach CLI - operator tool for CRM credentials and outreach reports
// ABOUTME: Connects integrations, forces token refresh, and generates or edits reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Print the CRM authorization page URL
//! outreach-cli credential authorize-url --state abc123
//!
//! # Exchange the authorization code from the callback
//! outreach-cli credential connect --user <uuid> --namespace crm --code <code>
//!
//! # Check (and refresh if needed) the stored token
//! outreach-cli credential token --user <uuid> --namespace crm
//!
//! # Generate a report for a contact
//! outreach-cli report generate --user <uuid> --contact c1 --website https://acme.org \
//!     --country uk --org-id 1234567 --insight "met CEO at conference"
//!
//! # Edit the follow-up email of a stored report
//! outreach-cli report update --user <uuid> --contact c1 --follow-up-body "..."
//!
//! # Generate an encryption key for OUTREACH_ENCRYPTION_KEY
//! outreach-cli key generate
//! ```

mod commands;
mod helpers;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use outreach_core::errors::AppResult;
use outreach_intel::logging::LoggingConfig;
use uuid::Uuid;

use helpers::context::CliContext;

#[derive(Parser)]
#[command(
    name = "outreach-cli",
    about = "Outreach Intelligence Pipeline CLI",
    long_about = "Operator tool for CRM integration credentials and outreach report generation."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// CRM integration credential commands
    Credential {
        #[command(subcommand)]
        action: CredentialCommand,
    },

    /// Outreach report commands
    Report {
        #[command(subcommand)]
        action: ReportCommand,
    },

    /// Encryption key commands
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum CredentialCommand {
    /// Show whether an integration is connected and its token usable
    Status {
        /// User id
        #[arg(long)]
        user: Uuid,
        /// Integration namespace
        #[arg(long)]
        namespace: String,
    },

    /// Exchange an authorization code and store the credential
    Connect {
        /// User id
        #[arg(long)]
        user: Uuid,
        /// Integration namespace
        #[arg(long)]
        namespace: String,
        /// Authorization code from the OAuth callback
        #[arg(long)]
        code: String,
    },

    /// Remove a stored credential
    Disconnect {
        /// User id
        #[arg(long)]
        user: Uuid,
        /// Integration namespace
        #[arg(long)]
        namespace: String,
    },

    /// Print the CRM authorization page URL
    AuthorizeUrl {
        /// Opaque state echoed back on the callback
        #[arg(long)]
        state: String,
    },

    /// Get a valid token, refreshing it if expired
    Token {
        /// User id
        #[arg(long)]
        user: Uuid,
        /// Integration namespace
        #[arg(long)]
        namespace: String,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ReportCommand {
    /// Generate and store a report for a contact
    Generate(Box<commands::report::GenerateArgs>),

    /// Print a stored report as JSON
    Show {
        /// User id
        #[arg(long)]
        user: Uuid,
        /// CRM contact id
        #[arg(long)]
        contact: String,
    },

    /// List a user's reports
    List {
        /// User id
        #[arg(long)]
        user: Uuid,
    },

    /// Replace the email bodies of a stored report
    Update {
        /// User id
        #[arg(long)]
        user: Uuid,
        /// CRM contact id
        #[arg(long)]
        contact: String,
        /// New first email body
        #[arg(long)]
        email_body: Option<String>,
        /// New follow-up body
        #[arg(long)]
        follow_up_body: Option<String>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum KeyCommand {
    /// Print a fresh base64 encryption key
    Generate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.verbose();
    }
    if let Err(e) = logging.init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error [{:?}]: {}", error.code, error.message);
            ExitCode::from(u8::try_from(error.code.exit_status()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    match cli.command {
        Command::Key {
            action: KeyCommand::Generate,
        } => commands::key::generate(),
        Command::Credential { action } => {
            let context = CliContext::load(cli.database_url).await?;
            run_credential(&context, action).await
        }
        Command::Report { action } => {
            let context = CliContext::load(cli.database_url).await?;
            run_report(&context, action).await
        }
    }
}

async fn run_credential(context: &CliContext, action: CredentialCommand) -> AppResult<()> {
    match action {
        CredentialCommand::Status { user, namespace } => {
            commands::credential::status(context, user, &namespace).await
        }
        CredentialCommand::Connect {
            user,
            namespace,
            code,
        } => commands::credential::connect(context, user, &namespace, &code).await,
        CredentialCommand::Disconnect { user, namespace } => {
            commands::credential::disconnect(context, user, &namespace).await
        }
        CredentialCommand::AuthorizeUrl { state } => {
            commands::credential::authorize_url(context, &state)
        }
        CredentialCommand::Token { user, namespace } => {
            commands::credential::token(context, user, &namespace).await
        }
    }
}

async fn run_report(context: &CliContext, action: ReportCommand) -> AppResult<()> {
    match action {
        ReportCommand::Generate(args) => commands::report::generate(context, *args).await,
        ReportCommand::Show { user, contact } => {
            commands::report::show(context, user, &contact).await
        }
        ReportCommand::List { user } => commands::report::list(context, user).await,
        ReportCommand::Update {
            user,
            contact,
            email_body,
            follow_up_body,
        } => commands::report::update(context, user, &contact, email_body, follow_up_body).await,
    }
}
