//! rbac-admin - command line access to the marketplace RBAC REST API
//!
//! Runs access checks, reads the audit log, exports registries and produces
//! security reports. Every command prints JSON on stdout.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use marketplace_rbac::config::Config;
use marketplace_rbac::core::models::{
    AccessCheckRequest, AuditAction, AuditFilter, BulkAccessCheckRequest, PageRequest, Principal,
    ReportPeriod,
};
use marketplace_rbac::utils::logging::init_tracing;
use marketplace_rbac::{Credentials, RbacApiClient, RequestOptions};

#[derive(Debug, Parser)]
#[command(name = "rbac-admin", version, about = "Administer the marketplace RBAC service")]
struct Cli {
    /// YAML configuration file; environment variables are used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured API base URL
    #[arg(long, env = "RBAC_API_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "RBAC_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check one or more permission codes for a principal
    Check {
        #[arg(long)]
        principal: Uuid,
        #[arg(long)]
        principal_type: String,
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Print a page of the audit log
    Audit {
        /// snake_case action name, e.g. assignment_revoked
        #[arg(long)]
        action: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Download a PDF export
    Export {
        #[arg(value_enum)]
        what: ExportKind,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Generate a security report over [from, to)
    Report {
        #[arg(long)]
        from: DateTime<Utc>,
        #[arg(long)]
        to: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportKind {
    Permissions,
    Roles,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::from_env()?,
    };
    if let Some(base_url) = cli.base_url {
        config.client.base_url = base_url;
    }
    config.validate()?;
    init_tracing(&config.logging)?;

    let client = Arc::new(RbacApiClient::new(config.client.clone())?);
    let credentials = cli.token.map(Credentials::bearer).unwrap_or_default();
    let options = RequestOptions::default();

    match cli.command {
        Command::Check {
            principal,
            principal_type,
            codes,
        } => {
            let principal = Principal::new(principal, principal_type);
            if let [code] = codes.as_slice() {
                let request = AccessCheckRequest {
                    principal,
                    permission_code: code.clone(),
                    context: None,
                };
                let result = client.check_access(&credentials, &request, &options).await?;
                print_json(&result)
            } else {
                let request = BulkAccessCheckRequest {
                    principal,
                    permission_codes: codes,
                    context: None,
                };
                let results = client.check_multiple(&credentials, &request, &options).await?;
                print_json(&results)
            }
        }
        Command::Audit {
            action,
            page,
            limit,
        } => {
            let filter = AuditFilter {
                action: action.as_deref().map(parse_action).transpose()?,
                ..AuditFilter::default()
            };
            let page = PageRequest::new(page, limit.unwrap_or(config.client.default_page_size));
            let entries = client
                .get_audit_log(&credentials, &filter, page, &options)
                .await?;
            print_json(&entries)
        }
        Command::Export { what, output } => {
            let bytes = match what {
                ExportKind::Permissions => {
                    client.export_permissions_pdf(&credentials, &options).await?
                }
                ExportKind::Roles => client.export_roles_pdf(&credentials, &options).await?,
            };
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(path = %output.display(), size = bytes.len(), "Export written");
            print_json(&serde_json::json!({
                "fichier": output.display().to_string(),
                "taille": bytes.len(),
            }))
        }
        Command::Report { from, to } => {
            let report = client
                .security_report(&credentials, &ReportPeriod::new(from, to), &options)
                .await?;
            print_json(&report)
        }
    }
}

fn parse_action(raw: &str) -> anyhow::Result<AuditAction> {
    debug!(action = raw, "Parsing audit action filter");
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .with_context(|| format!("unknown audit action '{}'", raw))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_several_codes() {
        let principal = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "rbac-admin",
            "--token",
            "t",
            "check",
            "--principal",
            &principal.to_string(),
            "--principal-type",
            "vendeur",
            "products.read",
            "products.write",
        ])
        .unwrap();
        match cli.command {
            Command::Check { codes, .. } => assert_eq!(codes.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(
            parse_action("assignment_revoked").unwrap(),
            AuditAction::AssignmentRevoked
        );
        assert!(parse_action("nope").is_err());
    }
}
