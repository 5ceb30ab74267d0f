//! Command handlers

use anyhow::{bail, Context, Result};
use routerdesk_api::accounts;
use routerdesk_api::models::RouterConnection as ConnectionView;
use routerdesk_api::{ApiServer, ApiServerConfig};
use routerdesk_control::{
    to_status, ConnectionConsole, ConnectionForm, ConnectionRow, MockTelemetry, NoticeLevel,
    Principal, RouterProbe, SeaOrmConnectionStore, StubProbe, TestOutcome, ViewState,
};
use routerdesk_db::DEFAULT_DATABASE_URL;
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ConfigManager;
use crate::{ConfigCommands, ConnectionCommands};

pub struct ServeOptions {
    pub bind: SocketAddr,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub probe: Arc<dyn RouterProbe>,
    pub allow_signup: bool,
    pub enable_cors: bool,
    /// `(email, password)` of an administrator to create before serving
    pub admin: Option<(String, String)>,
}

/// Stored config for the current user; an unreadable home directory counts as empty
fn stored_config() -> crate::config::RouterdeskConfig {
    match ConfigManager::new().and_then(|manager| manager.load()) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring configuration file: {:#}", e);
            Default::default()
        }
    }
}

/// Connect to the configured database and apply migrations
pub async fn open_database(flag: Option<String>) -> Result<DatabaseConnection> {
    let url = stored_config()
        .database_url_or(flag)
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    let db = routerdesk_db::connect(&url)
        .await
        .context(format!("Failed to connect to database: {}", url))?;
    routerdesk_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;

    Ok(db)
}

pub async fn serve(options: ServeOptions) -> Result<()> {
    let db = open_database(options.database_url).await?;

    if let Some((email, password)) = &options.admin {
        let admin = accounts::ensure_admin(&db, email, password)
            .await
            .context("Failed to create administrator")?;
        info!(user_id = %admin.id, email = %admin.email, "Administrator ready");
    }

    let jwt_secret = match stored_config().jwt_secret_or(options.jwt_secret) {
        Some(secret) => secret,
        None => {
            warn!("No JWT secret configured; sessions will not survive a restart");
            format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
        }
    };

    let mut config = ApiServerConfig::new(options.bind, jwt_secret);
    config.allow_signup = options.allow_signup;
    config.enable_cors = options.enable_cors;

    let server = ApiServer::new(
        config,
        db,
        options.probe,
        Arc::new(MockTelemetry::seeded()),
    );
    server.start().await
}

async fn owner_principal(db: &DatabaseConnection, email: &str) -> Result<Principal> {
    let owner = accounts::find_by_email(db, email)
        .await
        .context("Failed to look up owner")?
        .with_context(|| format!("No user with email '{}'", email))?;

    Ok(Principal::new(owner.id, owner.role))
}

fn print_notices(console: &ConnectionConsole, principal: &Principal) {
    for notice in console.notices().drain(principal.user_id) {
        let marker = match notice.level {
            NoticeLevel::Success => "✅",
            NoticeLevel::Info => "ℹ️ ",
            NoticeLevel::Warning => "⚠️ ",
            NoticeLevel::Error => "❌",
        };
        println!("{} {}", marker, notice.message);
    }
}

fn print_rows(rows: &[routerdesk_control::RouterConnection]) {
    if rows.is_empty() {
        println!("No router connections configured");
        println!("Add one with: routerdesk connection add --name <name> --router-ip <ip> --api-username <user>");
        return;
    }

    println!("Router connections ({})", rows.len());
    println!();

    for row in rows.iter().map(ConnectionRow::from) {
        let status = match row.status {
            routerdesk_control::listing::ConnectionStatusLabel::Active => "🟢 Active",
            routerdesk_control::listing::ConnectionStatusLabel::Inactive => "⚪ Inactive",
        };
        println!("  {} {}", status, row.name);
        println!("    Id: {}", row.id);
        println!(
            "    Endpoint: {}{}",
            row.endpoint,
            if row.ssl { " (SSL)" } else { "" }
        );
        println!("    Username: {}", row.username);
        println!("    Last connected: {}", row.last_connected);
    }
}

/// Run a `connection` subcommand on behalf of the user with `owner_email`
pub async fn connection(
    db: &DatabaseConnection,
    owner_email: &str,
    command: ConnectionCommands,
) -> Result<()> {
    let principal = owner_principal(db, owner_email).await?;
    let store = Arc::new(SeaOrmConnectionStore::new(db.clone()));

    let probe: Arc<dyn RouterProbe> = match &command {
        ConnectionCommands::Test { probe, .. } => probe.build(),
        _ => Arc::new(StubProbe),
    };
    let console = ConnectionConsole::new(store, probe);

    let result = run_connection_command(&console, &principal, command).await;
    print_notices(&console, &principal);
    result
}

async fn run_connection_command(
    console: &ConnectionConsole,
    principal: &Principal,
    command: ConnectionCommands,
) -> Result<()> {
    match command {
        ConnectionCommands::Add {
            name,
            router_ip,
            api_port,
            api_username,
            api_password,
            ssl,
        } => {
            let form = ConnectionForm {
                name,
                router_ip,
                api_port: Some(i64::from(api_port)),
                api_username,
                api_password,
                api_ssl: ssl,
            };
            let created = console.create(principal, form).await?;
            println!("Created connection {}", created.value.id);
        }
        ConnectionCommands::List => {
            let rows = console.list(principal).await?;
            print_rows(&rows);
        }
        ConnectionCommands::Show { id } => {
            let record = console.get(principal, id).await?;
            let status = to_status(&record);
            let json = serde_json::to_string_pretty(&serde_json::json!({
                "connection": ConnectionView::from(record),
                "status": status,
            }))?;
            println!("{}", json);
        }
        ConnectionCommands::Remove { id } => {
            console.delete(principal, id).await?;
        }
        ConnectionCommands::Test { id, .. } => {
            let mutation = console.test(principal, id).await;
            if mutation.view == ViewState::Stale {
                warn!("Connection list could not be refreshed after the test");
            }
            match mutation.value {
                TestOutcome::Connected(status) => {
                    println!(
                        "Router {}:{} is reachable",
                        status.router_ip, status.api_port
                    );
                }
                TestOutcome::NotConnected => println!("Router did not answer"),
                TestOutcome::AlreadyRunning => println!("A test for this connection is already running"),
                TestOutcome::Failed => bail!("Connection test failed"),
            }
        }
        ConnectionCommands::Select { id } => {
            let selected = console.select_current(principal, id).await?;
            println!("Settings now use '{}'", selected.name);
        }
    }

    Ok(())
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}

/// Run a `config` subcommand against `manager`
pub fn config(manager: &ConfigManager, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = manager.load()?;
            println!("Config file: {}", manager.path().display());
            println!(
                "  database_url: {}",
                config.database_url.as_deref().unwrap_or("(default)")
            );
            println!(
                "  jwt_secret:   {}",
                config
                    .jwt_secret
                    .as_deref()
                    .map(mask)
                    .unwrap_or_else(|| "(not set)".to_string())
            );
        }
        ConfigCommands::SetDatabase { url } => {
            manager.set_database_url(url)?;
            println!("✅ Database URL saved to {}", manager.path().display());
        }
        ConfigCommands::SetJwtSecret { secret } => {
            manager.set_jwt_secret(secret)?;
            println!("✅ JWT secret saved to {}", manager.path().display());
        }
        ConfigCommands::Clear => {
            manager.clear()?;
            println!("✅ Configuration cleared");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_prefix_only() {
        assert_eq!(mask("abcdefgh"), "abcd…");
        assert_eq!(mask("ab"), "ab…");
    }

    #[test]
    fn test_config_command_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::at(dir.path().join("config.json"));

        config(
            &manager,
            ConfigCommands::SetDatabase {
                url: "sqlite::memory:".to_string(),
            },
        )
        .unwrap();
        assert_eq!(
            manager.load().unwrap().database_url.as_deref(),
            Some("sqlite::memory:")
        );

        config(&manager, ConfigCommands::Clear).unwrap();
        assert!(manager.load().unwrap().database_url.is_none());
    }
}
