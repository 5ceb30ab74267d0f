//! Routerdesk command line: API server, connection management and settings

pub mod commands;
pub mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use routerdesk_control::{RouterProbe, StubProbe, TcpProbe};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Routerdesk - admin console backend for MikroTik routers
#[derive(Parser, Debug)]
#[command(name = "routerdesk")]
#[command(about = "Routerdesk - admin console backend for MikroTik routers")]
#[command(version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "info", env = "ROUTERDESK_LOG_LEVEL")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the REST API server
    #[command(long_about = r#"
Run the REST API server. Migrations are applied at startup.

EXAMPLES:
  # Local console with the default SQLite database
  routerdesk serve --jwt-secret "$(openssl rand -hex 32)"

  # Create an administrator on first start and probe routers over TCP
  routerdesk serve --probe tcp \
    --admin-email admin@example.com --admin-password 'change-me-now'

ENVIRONMENT VARIABLES:
  ROUTERDESK_BIND          Address to bind
  ROUTERDESK_DATABASE_URL  Database URL
  ROUTERDESK_JWT_SECRET    Session signing secret
    "#)]
    Serve {
        /// Address to bind the API server
        #[arg(long, env = "ROUTERDESK_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Secret for signing session tokens (falls back to the config file)
        #[arg(long, env = "ROUTERDESK_JWT_SECRET")]
        jwt_secret: Option<String>,

        #[command(flatten)]
        probe: ProbeArgs,

        /// Disable public registration
        #[arg(long)]
        no_signup: bool,

        /// Disable CORS for localhost development origins
        #[arg(long)]
        no_cors: bool,

        /// Create (or promote) this administrator before serving
        #[arg(long, env = "ROUTERDESK_ADMIN_EMAIL", requires = "admin_password")]
        admin_email: Option<String>,

        /// Password for a newly created administrator
        #[arg(long, env = "ROUTERDESK_ADMIN_PASSWORD", requires = "admin_email")]
        admin_password: Option<String>,
    },

    /// Manage router connections directly in the database
    Connection {
        #[command(flatten)]
        database: DatabaseArgs,

        /// Email of the user who owns the connections
        #[arg(long, global = true, env = "ROUTERDESK_OWNER")]
        owner: Option<String>,

        #[command(subcommand)]
        command: ConnectionCommands,
    },

    /// Manage the global configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (falls back to the config file, then sqlite://routerdesk.db)
    #[arg(long, env = "ROUTERDESK_DATABASE_URL")]
    pub database_url: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ProbeArgs {
    /// How connection tests reach the router
    #[arg(long, value_enum, default_value_t = ProbeKind::Stub)]
    pub probe: ProbeKind,

    /// Probe timeout in seconds (tcp probe only)
    #[arg(long, default_value = "5")]
    pub probe_timeout: u64,
}

impl ProbeArgs {
    pub fn build(&self) -> Arc<dyn RouterProbe> {
        match self.probe {
            ProbeKind::Stub => Arc::new(StubProbe),
            ProbeKind::Tcp => Arc::new(TcpProbe::new(Duration::from_secs(self.probe_timeout))),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Always reports the router as reachable
    Stub,
    /// TCP reachability of the API port
    Tcp,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConnectionCommands {
    /// Add a router connection
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Router address
        #[arg(long)]
        router_ip: String,

        /// RouterOS API port
        #[arg(long, default_value = "8728")]
        api_port: u16,

        /// RouterOS API user
        #[arg(long)]
        api_username: String,

        /// RouterOS API password
        #[arg(long, env = "ROUTERDESK_API_PASSWORD", default_value = "")]
        api_password: String,

        /// Use the TLS API service
        #[arg(long)]
        ssl: bool,
    },
    /// List router connections, newest first
    List,
    /// Show one connection and its status
    Show { id: Uuid },
    /// Delete a connection
    Remove { id: Uuid },
    /// Test a connection and record the result
    Test {
        id: Uuid,

        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Select the connection used by the settings view
    Select { id: Uuid },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the stored configuration
    Show,
    /// Set the default database URL
    SetDatabase {
        /// Database URL to store
        url: String,
    },
    /// Set the default session signing secret
    SetJwtSecret {
        /// Secret to store
        secret: String,
    },
    /// Remove every stored setting
    Clear,
}

/// Install the global tracing subscriber
pub fn init_logging(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to initialize logging filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            bind,
            database,
            jwt_secret,
            probe,
            no_signup,
            no_cors,
            admin_email,
            admin_password,
        } => {
            commands::serve(commands::ServeOptions {
                bind,
                database_url: database.database_url,
                jwt_secret,
                probe: probe.build(),
                allow_signup: !no_signup,
                enable_cors: !no_cors,
                admin: admin_email.zip(admin_password),
            })
            .await
        }
        Commands::Connection {
            database,
            owner,
            command,
        } => {
            let owner = owner.context("--owner <EMAIL> is required for connection commands")?;
            let db = commands::open_database(database.database_url).await?;
            commands::connection(&db, &owner, command).await
        }
        Commands::Config { command } => {
            commands::config(&config::ConfigManager::new()?, command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_connection_add() {
        let cli = Cli::try_parse_from([
            "routerdesk",
            "connection",
            "--owner",
            "ops@example.com",
            "add",
            "--name",
            "Office",
            "--router-ip",
            "10.0.0.1",
            "--api-username",
            "admin",
        ])
        .unwrap();

        match cli.command {
            Commands::Connection {
                owner,
                command:
                    ConnectionCommands::Add {
                        name,
                        api_port,
                        ssl,
                        ..
                    },
                ..
            } => {
                assert_eq!(owner.as_deref(), Some("ops@example.com"));
                assert_eq!(name, "Office");
                assert_eq!(api_port, 8728);
                assert!(!ssl);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_admin_flags_come_together() {
        let result = Cli::try_parse_from([
            "routerdesk",
            "serve",
            "--admin-email",
            "admin@example.com",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_probe_kind_parses() {
        let cli = Cli::try_parse_from(["routerdesk", "serve", "--probe", "tcp"]).unwrap();
        match cli.command {
            Commands::Serve { probe, .. } => assert_eq!(probe.probe, ProbeKind::Tcp),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
