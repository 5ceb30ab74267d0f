//! REST API for the router console

pub mod accounts;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use routerdesk_control::telemetry as telemetry_types;
use routerdesk_control::{
    ConnectionConsole, RouterProbe, RouterTelemetry, SeaOrmConnectionStore,
};
use sea_orm::DatabaseConnection;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Session lifetime when none is configured
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub console: ConnectionConsole,
    pub telemetry: Arc<dyn RouterTelemetry>,
    pub allow_signup: bool,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Routerdesk API",
        version = "0.1.0",
        description = "REST API for managing MikroTik router connections",
        contact(
            name = "Routerdesk Team",
            email = "team@routerdesk.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::register,
        handlers::login,
        handlers::logout,
        handlers::get_current_user,
        handlers::list_connections,
        handlers::create_connection,
        handlers::get_connection,
        handlers::update_connection,
        handlers::delete_connection,
        handlers::test_connection,
        handlers::connection_status,
        handlers::apply_settings,
        handlers::get_current_connection,
        handlers::select_current_connection,
        handlers::clear_current_connection,
        handlers::router_status,
        handlers::router_test_connection,
        handlers::system_info,
        handlers::resources,
        handlers::list_hotspot_users,
        handlers::get_hotspot_user,
        handlers::create_hotspot_user,
        handlers::update_hotspot_user,
        handlers::delete_hotspot_user,
        handlers::list_pppoe_users,
        handlers::get_pppoe_user,
        handlers::create_pppoe_user,
        handlers::update_pppoe_user,
        handlers::delete_pppoe_user,
        handlers::list_devices,
        handlers::get_device,
        handlers::list_firewall_rules,
        handlers::get_firewall_rule,
        handlers::enable_firewall_rule,
        handlers::disable_firewall_rule,
        handlers::list_bandwidth_profiles,
        handlers::list_schedules,
        handlers::dashboard_stats,
        handlers::drain_notices,
    ),
    components(
        schemas(
            models::HealthResponse,
            models::ErrorResponse,
            models::RegisterRequest,
            models::RegisterResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::UserRole,
            models::User,
            models::RouterConnection,
            models::RouterConnectionList,
            models::RouterConnectionMutation,
            models::TestResult,
            models::ConnectionTestResponse,
            models::SelectConnectionRequest,
            models::CurrentConnectionResponse,
            models::NoticeList,
            routerdesk_control::ConnectionForm,
            routerdesk_control::ConnectionPatch,
            routerdesk_control::RouterApiStatus,
            routerdesk_control::ConnectivityState,
            routerdesk_control::StatusUpdate,
            routerdesk_control::Notice,
            routerdesk_control::NoticeLevel,
            routerdesk_control::DashboardStats,
            telemetry_types::AccessAccount,
            telemetry_types::AccountStatus,
            telemetry_types::NewAccount,
            telemetry_types::AccountChanges,
            telemetry_types::ConnectedDevice,
            telemetry_types::FirewallRule,
            telemetry_types::BandwidthProfile,
            telemetry_types::AccessSchedule,
            telemetry_types::SystemInfo,
            telemetry_types::ResourceUsage,
        )
    ),
    tags(
        (name = "auth", description = "Sign-up, sign-in and session endpoints"),
        (name = "connections", description = "Router connection management endpoints"),
        (name = "settings", description = "Settings view connection selection"),
        (name = "router", description = "Selected router status and information"),
        (name = "hotspot", description = "Hotspot user management"),
        (name = "pppoe", description = "PPPoE user management"),
        (name = "devices", description = "Connected devices"),
        (name = "firewall", description = "Firewall rules"),
        (name = "bandwidth", description = "Bandwidth profiles"),
        (name = "schedules", description = "Access schedules"),
        (name = "dashboard", description = "Dashboard statistics"),
        (name = "notices", description = "User-visible notices"),
        (name = "system", description = "System health and info endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for localhost origins (for development)
    pub enable_cors: bool,
    /// Secret for signing session tokens
    pub jwt_secret: String,
    /// Allow public registration at /api/auth/register
    pub allow_signup: bool,
    /// How long a session token stays valid
    pub session_ttl: chrono::Duration,
}

impl ApiServerConfig {
    pub fn new(bind_addr: SocketAddr, jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr,
            enable_cors: true,
            jwt_secret: jwt_secret.into(),
            allow_signup: true,
            session_ttl: chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server over a migrated database
    pub fn new(
        config: ApiServerConfig,
        db: DatabaseConnection,
        probe: Arc<dyn RouterProbe>,
        telemetry: Arc<dyn RouterTelemetry>,
    ) -> Self {
        let store = Arc::new(SeaOrmConnectionStore::new(db.clone()));

        let state = Arc::new(AppState {
            db,
            console: ConnectionConsole::new(store, probe),
            telemetry,
            allow_signup: config.allow_signup,
            jwt_secret: config.jwt_secret.clone(),
            session_ttl: config.session_ttl,
        });

        Self { config, state }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let jwt_state = Arc::new(middleware::JwtState::new(
            self.config.jwt_secret.as_bytes(),
        ));

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/register", post(handlers::register))
            .route("/api/auth/login", post(handlers::login))
            .route("/api/auth/logout", post(handlers::logout))
            .with_state(self.state.clone());

        // Build PROTECTED routes (require session token authentication)
        let protected_router = Router::new()
            .route("/api/auth/me", get(handlers::get_current_user))
            .route(
                "/api/router-connections",
                get(handlers::list_connections).post(handlers::create_connection),
            )
            .route(
                "/api/router-connections/{id}",
                get(handlers::get_connection)
                    .patch(handlers::update_connection)
                    .delete(handlers::delete_connection),
            )
            .route(
                "/api/router-connections/{id}/test",
                post(handlers::test_connection),
            )
            .route(
                "/api/router-connections/{id}/status",
                get(handlers::connection_status),
            )
            .route(
                "/api/router-connections/{id}/settings",
                axum::routing::put(handlers::apply_settings),
            )
            .route(
                "/api/settings/current-connection",
                get(handlers::get_current_connection)
                    .put(handlers::select_current_connection)
                    .delete(handlers::clear_current_connection),
            )
            .route("/api/router/status", get(handlers::router_status))
            .route(
                "/api/router/test-connection",
                post(handlers::router_test_connection),
            )
            .route("/api/router/system-info", get(handlers::system_info))
            .route("/api/router/resources", get(handlers::resources))
            .route(
                "/api/hotspot/users",
                get(handlers::list_hotspot_users).post(handlers::create_hotspot_user),
            )
            .route(
                "/api/hotspot/users/{id}",
                get(handlers::get_hotspot_user)
                    .put(handlers::update_hotspot_user)
                    .delete(handlers::delete_hotspot_user),
            )
            .route(
                "/api/pppoe/users",
                get(handlers::list_pppoe_users).post(handlers::create_pppoe_user),
            )
            .route(
                "/api/pppoe/users/{id}",
                get(handlers::get_pppoe_user)
                    .put(handlers::update_pppoe_user)
                    .delete(handlers::delete_pppoe_user),
            )
            .route("/api/devices", get(handlers::list_devices))
            .route("/api/devices/{id}", get(handlers::get_device))
            .route("/api/firewall/rules", get(handlers::list_firewall_rules))
            .route("/api/firewall/rules/{id}", get(handlers::get_firewall_rule))
            .route(
                "/api/firewall/rules/{id}/enable",
                post(handlers::enable_firewall_rule),
            )
            .route(
                "/api/firewall/rules/{id}/disable",
                post(handlers::disable_firewall_rule),
            )
            .route(
                "/api/bandwidth/profiles",
                get(handlers::list_bandwidth_profiles),
            )
            .route("/api/schedules", get(handlers::list_schedules))
            .route("/api/dashboard/stats", get(handlers::dashboard_stats))
            .route("/api/notices", get(handlers::drain_notices))
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state.clone(),
                middleware::require_auth,
            ));

        let api_router = public_router.merge(protected_router);

        // SwaggerUi also serves the document at /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // Cookie auth needs credentials, which rules out a wildcard origin
            let cors_layer = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    is_local_origin(origin.to_str().unwrap_or(""))
                }));

            Some(cors_layer)
        } else {
            None
        };

        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI document: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

fn is_local_origin(origin: &str) -> bool {
    origin.starts_with("http://localhost:")
        || origin.starts_with("http://127.0.0.1:")
        || origin.starts_with("https://localhost:")
        || origin.starts_with("https://127.0.0.1:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();

        assert!(json.contains("/api/router-connections/{id}/test"));
        assert!(json.contains("/api/hotspot/users"));
    }

    #[test]
    fn test_local_origins() {
        assert!(is_local_origin("http://localhost:5173"));
        assert!(is_local_origin("https://127.0.0.1:8443"));
        assert!(!is_local_origin("https://console.example.com"));
        assert!(!is_local_origin("http://localhost.evil.com"));
    }
}
