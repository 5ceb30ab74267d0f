use chrono::{DateTime, Utc};
use routerdesk_control::{RouterApiStatus, ViewState};
use routerdesk_db::entities::{router_connection, user};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Per-field validation messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: Some(code.to_string()),
            fields: None,
        }
    }
}

/// Search box filter for list endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring filter
    pub search: Option<String>,
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// User email address (must be unique)
    pub email: String,
    /// User password (minimum 8 characters)
    pub password: String,
    /// User full name (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// User registration response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Newly created user
    pub user: User,
    /// Session token for immediate login
    pub token: String,
    /// Token expiration timestamp
    pub expires_at: DateTime<Utc>,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// User email address
    pub email: String,
    /// User password
    pub password: String,
}

/// User login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Logged in user
    pub user: User,
    /// Session token
    pub token: String,
    /// Token expiration timestamp
    pub expires_at: DateTime<Utc>,
}

/// User role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Console administrator
    Admin,
    /// Regular operator
    User,
}

impl From<&user::UserRole> for UserRole {
    fn from(role: &user::UserRole) -> Self {
        match role {
            user::UserRole::Admin => UserRole::Admin,
            user::UserRole::User => UserRole::User,
        }
    }
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// User UUID
    pub id: String,
    /// User email
    pub email: String,
    /// User full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// User role
    pub role: UserRole,
    /// Whether the account is active
    pub is_active: bool,
    /// When the user was created
    pub created_at: DateTime<Utc>,
    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id.to_string(),
            email: model.email,
            full_name: model.full_name,
            role: UserRole::from(&model.role),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A stored router connection (the API password is never returned)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RouterConnection {
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Router address
    pub router_ip: String,
    /// RouterOS API port
    pub api_port: i32,
    pub api_username: String,
    /// API over TLS
    pub api_ssl: bool,
    /// Set by the last successful connection test
    pub is_active: bool,
    /// Last successful contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_connected: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<router_connection::Model> for RouterConnection {
    fn from(model: router_connection::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            router_ip: model.router_ip,
            api_port: model.api_port,
            api_username: model.api_username,
            api_ssl: model.api_ssl,
            is_active: model.is_active,
            last_connected: model.last_connected,
            created_at: model.created_at,
        }
    }
}

/// Router connections, newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouterConnectionList {
    pub connections: Vec<RouterConnection>,
    /// Total count
    pub total: usize,
    /// True when the listing could not be refreshed after a change
    pub stale: bool,
}

impl RouterConnectionList {
    pub fn fresh(rows: Vec<router_connection::Model>) -> Self {
        let connections: Vec<RouterConnection> =
            rows.into_iter().map(RouterConnection::from).collect();
        Self {
            total: connections.len(),
            connections,
            stale: false,
        }
    }

    /// Listing to hand back after a mutation; `None` when nothing changed
    pub fn from_view(view: ViewState) -> Option<Self> {
        match view {
            ViewState::Fresh(rows) => Some(Self::fresh(rows)),
            ViewState::Stale => Some(Self::stale()),
            ViewState::Unchanged => None,
        }
    }

    pub fn stale() -> Self {
        Self {
            connections: Vec::new(),
            total: 0,
            stale: true,
        }
    }
}

/// Result of a create/update/delete, with the refreshed listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouterConnectionMutation {
    /// The created or updated connection (absent after delete)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<RouterConnection>,
    /// Refreshed listing
    pub listing: RouterConnectionList,
}

impl RouterConnectionMutation {
    pub fn new(connection: Option<router_connection::Model>, view: ViewState) -> Self {
        Self {
            connection: connection.map(RouterConnection::from),
            listing: RouterConnectionList::from_view(view)
                .unwrap_or_else(RouterConnectionList::stale),
        }
    }
}

/// How a connection test ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TestResult {
    Connected,
    NotConnected,
}

/// Connection test response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionTestResponse {
    pub result: TestResult,
    /// Observed status; null unless connected
    pub status: Option<RouterApiStatus>,
    /// Refreshed listing when the test wrote to the connection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<RouterConnectionList>,
}

/// Select the connection used by the settings view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectConnectionRequest {
    pub connection_id: Uuid,
}

/// The connection selected for the settings view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentConnectionResponse {
    /// Null when nothing is selected
    pub connection: Option<RouterConnection>,
    pub status: Option<RouterApiStatus>,
}

/// Pending notices for the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoticeList {
    pub notices: Vec<routerdesk_control::Notice>,
}
