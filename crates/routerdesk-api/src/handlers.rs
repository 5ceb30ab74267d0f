use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use routerdesk_auth::{JwtClaims, JwtValidator};
use routerdesk_control::telemetry::{
    AccessAccount, AccessSchedule, AccountChanges, AccountService, BandwidthProfile,
    ConnectedDevice, FirewallRule, NewAccount, ResourceUsage, SystemInfo,
};
use routerdesk_control::{
    filter_by_query, to_status, ConnectionForm, ConnectionPatch, ConsoleError, DashboardStats,
    Mutation, Principal, RouterApiStatus, StatusUpdate, StoreError, TelemetryError, TestOutcome,
};
use routerdesk_db::entities::user::{self, UserRole as DbUserRole};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::accounts::{self, AccountError};
use crate::middleware::SESSION_COOKIE;
use crate::models::*;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (status, Json(ErrorResponse::new(error, code)))
}

fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound(id) => api_error(
            StatusCode::NOT_FOUND,
            format!("Router connection '{}' not found", id),
            "CONNECTION_NOT_FOUND",
        ),
        StoreError::Database(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
            "DATABASE_ERROR",
        ),
    }
}

/// Unreadable request bodies get the same error shape as everything else
fn json_rejection(rejection: JsonRejection) -> ApiError {
    debug!(error = %rejection.body_text(), "Rejected request body");
    api_error(rejection.status(), rejection.body_text(), "INVALID_REQUEST")
}

fn console_error(e: ConsoleError) -> ApiError {
    match e {
        ConsoleError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: errors.to_string(),
                code: Some("VALIDATION_FAILED".to_string()),
                fields: Some(errors.fields),
            }),
        ),
        ConsoleError::Store(e) => store_error(e),
    }
}

fn telemetry_error(e: TelemetryError) -> ApiError {
    match e {
        TelemetryError::NotFound { .. } => {
            api_error(StatusCode::NOT_FOUND, e.to_string(), "NOT_FOUND")
        }
        TelemetryError::Invalid { .. } => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), "INVALID_REQUEST")
        }
    }
}

fn account_error(e: AccountError) -> ApiError {
    match e {
        AccountError::InvalidEmail => {
            api_error(StatusCode::BAD_REQUEST, e.to_string(), "INVALID_EMAIL")
        }
        AccountError::WeakPassword(_) => {
            api_error(StatusCode::BAD_REQUEST, e.to_string(), "WEAK_PASSWORD")
        }
        AccountError::EmailExists => {
            api_error(StatusCode::BAD_REQUEST, e.to_string(), "EMAIL_EXISTS")
        }
        AccountError::InvalidCredentials => {
            api_error(StatusCode::UNAUTHORIZED, e.to_string(), "INVALID_CREDENTIALS")
        }
        AccountError::Password(_) | AccountError::Database(_) => {
            error!(error = %e, "Account operation failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "INTERNAL_ERROR",
            )
        }
    }
}

/// Sign a session token and build the matching `Set-Cookie` header
fn issue_session(
    state: &AppState,
    account: &user::Model,
) -> Result<(String, DateTime<Utc>, HeaderMap), ApiError> {
    let claims = JwtClaims::session(
        account.id.to_string(),
        account.role.as_str().to_string(),
        state.session_ttl,
    );
    let expires_at = claims.expires_at();

    let token = JwtValidator::encode(state.jwt_secret.as_bytes(), &claims).map_err(|e| {
        error!(error = %e, "Failed to sign session token");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create session",
            "TOKEN_ERROR",
        )
    })?;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        state.session_ttl.num_seconds()
    );
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }

    Ok((token, expires_at, headers))
}

fn test_response(mutation: Mutation<TestOutcome>) -> Result<Json<ConnectionTestResponse>, ApiError> {
    let Mutation { value, view } = mutation;
    match value {
        TestOutcome::Connected(status) => Ok(Json(ConnectionTestResponse {
            result: TestResult::Connected,
            status: Some(status),
            listing: RouterConnectionList::from_view(view),
        })),
        TestOutcome::NotConnected => Ok(Json(ConnectionTestResponse {
            result: TestResult::NotConnected,
            status: None,
            listing: None,
        })),
        TestOutcome::AlreadyRunning => Err(api_error(
            StatusCode::CONFLICT,
            "A test for this connection is already running",
            "TEST_IN_PROGRESS",
        )),
        TestOutcome::Failed => Err(api_error(
            StatusCode::BAD_GATEWAY,
            "Failed to test connection",
            "TEST_FAILED",
        )),
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Authentication
// ============================================================================

/// Register a new operator account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid email, weak password or email taken", body = ErrorResponse),
        (status = 403, description = "Sign-up is disabled", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<RegisterResponse>), ApiError> {
    if !state.allow_signup {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "Public registration is disabled",
            "SIGNUP_DISABLED",
        ));
    }

    let account = accounts::register_user(
        &state.db,
        &req.email,
        &req.password,
        req.full_name,
        DbUserRole::User,
    )
    .await
    .map_err(account_error)?;

    let (token, expires_at, headers) = issue_session(&state, &account)?;

    Ok((
        StatusCode::CREATED,
        headers,
        Json(RegisterResponse {
            user: User::from(account),
            token,
            expires_at,
        }),
    ))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let account = accounts::authenticate(&state.db, &req.email, &req.password)
        .await
        .map_err(account_error)?;

    info!(user_id = %account.id, "User signed in");
    let (token, expires_at, headers) = issue_session(&state, &account)?;

    Ok((
        headers,
        Json(LoginResponse {
            user: User::from(account),
            token,
            expires_at,
        }),
    ))
}

/// Sign out by expiring the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout() -> (StatusCode, HeaderMap) {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );
    (StatusCode::NO_CONTENT, headers)
}

/// The signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<User>, ApiError> {
    match accounts::find_by_id(&state.db, principal.user_id).await {
        Ok(Some(account)) => Ok(Json(User::from(account))),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            "User not found",
            "USER_NOT_FOUND",
        )),
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
            "DATABASE_ERROR",
        )),
    }
}

// ============================================================================
// Router connections
// ============================================================================

/// List the caller's router connections, newest first
#[utoipa::path(
    get,
    path = "/api/router-connections",
    responses(
        (status = 200, description = "Router connections", body = RouterConnectionList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "connections"
)]
pub async fn list_connections(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<RouterConnectionList>, ApiError> {
    debug!(user_id = %principal.user_id, "Listing router connections");

    let rows = state.console.list(&principal).await.map_err(store_error)?;
    Ok(Json(RouterConnectionList::fresh(rows)))
}

/// Add a router connection
#[utoipa::path(
    post,
    path = "/api/router-connections",
    request_body = ConnectionForm,
    responses(
        (status = 201, description = "Connection created", body = RouterConnectionMutation),
        (status = 422, description = "Form validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "connections"
)]
pub async fn create_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<ConnectionForm>, JsonRejection>,
) -> Result<(StatusCode, Json<RouterConnectionMutation>), ApiError> {
    let Json(form) = payload.map_err(json_rejection)?;

    let mutation = state
        .console
        .create(&principal, form)
        .await
        .map_err(console_error)?;

    Ok((
        StatusCode::CREATED,
        Json(RouterConnectionMutation::new(
            Some(mutation.value),
            mutation.view,
        )),
    ))
}

/// Get one router connection
#[utoipa::path(
    get,
    path = "/api/router-connections/{id}",
    params(
        ("id" = Uuid, Path, description = "Connection ID")
    ),
    responses(
        (status = 200, description = "Router connection", body = RouterConnection),
        (status = 404, description = "Connection not found", body = ErrorResponse)
    ),
    tag = "connections"
)]
pub async fn get_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouterConnection>, ApiError> {
    let record = state
        .console
        .get(&principal, id)
        .await
        .map_err(store_error)?;
    Ok(Json(RouterConnection::from(record)))
}

/// Edit a router connection; absent fields are left unchanged
#[utoipa::path(
    patch,
    path = "/api/router-connections/{id}",
    params(
        ("id" = Uuid, Path, description = "Connection ID")
    ),
    request_body = ConnectionPatch,
    responses(
        (status = 200, description = "Connection updated", body = RouterConnectionMutation),
        (status = 404, description = "Connection not found", body = ErrorResponse),
        (status = 422, description = "Form validation failed", body = ErrorResponse)
    ),
    tag = "connections"
)]
pub async fn update_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ConnectionPatch>, JsonRejection>,
) -> Result<Json<RouterConnectionMutation>, ApiError> {
    let Json(patch) = payload.map_err(json_rejection)?;

    let mutation = state
        .console
        .update(&principal, id, patch)
        .await
        .map_err(console_error)?;

    Ok(Json(RouterConnectionMutation::new(
        Some(mutation.value),
        mutation.view,
    )))
}

/// Delete a router connection
#[utoipa::path(
    delete,
    path = "/api/router-connections/{id}",
    params(
        ("id" = Uuid, Path, description = "Connection ID")
    ),
    responses(
        (status = 200, description = "Connection deleted", body = RouterConnectionMutation),
        (status = 404, description = "Connection not found", body = ErrorResponse)
    ),
    tag = "connections"
)]
pub async fn delete_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouterConnectionMutation>, ApiError> {
    let mutation = state
        .console
        .delete(&principal, id)
        .await
        .map_err(console_error)?;

    Ok(Json(RouterConnectionMutation::new(None, mutation.view)))
}

/// Test a router connection
#[utoipa::path(
    post,
    path = "/api/router-connections/{id}/test",
    params(
        ("id" = Uuid, Path, description = "Connection ID")
    ),
    responses(
        (status = 200, description = "Test finished", body = ConnectionTestResponse),
        (status = 404, description = "Connection not found", body = ErrorResponse),
        (status = 409, description = "A test is already running", body = ErrorResponse),
        (status = 502, description = "Probe or store failure", body = ErrorResponse)
    ),
    tag = "connections"
)]
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionTestResponse>, ApiError> {
    state
        .console
        .get(&principal, id)
        .await
        .map_err(store_error)?;

    test_response(state.console.test(&principal, id).await)
}

/// Status view of a router connection
#[utoipa::path(
    get,
    path = "/api/router-connections/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Connection ID")
    ),
    responses(
        (status = 200, description = "Connection status", body = RouterApiStatus),
        (status = 404, description = "Connection not found", body = ErrorResponse)
    ),
    tag = "connections"
)]
pub async fn connection_status(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouterApiStatus>, ApiError> {
    let status = state
        .console
        .status(&principal, id)
        .await
        .map_err(store_error)?;
    Ok(Json(status))
}

/// Write the settings form back onto a connection
#[utoipa::path(
    put,
    path = "/api/router-connections/{id}/settings",
    params(
        ("id" = Uuid, Path, description = "Connection ID")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Settings applied", body = RouterConnectionMutation),
        (status = 404, description = "Connection not found", body = ErrorResponse),
        (status = 422, description = "Settings validation failed", body = ErrorResponse)
    ),
    tag = "connections"
)]
pub async fn apply_settings(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<RouterConnectionMutation>, ApiError> {
    let Json(update) = payload.map_err(json_rejection)?;

    let mutation = state
        .console
        .apply_settings(&principal, id, update)
        .await
        .map_err(console_error)?;

    Ok(Json(RouterConnectionMutation::new(
        Some(mutation.value),
        mutation.view,
    )))
}

// ============================================================================
// Settings view: the selected connection
// ============================================================================

fn current_response(record: Option<routerdesk_control::RouterConnection>) -> CurrentConnectionResponse {
    CurrentConnectionResponse {
        status: record.as_ref().map(to_status),
        connection: record.map(RouterConnection::from),
    }
}

fn no_current_connection() -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "No router connection selected",
        "NO_CURRENT_CONNECTION",
    )
}

/// The connection selected for the settings view
#[utoipa::path(
    get,
    path = "/api/settings/current-connection",
    responses(
        (status = 200, description = "Selected connection, or nulls", body = CurrentConnectionResponse)
    ),
    tag = "settings"
)]
pub async fn get_current_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<CurrentConnectionResponse>, ApiError> {
    let current = state
        .console
        .current(&principal)
        .await
        .map_err(store_error)?;
    Ok(Json(current_response(current)))
}

/// Select the connection used by the settings view
#[utoipa::path(
    put,
    path = "/api/settings/current-connection",
    request_body = SelectConnectionRequest,
    responses(
        (status = 200, description = "Selection stored", body = CurrentConnectionResponse),
        (status = 404, description = "Connection not found", body = ErrorResponse)
    ),
    tag = "settings"
)]
pub async fn select_current_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<SelectConnectionRequest>,
) -> Result<Json<CurrentConnectionResponse>, ApiError> {
    let selected = state
        .console
        .select_current(&principal, req.connection_id)
        .await
        .map_err(store_error)?;
    Ok(Json(current_response(Some(selected))))
}

/// Forget the selected connection
#[utoipa::path(
    delete,
    path = "/api/settings/current-connection",
    responses(
        (status = 204, description = "Selection cleared")
    ),
    tag = "settings"
)]
pub async fn clear_current_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<StatusCode, ApiError> {
    state
        .console
        .clear_current(&principal)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Status of the selected router
#[utoipa::path(
    get,
    path = "/api/router/status",
    responses(
        (status = 200, description = "Router status", body = RouterApiStatus),
        (status = 404, description = "No connection selected", body = ErrorResponse)
    ),
    tag = "router"
)]
pub async fn router_status(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<RouterApiStatus>, ApiError> {
    state
        .console
        .current_status(&principal)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(no_current_connection)
}

/// Test the selected router
#[utoipa::path(
    post,
    path = "/api/router/test-connection",
    responses(
        (status = 200, description = "Test finished", body = ConnectionTestResponse),
        (status = 404, description = "No connection selected", body = ErrorResponse),
        (status = 409, description = "A test is already running", body = ErrorResponse),
        (status = 502, description = "Probe or store failure", body = ErrorResponse)
    ),
    tag = "router"
)]
pub async fn router_test_connection(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ConnectionTestResponse>, ApiError> {
    let mutation = state
        .console
        .test_current(&principal)
        .await
        .map_err(store_error)?
        .ok_or_else(no_current_connection)?;
    test_response(mutation)
}

/// Router identity and version
#[utoipa::path(
    get,
    path = "/api/router/system-info",
    responses(
        (status = 200, description = "System information", body = SystemInfo)
    ),
    tag = "router"
)]
pub async fn system_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemInfo>, ApiError> {
    let info = state.telemetry.system_info().await.map_err(telemetry_error)?;
    Ok(Json(info))
}

/// Router CPU, memory and disk usage
#[utoipa::path(
    get,
    path = "/api/router/resources",
    responses(
        (status = 200, description = "Resource usage", body = ResourceUsage)
    ),
    tag = "router"
)]
pub async fn resources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResourceUsage>, ApiError> {
    let usage = state.telemetry.resources().await.map_err(telemetry_error)?;
    Ok(Json(usage))
}

// ============================================================================
// Hotspot and PPPoE accounts
// ============================================================================

async fn list_accounts(
    state: &AppState,
    service: AccountService,
    query: SearchQuery,
) -> Result<Json<Vec<AccessAccount>>, ApiError> {
    let accounts = state
        .telemetry
        .list_accounts(service)
        .await
        .map_err(telemetry_error)?;
    Ok(Json(filter_by_query(accounts, query.search.as_deref())))
}

async fn get_account(
    state: &AppState,
    service: AccountService,
    id: &str,
) -> Result<Json<AccessAccount>, ApiError> {
    let account = state
        .telemetry
        .get_account(service, id)
        .await
        .map_err(telemetry_error)?;
    Ok(Json(account))
}

async fn create_account(
    state: &AppState,
    service: AccountService,
    account: NewAccount,
) -> Result<(StatusCode, Json<AccessAccount>), ApiError> {
    let created = state
        .telemetry
        .create_account(service, account)
        .await
        .map_err(telemetry_error)?;
    info!(?service, id = %created.id, username = %created.username, "Account created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_account(
    state: &AppState,
    service: AccountService,
    id: &str,
    changes: AccountChanges,
) -> Result<Json<AccessAccount>, ApiError> {
    let updated = state
        .telemetry
        .update_account(service, id, changes)
        .await
        .map_err(telemetry_error)?;
    info!(?service, %id, "Account updated");
    Ok(Json(updated))
}

async fn delete_account(
    state: &AppState,
    service: AccountService,
    id: &str,
) -> Result<StatusCode, ApiError> {
    state
        .telemetry
        .delete_account(service, id)
        .await
        .map_err(telemetry_error)?;
    info!(?service, %id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// List hotspot users
#[utoipa::path(
    get,
    path = "/api/hotspot/users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Hotspot users", body = Vec<AccessAccount>)
    ),
    tag = "hotspot"
)]
pub async fn list_hotspot_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<AccessAccount>>, ApiError> {
    list_accounts(&state, AccountService::Hotspot, query).await
}

/// Get a hotspot user
#[utoipa::path(
    get,
    path = "/api/hotspot/users/{id}",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    responses(
        (status = 200, description = "Hotspot user", body = AccessAccount),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "hotspot"
)]
pub async fn get_hotspot_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AccessAccount>, ApiError> {
    get_account(&state, AccountService::Hotspot, &id).await
}

/// Create a hotspot user
#[utoipa::path(
    post,
    path = "/api/hotspot/users",
    request_body = NewAccount,
    responses(
        (status = 201, description = "Hotspot user created", body = AccessAccount),
        (status = 422, description = "Invalid account", body = ErrorResponse)
    ),
    tag = "hotspot"
)]
pub async fn create_hotspot_user(
    State(state): State<Arc<AppState>>,
    Json(account): Json<NewAccount>,
) -> Result<(StatusCode, Json<AccessAccount>), ApiError> {
    create_account(&state, AccountService::Hotspot, account).await
}

/// Update a hotspot user
#[utoipa::path(
    put,
    path = "/api/hotspot/users/{id}",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    request_body = AccountChanges,
    responses(
        (status = 200, description = "Hotspot user updated", body = AccessAccount),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "hotspot"
)]
pub async fn update_hotspot_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(changes): Json<AccountChanges>,
) -> Result<Json<AccessAccount>, ApiError> {
    update_account(&state, AccountService::Hotspot, &id, changes).await
}

/// Delete a hotspot user
#[utoipa::path(
    delete,
    path = "/api/hotspot/users/{id}",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    responses(
        (status = 204, description = "Hotspot user deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "hotspot"
)]
pub async fn delete_hotspot_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_account(&state, AccountService::Hotspot, &id).await
}

/// List PPPoE users
#[utoipa::path(
    get,
    path = "/api/pppoe/users",
    params(SearchQuery),
    responses(
        (status = 200, description = "PPPoE users", body = Vec<AccessAccount>)
    ),
    tag = "pppoe"
)]
pub async fn list_pppoe_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<AccessAccount>>, ApiError> {
    list_accounts(&state, AccountService::Pppoe, query).await
}

/// Get a PPPoE user
#[utoipa::path(
    get,
    path = "/api/pppoe/users/{id}",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    responses(
        (status = 200, description = "PPPoE user", body = AccessAccount),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "pppoe"
)]
pub async fn get_pppoe_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AccessAccount>, ApiError> {
    get_account(&state, AccountService::Pppoe, &id).await
}

/// Create a PPPoE user
#[utoipa::path(
    post,
    path = "/api/pppoe/users",
    request_body = NewAccount,
    responses(
        (status = 201, description = "PPPoE user created", body = AccessAccount),
        (status = 422, description = "Invalid account", body = ErrorResponse)
    ),
    tag = "pppoe"
)]
pub async fn create_pppoe_user(
    State(state): State<Arc<AppState>>,
    Json(account): Json<NewAccount>,
) -> Result<(StatusCode, Json<AccessAccount>), ApiError> {
    create_account(&state, AccountService::Pppoe, account).await
}

/// Update a PPPoE user
#[utoipa::path(
    put,
    path = "/api/pppoe/users/{id}",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    request_body = AccountChanges,
    responses(
        (status = 200, description = "PPPoE user updated", body = AccessAccount),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "pppoe"
)]
pub async fn update_pppoe_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(changes): Json<AccountChanges>,
) -> Result<Json<AccessAccount>, ApiError> {
    update_account(&state, AccountService::Pppoe, &id, changes).await
}

/// Delete a PPPoE user
#[utoipa::path(
    delete,
    path = "/api/pppoe/users/{id}",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    responses(
        (status = 204, description = "PPPoE user deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "pppoe"
)]
pub async fn delete_pppoe_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_account(&state, AccountService::Pppoe, &id).await
}

// ============================================================================
// Devices, firewall, bandwidth, schedules
// ============================================================================

/// List connected devices
#[utoipa::path(
    get,
    path = "/api/devices",
    params(SearchQuery),
    responses(
        (status = 200, description = "Connected devices", body = Vec<ConnectedDevice>)
    ),
    tag = "devices"
)]
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ConnectedDevice>>, ApiError> {
    let devices = state
        .telemetry
        .list_devices()
        .await
        .map_err(telemetry_error)?;
    Ok(Json(filter_by_query(devices, query.search.as_deref())))
}

/// Get a connected device
#[utoipa::path(
    get,
    path = "/api/devices/{id}",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    responses(
        (status = 200, description = "Connected device", body = ConnectedDevice),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "devices"
)]
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConnectedDevice>, ApiError> {
    let device = state
        .telemetry
        .get_device(&id)
        .await
        .map_err(telemetry_error)?;
    Ok(Json(device))
}

/// List firewall rules
#[utoipa::path(
    get,
    path = "/api/firewall/rules",
    params(SearchQuery),
    responses(
        (status = 200, description = "Firewall rules", body = Vec<FirewallRule>)
    ),
    tag = "firewall"
)]
pub async fn list_firewall_rules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<FirewallRule>>, ApiError> {
    let rules = state
        .telemetry
        .list_firewall_rules()
        .await
        .map_err(telemetry_error)?;
    Ok(Json(filter_by_query(rules, query.search.as_deref())))
}

/// Get a firewall rule
#[utoipa::path(
    get,
    path = "/api/firewall/rules/{id}",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    responses(
        (status = 200, description = "Firewall rule", body = FirewallRule),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "firewall"
)]
pub async fn get_firewall_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FirewallRule>, ApiError> {
    let rule = state
        .telemetry
        .get_firewall_rule(&id)
        .await
        .map_err(telemetry_error)?;
    Ok(Json(rule))
}

/// Enable a firewall rule
#[utoipa::path(
    post,
    path = "/api/firewall/rules/{id}/enable",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    responses(
        (status = 200, description = "Rule enabled", body = FirewallRule),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "firewall"
)]
pub async fn enable_firewall_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FirewallRule>, ApiError> {
    let rule = state
        .telemetry
        .set_firewall_rule_disabled(&id, false)
        .await
        .map_err(telemetry_error)?;
    info!(%id, "Firewall rule enabled");
    Ok(Json(rule))
}

/// Disable a firewall rule
#[utoipa::path(
    post,
    path = "/api/firewall/rules/{id}/disable",
    params(("id" = String, Path, description = "RouterOS id, e.g. *1")),
    responses(
        (status = 200, description = "Rule disabled", body = FirewallRule),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "firewall"
)]
pub async fn disable_firewall_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FirewallRule>, ApiError> {
    let rule = state
        .telemetry
        .set_firewall_rule_disabled(&id, true)
        .await
        .map_err(telemetry_error)?;
    info!(%id, "Firewall rule disabled");
    Ok(Json(rule))
}

/// List bandwidth profiles
#[utoipa::path(
    get,
    path = "/api/bandwidth/profiles",
    responses(
        (status = 200, description = "Bandwidth profiles", body = Vec<BandwidthProfile>)
    ),
    tag = "bandwidth"
)]
pub async fn list_bandwidth_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BandwidthProfile>>, ApiError> {
    let profiles = state
        .telemetry
        .list_bandwidth_profiles()
        .await
        .map_err(telemetry_error)?;
    Ok(Json(profiles))
}

/// List access schedules
#[utoipa::path(
    get,
    path = "/api/schedules",
    responses(
        (status = 200, description = "Access schedules", body = Vec<AccessSchedule>)
    ),
    tag = "schedules"
)]
pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccessSchedule>>, ApiError> {
    let schedules = state
        .telemetry
        .list_schedules()
        .await
        .map_err(telemetry_error)?;
    Ok(Json(schedules))
}

/// Dashboard summary cards
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    ),
    tag = "dashboard"
)]
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, ApiError> {
    let stats = DashboardStats::collect(state.telemetry.as_ref())
        .await
        .map_err(telemetry_error)?;
    Ok(Json(stats))
}

/// Take the caller's pending notices, oldest first
#[utoipa::path(
    get,
    path = "/api/notices",
    responses(
        (status = 200, description = "Pending notices", body = NoticeList)
    ),
    tag = "notices"
)]
pub async fn drain_notices(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Json<NoticeList> {
    Json(NoticeList {
        notices: state.console.notices().drain(principal.user_id),
    })
}
