//! Status Reconciler
//!
//! Converts between the persisted [`router_connection::Model`] and the
//! derived [`RouterApiStatus`] shown in the settings view. Both directions
//! are pure; the `_at` variants take the clock as a parameter.

use crate::store::ConnectionChanges;
use chrono::{DateTime, Utc};
use routerdesk_db::entities::router_connection;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Connectivity as reported by a probe or projected from a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Connected,
    Disconnected,
}

/// Health view of one router API endpoint; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RouterApiStatus {
    pub status: ConnectivityState,
    pub router_ip: String,
    pub api_port: u16,
    pub username: String,
    pub api_enabled: bool,
    pub api_ssl_enabled: bool,
    pub ping_status: bool,
    pub permissions_valid: bool,
    pub last_checked: DateTime<Utc>,
}

impl RouterApiStatus {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectivityState::Connected
    }
}

/// The settings-form subset of [`RouterApiStatus`] that may be written back
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StatusUpdate {
    #[serde(default)]
    pub router_ip: Option<String>,
    /// Wider than a port so out-of-range input reaches validation
    #[serde(default)]
    pub api_port: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub api_ssl_enabled: Option<bool>,
}

impl From<&RouterApiStatus> for StatusUpdate {
    fn from(status: &RouterApiStatus) -> Self {
        Self {
            router_ip: Some(status.router_ip.clone()),
            api_port: Some(i64::from(status.api_port)),
            username: Some(status.username.clone()),
            api_ssl_enabled: Some(status.api_ssl_enabled),
        }
    }
}

/// Project a stored connection into its status view
pub fn to_status(record: &router_connection::Model) -> RouterApiStatus {
    to_status_at(record, Utc::now())
}

/// [`to_status`] with an explicit clock, used when `last_connected` is unset
pub fn to_status_at(record: &router_connection::Model, now: DateTime<Utc>) -> RouterApiStatus {
    let state = if record.is_active {
        ConnectivityState::Connected
    } else {
        ConnectivityState::Disconnected
    };

    RouterApiStatus {
        status: state,
        router_ip: record.router_ip.clone(),
        // Ports are validated to 1..=65535 before they are stored
        api_port: u16::try_from(record.api_port).unwrap_or_default(),
        username: record.api_username.clone(),
        api_enabled: record.is_active,
        api_ssl_enabled: record.api_ssl,
        ping_status: record.is_active,
        permissions_valid: true,
        last_checked: record.last_connected.unwrap_or(now),
    }
}

/// Turn a (partial) status back into column changes, stamping `last_connected`
pub fn to_update(update: &StatusUpdate) -> ConnectionChanges {
    to_update_at(update, Utc::now())
}

pub fn to_update_at(update: &StatusUpdate, now: DateTime<Utc>) -> ConnectionChanges {
    ConnectionChanges {
        router_ip: update.router_ip.clone(),
        // Out-of-range ports are rejected by `validate_settings` before this runs
        api_port: update.api_port.and_then(|port| u16::try_from(port).ok()),
        api_username: update.username.clone(),
        api_ssl: update.api_ssl_enabled,
        last_connected: Some(now),
        ..ConnectionChanges::default()
    }
}
