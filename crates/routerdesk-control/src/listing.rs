//! Presentation helpers for list and detail views

use crate::telemetry::{
    AccessAccount, AccountService, AccountStatus, ConnectedDevice, FirewallRule, RouterTelemetry,
    TelemetryError,
};
use chrono::{DateTime, Utc};
use routerdesk_db::entities::router_connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte count, 1024-based, at most two decimals
///
/// ```
/// use routerdesk_control::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", BYTE_UNITS[unit])
}

/// Something a list view can filter with its search box
pub trait Searchable {
    /// Fields the search box matches against
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

impl Searchable for AccessAccount {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.username.as_str()];
        fields.extend(self.mac_address.as_deref());
        fields.extend(self.ip_address.as_deref());
        fields
    }
}

impl Searchable for ConnectedDevice {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.mac_address.as_str(), self.ip_address.as_str()];
        fields.extend(self.hostname.as_deref());
        fields
    }
}

impl Searchable for FirewallRule {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.chain.as_str(), self.action.as_str()];
        fields.extend(self.src_address.as_deref());
        fields.extend(self.dst_address.as_deref());
        fields.extend(self.comment.as_deref());
        fields
    }
}

/// Keep the items matching `query`; a blank query keeps everything
pub fn filter_by_query<T: Searchable>(items: Vec<T>, query: Option<&str>) -> Vec<T> {
    match query {
        Some(query) if !query.trim().is_empty() => {
            items.into_iter().filter(|item| item.matches(query)).collect()
        }
        _ => items,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum ConnectionStatusLabel {
    Active,
    Inactive,
}

/// One row of the router connections table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConnectionRow {
    pub id: Uuid,
    pub name: String,
    /// `address:port`
    pub endpoint: String,
    pub username: String,
    pub ssl: bool,
    pub status: ConnectionStatusLabel,
    pub last_connected: String,
}

impl From<&router_connection::Model> for ConnectionRow {
    fn from(record: &router_connection::Model) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            endpoint: format!("{}:{}", record.router_ip, record.api_port),
            username: record.api_username.clone(),
            ssl: record.api_ssl,
            status: if record.is_active {
                ConnectionStatusLabel::Active
            } else {
                ConnectionStatusLabel::Inactive
            },
            last_connected: display_timestamp(record.last_connected),
        }
    }
}

fn display_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Never".to_string())
}

/// Dashboard summary cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DashboardStats {
    pub active_hotspot_users: usize,
    pub total_hotspot_users: usize,
    pub active_pppoe_users: usize,
    pub total_pppoe_users: usize,
    pub connected_devices: usize,
    pub active_firewall_rules: usize,
    pub cpu_usage: u8,
    pub memory_usage: u8,
    pub uptime: String,
}

impl DashboardStats {
    pub async fn collect(telemetry: &dyn RouterTelemetry) -> Result<Self, TelemetryError> {
        let hotspot = telemetry.list_accounts(AccountService::Hotspot).await?;
        let pppoe = telemetry.list_accounts(AccountService::Pppoe).await?;
        let devices = telemetry.list_devices().await?;
        let rules = telemetry.list_firewall_rules().await?;
        let resources = telemetry.resources().await?;

        let active = |accounts: &[AccessAccount]| {
            accounts
                .iter()
                .filter(|a| a.status == AccountStatus::Active)
                .count()
        };

        Ok(Self {
            active_hotspot_users: active(&hotspot),
            total_hotspot_users: hotspot.len(),
            active_pppoe_users: active(&pppoe),
            total_pppoe_users: pppoe.len(),
            connected_devices: devices
                .iter()
                .filter(|d| d.status == AccountStatus::Active)
                .count(),
            active_firewall_rules: rules.iter().filter(|r| !r.disabled).count(),
            cpu_usage: resources.cpu_load,
            memory_usage: resources.memory_usage_percent(),
            uptime: resources.uptime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::MockTelemetry;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_500_000), "1.43 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(format_bytes(2 * 1024_u64.pow(5)), "2048 TB");
    }

    #[tokio::test]
    async fn test_search_hotspot_users() {
        let users = MockTelemetry::seeded()
            .list_accounts(AccountService::Hotspot)
            .await
            .unwrap();

        let by_name = filter_by_query(users.clone(), Some("HOTEL"));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].username, "hotel505");

        let by_mac = filter_by_query(users.clone(), Some("ee:33"));
        assert_eq!(by_mac[0].username, "cafecustomer");

        let by_ip = filter_by_query(users.clone(), Some("192.168.1.10"));
        assert_eq!(by_ip.len(), 5);

        assert_eq!(filter_by_query(users.clone(), Some("   ")).len(), 5);
        assert_eq!(filter_by_query(users, None).len(), 5);
    }

    #[tokio::test]
    async fn test_search_devices_and_rules() {
        let telemetry = MockTelemetry::seeded();

        let devices = filter_by_query(telemetry.list_devices().await.unwrap(), Some("printer"));
        assert_eq!(devices.len(), 1);

        let rules = filter_by_query(
            telemetry.list_firewall_rules().await.unwrap(),
            Some("telnet"),
        );
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].action, "drop");
    }

    #[test]
    fn test_connection_row() {
        let record = router_connection::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Office".to_string(),
            router_ip: "10.0.0.1".to_string(),
            api_port: 8728,
            api_username: "admin".to_string(),
            api_password: "s3cret".to_string(),
            api_ssl: false,
            is_active: false,
            last_connected: None,
            created_at: Utc::now(),
        };

        let row = ConnectionRow::from(&record);
        assert_eq!(row.endpoint, "10.0.0.1:8728");
        assert_eq!(row.status, ConnectionStatusLabel::Inactive);
        assert_eq!(row.last_connected, "Never");
        assert!(!serde_json::to_string(&row).unwrap().contains("s3cret"));
    }

    #[tokio::test]
    async fn test_dashboard_stats_from_seed() {
        let stats = DashboardStats::collect(&MockTelemetry::seeded())
            .await
            .unwrap();

        assert_eq!(stats.total_hotspot_users, 5);
        assert_eq!(stats.active_hotspot_users, 4);
        assert_eq!(stats.total_pppoe_users, 3);
        assert_eq!(stats.active_pppoe_users, 2);
        assert_eq!(stats.connected_devices, 3);
        assert_eq!(stats.active_firewall_rules, 3);
        assert_eq!(stats.cpu_usage, 24);
        assert_eq!(stats.memory_usage, 37);
    }
}
