//! Router-side resources: hotspot and PPPoE accounts, devices, firewall,
//! bandwidth profiles and schedules
//!
//! [`MockTelemetry`] is an in-memory router seeded with demo data. Ids follow
//! RouterOS conventions (`*1`, `*2`, ...).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid {kind}: {reason}")]
    Invalid { kind: &'static str, reason: String },
}

/// Which access service an account belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AccountService {
    Hotspot,
    Pppoe,
}

impl AccountService {
    fn kind(self) -> &'static str {
        match self {
            AccountService::Hotspot => "Hotspot user",
            AccountService::Pppoe => "PPPoE user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

/// A hotspot or PPPoE account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AccessAccount {
    pub id: String,
    pub username: String,
    /// Write-only
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub profile: String,
    pub uptime: String,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub status: AccountStatus,
    pub mac_address: Option<String>,
    pub ip_address: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewAccount {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AccountChanges {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub status: Option<AccountStatus>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConnectedDevice {
    pub id: String,
    pub mac_address: String,
    pub ip_address: String,
    pub hostname: Option<String>,
    pub uptime: String,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub status: AccountStatus,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FirewallRule {
    pub id: String,
    pub chain: String,
    pub action: String,
    pub protocol: Option<String>,
    pub src_address: Option<String>,
    pub dst_address: Option<String>,
    pub src_port: Option<String>,
    pub dst_port: Option<String>,
    pub comment: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BandwidthProfile {
    pub id: String,
    pub name: String,
    pub max_limit_up: String,
    pub max_limit_down: String,
    pub burst_limit_up: Option<String>,
    pub burst_limit_down: Option<String>,
    pub priority: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AccessSchedule {
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub days_of_week: Vec<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SystemInfo {
    pub identity: String,
    pub board_name: String,
    pub version: String,
    pub architecture: String,
    pub uptime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ResourceUsage {
    /// Percent
    pub cpu_load: u8,
    pub free_memory: u64,
    pub total_memory: u64,
    pub free_hdd_space: u64,
    pub total_hdd_space: u64,
    pub uptime: String,
}

impl ResourceUsage {
    pub fn memory_usage_percent(&self) -> u8 {
        if self.total_memory == 0 {
            return 0;
        }
        let used = self.total_memory.saturating_sub(self.free_memory);
        ((used * 100) / self.total_memory).min(100) as u8
    }
}

/// Read/write access to a router's managed resources
#[async_trait]
pub trait RouterTelemetry: Send + Sync {
    async fn system_info(&self) -> Result<SystemInfo, TelemetryError>;

    async fn resources(&self) -> Result<ResourceUsage, TelemetryError>;

    async fn list_accounts(
        &self,
        service: AccountService,
    ) -> Result<Vec<AccessAccount>, TelemetryError>;

    async fn get_account(
        &self,
        service: AccountService,
        id: &str,
    ) -> Result<AccessAccount, TelemetryError>;

    async fn create_account(
        &self,
        service: AccountService,
        account: NewAccount,
    ) -> Result<AccessAccount, TelemetryError>;

    async fn update_account(
        &self,
        service: AccountService,
        id: &str,
        changes: AccountChanges,
    ) -> Result<AccessAccount, TelemetryError>;

    async fn delete_account(&self, service: AccountService, id: &str)
        -> Result<(), TelemetryError>;

    async fn list_devices(&self) -> Result<Vec<ConnectedDevice>, TelemetryError>;

    async fn get_device(&self, id: &str) -> Result<ConnectedDevice, TelemetryError>;

    async fn list_firewall_rules(&self) -> Result<Vec<FirewallRule>, TelemetryError>;

    async fn get_firewall_rule(&self, id: &str) -> Result<FirewallRule, TelemetryError>;

    async fn set_firewall_rule_disabled(
        &self,
        id: &str,
        disabled: bool,
    ) -> Result<FirewallRule, TelemetryError>;

    async fn list_bandwidth_profiles(&self) -> Result<Vec<BandwidthProfile>, TelemetryError>;

    async fn list_schedules(&self) -> Result<Vec<AccessSchedule>, TelemetryError>;
}

struct TelemetryState {
    next_id: u64,
    system: SystemInfo,
    resources: ResourceUsage,
    hotspot: Vec<AccessAccount>,
    pppoe: Vec<AccessAccount>,
    devices: Vec<ConnectedDevice>,
    firewall: Vec<FirewallRule>,
    bandwidth: Vec<BandwidthProfile>,
    schedules: Vec<AccessSchedule>,
}

impl TelemetryState {
    fn accounts(&self, service: AccountService) -> &Vec<AccessAccount> {
        match service {
            AccountService::Hotspot => &self.hotspot,
            AccountService::Pppoe => &self.pppoe,
        }
    }

    fn accounts_mut(&mut self, service: AccountService) -> &mut Vec<AccessAccount> {
        match service {
            AccountService::Hotspot => &mut self.hotspot,
            AccountService::Pppoe => &mut self.pppoe,
        }
    }

    fn allocate_id(&mut self) -> String {
        let id = format!("*{:X}", self.next_id);
        self.next_id += 1;
        id
    }
}

fn not_found(kind: &'static str, id: &str) -> TelemetryError {
    TelemetryError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// In-memory router with demo data
pub struct MockTelemetry {
    state: RwLock<TelemetryState>,
}

impl MockTelemetry {
    /// A router with no accounts, devices or rules
    pub fn empty() -> Self {
        Self {
            state: RwLock::new(TelemetryState {
                next_id: 1,
                system: SystemInfo {
                    identity: "MikroTik".to_string(),
                    board_name: "hAP ac²".to_string(),
                    version: "7.14.3 (stable)".to_string(),
                    architecture: "arm".to_string(),
                    uptime: "0d 0h 0m".to_string(),
                },
                resources: ResourceUsage {
                    cpu_load: 0,
                    free_memory: 128 * 1024 * 1024,
                    total_memory: 128 * 1024 * 1024,
                    free_hdd_space: 16 * 1024 * 1024,
                    total_hdd_space: 16 * 1024 * 1024,
                    uptime: "0d 0h 0m".to_string(),
                },
                hotspot: Vec::new(),
                pppoe: Vec::new(),
                devices: Vec::new(),
                firewall: Vec::new(),
                bandwidth: Vec::new(),
                schedules: Vec::new(),
            }),
        }
    }

    /// A router populated with the demo data set
    pub fn seeded() -> Self {
        let now = Utc::now();
        let mut state = Self::empty().state.into_inner();

        state.system.uptime = "18d 6h 32m".to_string();
        state.resources = ResourceUsage {
            cpu_load: 24,
            free_memory: 80 * 1024 * 1024,
            total_memory: 128 * 1024 * 1024,
            free_hdd_space: 9 * 1024 * 1024,
            total_hdd_space: 16 * 1024 * 1024,
            uptime: "18d 6h 32m".to_string(),
        };

        let hotspot_seed = [
            ("guest1", "default", "2h 15m", 1_500_000, 500_000, AccountStatus::Active, "AA:BB:CC:DD:EE:FF", "192.168.1.101", Some("Guest user"), 7),
            ("user123", "premium", "5h 30m", 5_000_000, 2_000_000, AccountStatus::Active, "AA:BB:CC:DD:EE:11", "192.168.1.102", None, 14),
            ("visitor42", "basic", "0h 0m", 0, 0, AccountStatus::Inactive, "AA:BB:CC:DD:EE:22", "192.168.1.103", Some("Temporary access"), 2),
            ("cafecustomer", "hourly", "0h 45m", 250_000, 100_000, AccountStatus::Active, "AA:BB:CC:DD:EE:33", "192.168.1.104", None, 1),
            ("hotel505", "premium", "12h 10m", 8_500_000, 3_500_000, AccountStatus::Active, "AA:BB:CC:DD:EE:44", "192.168.1.105", Some("Room 505"), 3),
        ];
        for (username, profile, uptime, bytes_in, bytes_out, status, mac, ip, comment, age_days) in
            hotspot_seed
        {
            let id = state.allocate_id();
            state.hotspot.push(AccessAccount {
                id,
                username: username.to_string(),
                password: None,
                profile: profile.to_string(),
                uptime: uptime.to_string(),
                bytes_in,
                bytes_out,
                status,
                mac_address: Some(mac.to_string()),
                ip_address: Some(ip.to_string()),
                comment: comment.map(str::to_string),
                created_at: now - Duration::days(age_days),
            });
        }

        let pppoe_seed = [
            ("pppoe-smith", "10M", "3d 4h 12m", 42_000_000_000, 6_500_000_000, AccountStatus::Active, "10.10.0.2", Some("Smith residence")),
            ("pppoe-garcia", "20M", "1d 2h 0m", 18_300_000_000, 2_100_000_000, AccountStatus::Active, "10.10.0.3", None),
            ("pppoe-lee", "10M", "0h 0m", 0, 0, AccountStatus::Inactive, "10.10.0.4", Some("Suspended")),
        ];
        for (username, profile, uptime, bytes_in, bytes_out, status, ip, comment) in pppoe_seed {
            let id = state.allocate_id();
            state.pppoe.push(AccessAccount {
                id,
                username: username.to_string(),
                password: None,
                profile: profile.to_string(),
                uptime: uptime.to_string(),
                bytes_in,
                bytes_out,
                status,
                mac_address: None,
                ip_address: Some(ip.to_string()),
                comment: comment.map(str::to_string),
                created_at: now - Duration::days(30),
            });
        }

        let device_seed = [
            ("AA:BB:CC:DD:EE:FF", "192.168.1.101", Some("guest-phone"), "2h 15m", 1_500_000, 500_000, AccountStatus::Active),
            ("AA:BB:CC:DD:EE:11", "192.168.1.102", Some("laptop-user123"), "5h 30m", 5_000_000, 2_000_000, AccountStatus::Active),
            ("3C:22:FB:10:4A:01", "192.168.1.20", Some("printer-office"), "18d 6h 30m", 12_000_000, 800_000, AccountStatus::Active),
            ("F0:9F:C2:77:00:12", "192.168.1.30", None, "0h 0m", 0, 0, AccountStatus::Inactive),
        ];
        for (mac, ip, hostname, uptime, bytes_in, bytes_out, status) in device_seed {
            let id = state.allocate_id();
            state.devices.push(ConnectedDevice {
                id,
                mac_address: mac.to_string(),
                ip_address: ip.to_string(),
                hostname: hostname.map(str::to_string),
                uptime: uptime.to_string(),
                bytes_in,
                bytes_out,
                status,
                comment: None,
            });
        }

        let firewall_seed = [
            ("input", "accept", None, None, None, None, Some("established,related"), false),
            ("input", "drop", Some("tcp"), None, None, Some("23"), Some("Block telnet"), false),
            ("forward", "drop", None, Some("192.168.1.30"), None, None, Some("Quarantined device"), false),
            ("forward", "accept", Some("tcp"), None, Some("10.0.0.10"), Some("443"), Some("Allow HTTPS to server"), true),
        ];
        for (chain, action, protocol, src, dst, dst_port, comment, disabled) in firewall_seed {
            let id = state.allocate_id();
            state.firewall.push(FirewallRule {
                id,
                chain: chain.to_string(),
                action: action.to_string(),
                protocol: protocol.map(str::to_string),
                src_address: src.map(str::to_string),
                dst_address: dst.map(str::to_string),
                src_port: None,
                dst_port: dst_port.map(str::to_string),
                comment: comment.map(str::to_string),
                disabled,
            });
        }

        let bandwidth_seed = [
            ("basic", "1M", "2M", None, Some("8")),
            ("premium", "10M", "20M", Some("30M"), Some("1")),
            ("hourly", "2M", "5M", None, Some("5")),
        ];
        for (name, up, down, burst_down, priority) in bandwidth_seed {
            let id = state.allocate_id();
            state.bandwidth.push(BandwidthProfile {
                id,
                name: name.to_string(),
                max_limit_up: up.to_string(),
                max_limit_down: down.to_string(),
                burst_limit_up: None,
                burst_limit_down: burst_down.map(str::to_string),
                priority: priority.map(str::to_string),
                comment: None,
            });
        }

        let weekdays = ["mon", "tue", "wed", "thu", "fri"];
        let id = state.allocate_id();
        state.schedules.push(AccessSchedule {
            id,
            name: "Office hours".to_string(),
            start_time: "08:00".to_string(),
            end_time: "18:00".to_string(),
            days_of_week: weekdays.iter().map(|d| d.to_string()).collect(),
            comment: None,
        });
        let id = state.allocate_id();
        state.schedules.push(AccessSchedule {
            id,
            name: "Weekend guests".to_string(),
            start_time: "10:00".to_string(),
            end_time: "22:00".to_string(),
            days_of_week: vec!["sat".to_string(), "sun".to_string()],
            comment: Some("Guest hotspot only".to_string()),
        });

        Self {
            state: RwLock::new(state),
        }
    }
}

impl Default for MockTelemetry {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl RouterTelemetry for MockTelemetry {
    async fn system_info(&self) -> Result<SystemInfo, TelemetryError> {
        Ok(self.state.read().await.system.clone())
    }

    async fn resources(&self) -> Result<ResourceUsage, TelemetryError> {
        Ok(self.state.read().await.resources.clone())
    }

    async fn list_accounts(
        &self,
        service: AccountService,
    ) -> Result<Vec<AccessAccount>, TelemetryError> {
        Ok(self.state.read().await.accounts(service).clone())
    }

    async fn get_account(
        &self,
        service: AccountService,
        id: &str,
    ) -> Result<AccessAccount, TelemetryError> {
        self.state
            .read()
            .await
            .accounts(service)
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| not_found(service.kind(), id))
    }

    async fn create_account(
        &self,
        service: AccountService,
        account: NewAccount,
    ) -> Result<AccessAccount, TelemetryError> {
        let username = account.username.trim().to_string();
        if username.is_empty() {
            return Err(TelemetryError::Invalid {
                kind: service.kind(),
                reason: "Username is required".to_string(),
            });
        }

        let mut state = self.state.write().await;
        if state.accounts(service).iter().any(|a| a.username == username) {
            return Err(TelemetryError::Invalid {
                kind: service.kind(),
                reason: format!("Username {username} already exists"),
            });
        }

        let created = AccessAccount {
            id: state.allocate_id(),
            username,
            password: account.password,
            profile: non_blank(account.profile).unwrap_or_else(|| "default".to_string()),
            uptime: "0h 0m".to_string(),
            bytes_in: 0,
            bytes_out: 0,
            status: AccountStatus::Inactive,
            mac_address: non_blank(account.mac_address),
            ip_address: non_blank(account.ip_address),
            comment: non_blank(account.comment),
            created_at: Utc::now(),
        };
        state.accounts_mut(service).push(created.clone());

        debug!(id = %created.id, username = %created.username, ?service, "Created account");
        Ok(created)
    }

    async fn update_account(
        &self,
        service: AccountService,
        id: &str,
        changes: AccountChanges,
    ) -> Result<AccessAccount, TelemetryError> {
        let mut state = self.state.write().await;
        let account = state
            .accounts_mut(service)
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found(service.kind(), id))?;

        if let Some(username) = changes.username {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(TelemetryError::Invalid {
                    kind: service.kind(),
                    reason: "Username is required".to_string(),
                });
            }
            account.username = username;
        }
        if let Some(password) = changes.password {
            account.password = Some(password);
        }
        if let Some(profile) = non_blank(changes.profile) {
            account.profile = profile;
        }
        if let Some(status) = changes.status {
            account.status = status;
        }
        if let Some(mac_address) = changes.mac_address {
            account.mac_address = non_blank(Some(mac_address));
        }
        if let Some(ip_address) = changes.ip_address {
            account.ip_address = non_blank(Some(ip_address));
        }
        if let Some(comment) = changes.comment {
            account.comment = non_blank(Some(comment));
        }

        Ok(account.clone())
    }

    async fn delete_account(
        &self,
        service: AccountService,
        id: &str,
    ) -> Result<(), TelemetryError> {
        let mut state = self.state.write().await;
        let accounts = state.accounts_mut(service);
        let before = accounts.len();
        accounts.retain(|a| a.id != id);

        if accounts.len() == before {
            return Err(not_found(service.kind(), id));
        }
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<ConnectedDevice>, TelemetryError> {
        Ok(self.state.read().await.devices.clone())
    }

    async fn get_device(&self, id: &str) -> Result<ConnectedDevice, TelemetryError> {
        self.state
            .read()
            .await
            .devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| not_found("Device", id))
    }

    async fn list_firewall_rules(&self) -> Result<Vec<FirewallRule>, TelemetryError> {
        Ok(self.state.read().await.firewall.clone())
    }

    async fn get_firewall_rule(&self, id: &str) -> Result<FirewallRule, TelemetryError> {
        self.state
            .read()
            .await
            .firewall
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found("Firewall rule", id))
    }

    async fn set_firewall_rule_disabled(
        &self,
        id: &str,
        disabled: bool,
    ) -> Result<FirewallRule, TelemetryError> {
        let mut state = self.state.write().await;
        let rule = state
            .firewall
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("Firewall rule", id))?;

        rule.disabled = disabled;
        debug!(id, disabled, "Firewall rule toggled");
        Ok(rule.clone())
    }

    async fn list_bandwidth_profiles(&self) -> Result<Vec<BandwidthProfile>, TelemetryError> {
        Ok(self.state.read().await.bandwidth.clone())
    }

    async fn list_schedules(&self) -> Result<Vec<AccessSchedule>, TelemetryError> {
        Ok(self.state.read().await.schedules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_hotspot_users() {
        let telemetry = MockTelemetry::seeded();
        let users = telemetry.list_accounts(AccountService::Hotspot).await.unwrap();

        assert_eq!(users.len(), 5);
        assert_eq!(users[0].username, "guest1");
        assert_eq!(users[0].bytes_in, 1_500_000);
        assert_eq!(
            users
                .iter()
                .filter(|u| u.status == AccountStatus::Active)
                .count(),
            4
        );
    }

    #[tokio::test]
    async fn test_account_lifecycle() {
        let telemetry = MockTelemetry::empty();

        let created = telemetry
            .create_account(
                AccountService::Pppoe,
                NewAccount {
                    username: "pppoe-new".to_string(),
                    password: Some("secret".to_string()),
                    ..NewAccount::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.profile, "default");
        assert_eq!(created.status, AccountStatus::Inactive);

        let updated = telemetry
            .update_account(
                AccountService::Pppoe,
                &created.id,
                AccountChanges {
                    status: Some(AccountStatus::Active),
                    comment: Some("Enabled".to_string()),
                    ..AccountChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AccountStatus::Active);
        assert_eq!(updated.comment.as_deref(), Some("Enabled"));

        // Hotspot and PPPoE are separate tables
        assert!(telemetry
            .get_account(AccountService::Hotspot, &created.id)
            .await
            .is_err());

        telemetry
            .delete_account(AccountService::Pppoe, &created.id)
            .await
            .unwrap();
        assert!(matches!(
            telemetry
                .delete_account(AccountService::Pppoe, &created.id)
                .await,
            Err(TelemetryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_account_requires_unique_username() {
        let telemetry = MockTelemetry::seeded();

        let blank = telemetry
            .create_account(AccountService::Hotspot, NewAccount::default())
            .await;
        assert!(matches!(blank, Err(TelemetryError::Invalid { .. })));

        let duplicate = telemetry
            .create_account(
                AccountService::Hotspot,
                NewAccount {
                    username: "guest1".to_string(),
                    ..NewAccount::default()
                },
            )
            .await;
        assert!(matches!(duplicate, Err(TelemetryError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_password_not_serialized() {
        let telemetry = MockTelemetry::empty();
        let created = telemetry
            .create_account(
                AccountService::Hotspot,
                NewAccount {
                    username: "walkin".to_string(),
                    password: Some("letmein".to_string()),
                    ..NewAccount::default()
                },
            )
            .await
            .unwrap();

        let json = serde_json::to_string(&created).unwrap();
        assert!(!json.contains("letmein"));
    }

    #[tokio::test]
    async fn test_toggle_firewall_rule() {
        let telemetry = MockTelemetry::seeded();
        let rules = telemetry.list_firewall_rules().await.unwrap();
        let rule = rules.iter().find(|r| r.disabled).unwrap();

        let enabled = telemetry
            .set_firewall_rule_disabled(&rule.id, false)
            .await
            .unwrap();
        assert!(!enabled.disabled);
        assert!(!telemetry.get_firewall_rule(&rule.id).await.unwrap().disabled);

        assert!(telemetry
            .set_firewall_rule_disabled("*FFFF", true)
            .await
            .is_err());
    }

    #[test]
    fn test_memory_usage_percent() {
        let usage = ResourceUsage {
            cpu_load: 10,
            free_memory: 25,
            total_memory: 100,
            free_hdd_space: 0,
            total_hdd_space: 0,
            uptime: String::new(),
        };
        assert_eq!(usage.memory_usage_percent(), 75);
    }
}
