//! Connection form validation
//!
//! A form that fails here never reaches the store.

use crate::reconciler::StatusUpdate;
use crate::store::{ConnectionChanges, NewConnection};
use routerdesk_db::entities::router_connection::DEFAULT_API_PORT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

pub const NAME_REQUIRED: &str = "Name is required";
pub const ROUTER_IP_REQUIRED: &str = "Router IP is required";
pub const API_PORT_REQUIRED: &str = "API Port is required";
pub const API_USERNAME_REQUIRED: &str = "API Username is required";
pub const API_PORT_RANGE: &str = "API Port must be between 1 and 65535";

fn default_api_port() -> Option<i64> {
    Some(i64::from(DEFAULT_API_PORT))
}

/// Per-field validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FormErrors {
    pub fields: BTreeMap<String, String>,
}

impl FormErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.fields.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "Invalid connection form ({})", summary.join(", "))
    }
}

impl std::error::Error for FormErrors {}

/// Fields of the "add connection" dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConnectionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub router_ip: String,
    /// Absent means the default port; an explicit `null` means "cleared".
    /// Kept wider than `u16` so out-of-range values get a field message.
    #[serde(default = "default_api_port")]
    pub api_port: Option<i64>,
    #[serde(default)]
    pub api_username: String,
    #[serde(default)]
    pub api_password: String,
    #[serde(default)]
    pub api_ssl: bool,
}

impl Default for ConnectionForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            router_ip: String::new(),
            api_port: default_api_port(),
            api_username: String::new(),
            api_password: String::new(),
            api_ssl: false,
        }
    }
}

fn required(errors: &mut FormErrors, field: &str, value: &str, message: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, message);
    }
    trimmed.to_string()
}

fn check_port(errors: &mut FormErrors, port: Option<i64>) -> u16 {
    match port.map(u16::try_from) {
        None => {
            errors.add("api_port", API_PORT_REQUIRED);
            0
        }
        Some(Ok(port)) if port > 0 => port,
        Some(_) => {
            errors.add("api_port", API_PORT_RANGE);
            0
        }
    }
}

impl ConnectionForm {
    pub fn validate(self) -> Result<NewConnection, FormErrors> {
        let mut errors = FormErrors::default();

        let name = required(&mut errors, "name", &self.name, NAME_REQUIRED);
        let router_ip = required(&mut errors, "router_ip", &self.router_ip, ROUTER_IP_REQUIRED);
        let api_port = check_port(&mut errors, self.api_port);
        let api_username = required(
            &mut errors,
            "api_username",
            &self.api_username,
            API_USERNAME_REQUIRED,
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewConnection {
            name,
            router_ip,
            api_port,
            api_username,
            api_password: self.api_password,
            api_ssl: self.api_ssl,
        })
    }
}

/// Fields of the "edit connection" dialog; absent fields stay as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConnectionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub router_ip: Option<String>,
    #[serde(default)]
    pub api_port: Option<i64>,
    #[serde(default)]
    pub api_username: Option<String>,
    #[serde(default)]
    pub api_password: Option<String>,
    #[serde(default)]
    pub api_ssl: Option<bool>,
}

impl ConnectionPatch {
    pub fn validate(self) -> Result<ConnectionChanges, FormErrors> {
        let mut errors = FormErrors::default();

        let name = self
            .name
            .map(|v| required(&mut errors, "name", &v, NAME_REQUIRED));
        let router_ip = self
            .router_ip
            .map(|v| required(&mut errors, "router_ip", &v, ROUTER_IP_REQUIRED));
        let api_port = self
            .api_port
            .map(|port| check_port(&mut errors, Some(port)));
        let api_username = self
            .api_username
            .map(|v| required(&mut errors, "api_username", &v, API_USERNAME_REQUIRED));

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ConnectionChanges {
            name,
            router_ip,
            api_port,
            api_username,
            api_password: self.api_password,
            api_ssl: self.api_ssl,
            ..ConnectionChanges::default()
        })
    }
}

/// Check the editable fields of the settings view before they are written
pub fn validate_settings(update: &StatusUpdate) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if let Some(router_ip) = &update.router_ip {
        required(&mut errors, "router_ip", router_ip, ROUTER_IP_REQUIRED);
    }
    if update.api_port.is_some() {
        check_port(&mut errors, update.api_port);
    }
    if let Some(username) = &update.username {
        required(&mut errors, "username", username, API_USERNAME_REQUIRED);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_form() -> ConnectionForm {
        ConnectionForm {
            name: "Office".to_string(),
            router_ip: "10.0.0.1".to_string(),
            api_username: "admin".to_string(),
            ..ConnectionForm::default()
        }
    }

    #[test]
    fn test_valid_form_uses_default_port() {
        let connection = office_form().validate().unwrap();

        assert_eq!(connection.api_port, 8728);
        assert_eq!(connection.api_password, "");
        assert!(!connection.api_ssl);
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = ConnectionForm {
            api_port: None,
            ..ConnectionForm::default()
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.get("name"), Some(NAME_REQUIRED));
        assert_eq!(errors.get("router_ip"), Some(ROUTER_IP_REQUIRED));
        assert_eq!(errors.get("api_port"), Some(API_PORT_REQUIRED));
        assert_eq!(errors.get("api_username"), Some(API_USERNAME_REQUIRED));
        assert!(errors.get("api_password").is_none());
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        let errors = ConnectionForm {
            name: "   ".to_string(),
            ..office_form()
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.fields.len(), 1);
        assert_eq!(errors.get("name"), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_values_are_trimmed_but_password_is_not() {
        let connection = ConnectionForm {
            router_ip: " 10.0.0.1 ".to_string(),
            api_password: " pass ".to_string(),
            ..office_form()
        }
        .validate()
        .unwrap();

        assert_eq!(connection.router_ip, "10.0.0.1");
        assert_eq!(connection.api_password, " pass ");
    }

    #[test]
    fn test_port_zero_rejected() {
        let errors = ConnectionForm {
            api_port: Some(0),
            ..office_form()
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.get("api_port"), Some(API_PORT_RANGE));
    }

    #[test]
    fn test_port_above_range_rejected() {
        let form: ConnectionForm = serde_json::from_str(
            r#"{"name":"a","router_ip":"b","api_username":"c","api_port":70000}"#,
        )
        .unwrap();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("api_port"), Some(API_PORT_RANGE));

        let errors = ConnectionPatch {
            api_port: Some(-1),
            ..ConnectionPatch::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("api_port"), Some(API_PORT_RANGE));

        assert_eq!(
            ConnectionForm {
                api_port: Some(65535),
                ..office_form()
            }
            .validate()
            .unwrap()
            .api_port,
            65535
        );
    }

    #[test]
    fn test_json_port_absent_vs_null() {
        let absent: ConnectionForm =
            serde_json::from_str(r#"{"name":"a","router_ip":"b","api_username":"c"}"#).unwrap();
        assert_eq!(absent.api_port, Some(8728));

        let cleared: ConnectionForm = serde_json::from_str(
            r#"{"name":"a","router_ip":"b","api_username":"c","api_port":null}"#,
        )
        .unwrap();
        assert!(cleared.validate().is_err());
    }

    #[test]
    fn test_patch_validates_present_fields_only() {
        let changes = ConnectionPatch {
            api_ssl: Some(true),
            ..ConnectionPatch::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.api_ssl, Some(true));
        assert!(changes.name.is_none());

        let errors = ConnectionPatch {
            router_ip: Some(String::new()),
            ..ConnectionPatch::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("router_ip"), Some(ROUTER_IP_REQUIRED));
    }

    #[test]
    fn test_settings_validation() {
        assert!(validate_settings(&StatusUpdate::default()).is_ok());

        let errors = validate_settings(&StatusUpdate {
            api_port: Some(65536),
            username: Some(String::new()),
            ..StatusUpdate::default()
        })
        .unwrap_err();
        assert_eq!(errors.get("api_port"), Some(API_PORT_RANGE));
        assert_eq!(errors.get("username"), Some(API_USERNAME_REQUIRED));
    }

    #[test]
    fn test_display_lists_fields() {
        let errors = ConnectionForm::default().validate().unwrap_err();
        let rendered = errors.to_string();

        assert!(rendered.contains("name: Name is required"));
    }
}
