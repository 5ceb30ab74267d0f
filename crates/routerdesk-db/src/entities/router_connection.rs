//! RouterConnection entity: how the console reaches one MikroTik router's API

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// RouterOS API port used when the operator leaves the field untouched
pub const DEFAULT_API_PORT: i32 = 8728;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "router_connections")]
pub struct Model {
    /// Connection UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user; rows are only visible to their owner
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Router network address (IP or hostname)
    pub router_ip: String,

    /// RouterOS API port
    pub api_port: i32,

    pub api_username: String,

    /// Write-only: never serialized back to clients
    #[serde(skip_serializing, default)]
    pub api_password: String,

    /// Whether the API is reached over TLS (api-ssl)
    pub api_ssl: bool,

    /// Set by a successful connection test
    pub is_active: bool,

    /// Last successful contact with the router
    pub last_connected: Option<ChronoDateTimeUtc>,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(has_many = "super::current_connection::Entity")]
    Selections,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::current_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
