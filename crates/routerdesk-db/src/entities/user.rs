//! Console operator accounts

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operator role in the console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum UserRole {
    /// Full access, created from the command line
    #[sea_orm(string_value = "admin")]
    Admin,

    /// Regular operator
    #[sea_orm(string_value = "user")]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login email (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub full_name: Option<String>,

    pub role: UserRole,

    /// Disabled accounts cannot sign in
    pub is_active: bool,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Router connections owned by this user
    #[sea_orm(has_many = "super::router_connection::Entity")]
    RouterConnections,

    /// The connection selected in the settings view
    #[sea_orm(has_one = "super::current_connection::Entity")]
    CurrentConnection,
}

impl Related<super::router_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RouterConnections.def()
    }
}

impl Related<super::current_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CurrentConnection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
