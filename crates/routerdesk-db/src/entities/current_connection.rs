//! Explicit per-user selection of the connection shown in the settings view

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "current_connections")]
pub struct Model {
    /// One selection per user
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    pub connection_id: Uuid,

    pub selected_at: ChronoDateTimeUtc,
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

    /// Deleting the connection drops the selection
    #[sea_orm(
        belongs_to = "super::router_connection::Entity",
        from = "Column::ConnectionId",
        to = "super::router_connection::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    RouterConnection,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::router_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RouterConnection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
