//! Connection Store Adapter
//!
//! The only path between the console and the `router_connections` table.
//! Every call is scoped to a [`Principal`]: rows owned by another user are
//! reported as [`StoreError::NotFound`], exactly like ids that never existed.

use crate::principal::Principal;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routerdesk_db::entities::{current_connection, router_connection};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Router connection not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A validated connection ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConnection {
    pub name: String,
    pub router_ip: String,
    pub api_port: u16,
    pub api_username: String,
    pub api_password: String,
    pub api_ssl: bool,
}

/// Partial update of a stored connection; `None` leaves the column alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionChanges {
    pub name: Option<String>,
    pub router_ip: Option<String>,
    pub api_port: Option<u16>,
    pub api_username: Option<String>,
    pub api_password: Option<String>,
    pub api_ssl: Option<bool>,
    pub is_active: Option<bool>,
    pub last_connected: Option<DateTime<Utc>>,
}

impl ConnectionChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, active: &mut router_connection::ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(router_ip) = self.router_ip {
            active.router_ip = Set(router_ip);
        }
        if let Some(api_port) = self.api_port {
            active.api_port = Set(i32::from(api_port));
        }
        if let Some(api_username) = self.api_username {
            active.api_username = Set(api_username);
        }
        if let Some(api_password) = self.api_password {
            active.api_password = Set(api_password);
        }
        if let Some(api_ssl) = self.api_ssl {
            active.api_ssl = Set(api_ssl);
        }
        if let Some(is_active) = self.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(last_connected) = self.last_connected {
            active.last_connected = Set(Some(last_connected));
        }
    }
}

/// Persistence operations on router connections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn create(
        &self,
        principal: &Principal,
        connection: NewConnection,
    ) -> Result<router_connection::Model, StoreError>;

    /// All of the principal's connections, newest first
    async fn list(&self, principal: &Principal)
        -> Result<Vec<router_connection::Model>, StoreError>;

    async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<router_connection::Model, StoreError>;

    async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: ConnectionChanges,
    ) -> Result<router_connection::Model, StoreError>;

    async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), StoreError>;

    /// The connection explicitly selected for the settings view, if any
    async fn current(
        &self,
        principal: &Principal,
    ) -> Result<Option<router_connection::Model>, StoreError>;

    async fn select_current(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<router_connection::Model, StoreError>;

    async fn clear_current(&self, principal: &Principal) -> Result<(), StoreError>;
}

/// [`ConnectionStore`] backed by SeaORM
#[derive(Clone)]
pub struct SeaOrmConnectionStore {
    db: DatabaseConnection,
}

impl SeaOrmConnectionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ConnectionStore for SeaOrmConnectionStore {
    async fn create(
        &self,
        principal: &Principal,
        connection: NewConnection,
    ) -> Result<router_connection::Model, StoreError> {
        let model = router_connection::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(principal.user_id),
            name: Set(connection.name),
            router_ip: Set(connection.router_ip),
            api_port: Set(i32::from(connection.api_port)),
            api_username: Set(connection.api_username),
            api_password: Set(connection.api_password),
            api_ssl: Set(connection.api_ssl),
            is_active: Set(false),
            last_connected: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        debug!(
            connection_id = %model.id,
            user_id = %principal.user_id,
            "Created router connection"
        );

        Ok(model)
    }

    async fn list(
        &self,
        principal: &Principal,
    ) -> Result<Vec<router_connection::Model>, StoreError> {
        let rows = router_connection::Entity::find()
            .filter(router_connection::Column::UserId.eq(principal.user_id))
            .order_by_desc(router_connection::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<router_connection::Model, StoreError> {
        router_connection::Entity::find_by_id(id)
            .filter(router_connection::Column::UserId.eq(principal.user_id))
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: ConnectionChanges,
    ) -> Result<router_connection::Model, StoreError> {
        let existing = self.get(principal, id).await?;
        if changes.is_empty() {
            return Ok(existing);
        }

        let mut active: router_connection::ActiveModel = existing.into();
        changes.apply(&mut active);
        let updated = active.update(&self.db).await?;

        debug!(connection_id = %id, "Updated router connection");

        Ok(updated)
    }

    async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), StoreError> {
        let result = router_connection::Entity::delete_many()
            .filter(router_connection::Column::Id.eq(id))
            .filter(router_connection::Column::UserId.eq(principal.user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }

        debug!(connection_id = %id, "Deleted router connection");
        Ok(())
    }

    async fn current(
        &self,
        principal: &Principal,
    ) -> Result<Option<router_connection::Model>, StoreError> {
        let Some(selection) = current_connection::Entity::find_by_id(principal.user_id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        match self.get(principal, selection.connection_id).await {
            Ok(connection) => Ok(Some(connection)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn select_current(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<router_connection::Model, StoreError> {
        let connection = self.get(principal, id).await?;

        current_connection::Entity::insert(current_connection::ActiveModel {
            user_id: Set(principal.user_id),
            connection_id: Set(connection.id),
            selected_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(current_connection::Column::UserId)
                .update_columns([
                    current_connection::Column::ConnectionId,
                    current_connection::Column::SelectedAt,
                ])
                .to_owned(),
        )
        .exec(&self.db)
        .await?;

        debug!(
            connection_id = %id,
            user_id = %principal.user_id,
            "Selected current router connection"
        );

        Ok(connection)
    }

    async fn clear_current(&self, principal: &Principal) -> Result<(), StoreError> {
        current_connection::Entity::delete_by_id(principal.user_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
