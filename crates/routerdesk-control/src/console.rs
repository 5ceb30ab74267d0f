//! Router connection console
//!
//! Glues the store, the tester and the notice board together the way the
//! connections page and the settings view use them. Every successful
//! mutation is followed by an awaited refresh of the caller's listing.

use crate::form::{validate_settings, ConnectionForm, ConnectionPatch, FormErrors};
use crate::notice::NoticeBoard;
use crate::principal::Principal;
use crate::probe::RouterProbe;
use crate::reconciler::{to_status, to_update, RouterApiStatus, StatusUpdate};
use crate::store::{ConnectionStore, StoreError};
use crate::tester::{ConnectionTester, TestOutcome};
use dashmap::DashMap;
use routerdesk_db::entities::router_connection;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const CREATED_NOTICE: &str = "Router connection created successfully";
pub const CREATE_FAILED_NOTICE: &str = "Failed to create router connection";
pub const UPDATED_NOTICE: &str = "Router connection updated successfully";
pub const UPDATE_FAILED_NOTICE: &str = "Failed to update router connection";
pub const DELETED_NOTICE: &str = "Router connection deleted successfully";
pub const DELETE_FAILED_NOTICE: &str = "Failed to delete router connection";
pub const LOAD_FAILED_NOTICE: &str = "Failed to load router connections";
pub const SELECTED_NOTICE: &str = "Current router connection updated";
pub const SELECT_FAILED_NOTICE: &str = "Failed to update current router connection";
pub const CLEARED_NOTICE: &str = "Current router connection cleared";
pub const CLEAR_FAILED_NOTICE: &str = "Failed to clear current router connection";
pub const STALE_VIEW_NOTICE: &str = "Router connection list may be out of date";

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Validation(#[from] FormErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// State of the caller's listing after a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Refreshed from the store
    Fresh(Vec<router_connection::Model>),
    /// Refresh failed; the cached listing was dropped
    Stale,
    /// Nothing was written, so no refresh was needed
    Unchanged,
}

/// A successful mutation plus the refreshed view
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<T> {
    pub value: T,
    pub view: ViewState,
}

pub struct ConnectionConsole {
    store: Arc<dyn ConnectionStore>,
    tester: ConnectionTester,
    notices: Arc<NoticeBoard>,
    listings: DashMap<Uuid, Vec<router_connection::Model>>,
}

impl ConnectionConsole {
    pub fn new(store: Arc<dyn ConnectionStore>, probe: Arc<dyn RouterProbe>) -> Self {
        let notices = Arc::new(NoticeBoard::new());
        let tester = ConnectionTester::new(store.clone(), probe, notices.clone());

        Self {
            store,
            tester,
            notices,
            listings: DashMap::new(),
        }
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn tester(&self) -> &ConnectionTester {
        &self.tester
    }

    /// Last listing fetched for the caller, if it is still considered fresh
    pub fn cached(&self, principal: &Principal) -> Option<Vec<router_connection::Model>> {
        self.listings
            .get(&principal.user_id)
            .map(|rows| rows.value().clone())
    }

    async fn refresh(&self, principal: &Principal) -> ViewState {
        match self.store.list(principal).await {
            Ok(rows) => {
                self.listings.insert(principal.user_id, rows.clone());
                ViewState::Fresh(rows)
            }
            Err(e) => {
                warn!(user_id = %principal.user_id, error = %e, "Failed to refresh connection list");
                self.listings.remove(&principal.user_id);
                self.notices.warning(principal.user_id, STALE_VIEW_NOTICE);
                ViewState::Stale
            }
        }
    }

    async fn finish<T>(&self, principal: &Principal, value: T) -> Mutation<T> {
        let view = self.refresh(principal).await;
        Mutation { value, view }
    }

    pub async fn list(
        &self,
        principal: &Principal,
    ) -> Result<Vec<router_connection::Model>, StoreError> {
        match self.store.list(principal).await {
            Ok(rows) => {
                self.listings.insert(principal.user_id, rows.clone());
                Ok(rows)
            }
            Err(e) => {
                error!(user_id = %principal.user_id, error = %e, "Failed to load router connections");
                self.notices.error(principal.user_id, LOAD_FAILED_NOTICE);
                Err(e)
            }
        }
    }

    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<router_connection::Model, StoreError> {
        self.store.get(principal, id).await
    }

    /// Status view of one connection, recomputed from the stored record
    pub async fn status(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<RouterApiStatus, StoreError> {
        let record = self.store.get(principal, id).await?;
        Ok(to_status(&record))
    }

    pub async fn create(
        &self,
        principal: &Principal,
        form: ConnectionForm,
    ) -> Result<Mutation<router_connection::Model>, ConsoleError> {
        let connection = form.validate()?;

        match self.store.create(principal, connection).await {
            Ok(created) => {
                info!(connection_id = %created.id, name = %created.name, "Router connection created");
                self.notices.success(principal.user_id, CREATED_NOTICE);
                Ok(self.finish(principal, created).await)
            }
            Err(e) => {
                error!(error = %e, "Failed to create router connection");
                self.notices.error(principal.user_id, CREATE_FAILED_NOTICE);
                Err(e.into())
            }
        }
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ConnectionPatch,
    ) -> Result<Mutation<router_connection::Model>, ConsoleError> {
        let changes = patch.validate()?;

        match self.store.update(principal, id, changes).await {
            Ok(updated) => {
                info!(connection_id = %id, "Router connection updated");
                self.notices.success(principal.user_id, UPDATED_NOTICE);
                Ok(self.finish(principal, updated).await)
            }
            Err(e) => {
                error!(connection_id = %id, error = %e, "Failed to update router connection");
                self.notices.error(principal.user_id, UPDATE_FAILED_NOTICE);
                Err(e.into())
            }
        }
    }

    pub async fn delete(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Mutation<()>, ConsoleError> {
        match self.store.delete(principal, id).await {
            Ok(()) => {
                info!(connection_id = %id, "Router connection deleted");
                self.notices.success(principal.user_id, DELETED_NOTICE);
                Ok(self.finish(principal, ()).await)
            }
            Err(e) => {
                error!(connection_id = %id, error = %e, "Failed to delete router connection");
                self.notices.error(principal.user_id, DELETE_FAILED_NOTICE);
                Err(e.into())
            }
        }
    }

    /// Write the settings form back onto a connection
    pub async fn apply_settings(
        &self,
        principal: &Principal,
        id: Uuid,
        update: StatusUpdate,
    ) -> Result<Mutation<router_connection::Model>, ConsoleError> {
        validate_settings(&update)?;

        match self.store.update(principal, id, to_update(&update)).await {
            Ok(updated) => {
                info!(connection_id = %id, "Router settings applied");
                self.notices.success(principal.user_id, UPDATED_NOTICE);
                Ok(self.finish(principal, updated).await)
            }
            Err(e) => {
                error!(connection_id = %id, error = %e, "Failed to apply router settings");
                self.notices.error(principal.user_id, UPDATE_FAILED_NOTICE);
                Err(e.into())
            }
        }
    }

    /// Test a connection; the listing is refreshed only if the test wrote
    pub async fn test(&self, principal: &Principal, id: Uuid) -> Mutation<TestOutcome> {
        let outcome = self.tester.test(principal, id).await;

        if outcome.is_connected() {
            self.finish(principal, outcome).await
        } else {
            Mutation {
                value: outcome,
                view: ViewState::Unchanged,
            }
        }
    }

    pub async fn current(
        &self,
        principal: &Principal,
    ) -> Result<Option<router_connection::Model>, StoreError> {
        self.store.current(principal).await
    }

    /// Status of the selected connection; `None` when nothing is selected
    pub async fn current_status(
        &self,
        principal: &Principal,
    ) -> Result<Option<RouterApiStatus>, StoreError> {
        Ok(self.store.current(principal).await?.as_ref().map(to_status))
    }

    pub async fn select_current(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<router_connection::Model, StoreError> {
        match self.store.select_current(principal, id).await {
            Ok(selected) => {
                info!(connection_id = %id, "Current router connection selected");
                self.notices.success(principal.user_id, SELECTED_NOTICE);
                Ok(selected)
            }
            Err(e) => {
                error!(connection_id = %id, error = %e, "Failed to select current router connection");
                self.notices.error(principal.user_id, SELECT_FAILED_NOTICE);
                Err(e)
            }
        }
    }

    pub async fn clear_current(&self, principal: &Principal) -> Result<(), StoreError> {
        match self.store.clear_current(principal).await {
            Ok(()) => {
                info!(user_id = %principal.user_id, "Current router connection cleared");
                self.notices.success(principal.user_id, CLEARED_NOTICE);
                Ok(())
            }
            Err(e) => {
                error!(user_id = %principal.user_id, error = %e, "Failed to clear current router connection");
                self.notices.error(principal.user_id, CLEAR_FAILED_NOTICE);
                Err(e)
            }
        }
    }

    /// Test the selected connection; `None` when nothing is selected
    pub async fn test_current(
        &self,
        principal: &Principal,
    ) -> Result<Option<Mutation<TestOutcome>>, StoreError> {
        match self.store.current(principal).await? {
            Some(connection) => Ok(Some(self.test(principal, connection.id).await)),
            None => Ok(None),
        }
    }
}
