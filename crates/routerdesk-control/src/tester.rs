//! Connection Tester
//!
//! Probes a stored connection and, when the router answers, writes the
//! observed addressing back together with `is_active = true` and a fresh
//! `last_connected`. At most one test per connection id runs at a time.

use crate::notice::NoticeBoard;
use crate::principal::Principal;
use crate::probe::{ProbeTarget, RouterProbe};
use crate::reconciler::{to_update, RouterApiStatus, StatusUpdate};
use crate::store::ConnectionStore;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

pub const TEST_SUCCEEDED_NOTICE: &str = "Connection test successful";
pub const TEST_NOT_CONNECTED_NOTICE: &str = "Connection test failed";
pub const TEST_ERROR_NOTICE: &str = "Failed to test connection";

/// Result of one connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// Router answered; the report has been persisted
    Connected(RouterApiStatus),
    /// Router did not answer; nothing was written
    NotConnected,
    /// Another test for the same connection is still running
    AlreadyRunning,
    /// Probe or store failure; nothing was written
    Failed,
}

impl TestOutcome {
    /// The status when connected, `None` otherwise
    pub fn into_status(self) -> Option<RouterApiStatus> {
        match self {
            TestOutcome::Connected(status) => Some(status),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, TestOutcome::Connected(_))
    }
}

/// Releases the in-flight slot for a connection on drop
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<Uuid, ()>,
    connection_id: Uuid,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.connection_id);
    }
}

pub struct ConnectionTester {
    store: Arc<dyn ConnectionStore>,
    probe: Arc<dyn RouterProbe>,
    notices: Arc<NoticeBoard>,
    in_flight: DashMap<Uuid, ()>,
}

impl ConnectionTester {
    pub fn new(
        store: Arc<dyn ConnectionStore>,
        probe: Arc<dyn RouterProbe>,
        notices: Arc<NoticeBoard>,
    ) -> Self {
        Self {
            store,
            probe,
            notices,
            in_flight: DashMap::new(),
        }
    }

    /// Whether a test for this connection is currently running
    pub fn is_testing(&self, connection_id: Uuid) -> bool {
        self.in_flight.contains_key(&connection_id)
    }

    fn begin(&self, connection_id: Uuid) -> Option<InFlightGuard<'_>> {
        match self.in_flight.entry(connection_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(InFlightGuard {
                    in_flight: &self.in_flight,
                    connection_id,
                })
            }
        }
    }

    pub async fn test(&self, principal: &Principal, connection_id: Uuid) -> TestOutcome {
        // Ownership is checked before the in-flight slot is taken
        let record = match self.store.get(principal, connection_id).await {
            Ok(record) => record,
            Err(e) => {
                error!(%connection_id, error = %e, "Failed to load connection for test");
                self.notices.error(principal.user_id, TEST_ERROR_NOTICE);
                return TestOutcome::Failed;
            }
        };

        let Some(_guard) = self.begin(connection_id) else {
            debug!(%connection_id, "Connection test already running");
            return TestOutcome::AlreadyRunning;
        };

        let target = ProbeTarget::from(&record);
        let report = match self.probe.probe(&target).await {
            Ok(report) => report,
            Err(e) => {
                error!(%connection_id, error = %e, "Router probe failed");
                self.notices.error(principal.user_id, TEST_ERROR_NOTICE);
                return TestOutcome::Failed;
            }
        };

        if !report.is_connected() {
            info!(%connection_id, router_ip = %record.router_ip, "Router did not answer");
            self.notices
                .warning(principal.user_id, TEST_NOT_CONNECTED_NOTICE);
            return TestOutcome::NotConnected;
        }

        let mut changes = to_update(&StatusUpdate::from(&report));
        changes.is_active = Some(true);

        match self.store.update(principal, connection_id, changes).await {
            Ok(_) => {
                info!(%connection_id, router_ip = %report.router_ip, "Connection test succeeded");
                self.notices.success(principal.user_id, TEST_SUCCEEDED_NOTICE);
                TestOutcome::Connected(report)
            }
            Err(e) => {
                error!(%connection_id, error = %e, "Failed to record connection test");
                self.notices.error(principal.user_id, TEST_ERROR_NOTICE);
                TestOutcome::Failed
            }
        }
    }
}
