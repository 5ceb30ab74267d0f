//! Control plane for the router console
//!
//! Everything between the HTTP surface and the database: the connection
//! store adapter, the status reconciler, the connection tester, form
//! validation, user notices and the presentation helpers.

pub mod console;
pub mod form;
pub mod listing;
pub mod notice;
pub mod principal;
pub mod probe;
pub mod reconciler;
pub mod store;
pub mod telemetry;
pub mod tester;

pub use console::{ConnectionConsole, ConsoleError, Mutation, ViewState};
pub use form::{ConnectionForm, ConnectionPatch, FormErrors};
pub use listing::{filter_by_query, format_bytes, ConnectionRow, DashboardStats, Searchable};
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use principal::Principal;
pub use probe::{ProbeError, ProbeTarget, RouterProbe, StubProbe, TcpProbe};
pub use reconciler::{to_status, to_update, ConnectivityState, RouterApiStatus, StatusUpdate};
pub use store::{
    ConnectionChanges, ConnectionStore, NewConnection, SeaOrmConnectionStore, StoreError,
};
pub use telemetry::{MockTelemetry, RouterTelemetry, TelemetryError};
pub use tester::{ConnectionTester, TestOutcome};

pub use routerdesk_db::entities::router_connection::Model as RouterConnection;
