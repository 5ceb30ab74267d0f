//! Database entities

pub mod current_connection;
pub mod router_connection;
pub mod user;

pub use current_connection::Entity as CurrentConnection;
pub use router_connection::Entity as RouterConnection;
pub use user::Entity as User;

pub mod prelude {
    pub use super::current_connection::Entity as CurrentConnection;
    pub use super::router_connection::Entity as RouterConnection;
    pub use super::user::Entity as User;
}
