//! Concrete store implementations.

pub mod role_store;
pub mod user_store;

pub use role_store::SqlRoleStore;
pub use user_store::SqlUserStore;
