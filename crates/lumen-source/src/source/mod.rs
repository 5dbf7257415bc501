//! Query executor and permission oracle abstractions.

mod auth;
mod query;
mod result;
mod traits;

pub use auth::{AuthState, Identity};
pub use query::StoreQuery;
pub use result::QueryPage;
pub use traits::{PermissionOracle, QueryExecutor};
