// handlers/mod.rs - HTTP handlers
//
// graphql: /query (identity middleware applied by the router)
// system:  /, /health and the fallback for unknown routes
pub mod graphql;
pub mod system;

pub use graphql::{graphql_handler, playground};
pub use system::{health, not_found, root};
