pub mod identity;
pub mod scope;

pub use identity::{identity_middleware, IdentityExtractor};
pub use scope::RequestScope;
