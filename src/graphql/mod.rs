//! GraphQL schema: query and mutation roots, object relations and the role guard.

pub mod guard;
pub mod mutation;
pub mod query;
pub mod relations;

use async_graphql::extensions::apollo_persisted_queries::{ApolloPersistedQueries, LruCacheStorage};
use async_graphql::extensions::Tracing;
use async_graphql::{Context, EmptySubscription, ErrorExtensions, Schema};

pub use guard::{admit, authorize, AuthError, RoleGuard};
pub use mutation::MutationRoot;
pub use query::QueryRoot;

use crate::config::GraphqlConfig;
use crate::database::{SharedStore, StoreError};

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the executable schema. The store handle is attached as schema data
/// and shared by every request.
pub fn build_schema(store: SharedStore, config: &GraphqlConfig) -> AppSchema {
    let mut builder = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .extension(Tracing)
        .extension(ApolloPersistedQueries::new(LruCacheStorage::new(config.apq_cache_size.max(1))))
        .limit_depth(config.max_depth);

    if !config.enable_introspection {
        builder = builder.disable_introspection();
    }

    builder.finish()
}

/// Schema SDL without any runtime data
pub fn sdl() -> String {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish().sdl()
}

pub(crate) fn store<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a SharedStore> {
    ctx.data::<SharedStore>()
}

pub(crate) fn extend(err: StoreError) -> async_graphql::Error {
    err.extend()
}
