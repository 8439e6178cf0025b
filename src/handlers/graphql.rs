// handlers/graphql.rs - GET/POST /query and the GraphiQL page

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{extract::State, response::Html, Extension};

use crate::app::AppState;
use crate::middleware::RequestScope;

/// Execute one GraphQL request. The request scope built by the identity
/// middleware is handed to the engine as request data; without it the
/// guards see no principal.
pub async fn graphql_handler(
    State(state): State<AppState>,
    scope: Option<Extension<RequestScope>>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(Extension(scope)) = scope {
        request = request.data(scope);
    }
    state.schema.execute(request).await.into()
}

pub async fn playground() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/query").finish())
}
