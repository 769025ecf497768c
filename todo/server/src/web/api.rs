use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::todo::api::v1;

/// OpenAPI description of the JSON endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        v1::list_todos_handler,
        v1::create_todo_handler,
        v1::update_todo_handler,
        v1::delete_todo_handler
    ),
    components(schemas(
        v1::TodoJson,
        v1::TodosResponse,
        v1::CreateTodoRequest,
        v1::UpdateTodoRequest,
        v1::TodoCreatedResponse,
        v1::MessageResponse,
        v1::ErrorResponse
    )),
    tags((name = "Todos", description = "Create, list, update and delete todos"))
)]
pub struct ApiDoc;

/// Serves the OpenAPI document and a Swagger UI for it.
pub fn create_api_docs_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
