use askama::Template;
use axum::Router;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::todo::api::v1::{TodoState, create_todo_router};
use crate::todo::repository::{MongoTodoRepository, TodoRepository};

pub mod api;

/// Everything the handlers need, built once at startup and handed to the router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub todos: Arc<TodoState>,
}

impl AppState {
    pub fn new(config: Config, repository: Arc<dyn TodoRepository>) -> Self {
        Self {
            config: Arc::new(config),
            todos: Arc::new(TodoState { repository }),
        }
    }
}

/// Custom error type for web handler operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    /// The specific `askama::Error` is captured as the source of this error.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl axum::response::IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{}", self);
        let user_facing_error_message =
            "An unexpected error occurred while processing your request. Please try again later.";
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!(
                "<h1>Internal Server Error</h1><p>{}</p>",
                user_facing_error_message
            )),
        )
            .into_response()
    }
}

/// Connects to the store, then serves the application until a shutdown signal arrives.
///
/// Failing to reach the store is fatal; there is no lazy reconnect.
#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let repository = MongoTodoRepository::connect(&config).await?;
    let state = AppState::new(config, Arc::new(repository));

    let server_address = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let grace_period = Duration::from_secs(state.config.shutdown_grace_secs);
    let app = create_app(state);
    serve(listener, app, shutdown_signal(), grace_period).await
}

/// Builds the full application router.
pub fn create_app(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);
    let router = Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_check_handler))
        .merge(create_todo_router(state.todos.clone()))
        .merge(api::create_api_docs_router());
    with_request_layers(router, request_timeout)
}

/// Wraps `router` with request tracing and a per-request timeout answered with 408.
fn with_request_layers(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout,
            )),
    )
}

/// Serves `app` until `signal` resolves, then lets in-flight requests finish
/// for at most `grace_period` before returning.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace_period: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let shutdown_requested = Arc::new(Notify::new());
    let notifier = shutdown_requested.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            tracing::info!("Shutting down server, draining in-flight requests");
            notifier.notify_one();
        })
        .into_future();

    let deadline = async {
        shutdown_requested.notified().await;
        tokio::time::sleep(grace_period).await;
    };

    tokio::select! {
        result = server => result?,
        () = deadline => {
            tracing::warn!("Grace period of {:?} elapsed, forcing shutdown", grace_period);
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[tracing::instrument]
pub async fn home_handler() -> Result<Html<String>, WebError> {
    let template = IndexTemplate::new("/todo/");
    template.render().map(Html).map_err(WebError::from)
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    todo_endpoint: &'static str,
}

impl IndexTemplate {
    pub fn new(todo_endpoint: &'static str) -> Self {
        Self { todo_endpoint }
    }
}
