use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod extractors;
pub mod games;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;

pub use config::Config;
pub use services::AppState;

/// CSP middleware adds Content-Security-Policy header to all responses
async fn csp_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self' 'unsafe-inline'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data: https:; \
             connect-src 'self'",
        ),
    );
    response
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(handlers::metrics_handler).layer(middleware::from_fn_with_state(
                app_state.clone(),
                handlers::metrics_auth_middleware,
            )),
        )
        .nest("/api/v1/quiz", quiz_routes())
        .nest("/api/v1/content", content_routes())
        .nest("/api/v1/portfolio", handlers::portfolio::public_routes())
        .route("/api/v1/admin/login", post(handlers::admin::login))
        .nest("/admin", admin_routes(app_state.clone()))
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(csp_middleware))
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn quiz_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/catalog", get(handlers::quiz::catalog))
        .route("/{client_id}/state", get(handlers::quiz::get_state))
        .route("/{client_id}/start", post(handlers::quiz::start_game))
        .route("/{client_id}/reset", post(handlers::quiz::reset_game))
        .route("/{client_id}/adblock", post(handlers::quiz::report_adblock))
        .route("/{client_id}/pages/{page}", get(handlers::quiz::enter_page))
        .route(
            "/{client_id}/pages/{page}/tasks/{task_id}/answers",
            post(handlers::quiz::submit_answer),
        )
        .route(
            "/{client_id}/pages/{page}/next",
            post(handlers::quiz::next_page),
        )
        .route(
            "/{client_id}/pages/{page}/back",
            post(handlers::quiz::previous_page),
        )
        .route("/{client_id}/score", get(handlers::quiz::score))
        .route("/{client_id}/stream", get(handlers::sse::quiz_stream))
}

fn content_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sections", get(handlers::content::list_sections))
        .route("/sections/{section}", get(handlers::content::get_section))
        .route("/contact", post(handlers::content::submit_contact))
}

fn admin_routes(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/content/{section}",
            put(handlers::content::save_section).delete(handlers::content::reset_section),
        )
        .route(
            "/contact-submissions",
            get(handlers::content::list_contact_submissions),
        )
        .route(
            "/contact-submissions/{id}",
            axum::routing::delete(handlers::content::delete_contact_submission),
        )
        .nest("/portfolio", handlers::portfolio::admin_routes())
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::admin_guard_middleware,
        ))
}
