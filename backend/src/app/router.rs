use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core;
use crate::routes;

/// Roster API plus health check. CORS is open so a page served from another origin can read it.
pub fn create_router(context: core::ArcContext) -> Router {
    let student_routes = Router::new()
        .route("/", get(routes::students::list_students).post(routes::students::create_student))
        .route(
            "/{id}",
            get(routes::students::show_student)
                .put(routes::students::update_student)
                .delete(routes::students::delete_student),
        )
        .with_state(context.clone());

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .with_state(context);

    Router::new()
        .merge(public_routes)
        .merge(student_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
