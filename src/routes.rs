// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, booking, content, profile},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, guide_middleware, tourist_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: auth, homepage content, content detail, upload files.
/// * Role-gated sub-routers for tourist, guide and admin operations
///   (authentication first, then the role check).
/// * Global middleware: Trace, CORS.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let public_routes = Router::new()
        .route("/content/recent", get(content::list_recent))
        .route("/content/{id}", get(content::get_content));

    let tourist_routes = Router::new()
        .route("/guides", get(booking::list_available_guides))
        .route("/guides/{id}", get(booking::get_guide))
        .route(
            "/bookings",
            post(booking::create_booking).get(booking::list_my_bookings),
        )
        .layer(middleware::from_fn(tourist_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let guide_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_my_profile).put(profile::upsert_profile),
        )
        .route("/bookings", get(booking::list_guide_bookings))
        .route(
            "/bookings/{id}/status/{status}",
            put(booking::update_booking_status),
        )
        .route(
            "/content",
            post(content::upload_content).get(content::list_my_content),
        )
        .route(
            "/content/{id}",
            put(content::edit_content).delete(content::delete_content),
        )
        // Image uploads need more than axum's 2MB default
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
        .layer(middleware::from_fn(guide_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/bookings", get(admin::list_bookings))
        .route("/content", get(admin::list_content))
        // Double middleware protection: Auth first, then role check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/tourist", tourist_routes)
        .nest("/api/guide", guide_routes)
        .nest("/api/admin", admin_routes)
        // Uploaded images are served as static assets
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
