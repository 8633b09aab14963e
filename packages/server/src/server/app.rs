//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use mailgun::{MailgunOptions, MailgunService};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::auth::JwtService;
use crate::kernel::{BaseDirectory, InboxNotifier, PgDirectory, ServerDeps};
use crate::server::middleware::{extract_client_ip, jwt_auth_middleware};
use crate::server::routes::{
    ambulances::{
        complete_mission_handler, my_ambulance_handler, register_handler, report_location_handler,
        update_availability_handler,
    },
    dispatch::{
        accept_request_handler, create_request_handler, decline_request_handler, nearby_handler,
        pending_requests_handler,
    },
    health_handler,
    notifications::{list_notifications_handler, mark_read_handler},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
}

/// Build the full application: wire the concrete dependency set over the
/// database pool, then assemble the router.
///
/// Email delivery is optional; without Mailgun credentials the notifier only
/// writes inbox rows.
pub fn build_app(
    pool: PgPool,
    jwt_secret: &str,
    jwt_issuer: String,
    allowed_origins: Vec<String>,
    mailgun: Option<MailgunOptions>,
) -> Router {
    let directory: Arc<dyn BaseDirectory> = Arc::new(PgDirectory::new(pool.clone()));
    let mailer = mailgun.map(|options| Arc::new(MailgunService::new(options)));
    let notifier = Arc::new(InboxNotifier::new(directory.clone(), mailer));
    let jwt_service = Arc::new(JwtService::new(jwt_secret, jwt_issuer));

    let deps = Arc::new(ServerDeps::new(directory, notifier, jwt_service));

    let app_state = AppState { db_pool: pool, deps };

    build_router(app_state, allowed_origins)
}

/// Build the Axum router over an already-wired application state.
///
/// Split from [`build_app`] so tests can run the full middleware stack over
/// in-memory dependencies.
pub fn build_router(app_state: AppState, allowed_origins: Vec<String>) -> Router {
    // CORS configuration - explicit origins in production, any origin when
    // the list is empty (development)
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    };

    // Clone jwt_service for middleware closure
    let jwt_service_for_middleware = app_state.deps.jwt_service.clone();

    // Rate limiting configuration
    // 10 requests per second per IP with bursts up to 20
    // Prevents API abuse, DoS attacks, and resource exhaustion
    let rate_limit_config = std::sync::Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10) // Base rate: 10 requests per second
            .burst_size(20) // Allow bursts up to 20
            .use_headers() // Extract IP from X-Forwarded-For header
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    Router::new()
        // Patient surface
        .route("/nearby", post(nearby_handler))
        .route("/ambulances/:id/request", post(create_request_handler))
        // Crew surface
        .route("/requests/:id/accept", post(accept_request_handler))
        .route("/requests/:id/decline", post(decline_request_handler))
        .route("/requests/pending", get(pending_requests_handler))
        .route("/ambulances/register", post(register_handler))
        .route("/ambulances/me", get(my_ambulance_handler))
        .route("/ambulances/:id/location", post(report_location_handler))
        .route(
            "/ambulances/:id/availability",
            post(update_availability_handler),
        )
        .route(
            "/ambulances/:id/complete-mission",
            post(complete_mission_handler),
        )
        // Inbox
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/:id/read", post(mark_read_handler))
        // Health check
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        })) // JWT authentication
        .layer(rate_limit_layer) // Rate limit per IP
        .layer(middleware::from_fn(extract_client_ip))
        .layer(Extension(app_state)) // Add shared state (must be after middlewares that need it)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
