//! API routes.

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::services::ServeDir;

use crate::handlers::{admin, applications, health, jobs, screenings, users};
use crate::middleware::{cors_layer, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/profile", get(users::get_profile).put(users::update_profile))
        .route("/password", put(users::change_password))
        // Bootstrap path for the first admin; see the handler.
        .route("/make-admin/:id", put(users::make_admin));

    let job_routes = Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/:id",
            get(jobs::get_job).put(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/:id/apply", post(jobs::apply_for_job));

    let application_routes = Router::new()
        .route("/my-applications", get(applications::my_applications))
        .route("/job/:job_id", get(applications::job_applications))
        .route("/:id/status", put(applications::update_application_status))
        .route("/:id/notes", post(applications::add_application_note));

    let screening_routes = Router::new()
        .route("/jobs/:job_id/screenings", get(screenings::job_screenings))
        .route(
            "/applications/:application_id/screening",
            get(screenings::get_application_screening)
                .put(screenings::upsert_screening)
                .delete(screenings::delete_screening),
        );

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users))
        .route(
            "/users/:id",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/jobs", get(admin::list_jobs))
        .route(
            "/jobs/:id",
            get(admin::get_job)
                .put(admin::update_job)
                .delete(admin::delete_job),
        )
        .route("/applications", get(admin::list_applications))
        .route(
            "/applications/:id",
            get(admin::get_application)
                .put(admin::update_application)
                .delete(admin::delete_application),
        );

    Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/jobs", job_routes)
        .nest("/api/applications", application_routes)
        .nest("/api/screening", screening_routes)
        .nest("/api/admin", admin_routes)
        .route("/health", get(health::health))
        .nest_service(
            "/uploads",
            ServeDir::new(state.uploads.root().to_path_buf()),
        )
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
