//! # ab-api
//!
//! The web routing and orchestration layer for anonboard.

pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;

use ab_core::AppError;
use actix_files::Files;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};

pub use error::ApiError;
pub use handlers::AppState;

/// Configures the JSON API and page routes.
///
/// # Developer Note
/// Board-scoped API routes take the board from the path; reply routes only
/// use it to build redirects, threads are addressed by id.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/threads/{board}")
            .route(web::post().to(handlers::create_thread))
            .route(web::get().to(handlers::list_threads))
            .route(web::put().to(handlers::report_thread))
            .route(web::delete().to(handlers::delete_thread)),
    )
    .service(
        web::resource("/api/replies/{board}")
            .route(web::post().to(handlers::create_reply))
            .route(web::get().to(handlers::get_thread))
            .route(web::put().to(handlers::report_reply))
            .route(web::delete().to(handlers::delete_reply)),
    )
    // The "Board Index"
    .route("/", web::get().to(handlers::index))
    // The board page (e.g., /b/general/)
    .route("/b/{board}", web::get().to(handlers::board_page))
    .route("/b/{board}/", web::get().to(handlers::board_page))
    // The "Thread View" (e.g., /b/general/<uuid>)
    .route("/b/{board}/{thread_id}", web::get().to(handlers::thread_page));
}

/// Malformed bodies and queries come back as validation errors with the
/// usual JSON shape instead of actix-web's plain-text default.
fn extractor_error(err: impl std::fmt::Display) -> actix_web::Error {
    ApiError(AppError::ValidationError(err.to_string())).into()
}

/// Assembles the full application: state, middleware, static files, routes
/// and the plain-text 404 fallback.
pub fn build_app(
    state: web::Data<AppState>,
    public_dir: &str,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(|err, _| extractor_error(err)))
        .app_data(web::FormConfig::default().error_handler(|err, _| extractor_error(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| extractor_error(err)))
        .wrap(middleware::security_headers())
        .wrap(middleware::cors_policy())
        .wrap(middleware::standard_middleware())
        .service(Files::new("/public", public_dir))
        .configure(configure_routes)
        .default_service(web::to(handlers::not_found))
}
