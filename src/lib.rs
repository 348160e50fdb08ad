#[macro_use]
extern crate diesel;

pub mod admin;
pub mod auth;
pub mod blog;
pub mod config;
pub mod database;
pub mod error;
pub mod home;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod protocol;
pub mod schema;
pub mod session;
pub mod utils;
pub mod views;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
};
use diesel::{r2d2::ConnectionManager, SqliteConnection};

use crate::{
    config::Settings,
    error::AppError,
    mailer::Mailer,
    middleware::{AdminGuard, RequestLogging},
    session::SessionMiddleware,
};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

async fn not_found() -> Result<actix_web::HttpResponse, AppError> {
    Err(AppError::NotFound("Page not found".to_string()))
}

pub fn build_app(
    pool: web::Data<DbPool>,
    mailer: web::Data<dyn Mailer>,
    settings: web::Data<Settings>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let sessions = SessionMiddleware::new(
        pool.clone(),
        settings.session_ttl_secs,
        settings.cookie_secure,
    );

    App::new()
        .app_data(pool)
        .app_data(mailer)
        .app_data(settings)
        .app_data(
            web::FormConfig::default()
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
        )
        .configure(home::config)
        .configure(auth::config)
        .configure(blog::config)
        .service(
            web::scope("/admin")
                .wrap(AdminGuard)
                .configure(admin::config),
        )
        .default_service(web::to(not_found))
        .wrap(sessions)
        .wrap(RequestLogging)
}
