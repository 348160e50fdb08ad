mod requests;
pub mod utils;

use actix_web::{get, http::StatusCode, post, web, HttpResponse};
use validator::Validate;

use crate::{
    database::{self, users},
    error::{AppError, Result},
    models::users::{NewUser, ROLE_USER},
    protocol::redirect,
    session::{csrf, Session, FLASH_SUCCESS},
    views::{
        self,
        auth::{LoginPage, LogoutPage, RegisterPage},
        PageContext,
    },
    DbPool,
};

use self::{requests::*, utils::CurrentUser};

const LOGIN_TOKEN: &str = "login_token";
const REGISTER_TOKEN: &str = "register_token";
const LOGOUT_TOKEN: &str = "logout_token";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(login_form)
        .service(login)
        .service(logout_form)
        .service(logout)
        .service(register_form)
        .service(register);
}

fn login_page(session: &Session, username: String, error: Option<String>) -> Result<LoginPage> {
    Ok(LoginPage {
        username,
        error,
        csrf_token: csrf::token(session, LOGIN_TOKEN)?,
    })
}

fn register_page(
    session: &Session,
    username: String,
    email: String,
    errors: Vec<String>,
) -> Result<RegisterPage> {
    Ok(RegisterPage {
        username,
        email,
        errors,
        csrf_token: csrf::token(session, REGISTER_TOKEN)?,
    })
}

fn log_in(session: &Session, user_id: i32, greeting: String) -> Result<()> {
    session.renew();
    session.set_user_id(user_id)?;
    session.add_flash(FLASH_SUCCESS, greeting)
}

#[get("/login")]
async fn login_form(session: Session, user: Option<CurrentUser>) -> Result<HttpResponse> {
    if user.is_some() {
        return Ok(redirect("/home"));
    }

    let page = login_page(&session, String::new(), None)?;
    Ok(views::render(
        &page,
        &PageContext::new(&session, None),
        StatusCode::OK,
    ))
}

#[post("/login")]
async fn login(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<LoginRequest>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    csrf::verify(&session, LOGIN_TOKEN, &form.login_token)?;

    let username = form.username.clone();
    let user =
        database::run(&pool, move |conn| users::find_by_username(conn, &username)).await?;

    let user = match user {
        Some(user) => {
            let password = form.password;
            let hashed = user.password.clone();
            let verified =
                web::block(move || crate::utils::verify_password(&password, &hashed)).await?;
            if verified {
                Some(user)
            } else {
                None
            }
        }
        None => None,
    };

    match user {
        Some(user) => {
            log_in(&session, user.id, format!("Welcome back, {}!", user.username))?;
            tracing::info!(user_id = user.id, "user logged in");
            Ok(redirect(if user.is_admin() { "/admin" } else { "/home" }))
        }
        None => {
            tracing::warn!(username = %form.username, "failed login attempt");
            let page = login_page(
                &session,
                form.username,
                Some("Invalid username or password".to_string()),
            )?;
            Ok(views::render(
                &page,
                &PageContext::new(&session, None),
                StatusCode::BAD_REQUEST,
            ))
        }
    }
}

#[get("/logout")]
async fn logout_form(session: Session, user: Option<CurrentUser>) -> Result<HttpResponse> {
    let user = match user {
        Some(CurrentUser(user)) => user,
        None => return Ok(redirect("/home")),
    };

    let page = LogoutPage {
        csrf_token: csrf::token(&session, LOGOUT_TOKEN)?,
    };
    Ok(views::render(
        &page,
        &PageContext::new(&session, Some(user)),
        StatusCode::OK,
    ))
}

#[post("/logout")]
async fn logout(session: Session, form: web::Form<LogoutRequest>) -> Result<HttpResponse> {
    csrf::verify(&session, LOGOUT_TOKEN, &form.logout_token)?;

    session.purge();
    session.add_flash(FLASH_SUCCESS, "You have been logged out.")?;
    Ok(redirect("/home"))
}

#[get("/register")]
async fn register_form(session: Session, user: Option<CurrentUser>) -> Result<HttpResponse> {
    if user.is_some() {
        return Ok(redirect("/home"));
    }

    let page = register_page(&session, String::new(), String::new(), Vec::new())?;
    Ok(views::render(
        &page,
        &PageContext::new(&session, None),
        StatusCode::OK,
    ))
}

#[post("/register")]
async fn register(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<RegisterRequest>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    csrf::verify(&session, REGISTER_TOKEN, &form.register_token)?;

    if let Err(errors) = form.validate() {
        let page = register_page(
            &session,
            form.username,
            form.email,
            views::violations(&errors),
        )?;
        return Ok(views::render(
            &page,
            &PageContext::new(&session, None),
            StatusCode::BAD_REQUEST,
        ));
    }

    let password = form.password.clone();
    let hashed = web::block(move || crate::utils::hash_password(&password)).await??;

    let data = NewUser {
        username: form.username.clone(),
        email: form.email.clone(),
        password: hashed,
        role: ROLE_USER.to_string(),
        created_at: crate::utils::now_str(),
    };
    let created = database::run(&pool, move |conn| users::create(conn, data)).await;

    match created {
        Ok(user) => {
            log_in(&session, user.id, format!("Welcome, {}!", user.username))?;
            tracing::info!(user_id = user.id, "user registered");
            Ok(redirect("/home"))
        }
        Err(AppError::BadRequest(reason)) => {
            let page = register_page(&session, form.username, form.email, vec![reason])?;
            Ok(views::render(
                &page,
                &PageContext::new(&session, None),
                StatusCode::BAD_REQUEST,
            ))
        }
        Err(err) => Err(err),
    }
}
