#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, web,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use tempfile::TempDir;

use portfolio::{
    config::Settings,
    database::{self, users},
    error::Result,
    mailer::{Email, Mailer},
    models::users::{NewUser, User},
    schema::sessions,
    session::SESSION_COOKIE,
    utils, DbPool,
};

pub const PASSWORD: &str = "correct horse battery";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<()> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestContext {
    _dir: TempDir,
    pub pool: web::Data<DbPool>,
    pub recorder: Arc<RecordingMailer>,
    pub mailer: web::Data<dyn Mailer>,
    pub settings: web::Data<Settings>,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("portfolio.db");
        let url = url.to_str().unwrap().to_string();

        let settings: Settings = envy::from_iter(vec![
            ("DATABASE_URL".to_string(), url.clone()),
            ("CONTACT_RECIPIENT".to_string(), "owner@example.com".to_string()),
        ])
        .unwrap();

        let pool = database::create_pool(&url, 4).unwrap();
        database::run_migrations(&pool).unwrap();

        let recorder = Arc::new(RecordingMailer::default());
        let mailer: Arc<dyn Mailer> = recorder.clone();

        TestContext {
            _dir: dir,
            pool: web::Data::new(pool),
            recorder,
            mailer: web::Data::from(mailer),
            settings: web::Data::new(settings),
        }
    }

    pub fn create_user(&self, username: &str, role: &str) -> User {
        let mut conn = self.pool.get().unwrap();
        users::create(
            &mut conn,
            NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: utils::hash_password(PASSWORD).unwrap(),
                role: role.to_string(),
                created_at: utils::now_str(),
            },
        )
        .unwrap()
    }

    /// Pretends the session was last written `secs` seconds ago.
    pub fn age_session(&self, id: &str, secs: i64) {
        let then = Utc::now().naive_utc() - Duration::seconds(secs);
        let mut conn = self.pool.get().unwrap();
        diesel::update(sessions::table.find(id))
            .set(sessions::updated_at.eq(utils::format_time_str(&then)))
            .execute(&mut conn)
            .unwrap();
    }

    pub fn session_updated_at(&self, id: &str) -> Option<String> {
        let mut conn = self.pool.get().unwrap();
        sessions::table
            .find(id)
            .select(sessions::updated_at)
            .first(&mut conn)
            .optional()
            .unwrap()
    }

    pub fn session_rows(&self) -> i64 {
        let mut conn = self.pool.get().unwrap();
        sessions::table.count().get_result(&mut conn).unwrap()
    }

    pub fn sent_mail(&self) -> Vec<Email> {
        self.recorder.sent.lock().unwrap().clone()
    }
}

#[macro_export]
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(portfolio::build_app(
            $ctx.pool.clone(),
            $ctx.mailer.clone(),
            $ctx.settings.clone(),
        ))
        .await
    };
}

/// Status, headers of interest and body of a finished request.
pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub cookie: Option<Cookie<'static>>,
    pub body: String,
}

impl Page {
    /// Value of the hidden input named `name`.
    pub fn hidden(&self, name: &str) -> String {
        let marker = format!(r#"name="{}" value=""#, name);
        let start = self
            .body
            .find(&marker)
            .unwrap_or_else(|| panic!("no hidden field {} in {}", name, self.body))
            + marker.len();
        let end = self.body[start..].find('"').unwrap() + start;
        self.body[start..end].to_string()
    }
}

/// Browser-like client that keeps the session cookie between requests.
#[derive(Default)]
pub struct Client {
    pub cookie: Option<Cookie<'static>>,
}

impl Client {
    pub async fn get<S, B>(&mut self, app: &S, uri: &str) -> Page
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let mut req = test::TestRequest::get().uri(uri);
        if let Some(cookie) = &self.cookie {
            req = req.cookie(cookie.clone());
        }
        let res = test::call_service(app, req.to_request()).await;
        self.finish(res).await
    }

    pub async fn post<S, B>(&mut self, app: &S, uri: &str, form: &[(&str, &str)]) -> Page
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let mut req = test::TestRequest::post().uri(uri).set_form(form);
        if let Some(cookie) = &self.cookie {
            req = req.cookie(cookie.clone());
        }
        let res = test::call_service(app, req.to_request()).await;
        self.finish(res).await
    }

    async fn finish<B: MessageBody>(&mut self, res: ServiceResponse<B>) -> Page {
        let status = res.status();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_string());
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.into_owned());

        if let Some(cookie) = &cookie {
            if cookie.value().is_empty() {
                self.cookie = None;
            } else {
                self.cookie = Some(cookie.clone());
            }
        }

        let body = test::read_body(res).await;
        Page {
            status,
            location,
            cookie,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    pub async fn login<S, B>(&mut self, app: &S, username: &str) -> Page
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let form = self.get(app, "/login").await;
        let token = form.hidden("login_token");
        self.post(
            app,
            "/login",
            &[
                ("username", username),
                ("password", PASSWORD),
                ("login_token", &token),
            ],
        )
        .await
    }

    pub fn session_id(&self) -> String {
        self.cookie.as_ref().unwrap().value().to_string()
    }
}
