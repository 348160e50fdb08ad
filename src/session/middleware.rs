use std::{
    collections::HashMap,
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::MessageBody,
    cookie::{Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::LocalBoxFuture;

use super::{Session, SessionStatus, SESSION_COOKIE};

/// Unchanged sessions get their timestamp refreshed at most this often.
const TOUCH_INTERVAL_SECS: i64 = 60;
use crate::{
    database::{self, sessions},
    error::AppError,
    DbPool,
};

#[derive(Clone)]
pub struct SessionMiddleware {
    pool: web::Data<DbPool>,
    ttl_secs: i64,
    cookie_secure: bool,
}

impl SessionMiddleware {
    pub fn new(pool: web::Data<DbPool>, ttl_secs: i64, cookie_secure: bool) -> Self {
        Self {
            pool,
            ttl_secs,
            cookie_secure,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            config: self.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    config: SessionMiddleware,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = self.config.clone();

        Box::pin(async move {
            let cookie_id = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
            let (session, last_seen) = load_session(&config, cookie_id.clone()).await?;
            req.extensions_mut().insert(session.clone());

            let mut res = service.call(req).await?;
            store_session(&config, &session, cookie_id, last_seen, res.response_mut()).await?;
            Ok(res)
        })
    }
}

/// Returns the session and, for a stored one, when it was last written.
async fn load_session(
    config: &SessionMiddleware,
    cookie_id: Option<String>,
) -> Result<(Session, Option<String>), AppError> {
    let id = match cookie_id {
        Some(id) => id,
        None => return Ok((Session::default(), None)),
    };

    let ttl_secs = config.ttl_secs;
    let lookup_id = id.clone();
    let data =
        database::run(&config.pool, move |conn| sessions::load(conn, &lookup_id, ttl_secs)).await?;

    match data {
        Some(row) => {
            let state: HashMap<String, serde_json::Value> = serde_json::from_str(&row.data)
                .unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "discarding unreadable session");
                    HashMap::new()
                });
            Ok((Session::load(Some(id), state), Some(row.updated_at)))
        }
        None => Ok((Session::default(), None)),
    }
}

async fn store_session<B>(
    config: &SessionMiddleware,
    session: &Session,
    cookie_id: Option<String>,
    last_seen: Option<String>,
    response: &mut HttpResponse<B>,
) -> Result<(), AppError> {
    let (id, status, state) = session.snapshot();

    match status {
        SessionStatus::Unchanged => match (id, last_seen) {
            (Some(id), Some(last_seen)) => {
                if sessions::is_stale(&last_seen, TOUCH_INTERVAL_SECS) {
                    database::run(&config.pool, move |conn| sessions::touch(conn, &id)).await?;
                }
            }
            (None, _) if cookie_id.is_some() => remove_cookie(response)?,
            _ => {}
        },
        SessionStatus::Changed => {
            let (id, is_new) = match id {
                Some(id) => (id, false),
                None => (crate::utils::generate_token(), true),
            };
            save(config, id.clone(), &state, None, is_new).await?;
            if is_new {
                set_cookie(config, response, id)?;
            }
        }
        SessionStatus::Renewed => {
            let new_id = crate::utils::generate_token();
            save(config, new_id.clone(), &state, id, true).await?;
            set_cookie(config, response, new_id)?;
        }
        SessionStatus::Purged => {
            if let Some(id) = id {
                database::run(&config.pool, move |conn| sessions::delete(conn, &id)).await?;
            }
            if cookie_id.is_some() {
                remove_cookie(response)?;
            }
        }
    }

    Ok(())
}

async fn save(
    config: &SessionMiddleware,
    id: String,
    state: &HashMap<String, serde_json::Value>,
    replaces: Option<String>,
    issued: bool,
) -> Result<(), AppError> {
    let data = serde_json::to_string(state)
        .map_err(|err| AppError::Internal(format!("session encoding: {}", err)))?;
    let ttl_secs = config.ttl_secs;
    database::run(&config.pool, move |conn| {
        if let Some(old_id) = replaces {
            sessions::delete(conn, &old_id)?;
        }
        // expired rows are reclaimed whenever a new id is handed out
        if issued {
            let purged = sessions::purge_expired(conn, ttl_secs)?;
            if purged > 0 {
                tracing::debug!(purged, "dropped expired sessions");
            }
        }
        sessions::save(conn, &id, &data)
    })
    .await
}

fn session_cookie(id: String, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish()
}

fn set_cookie<B>(
    config: &SessionMiddleware,
    response: &mut HttpResponse<B>,
    id: String,
) -> Result<(), AppError> {
    response
        .add_cookie(&session_cookie(id, config.cookie_secure))
        .map_err(|err| AppError::Internal(err.to_string()))
}

fn remove_cookie<B>(response: &mut HttpResponse<B>) -> Result<(), AppError> {
    response
        .add_removal_cookie(&session_cookie(String::new(), false))
        .map_err(|err| AppError::Internal(err.to_string()))
}
