//! Database-backed sessions.
//!
//! A session is a JSON object of keys stored in the `sessions` table and named
//! by the `portfolio_session` cookie. [`SessionMiddleware`] loads it before the
//! handler runs and writes it back afterwards when the handler changed it.

pub mod csrf;
mod middleware;

pub use self::middleware::SessionMiddleware;

use std::{
    cell::RefCell,
    collections::HashMap,
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

pub const SESSION_COOKIE: &str = "portfolio_session";

const USER_ID_KEY: &str = "user_id";
const FLASHES_KEY: &str = "_flashes";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Unchanged,
    Changed,
    /// Must be stored under a fresh id; the old row is dropped.
    Renewed,
    Purged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: String,
    pub message: String,
}

pub const FLASH_SUCCESS: &str = "success";

#[derive(Default)]
struct SessionInner {
    id: Option<String>,
    state: HashMap<String, Value>,
    status: SessionStatus,
}

#[derive(Clone, Default)]
pub struct Session(Rc<RefCell<SessionInner>>);

impl Session {
    pub(crate) fn load(id: Option<String>, state: HashMap<String, Value>) -> Self {
        Self(Rc::new(RefCell::new(SessionInner {
            id,
            state,
            status: SessionStatus::Unchanged,
        })))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.0.borrow().state.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|err| AppError::Internal(format!("bad session value {}: {}", key, err))),
            None => Ok(None),
        }
    }

    pub fn insert<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|err| AppError::Internal(format!("unserializable session value: {}", err)))?;
        let mut inner = self.0.borrow_mut();
        inner.state.insert(key.into(), value);
        inner.mark_changed();
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut inner = self.0.borrow_mut();
        let removed = inner.state.remove(key);
        if removed.is_some() {
            inner.mark_changed();
        }
        removed
    }

    /// Keeps the data but moves it to a new id, e.g. after login.
    pub fn renew(&self) {
        let mut inner = self.0.borrow_mut();
        if inner.status != SessionStatus::Purged {
            inner.status = SessionStatus::Renewed;
        }
    }

    /// Drops the data and the stored row.
    pub fn purge(&self) {
        let mut inner = self.0.borrow_mut();
        inner.state.clear();
        inner.status = SessionStatus::Purged;
    }

    pub fn status(&self) -> SessionStatus {
        self.0.borrow().status
    }

    pub fn user_id(&self) -> Result<Option<i32>> {
        self.get(USER_ID_KEY)
    }

    pub fn set_user_id(&self, user_id: i32) -> Result<()> {
        self.insert(USER_ID_KEY, user_id)
    }

    pub fn forget_user(&self) {
        self.remove(USER_ID_KEY);
    }

    pub fn add_flash(&self, kind: &str, message: impl Into<String>) -> Result<()> {
        let mut flashes: Vec<Flash> = self.get(FLASHES_KEY)?.unwrap_or_default();
        flashes.push(Flash {
            kind: kind.to_string(),
            message: message.into(),
        });
        self.insert(FLASHES_KEY, flashes)
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        match self.remove(FLASHES_KEY) {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> (Option<String>, SessionStatus, HashMap<String, Value>) {
        let inner = self.0.borrow();
        (inner.id.clone(), inner.status, inner.state.clone())
    }
}

impl SessionInner {
    fn mark_changed(&mut self) {
        self.status = match self.status {
            SessionStatus::Unchanged | SessionStatus::Changed => SessionStatus::Changed,
            SessionStatus::Renewed | SessionStatus::Purged => SessionStatus::Renewed,
        };
    }
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Session>()
                .cloned()
                .ok_or_else(|| AppError::Internal("session middleware not installed".to_string())),
        )
    }
}
