use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::{
    database::{self, users},
    error::{AppError, Result},
    models::users::User,
    session::Session,
    DbPool,
};

/// The logged-in user. Use `Option<CurrentUser>` on pages open to everyone.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

pub async fn get_user_from_session(
    session: &Session,
    pool: &web::Data<DbPool>,
) -> Result<Option<User>> {
    let user_id = match session.user_id()? {
        Some(user_id) => user_id,
        None => return Ok(None),
    };

    let user = database::run(pool, move |conn| match users::find(conn, user_id) {
        Ok(user) => Ok(Some(user)),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    })
    .await?;

    if user.is_none() {
        tracing::info!(user_id, "session refers to a deleted user");
        session.forget_user();
    }

    Ok(user)
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<CurrentUser>() {
            let user = user.clone();
            return Box::pin(async move { Ok(user) });
        }

        let session = req.extensions().get::<Session>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move {
            let (session, pool) = match (session, pool) {
                (Some(session), Some(pool)) => (session, pool),
                _ => {
                    return Err(AppError::Internal(
                        "current user needs session and pool".to_string(),
                    ))
                }
            };

            match get_user_from_session(&session, &pool).await? {
                Some(user) => Ok(CurrentUser(user)),
                None => Err(AppError::Forbidden("Login required".to_string())),
            }
        })
    }
}
