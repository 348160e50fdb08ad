use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;

use crate::{
    auth::utils::{get_user_from_session, CurrentUser},
    error::AppError,
    session::Session,
    DbPool,
};

/// Lets a request through only when the session belongs to an admin.
#[derive(Clone, Default)]
pub struct AdminGuard;

impl<S, B> Transform<S, ServiceRequest> for AdminGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct AdminGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let session = req.extensions().get::<Session>().cloned();
            let pool = req.app_data::<web::Data<DbPool>>().cloned();
            let (session, pool) = match (session, pool) {
                (Some(session), Some(pool)) => (session, pool),
                _ => {
                    return Err(
                        AppError::Internal("admin guard needs session and pool".to_string()).into(),
                    )
                }
            };

            let refusal = match get_user_from_session(&session, &pool).await? {
                Some(user) if user.is_admin() => {
                    req.extensions_mut().insert(CurrentUser(user));
                    return service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body);
                }
                Some(user) => {
                    tracing::warn!(user_id = user.id, path = req.path(), "non-admin refused");
                    AppError::Forbidden("Administrators only".to_string())
                }
                None => AppError::Forbidden("Administrators only".to_string()),
            };

            Ok(req.error_response(refusal).map_into_right_body())
        })
    }
}
