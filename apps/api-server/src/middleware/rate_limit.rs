//! Rate limiting middleware.

use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
    web,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use quill_core::ports::{RateLimiter, TokenService};

use super::error::AppError;

/// Rate limiting middleware factory. Without a limiter every request passes.
pub struct RateLimitMiddleware {
    limiter: Option<Arc<dyn RateLimiter>>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Option<Arc<dyn RateLimiter>>,
}

/// Signed-in callers are limited per user, everyone else per address.
fn client_key(req: &ServiceRequest) -> String {
    let user = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .zip(req.app_data::<web::Data<Arc<dyn TokenService>>>())
        .and_then(|(token, tokens)| tokens.validate_token(token.trim()).ok());

    match user {
        Some(claims) => format!("user:{}", claims.user_id),
        None => format!(
            "ip:{}",
            req.connection_info().realip_remote_addr().unwrap_or("unknown")
        ),
    }
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let Some(limiter) = self.limiter.clone() else {
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        };
        let key = client_key(&req);

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(key = %key, "Rate limit exceeded");
                    let err = AppError::TooManyRequests {
                        retry_after: result.reset_after,
                    };
                    return Ok(req.error_response(err).map_into_right_body());
                }
                Ok(_) => {}
                // Fail open.
                Err(e) => tracing::error!(error = %e, "Rate limiter error, failing open"),
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
