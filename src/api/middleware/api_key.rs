//! API key admission
//!
//! `/collect` 与 `/api` 要求请求携带后端访问密钥：`apikey` 头，
//! 或 `Authorization: Bearer <key>`。比较使用常数时间。

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode, header::AUTHORIZATION},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{trace, warn};

use crate::api::constants::API_KEY_HEADER;
use crate::api::types::{ErrorCode, error_response};

#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Arc<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Arc::new(api_key.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            api_key: self.api_key.clone(),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    api_key: Arc<String>,
}

/// 从请求头提取密钥
fn presented_key(req: &ServiceRequest) -> Option<String> {
    if let Some(value) = req.headers().get(API_KEY_HEADER)
        && let Ok(key) = value.to_str()
    {
        return Some(key.trim().to_string());
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn key_matches(expected: &str, presented: &str) -> bool {
    // 长度不同时 ct_eq 直接返回 false
    bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let api_key = self.api_key.clone();

        Box::pin(async move {
            // CORS 预检不携带密钥
            if req.method() == Method::OPTIONS {
                let response = srv.call(req).await?.map_into_left_body();
                return Ok(response);
            }

            let Some(presented) = presented_key(&req) else {
                warn!("Rejected {} {}: missing api key", req.method(), req.path());
                return Ok(req.into_response(
                    error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::ApiKeyMissing,
                        "Missing api key",
                    )
                    .map_into_right_body(),
                ));
            };

            if api_key.is_empty() || !key_matches(&api_key, &presented) {
                warn!("Rejected {} {}: invalid api key", req.method(), req.path());
                return Ok(req.into_response(
                    error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::ApiKeyInvalid,
                        "Invalid api key",
                    )
                    .map_into_right_body(),
                ));
            }

            trace!("Api key accepted");
            let response = srv.call(req).await?.map_into_left_body();
            Ok(response)
        })
    }
}
