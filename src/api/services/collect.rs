//! 采集信标
//!
//! 页面通过信标驱动服务端的页面视图：`pageview` 挂载追踪器，
//! `click` 把点击分发进页面文档，`leave` 卸载。写入失败只记录日志，
//! 信标一律快速返回。

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::http::header::USER_AGENT;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, warn};

use crate::api::pages::PageRegistry;
use crate::api::types::{
    ClickAccepted, ErrorCode, PageviewAccepted, PageviewRequest, error_from_clickpulse,
    json_response,
};
use crate::capture::{PageContext, PointerEvent};
use crate::errors::ClickpulseError;
use crate::tracker::Tracker;

pub struct CollectorState {
    pub tracker: Tracker,
    pub pages: PageRegistry,
    pub cookie_name: String,
}

impl CollectorState {
    fn session_cookie(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(&self.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }
}

pub struct CollectService;

impl CollectService {
    pub async fn pageview(
        req: HttpRequest,
        state: web::Data<CollectorState>,
        body: web::Json<PageviewRequest>,
    ) -> HttpResponse {
        let body = body.into_inner();
        if body.pathname.trim().is_empty() {
            return error_from_clickpulse(&ClickpulseError::validation("pathname is required"));
        }

        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let href = if body.href.is_empty() {
            body.pathname.clone()
        } else {
            body.href
        };

        let page = PageContext {
            href,
            pathname: body.pathname,
            user_agent,
            referrer: body.referrer,
        };

        let cookie = state.session_cookie(&req);
        let mounted = state.pages.mount(&state.tracker, cookie.as_deref(), page);

        let mut response = json_response(
            StatusCode::ACCEPTED,
            ErrorCode::Success,
            "Accepted",
            Some(PageviewAccepted {
                session_id: mounted.session_id,
            }),
        );

        if let Some(issued) = mounted.issued_session {
            let cookie = Cookie::build(state.cookie_name.clone(), issued)
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish();
            if let Err(e) = response.add_cookie(&cookie) {
                warn!("Failed to set session cookie: {}", e);
            }
        }

        response
    }

    pub async fn click(
        req: HttpRequest,
        state: web::Data<CollectorState>,
        body: web::Json<PointerEvent>,
    ) -> HttpResponse {
        let event = body.into_inner();

        let listeners = match state.session_cookie(&req) {
            Some(session_id) => match state.pages.dispatch_click(&session_id, &event) {
                Some(count) => count,
                None => {
                    debug!("Click for session {} without a mounted page", session_id);
                    0
                }
            },
            None => {
                warn!("Click beacon without session cookie, skipped");
                0
            }
        };

        json_response(
            StatusCode::ACCEPTED,
            ErrorCode::Success,
            "Accepted",
            Some(ClickAccepted { listeners }),
        )
    }

    pub async fn leave(req: HttpRequest, state: web::Data<CollectorState>) -> HttpResponse {
        if let Some(session_id) = state.session_cookie(&req)
            && state.pages.leave(&session_id)
        {
            debug!("Page view for session {} left", session_id);
        }
        HttpResponse::NoContent().finish()
    }
}

pub fn collect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/pageview", web::post().to(CollectService::pageview))
        .route("/click", web::post().to(CollectService::click))
        .route("/leave", web::post().to(CollectService::leave))
}
