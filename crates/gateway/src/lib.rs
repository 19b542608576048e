//! HTTP gateway for Storewise.
//!
//! Serves the embedded web chat and a small JSON API over the session
//! driver. Every browser tab is its own session, keyed by the
//! `X-Session-Id` header, so concurrent users never share a transcript.

pub mod api_v1;
pub mod frontend;

#[cfg(test)]
pub(crate) mod testing;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use storewise_agent::{GuardedSession, SessionDriver};
use storewise_config::{AppConfig, GatewayConfig};
use storewise_core::event::EventBus;

/// Maximum number of live sessions before the oldest idle ones are evicted.
const MAX_SESSIONS: usize = 1_000;

#[derive(Default)]
struct SessionTable {
    sessions: HashMap<String, Arc<GuardedSession>>,
    /// Creation order, oldest first.
    order: VecDeque<String>,
}

impl SessionTable {
    fn evict_idle(&mut self) {
        while self.sessions.len() >= MAX_SESSIONS {
            let Some(pos) = self
                .order
                .iter()
                .position(|id| self.sessions.get(id).is_some_and(|s| !s.is_busy()))
            else {
                warn!(sessions = self.sessions.len(), "Every session is busy; not evicting");
                return;
            };
            if let Some(id) = self.order.remove(pos) {
                self.sessions.remove(&id);
            }
        }
    }
}

/// Shared application state for the gateway.
pub struct GatewayState {
    driver: SessionDriver,
    sessions: RwLock<SessionTable>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// `driver` is the template every session is cloned from.
    pub fn new(driver: SessionDriver) -> Self {
        Self {
            driver,
            sessions: RwLock::new(SessionTable::default()),
        }
    }

    pub fn events(&self) -> &EventBus {
        self.driver.events()
    }

    /// The session for `id`, created on first use.
    pub async fn session(&self, id: &str) -> Arc<GuardedSession> {
        if let Some(session) = self.sessions.read().await.sessions.get(id) {
            return session.clone();
        }

        let mut table = self.sessions.write().await;
        if let Some(session) = table.sessions.get(id) {
            return session.clone();
        }
        table.evict_idle();
        let session = Arc::new(GuardedSession::new(self.driver.clone().with_session_id(id)));
        table.sessions.insert(id.to_string(), session.clone());
        table.order.push_back(id.to_string());
        info!(session_id = id, "Session created");
        session
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.sessions.len()
    }
}

/// Build the full router: health check, v1 API and the embedded frontend.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Only the gateway's own origin may call the API from a browser.
fn cors_layer(config: &GatewayConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(api_v1::SESSION_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600));

    let origin = format!("http://{}:{}", config.host, config.port);
    match HeaderValue::from_str(&origin) {
        Ok(origin) => cors.allow_origin(AllowOrigin::exact(origin)),
        Err(e) => {
            warn!(origin = %origin, error = %e, "Invalid gateway origin; cross-origin requests disabled");
            cors
        }
    }
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let driver = SessionDriver::from_config(&config, EventBus::default())?;
    let state = Arc::new(GatewayState::new(driver));
    let app = build_router(state).layer(cors_layer(&config.gateway));

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Storewise gateway listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(MockProvider::replying("Hello!")));

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn sessions_are_created_once_per_id() {
        let state = test_state(MockProvider::replying("Hello!"));

        let a = state.session("a").await;
        let again = state.session("a").await;
        let b = state.session("b").await;

        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.driver().session_id(), "a");
        assert_eq!(state.session_count().await, 2);
    }

    #[tokio::test]
    async fn oldest_idle_session_is_evicted_at_capacity() {
        let state = test_state(MockProvider::replying("Hello!"));
        for i in 0..MAX_SESSIONS {
            state.session(&format!("s{i}")).await;
        }
        let first = state.session("s0").await;

        state.session("one-more").await;

        assert_eq!(state.session_count().await, MAX_SESSIONS);
        let recreated = state.session("s0").await;
        assert!(!Arc::ptr_eq(&first, &recreated));
    }
}
