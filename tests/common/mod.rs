use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use mesa_api::{
    auth::AuthService,
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    models::Role,
    AppState,
};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "a_test_secret_key_for_integration_tests_only";

/// Test harness: real router over a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_file: NamedTempFile,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_file = NamedTempFile::new().expect("create temp db file");
        let database_url = format!("sqlite://{}?mode=rwc", db_file.path().display());

        let cfg = AppConfig::new(database_url, TEST_JWT_SECRET.to_string());

        let pool = db::establish_connection(&cfg.database_url)
            .await
            .expect("connect test database");
        db::run_migrations(&pool).await.expect("run migrations");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::from_config(&cfg));
        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            auth_service.clone(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            auth: auth_service,
            services,
            event_sender,
        };

        let router = mesa_api::app_router(state.clone());

        Self {
            router,
            state,
            _db_file: db_file,
            _event_task: event_task,
        }
    }

    /// Bearer token for a synthetic staff member with the given role.
    pub fn staff_token(&self, role: Role) -> String {
        self.state
            .auth
            .create_staff_token(Uuid::new_v4(), "Test Staff", "staff@mesa.test", role)
            .expect("create staff token")
    }

    /// Bearer token for a synthetic customer.
    pub fn app_token(&self, user_id: Uuid) -> String {
        self.state
            .auth
            .create_app_token(user_id, "Test Customer", "customer@mesa.test")
            .expect("create app token")
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("route request")
    }
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse response body")
}
