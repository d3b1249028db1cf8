#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use heritage_backend::config::AppConfig;
use heritage_backend::infrastructure::database;
use heritage_backend::services::storage::StorageService;
use heritage_backend::{AppState, create_app};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "curator@example.com";
pub const ADMIN_PASSWORD: &str = "angkor-1113";
pub const DEFAULT_HERO: &str = "https://cdn.test/default-hero.jpg";
pub const PNG: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, 0x49, 0x48, 0x44, 0x52,
];

pub struct MockStorageService {
    pub files: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload_file(&self, key: &str, data: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn file_exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://cdn.test/media/{}", key)
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub storage: Arc<MockStorageService>,
}

pub async fn setup() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let config = AppConfig {
        jwt_secret: "test_secret".to_string(),
        default_hero_image: DEFAULT_HERO.to_string(),
        max_upload_size: 1024,
        ..AppConfig::default()
    };

    let storage = Arc::new(MockStorageService::new());
    let state = AppState::new(db, storage.clone(), config);
    state
        .auth
        .create_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();

    TestApp {
        app: create_app(state.clone()),
        state,
        storage,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn login(&self) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/admin/login",
                None,
                serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn authed(&self, method: &str, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = match body {
            Some(json) => json_request(method, uri, Some(token), json),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        };
        self.send(req).await
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn multipart_request(uri: &str, token: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "heritage-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}
