//! Shared harness for the HTTP integration tests.
//!
//! Every test gets in-memory databases, a temporary storage directory and a
//! logged-in admin token.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use backoffice_lib::auth::hash_password;
use backoffice_lib::db::repository::ensure_admin;
use backoffice_lib::db::Databases;
use backoffice_lib::storage::Storage;
use backoffice_lib::{build_router, AppConfig, AppState};

pub const ADMIN_EMAIL: &str = "admin@vantripper.test";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";

const BOUNDARY: &str = "backoffice-test-boundary";

pub struct TestApp {
    pub state: AppState,
    pub token: String,
    router: Router,
    _storage_dir: TempDir,
}

/// A multipart file part
pub struct Upload<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

impl TestApp {
    pub async fn new() -> Self {
        let storage_dir = TempDir::new().expect("temp storage dir");
        let root = storage_dir.path().to_string_lossy().to_string();
        let config = AppConfig::from_lookup(|name| match name {
            "BACKOFFICE_DATA_DIR" | "BACKOFFICE_STORAGE_DIR" => Some(root.clone()),
            "BACKOFFICE_APP_URL" => Some("http://backoffice.test".to_string()),
            _ => None,
        })
        .expect("test config");

        let dbs = Databases::in_memory().expect("in-memory databases");
        {
            let conn = dbs.main.lock().expect("main db lock");
            let hash = hash_password(ADMIN_PASSWORD).expect("hash admin password");
            ensure_admin(&conn, ADMIN_EMAIL, &hash).expect("seed admin");
        }
        let storage =
            Storage::new(storage_dir.path(), config.app_url.clone()).expect("test storage");

        let state = AppState::new(dbs, storage, config);
        let router = build_router(state.clone());
        let mut app = Self {
            state,
            token: String::new(),
            router,
            _storage_dir: storage_dir,
        };
        app.token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        app
    }

    /// Log in and return the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send_json(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn raw(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");
        read_json(self.raw(request).await).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send_json(Method::GET, uri, None, Some(&self.token)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json(Method::POST, uri, Some(body), Some(&self.token))
            .await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json(Method::PUT, uri, Some(body), Some(&self.token))
            .await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json(Method::PATCH, uri, Some(body), Some(&self.token))
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send_json(Method::DELETE, uri, None, Some(&self.token))
            .await
    }

    /// Send a `multipart/form-data` body with the admin token.
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
        files: &[Upload<'_>],
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for file in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    file.field, file.file_name, file.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(file.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("valid multipart request");
        read_json(self.raw(request).await).await
    }

    /// Register an account and have the admin verify and approve it.
    pub async fn approved_user(&self, email: &str, password: &str) -> i64 {
        let (status, body) = self
            .send_json(
                Method::POST,
                "/api/auth/register",
                Some(json!({
                    "name": "Staff Member",
                    "email": email,
                    "password": password,
                    "password_confirmation": password,
                })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["data"]["user"]["id"].as_i64().expect("user id");

        let (status, _) = self.post(&format!("/api/admin/users/{id}/verify"), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = self.post(&format!("/api/admin/users/{id}/approve"), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        id
    }
}

pub async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
