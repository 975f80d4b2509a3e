#![allow(dead_code)]
use std::{net::SocketAddr, sync::Arc};

use uuid::Uuid;

use clubhub_backend::{
    api,
    auth::{Claims, Role},
    store::{DynStore, MemoryStore},
    AppState,
};

pub const JWT_SECRET: &str = "test-secret-that-is-at-least-32-chars-long!!";
const JWT_EXPIRY_HOURS: u64 = 12;
pub const PASSWORD: &str = "testpass123";

pub struct TestApp {
    pub addr: SocketAddr,
    pub store: DynStore,
    pub client: reqwest::Client,
}

/// Spin up a real Axum server on a random port backed by a fresh in-memory
/// store. Every test gets its own store, so the first signup in a test is
/// always the superadmin.
pub async fn setup_test_app() -> TestApp {
    setup_with_debug(false).await
}

pub async fn setup_with_debug(debug_routes: bool) -> TestApp {
    let store: DynStore = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiry_hours: JWT_EXPIRY_HOURS,
        debug_routes,
    };

    // main.rs puts the rate limiter in front of the auth routes; tests run without it
    let app = api::router(state.clone()).merge(api::auth_router(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        addr,
        store,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// POST /api/auth/signup and return the raw response.
    pub async fn signup_raw(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/signup"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Signup request failed")
    }

    /// Sign up and return (user id, token).
    pub async fn signup(&self, email: &str) -> (Uuid, String) {
        let resp = self.signup_raw(email, PASSWORD).await;
        assert_eq!(resp.status(), 201, "Signup should return 201");
        let body: serde_json::Value = resp.json().await.unwrap();
        let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        (id, body["token"].as_str().unwrap().to_string())
    }

    pub async fn signin(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/signin"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Signin request failed")
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    pub async fn post(&self, path: &str, token: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn patch(&self, path: &str, token: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    /// Create an organization as `token` and return its id.
    pub async fn create_org(&self, token: &str, name: &str, admin_email: &str) -> Uuid {
        let resp = self
            .post(
                "/api/organizations",
                token,
                serde_json::json!({ "name": name, "admin_email": admin_email }),
            )
            .await;
        assert_eq!(resp.status(), 200, "Organization create should return 200");
        let body: serde_json::Value = resp.json().await.unwrap();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    /// Superadmin, one org with an admin and a student member.
    pub async fn seed_org(&self, name: &str) -> OrgFixture {
        let superadmin_email = unique_email("root");
        let (_, superadmin_token) = self.signup(&superadmin_email).await;
        self.seed_org_with(&superadmin_token, name).await
    }

    /// Another org under an existing superadmin.
    pub async fn seed_org_with(&self, superadmin_token: &str, name: &str) -> OrgFixture {
        let admin_email = unique_email("admin");
        let student_email = unique_email("student");
        let (admin_id, _) = self.signup(&admin_email).await;
        let (student_id, _) = self.signup(&student_email).await;

        let org_id = self.create_org(superadmin_token, name, &admin_email).await;

        let resp = self
            .post(
                &format!("/api/organizations/{}/members", org_id),
                superadmin_token,
                serde_json::json!({ "email": student_email }),
            )
            .await;
        assert_eq!(resp.status(), 200, "Member assign should return 200");

        // Tokens issued after the membership change carry the new org
        let admin_token = self.token_for(&admin_email).await;
        let student_token = self.token_for(&student_email).await;

        OrgFixture {
            org_id,
            superadmin_token: superadmin_token.to_string(),
            admin_id,
            admin_email,
            admin_token,
            student_id,
            student_email,
            student_token,
        }
    }

    pub async fn token_for(&self, email: &str) -> String {
        let resp = self.signin(email, PASSWORD).await;
        assert_eq!(resp.status(), 200, "Signin should return 200");
        let body: serde_json::Value = resp.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }
}

pub struct OrgFixture {
    pub org_id: Uuid,
    pub superadmin_token: String,
    pub admin_id: Uuid,
    pub admin_email: String,
    pub admin_token: String,
    pub student_id: Uuid,
    pub student_email: String,
    pub student_token: String,
}

impl OrgFixture {
    pub fn path(&self, rest: &str) -> String {
        format!("/api/organizations/{}{}", self.org_id, rest)
    }
}

/// Unique email per call so tests never collide.
pub fn unique_email(prefix: &str) -> String {
    format!("{}+{}@test.local", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Create a JWT token that is already expired (exp in the past).
/// Uses the same secret as the test app.
pub fn create_expired_token(user_id: Uuid, email: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = time::OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        org_id: None,
        role: Role::Student,
        exp: (now - time::Duration::hours(1)).unix_timestamp(), // expired 1 hour ago
        iat: (now - time::Duration::hours(2)).unix_timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to create expired token")
}
