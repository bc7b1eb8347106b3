#![allow(dead_code)]

use anyhow::{anyhow, Result};
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mongodb::bson::oid::ObjectId;
use pasetors::claims::Claims;
use pasetors::keys::SymmetricKey;
use pasetors::{local, version4::V4};
use serde_json::Value;
use std::sync::Arc;
use time::OffsetDateTime;
use tower::ServiceExt;

use tubetalk::domain::comment::{Comment, VideoComment};
use tubetalk::domain::pagination::PageRequest;
use tubetalk::domain::tweet::{Tweet, UserTweets};
use tubetalk::domain::user::User;
use tubetalk::infra::memory::MemoryStore;
use tubetalk::infra::store::{SharedStore, Store};
use tubetalk::AppState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

// "0123456789abcdef0123456789abcdef" (32 bytes), test-only
const TEST_PASETO_ACCESS_KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";
const TEST_TOKEN_ISSUER: &str = "tubetalk-test";
const TEST_MAX_BODY_BYTES: usize = 65_536;

// ---------------------------------------------------------------------------
// TestApp: a fresh router over an empty in-memory store per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub store: MemoryStore,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or("").to_string()
    }

    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }
}

pub struct TestUser {
    pub id: ObjectId,
    pub username: String,
    pub access_token: String,
}

pub fn app() -> TestApp {
    let store = MemoryStore::new();
    build_app(Arc::new(store.clone()), store, TEST_MAX_BODY_BYTES)
}

pub fn app_with_body_limit(max_body_bytes: usize) -> TestApp {
    let store = MemoryStore::new();
    build_app(Arc::new(store.clone()), store, max_body_bytes)
}

/// Users, videos and single-document reads are served from `TestApp::store`;
/// every write, listing and ping fails.
pub fn app_with_failing_store() -> TestApp {
    let store = MemoryStore::new();
    let failing = FailingStore {
        reads: store.clone(),
    };
    build_app(Arc::new(failing), store, TEST_MAX_BODY_BYTES)
}

fn build_app(shared: SharedStore, store: MemoryStore, max_body_bytes: usize) -> TestApp {
    let state = AppState {
        store: shared,
        paseto_access_key: TEST_PASETO_ACCESS_KEY,
        token_issuer: TEST_TOKEN_ISSUER.to_string(),
    };
    let router = tubetalk::http::with_layers(tubetalk::http::router(state), max_body_bytes);

    TestApp { router, store }
}

// ---------------------------------------------------------------------------
// FailingStore: a backend whose writes and aggregations are down
// ---------------------------------------------------------------------------

struct FailingStore {
    reads: MemoryStore,
}

fn store_down<T>() -> Result<T> {
    Err(anyhow!("connection reset by store"))
}

#[axum::async_trait]
impl Store for FailingStore {
    async fn ping(&self) -> Result<()> {
        store_down()
    }

    async fn user_by_id(&self, user_id: ObjectId) -> Result<Option<User>> {
        self.reads.user_by_id(user_id).await
    }

    async fn video_exists(&self, video_id: ObjectId) -> Result<bool> {
        self.reads.video_exists(video_id).await
    }

    async fn insert_comment(&self, _comment: &Comment) -> Result<()> {
        store_down()
    }

    async fn comment_by_id(&self, comment_id: ObjectId) -> Result<Option<Comment>> {
        self.reads.comment_by_id(comment_id).await
    }

    async fn update_comment_content(
        &self,
        _comment_id: ObjectId,
        _content: &str,
        _updated_at: OffsetDateTime,
    ) -> Result<Option<Comment>> {
        store_down()
    }

    async fn delete_comment(&self, _comment_id: ObjectId) -> Result<bool> {
        store_down()
    }

    async fn video_comments(
        &self,
        _video_id: ObjectId,
        _page: PageRequest,
    ) -> Result<(Vec<VideoComment>, u64)> {
        store_down()
    }

    async fn insert_tweet(&self, _tweet: &Tweet) -> Result<()> {
        store_down()
    }

    async fn tweet_by_id(&self, tweet_id: ObjectId) -> Result<Option<Tweet>> {
        self.reads.tweet_by_id(tweet_id).await
    }

    async fn update_tweet_content(
        &self,
        _tweet_id: ObjectId,
        _content: &str,
        _updated_at: OffsetDateTime,
    ) -> Result<Option<Tweet>> {
        store_down()
    }

    async fn delete_tweet(&self, _tweet_id: ObjectId) -> Result<bool> {
        store_down()
    }

    async fn user_tweets(&self, _owner_id: ObjectId) -> Result<Vec<UserTweets>> {
        store_down()
    }
}

/// Mint an access token the way the upstream account service does.
pub fn access_token_for(user_id: ObjectId) -> String {
    let key = SymmetricKey::<V4>::from(&TEST_PASETO_ACCESS_KEY).expect("test key");
    let mut claims = Claims::new().expect("claims");
    claims.issuer(TEST_TOKEN_ISSUER).expect("issuer");
    claims.audience(TEST_TOKEN_ISSUER).expect("audience");
    claims.subject(&user_id.to_hex()).expect("subject");
    claims.add_additional("typ", "access").expect("typ");
    local::encrypt(&key, &claims, None, None).expect("encrypt token")
}

impl TestApp {
    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body_bytes,
        }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, path, Some(body), token).await
    }

    pub async fn patch_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::PATCH, path, Some(body), token).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, path, None, token).await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Register a user in the store and mint an access token for them.
    pub async fn create_user(&self, username: &str) -> TestUser {
        let id = ObjectId::new();
        self.store
            .insert_user(User {
                id,
                username: username.to_string(),
                avatar_url: Some(format!("https://cdn.example.com/{}.png", username)),
            })
            .await;

        TestUser {
            id,
            username: username.to_string(),
            access_token: access_token_for(id),
        }
    }

    pub async fn create_video(&self) -> ObjectId {
        let id = ObjectId::new();
        self.store.insert_video(id).await;
        id
    }

    /// Insert a comment directly with a fixed creation time (seconds since epoch).
    pub async fn insert_comment_at(
        &self,
        video_id: ObjectId,
        owner_id: ObjectId,
        content: &str,
        seconds: i64,
    ) -> ObjectId {
        let at = OffsetDateTime::from_unix_timestamp(seconds).expect("timestamp");
        let comment = Comment {
            id: ObjectId::new(),
            video_id,
            owner_id,
            content: content.to_string(),
            created_at: at,
            updated_at: at,
        };
        self.store
            .insert_comment(&comment)
            .await
            .expect("insert comment failed");
        comment.id
    }

    /// Insert a tweet directly with a fixed creation time (seconds since epoch).
    pub async fn insert_tweet_at(&self, owner_id: ObjectId, content: &str, seconds: i64) -> ObjectId {
        let at = OffsetDateTime::from_unix_timestamp(seconds).expect("timestamp");
        let tweet = Tweet {
            id: ObjectId::new(),
            owner_id,
            content: content.to_string(),
            created_at: at,
            updated_at: at,
        };
        self.store
            .insert_tweet(&tweet)
            .await
            .expect("insert tweet failed");
        tweet.id
    }

    pub async fn stored_comment(&self, comment_id: ObjectId) -> Option<Comment> {
        self.store
            .comment_by_id(comment_id)
            .await
            .expect("load comment failed")
    }
}
