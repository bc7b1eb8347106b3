use axum::{routing::get, routing::patch, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn comments() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/comments/:video_id",
            get(handlers::list_video_comments).post(handlers::add_comment),
        )
        .route(
            "/api/v1/comments/c/:comment_id",
            patch(handlers::update_comment).delete(handlers::delete_comment),
        )
}

pub fn tweets() -> Router<AppState> {
    Router::new()
        .route("/api/v1/tweets", post(handlers::create_tweet))
        .route("/api/v1/tweets/user/:user_id", get(handlers::list_user_tweets))
        .route(
            "/api/v1/tweets/:tweet_id",
            patch(handlers::update_tweet).delete(handlers::delete_tweet),
        )
}
