use axum::extract::{Path, State};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::app::comments::CommentService;
use crate::app::tweets::TweetService;
use crate::app::users::UserService;
use crate::app::videos::VideoService;
use crate::domain::access::authorize_owner;
use crate::domain::comment::{Comment, CommentPage, MAX_COMMENT_LEN};
use crate::domain::pagination::{PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::domain::tweet::{Tweet, UserTweets, MAX_TWEET_LEN};
use crate::domain::user::User;
use crate::http::extract::{ApiJson, ApiQuery};
use crate::http::response::{ApiResponse, EmptyList, EmptyObject, Listing};
use crate::http::{AppError, AuthUser};
use crate::AppState;

fn parse_object_id(value: &str, message: &'static str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value).map_err(|_| AppError::bad_request(message))
}

/// Trims `value` and enforces it is non-empty and at most `max_len` characters.
fn required_content(value: Option<String>, max_len: usize) -> Result<String, AppError> {
    let content = value.as_deref().map(str::trim).unwrap_or_default();
    if content.is_empty() {
        return Err(AppError::bad_request("Content is required"));
    }
    if content.chars().count() > max_len {
        return Err(AppError::bad_request(format!(
            "Content must be at most {} characters",
            max_len
        )));
    }
    Ok(content.to_string())
}

async fn require_user(state: &AppState, user_id: ObjectId) -> Result<User, AppError> {
    let service = UserService::new(state.store.clone());
    let user = service.get_user(user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user_id, "failed to load user");
        AppError::internal("failed to load user")
    })?;

    user.ok_or_else(|| AppError::not_found("User not found"))
}

async fn require_video(state: &AppState, video_id: ObjectId) -> Result<(), AppError> {
    let service = VideoService::new(state.store.clone());
    let exists = service.exists(video_id).await.map_err(|err| {
        tracing::error!(error = ?err, video_id = %video_id, "failed to load video");
        AppError::internal("failed to load video")
    })?;

    if exists {
        Ok(())
    } else {
        Err(AppError::not_found("Video not found"))
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let status = match state.store.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = ?err, "store ping failed");
            "degraded"
        }
    };

    ApiResponse::ok(HealthResponse { status }, "health check")
}

pub async fn fallback() -> AppError {
    AppError::not_found("route not found")
}

pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed("method not allowed")
}

#[derive(Deserialize)]
pub struct CommentListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    #[serde(default, alias = "content")]
    pub text: Option<String>,
}

pub async fn list_video_comments(
    Path(video_id): Path<String>,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CommentListQuery>,
) -> Result<ApiResponse<Listing<CommentPage>>, AppError> {
    let video_id = parse_object_id(&video_id, "Invalid Video Id")?;
    let page = PageRequest::new(
        query.page.unwrap_or(DEFAULT_PAGE),
        query.limit.unwrap_or(DEFAULT_LIMIT),
    )
    .ok_or_else(|| AppError::bad_request("page must be at least 1 and limit between 1 and 100"))?;

    require_video(&state, video_id).await?;

    let service = CommentService::new(state.store.clone());
    let page = service
        .list_for_video(video_id, page)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, video_id = %video_id, "failed to aggregate comments");
            AppError::internal("Internal server error in comment aggregation")
        })?;

    if page.comments.is_empty() {
        return Ok(ApiResponse::ok(
            Listing::Empty(EmptyList::default()),
            "No comments found",
        ));
    }

    Ok(ApiResponse::ok(Listing::Found(page), "success"))
}

pub async fn add_comment(
    Path(video_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<ApiResponse<Comment>, AppError> {
    let video_id = parse_object_id(&video_id, "Invalid Video Id")?;
    let content = required_content(payload.text, MAX_COMMENT_LEN)?;

    require_video(&state, video_id).await?;
    let user = require_user(&state, auth.user_id).await?;

    let service = CommentService::new(state.store.clone());
    let comment = service
        .add_comment(video_id, user.id, content)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user.id, video_id = %video_id, "failed to add comment");
            AppError::internal("Something went wrong while adding comment")
        })?;

    tracing::info!(comment_id = %comment.id, video_id = %video_id, "comment added");
    Ok(ApiResponse::created(comment, "Comment Added Successfully"))
}

pub async fn update_comment(
    Path(comment_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<ApiResponse<Comment>, AppError> {
    let comment_id = parse_object_id(&comment_id, "Invalid Comment Id")?;
    let content = required_content(payload.text, MAX_COMMENT_LEN)?;

    let service = CommentService::new(state.store.clone());
    let comment = service
        .get_comment(comment_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, comment_id = %comment_id, "failed to load comment");
            AppError::internal("Something went wrong while updating comment")
        })?
        .ok_or_else(|| AppError::not_found("Comment not found"))?;

    if !authorize_owner(auth.user_id, comment.owner_id).is_allowed() {
        return Err(AppError::forbidden(
            "You do not have permission to update this comment",
        ));
    }

    let updated = service
        .update_content(comment_id, &content)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, comment_id = %comment_id, "failed to update comment");
            AppError::internal("Something went wrong while updating comment")
        })?
        .ok_or_else(|| AppError::not_found("Comment not found"))?;

    Ok(ApiResponse::ok(updated, "Comment Updated Successfully"))
}

pub async fn delete_comment(
    Path(comment_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<EmptyObject>, AppError> {
    let comment_id = parse_object_id(&comment_id, "Invalid Comment Id")?;

    let service = CommentService::new(state.store.clone());
    let comment = service
        .get_comment(comment_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, comment_id = %comment_id, "failed to load comment");
            AppError::internal("Something went wrong while deleting comment")
        })?
        .ok_or_else(|| AppError::not_found("Not found comment for this id"))?;

    if !authorize_owner(auth.user_id, comment.owner_id).is_allowed() {
        return Err(AppError::forbidden(
            "You do not have permission to delete this comment",
        ));
    }

    let deleted = service.delete_comment(comment_id).await.map_err(|err| {
        tracing::error!(error = ?err, comment_id = %comment_id, user_id = %auth.user_id, "failed to delete comment");
        AppError::internal("Something went wrong while deleting comment")
    })?;

    if deleted {
        Ok(ApiResponse::ok(EmptyObject {}, "Comment Deleted Successfully"))
    } else {
        Err(AppError::not_found("Not found comment for this id"))
    }
}

#[derive(Deserialize)]
pub struct CreateTweetRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTweetRequest {
    #[serde(default, alias = "content")]
    pub newcontent: Option<String>,
}

pub async fn create_tweet(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateTweetRequest>,
) -> Result<ApiResponse<Tweet>, AppError> {
    let content = required_content(payload.content, MAX_TWEET_LEN)?;
    let user = require_user(&state, auth.user_id).await?;

    let service = TweetService::new(state.store.clone());
    let tweet = service
        .create_tweet(user.id, content)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user.id, "failed to create tweet");
            AppError::internal("Something went wrong while creating the tweet")
        })?;

    tracing::info!(tweet_id = %tweet.id, user_id = %user.id, "tweet created");
    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

pub async fn list_user_tweets(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserTweets>>, AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::bad_request("userId is required"));
    }
    let user_id = parse_object_id(&user_id, "Invalid User Id")?;

    let service = TweetService::new(state.store.clone());
    let tweets = service.list_by_user(user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user_id, "failed to fetch tweets");
        AppError::internal("Unable to fetch tweets")
    })?;

    if tweets.is_empty() {
        return Ok(ApiResponse::ok(Vec::new(), "User have no tweets"));
    }

    Ok(ApiResponse::ok(
        tweets,
        "Tweet for the user fetched successfully!",
    ))
}

pub async fn update_tweet(
    Path(tweet_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateTweetRequest>,
) -> Result<ApiResponse<Tweet>, AppError> {
    let tweet_id = parse_object_id(&tweet_id, "Invalid Tweet Id")?;
    let user = require_user(&state, auth.user_id).await?;

    let service = TweetService::new(state.store.clone());
    let tweet = service
        .get_tweet(tweet_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, tweet_id = %tweet_id, "failed to load tweet");
            AppError::internal("Something went wrong while updating tweet")
        })?
        .ok_or_else(|| AppError::not_found("Tweet not found"))?;

    let content = required_content(payload.newcontent, MAX_TWEET_LEN)?;

    if !authorize_owner(user.id, tweet.owner_id).is_allowed() {
        return Err(AppError::forbidden(
            "You do not have permission to update this tweet",
        ));
    }

    let updated = service
        .update_content(tweet_id, &content)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, tweet_id = %tweet_id, "failed to update tweet");
            AppError::internal("Something went wrong while updating tweet")
        })?
        .ok_or_else(|| AppError::not_found("Tweet not found"))?;

    Ok(ApiResponse::ok(updated, "Tweet updated successfully"))
}

pub async fn delete_tweet(
    Path(tweet_id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<EmptyObject>, AppError> {
    let tweet_id = parse_object_id(&tweet_id, "Invalid Tweet Id")?;
    let user = require_user(&state, auth.user_id).await?;

    let service = TweetService::new(state.store.clone());
    let tweet = service
        .get_tweet(tweet_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, tweet_id = %tweet_id, "failed to load tweet");
            AppError::internal("Something went wrong while deleting tweet")
        })?
        .ok_or_else(|| AppError::not_found("Tweet not found"))?;

    if !authorize_owner(user.id, tweet.owner_id).is_allowed() {
        return Err(AppError::forbidden(
            "You do not have permission to delete this tweet",
        ));
    }

    let deleted = service.delete_tweet(tweet_id).await.map_err(|err| {
        tracing::error!(error = ?err, tweet_id = %tweet_id, user_id = %user.id, "failed to delete tweet");
        AppError::internal("Something went wrong while deleting tweet")
    })?;

    if deleted {
        Ok(ApiResponse::ok(EmptyObject {}, "Tweet deleted successfully"))
    } else {
        Err(AppError::not_found("Tweet not found"))
    }
}
