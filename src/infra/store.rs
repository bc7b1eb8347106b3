use std::sync::Arc;

use anyhow::Result;
use mongodb::bson::oid::ObjectId;
use time::OffsetDateTime;

use crate::domain::comment::{Comment, VideoComment};
use crate::domain::pagination::PageRequest;
use crate::domain::tweet::{Tweet, UserTweets};
use crate::domain::user::User;

pub type SharedStore = Arc<dyn Store>;

/// Document storage for comments and tweets. Users and videos are owned by
/// other services and are only read here.
///
/// Every method is a single-document operation except the two listings.
#[axum::async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn user_by_id(&self, user_id: ObjectId) -> Result<Option<User>>;

    async fn video_exists(&self, video_id: ObjectId) -> Result<bool>;

    async fn insert_comment(&self, comment: &Comment) -> Result<()>;

    async fn comment_by_id(&self, comment_id: ObjectId) -> Result<Option<Comment>>;

    async fn update_comment_content(
        &self,
        comment_id: ObjectId,
        content: &str,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Comment>>;

    async fn delete_comment(&self, comment_id: ObjectId) -> Result<bool>;

    /// One page of a video's comments, newest first, each joined with its
    /// owner summary, plus the total number of comments on the video.
    async fn video_comments(
        &self,
        video_id: ObjectId,
        page: PageRequest,
    ) -> Result<(Vec<VideoComment>, u64)>;

    async fn insert_tweet(&self, tweet: &Tweet) -> Result<()>;

    async fn tweet_by_id(&self, tweet_id: ObjectId) -> Result<Option<Tweet>>;

    async fn update_tweet_content(
        &self,
        tweet_id: ObjectId,
        content: &str,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Tweet>>;

    async fn delete_tweet(&self, tweet_id: ObjectId) -> Result<bool>;

    /// All tweet bodies of `owner_id` grouped into a single entry, or an empty
    /// vector when the user has none.
    async fn user_tweets(&self, owner_id: ObjectId) -> Result<Vec<UserTweets>>;
}
