use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use mongodb::bson::oid::ObjectId;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::domain::comment::{attach_owners, Comment, VideoComment};
use crate::domain::pagination::PageRequest;
use crate::domain::tweet::{Tweet, UserTweets};
use crate::domain::user::User;
use crate::infra::store::Store;

#[derive(Default)]
struct Collections {
    users: HashMap<ObjectId, User>,
    videos: HashSet<ObjectId>,
    comments: HashMap<ObjectId, Comment>,
    tweets: HashMap<ObjectId, Tweet>,
}

/// Process-local store with the same semantics as the MongoDB one. Users and
/// videos are registered through the inherent methods since this service never
/// creates them.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id, user);
    }

    pub async fn insert_video(&self, video_id: ObjectId) {
        self.inner.write().await.videos.insert(video_id);
    }
}

fn newest_first(a: &Comment, b: &Comment) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[axum::async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn user_by_id(&self, user_id: ObjectId) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn video_exists(&self, video_id: ObjectId) -> Result<bool> {
        Ok(self.inner.read().await.videos.contains(&video_id))
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.inner
            .write()
            .await
            .comments
            .insert(comment.id, comment.clone());
        Ok(())
    }

    async fn comment_by_id(&self, comment_id: ObjectId) -> Result<Option<Comment>> {
        Ok(self.inner.read().await.comments.get(&comment_id).cloned())
    }

    async fn update_comment_content(
        &self,
        comment_id: ObjectId,
        content: &str,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Comment>> {
        let mut inner = self.inner.write().await;
        let updated = inner.comments.get_mut(&comment_id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = updated_at;
            comment.clone()
        });
        Ok(updated)
    }

    async fn delete_comment(&self, comment_id: ObjectId) -> Result<bool> {
        Ok(self
            .inner
            .write()
            .await
            .comments
            .remove(&comment_id)
            .is_some())
    }

    async fn video_comments(
        &self,
        video_id: ObjectId,
        page: PageRequest,
    ) -> Result<(Vec<VideoComment>, u64)> {
        let inner = self.inner.read().await;

        let mut matching: Vec<&Comment> = inner
            .comments
            .values()
            .filter(|comment| comment.video_id == video_id)
            .collect();
        matching.sort_by(|a, b| newest_first(a, b));
        let total = matching.len() as u64;

        let window: Vec<Comment> = matching
            .into_iter()
            .skip(to_index(page.skip()))
            .take(to_index(page.limit()))
            .cloned()
            .collect();

        let owner_ids: HashSet<ObjectId> = window.iter().map(|comment| comment.owner_id).collect();
        let owners: HashMap<ObjectId, User> = owner_ids
            .into_iter()
            .filter_map(|id| inner.users.get(&id).map(|user| (id, user.clone())))
            .collect();

        Ok((attach_owners(window, &owners), total))
    }

    async fn insert_tweet(&self, tweet: &Tweet) -> Result<()> {
        self.inner
            .write()
            .await
            .tweets
            .insert(tweet.id, tweet.clone());
        Ok(())
    }

    async fn tweet_by_id(&self, tweet_id: ObjectId) -> Result<Option<Tweet>> {
        Ok(self.inner.read().await.tweets.get(&tweet_id).cloned())
    }

    async fn update_tweet_content(
        &self,
        tweet_id: ObjectId,
        content: &str,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Tweet>> {
        let mut inner = self.inner.write().await;
        let updated = inner.tweets.get_mut(&tweet_id).map(|tweet| {
            tweet.content = content.to_string();
            tweet.updated_at = updated_at;
            tweet.clone()
        });
        Ok(updated)
    }

    async fn delete_tweet(&self, tweet_id: ObjectId) -> Result<bool> {
        Ok(self.inner.write().await.tweets.remove(&tweet_id).is_some())
    }

    async fn user_tweets(&self, owner_id: ObjectId) -> Result<Vec<UserTweets>> {
        let inner = self.inner.read().await;

        let mut owned: Vec<&Tweet> = inner
            .tweets
            .values()
            .filter(|tweet| tweet.owner_id == owner_id)
            .collect();
        if owned.is_empty() {
            return Ok(Vec::new());
        }
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(vec![UserTweets {
            tweets: owned.into_iter().map(|tweet| tweet.content.clone()).collect(),
        }])
    }
}
