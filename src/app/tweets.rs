use anyhow::Result;
use mongodb::bson::oid::ObjectId;
use time::OffsetDateTime;

use crate::domain::tweet::{Tweet, UserTweets};
use crate::infra::store::SharedStore;

#[derive(Clone)]
pub struct TweetService {
    store: SharedStore,
}

impl TweetService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create_tweet(&self, owner_id: ObjectId, content: String) -> Result<Tweet> {
        let now = OffsetDateTime::now_utc();
        let tweet = Tweet {
            id: ObjectId::new(),
            owner_id,
            content,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_tweet(&tweet).await?;

        Ok(tweet)
    }

    pub async fn list_by_user(&self, owner_id: ObjectId) -> Result<Vec<UserTweets>> {
        self.store.user_tweets(owner_id).await
    }

    pub async fn get_tweet(&self, tweet_id: ObjectId) -> Result<Option<Tweet>> {
        self.store.tweet_by_id(tweet_id).await
    }

    pub async fn update_content(&self, tweet_id: ObjectId, content: &str) -> Result<Option<Tweet>> {
        self.store
            .update_tweet_content(tweet_id, content, OffsetDateTime::now_utc())
            .await
    }

    pub async fn delete_tweet(&self, tweet_id: ObjectId) -> Result<bool> {
        self.store.delete_tweet(tweet_id).await
    }
}
