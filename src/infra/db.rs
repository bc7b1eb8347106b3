use anyhow::{anyhow, Result};
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, from_document, DateTime, Document};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, FindOneOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

use crate::config::AppConfig;
use crate::domain::comment::{Comment, VideoComment};
use crate::domain::pagination::PageRequest;
use crate::domain::tweet::{Tweet, UserTweets};
use crate::domain::user::User;
use crate::infra::store::Store;

const COMMENTS: &str = "comments";
const TWEETS: &str = "tweets";
const USERS: &str = "users";
const VIDEOS: &str = "videos";

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let uri = config
            .mongodb_uri
            .as_deref()
            .ok_or_else(|| anyhow!("missing required env var: MONGODB_URI"))?;

        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some("tubetalk".to_string());
        options.max_pool_size = Some(config.db_max_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.db_connect_timeout_seconds));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.db_connect_timeout_seconds));

        let client = Client::with_options(options)?;
        let store = Self {
            db: client.database(&config.mongodb_database),
        };
        store.ping().await?;
        Ok(store)
    }

    fn comments(&self) -> Collection<CommentDocument> {
        self.db.collection(COMMENTS)
    }

    fn tweets(&self) -> Collection<TweetDocument> {
        self.db.collection(TWEETS)
    }
}

#[axum::async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn user_by_id(&self, user_id: ObjectId) -> Result<Option<User>> {
        let options = FindOneOptions::builder()
            .projection(doc! { "_id": 1, "username": 1, "avatar": 1 })
            .build();
        let user = self
            .db
            .collection::<UserDocument>(USERS)
            .find_one(doc! { "_id": user_id }, options)
            .await?;

        Ok(user.map(User::from))
    }

    async fn video_exists(&self, video_id: ObjectId) -> Result<bool> {
        let options = FindOneOptions::builder()
            .projection(doc! { "_id": 1 })
            .build();
        let video = self
            .db
            .collection::<Document>(VIDEOS)
            .find_one(doc! { "_id": video_id }, options)
            .await?;

        Ok(video.is_some())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.comments()
            .insert_one(CommentDocument::from(comment), None)
            .await?;
        Ok(())
    }

    async fn comment_by_id(&self, comment_id: ObjectId) -> Result<Option<Comment>> {
        let comment = self
            .comments()
            .find_one(doc! { "_id": comment_id }, None)
            .await?;

        comment.map(Comment::try_from).transpose()
    }

    async fn update_comment_content(
        &self,
        comment_id: ObjectId,
        content: &str,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Comment>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let comment = self
            .comments()
            .find_one_and_update(
                doc! { "_id": comment_id },
                doc! { "$set": { "content": content, "updatedAt": to_bson_datetime(updated_at) } },
                options,
            )
            .await?;

        comment.map(Comment::try_from).transpose()
    }

    async fn delete_comment(&self, comment_id: ObjectId) -> Result<bool> {
        let result = self
            .comments()
            .delete_one(doc! { "_id": comment_id }, None)
            .await?;

        Ok(result.deleted_count > 0)
    }

    async fn video_comments(
        &self,
        video_id: ObjectId,
        page: PageRequest,
    ) -> Result<(Vec<VideoComment>, u64)> {
        let mut cursor = self
            .comments()
            .aggregate(video_comments_pipeline(video_id, page), None)
            .await?;

        let Some(facet) = cursor.try_next().await? else {
            return Ok((Vec::new(), 0));
        };
        let facet: CommentFacet = from_document(facet)?;

        let total = facet.total.first().map_or(0, |count| count.count.max(0) as u64);
        let comments = facet
            .comments
            .into_iter()
            .map(VideoComment::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((comments, total))
    }

    async fn insert_tweet(&self, tweet: &Tweet) -> Result<()> {
        self.tweets()
            .insert_one(TweetDocument::from(tweet), None)
            .await?;
        Ok(())
    }

    async fn tweet_by_id(&self, tweet_id: ObjectId) -> Result<Option<Tweet>> {
        let tweet = self.tweets().find_one(doc! { "_id": tweet_id }, None).await?;

        tweet.map(Tweet::try_from).transpose()
    }

    async fn update_tweet_content(
        &self,
        tweet_id: ObjectId,
        content: &str,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Tweet>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let tweet = self
            .tweets()
            .find_one_and_update(
                doc! { "_id": tweet_id },
                doc! { "$set": { "content": content, "updatedAt": to_bson_datetime(updated_at) } },
                options,
            )
            .await?;

        tweet.map(Tweet::try_from).transpose()
    }

    async fn delete_tweet(&self, tweet_id: ObjectId) -> Result<bool> {
        let result = self
            .tweets()
            .delete_one(doc! { "_id": tweet_id }, None)
            .await?;

        Ok(result.deleted_count > 0)
    }

    async fn user_tweets(&self, owner_id: ObjectId) -> Result<Vec<UserTweets>> {
        let groups: Vec<Document> = self
            .tweets()
            .aggregate(user_tweets_pipeline(owner_id), None)
            .await?
            .try_collect()
            .await?;

        let mut tweets = Vec::with_capacity(groups.len());
        for group in groups {
            tweets.push(from_document(group)?);
        }

        Ok(tweets)
    }
}

/// Match the video's comments, join the owner summary from `users`, collapse
/// the joined array to a single value, sort newest first, then split into the
/// requested window and the total count.
pub(crate) fn video_comments_pipeline(video_id: ObjectId, page: PageRequest) -> Vec<Document> {
    let skip = i64::try_from(page.skip()).unwrap_or(i64::MAX);
    let limit = i64::try_from(page.limit()).unwrap_or(i64::MAX);

    vec![
        doc! { "$match": { "video": video_id } },
        doc! {
            "$lookup": {
                "from": USERS,
                "localField": "owner",
                "foreignField": "_id",
                "as": "owner",
                "pipeline": [
                    { "$project": { "_id": 1, "username": 1, "avatar": "$avatar.url" } },
                ],
            }
        },
        doc! { "$addFields": { "owner": { "$first": "$owner" } } },
        doc! { "$sort": { "createdAt": -1, "_id": -1 } },
        doc! {
            "$facet": {
                "comments": [ { "$skip": skip }, { "$limit": limit } ],
                "total": [ { "$count": "count" } ],
            }
        },
    ]
}

pub(crate) fn user_tweets_pipeline(owner_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "owner": owner_id } },
        doc! { "$sort": { "createdAt": 1, "_id": 1 } },
        doc! { "$group": { "_id": "$owner", "tweets": { "$push": "$content" } } },
        doc! { "$project": { "_id": 0, "tweets": 1 } },
    ]
}

fn to_bson_datetime(value: OffsetDateTime) -> DateTime {
    DateTime::from_millis((value.unix_timestamp_nanos() / 1_000_000) as i64)
}

fn from_bson_datetime(value: DateTime) -> Result<OffsetDateTime> {
    let nanos = i128::from(value.timestamp_millis()) * 1_000_000;
    Ok(OffsetDateTime::from_unix_timestamp_nanos(nanos)?)
}

#[derive(Debug, Serialize, Deserialize)]
struct CommentDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    video: ObjectId,
    owner: ObjectId,
    content: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime,
}

impl From<&Comment> for CommentDocument {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            video: comment.video_id,
            owner: comment.owner_id,
            content: comment.content.clone(),
            created_at: to_bson_datetime(comment.created_at),
            updated_at: to_bson_datetime(comment.updated_at),
        }
    }
}

impl TryFrom<CommentDocument> for Comment {
    type Error = anyhow::Error;

    fn try_from(document: CommentDocument) -> Result<Self> {
        Ok(Self {
            id: document.id,
            video_id: document.video,
            owner_id: document.owner,
            content: document.content,
            created_at: from_bson_datetime(document.created_at)?,
            updated_at: from_bson_datetime(document.updated_at)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CommentFacet {
    comments: Vec<VideoCommentDocument>,
    total: Vec<FacetCount>,
}

#[derive(Debug, Deserialize)]
struct FacetCount {
    count: i64,
}

#[derive(Debug, Deserialize)]
struct VideoCommentDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    video: ObjectId,
    content: String,
    #[serde(default)]
    owner: Option<OwnerDocument>,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime,
}

#[derive(Debug, Deserialize)]
struct OwnerDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    username: String,
    #[serde(default)]
    avatar: Option<String>,
}

impl TryFrom<VideoCommentDocument> for VideoComment {
    type Error = anyhow::Error;

    fn try_from(document: VideoCommentDocument) -> Result<Self> {
        Ok(Self {
            id: document.id,
            video_id: document.video,
            content: document.content,
            owner: document.owner.map(|owner| User {
                id: owner.id,
                username: owner.username,
                avatar_url: owner.avatar,
            }),
            created_at: from_bson_datetime(document.created_at)?,
            updated_at: from_bson_datetime(document.updated_at)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    username: String,
    #[serde(default)]
    avatar: Option<AvatarDocument>,
}

#[derive(Debug, Deserialize)]
struct AvatarDocument {
    url: Option<String>,
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        Self {
            id: document.id,
            username: document.username,
            avatar_url: document.avatar.and_then(|avatar| avatar.url),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TweetDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    owner: ObjectId,
    content: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime,
}

impl From<&Tweet> for TweetDocument {
    fn from(tweet: &Tweet) -> Self {
        Self {
            id: tweet.id,
            owner: tweet.owner_id,
            content: tweet.content.clone(),
            created_at: to_bson_datetime(tweet.created_at),
            updated_at: to_bson_datetime(tweet.updated_at),
        }
    }
}

impl TryFrom<TweetDocument> for Tweet {
    type Error = anyhow::Error;

    fn try_from(document: TweetDocument) -> Result<Self> {
        Ok(Self {
            id: document.id,
            owner_id: document.owner,
            content: document.content,
            created_at: from_bson_datetime(document.created_at)?,
            updated_at: from_bson_datetime(document.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_pipeline_windows_after_sorting() {
        let video_id = ObjectId::new();
        let page = PageRequest::new(3, 20).unwrap();
        let pipeline = video_comments_pipeline(video_id, page);

        let stages: Vec<&str> = pipeline
            .iter()
            .map(|stage| stage.keys().next().map(String::as_str).unwrap_or(""))
            .collect();
        assert_eq!(stages, ["$match", "$lookup", "$addFields", "$sort", "$facet"]);

        assert_eq!(
            pipeline[0].get_document("$match").unwrap().get_object_id("video").unwrap(),
            video_id
        );
        let sort = pipeline[3].get_document("$sort").unwrap();
        assert_eq!(sort.get_i32("createdAt").unwrap(), -1);

        let window = pipeline[4]
            .get_document("$facet")
            .unwrap()
            .get_array("comments")
            .unwrap();
        let skip = window[0].as_document().unwrap().get_i64("$skip").unwrap();
        let limit = window[1].as_document().unwrap().get_i64("$limit").unwrap();
        assert_eq!((skip, limit), (40, 20));
    }

    #[test]
    fn tweets_pipeline_groups_contents() {
        let owner = ObjectId::new();
        let pipeline = user_tweets_pipeline(owner);
        let group = pipeline[2].get_document("$group").unwrap();
        assert_eq!(
            group.get_document("tweets").unwrap().get_str("$push").unwrap(),
            "$content"
        );
    }

    #[test]
    fn datetime_conversion_keeps_millisecond_precision() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
            + time::Duration::milliseconds(123);
        let round = from_bson_datetime(to_bson_datetime(now)).unwrap();
        assert_eq!(round, now);
    }
}
