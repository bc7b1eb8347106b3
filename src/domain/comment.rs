use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::pagination::PageMeta;
use crate::domain::user::User;

pub const MAX_COMMENT_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(rename = "video", serialize_with = "serialize_object_id_as_hex_string")]
    pub video_id: ObjectId,
    #[serde(rename = "owner", serialize_with = "serialize_object_id_as_hex_string")]
    pub owner_id: ObjectId,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A comment as listed under a video, with its owner collapsed to a summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoComment {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(rename = "video", serialize_with = "serialize_object_id_as_hex_string")]
    pub video_id: ObjectId,
    pub content: String,
    pub owner: Option<User>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<VideoComment>,
    pub total_comments: u64,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Joins each comment with its owner's summary. Comments whose owner is no
/// longer present keep `owner: None`; order is preserved.
pub fn attach_owners(comments: Vec<Comment>, owners: &HashMap<ObjectId, User>) -> Vec<VideoComment> {
    comments
        .into_iter()
        .map(|comment| VideoComment {
            owner: owners.get(&comment.owner_id).cloned(),
            id: comment.id,
            video_id: comment.video_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        })
        .collect()
}
