use anyhow::Result;
use mongodb::bson::oid::ObjectId;
use time::OffsetDateTime;

use crate::domain::comment::{Comment, CommentPage};
use crate::domain::pagination::{page_meta, PageRequest};
use crate::infra::store::SharedStore;

#[derive(Clone)]
pub struct CommentService {
    store: SharedStore,
}

impl CommentService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_for_video(&self, video_id: ObjectId, page: PageRequest) -> Result<CommentPage> {
        let (comments, total) = self.store.video_comments(video_id, page).await?;

        Ok(CommentPage {
            comments,
            total_comments: total,
            meta: page_meta(page, total),
        })
    }

    pub async fn add_comment(
        &self,
        video_id: ObjectId,
        owner_id: ObjectId,
        content: String,
    ) -> Result<Comment> {
        let now = OffsetDateTime::now_utc();
        let comment = Comment {
            id: ObjectId::new(),
            video_id,
            owner_id,
            content,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_comment(&comment).await?;

        Ok(comment)
    }

    pub async fn get_comment(&self, comment_id: ObjectId) -> Result<Option<Comment>> {
        self.store.comment_by_id(comment_id).await
    }

    pub async fn update_content(
        &self,
        comment_id: ObjectId,
        content: &str,
    ) -> Result<Option<Comment>> {
        self.store
            .update_comment_content(comment_id, content, OffsetDateTime::now_utc())
            .await
    }

    pub async fn delete_comment(&self, comment_id: ObjectId) -> Result<bool> {
        self.store.delete_comment(comment_id).await
    }
}
