use anyhow::Result;
use mongodb::bson::oid::ObjectId;

use crate::infra::store::SharedStore;

#[derive(Clone)]
pub struct VideoService {
    store: SharedStore,
}

impl VideoService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn exists(&self, video_id: ObjectId) -> Result<bool> {
        self.store.video_exists(video_id).await
    }
}
