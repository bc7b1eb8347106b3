use anyhow::Result;
use mongodb::bson::oid::ObjectId;

use crate::domain::user::User;
use crate::infra::store::SharedStore;

#[derive(Clone)]
pub struct UserService {
    store: SharedStore,
}

impl UserService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_user(&self, user_id: ObjectId) -> Result<Option<User>> {
        self.store.user_by_id(user_id).await
    }
}
