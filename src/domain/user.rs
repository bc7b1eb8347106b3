use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::Serialize;

/// The slice of a user document this service reads: enough to check that the
/// user exists and to denormalize it onto comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub username: String,
    #[serde(rename = "avatar")]
    pub avatar_url: Option<String>,
}
