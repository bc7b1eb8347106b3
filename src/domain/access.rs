use mongodb::bson::oid::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Only the owner of a comment or tweet may change or remove it.
pub fn authorize_owner(actor_id: ObjectId, owner_id: ObjectId) -> Access {
    if actor_id == owner_id {
        Access::Allow
    } else {
        Access::Deny
    }
}
