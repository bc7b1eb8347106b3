pub mod access;
pub mod comment;
pub mod pagination;
pub mod tweet;
pub mod user;
