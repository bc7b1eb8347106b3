pub mod auth;
pub mod comments;
pub mod tweets;
pub mod users;
pub mod videos;
