pub mod comments;
pub mod posts;
pub mod sessions;
pub mod users;
