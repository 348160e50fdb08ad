use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
pub struct PostRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 500))]
    pub lede: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub post_token: String,
}

#[derive(Deserialize)]
pub struct PostTokenRequest {
    #[serde(default)]
    pub post_token: String,
}

#[derive(Deserialize)]
pub struct ModerationRequest {
    #[serde(default)]
    pub comment_moderation_token: String,
}

#[derive(Deserialize)]
pub struct UserRoleRequest {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub user_token: String,
}

#[derive(Deserialize)]
pub struct UserTokenRequest {
    #[serde(default)]
    pub user_token: String,
}
