use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
pub struct CommentRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    #[serde(default)]
    pub comment_token: String,
}
