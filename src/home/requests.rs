use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
pub struct ContactRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 150))]
    pub subject: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
    #[serde(default)]
    pub contact_token: String,
}
