use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub login_token: String,
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 4096))]
    pub password: String,
    #[serde(default)]
    #[validate(must_match(other = "password"))]
    pub password_confirm: String,
    #[serde(default)]
    pub register_token: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub logout_token: String,
}
