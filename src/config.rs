use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub database_url: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Idle lifetime of a session before it is discarded.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,

    #[serde(default)]
    pub cookie_secure: bool,

    /// Empty means mail is logged instead of sent.
    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    #[serde(default = "default_contact_recipient")]
    pub contact_recipient: String,

    #[serde(default)]
    pub admin_username: Option<String>,

    #[serde(default)]
    pub admin_email: Option<String>,

    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_max_connections() -> u32 {
    8
}

fn default_session_ttl_secs() -> i64 {
    3600
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "Portfolio <no-reply@localhost>".to_string()
}

fn default_contact_recipient() -> String {
    "owner@localhost".to_string()
}

impl Settings {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Settings>()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Admin account to seed at startup, when fully configured.
    pub fn admin_seed(&self) -> Option<(&str, &str, &str)> {
        match (&self.admin_username, &self.admin_email, &self.admin_password) {
            (Some(username), Some(email), Some(password)) => {
                Some((username.as_str(), email.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_defaults_for_missing_keys() {
        let vars = vec![("DATABASE_URL".to_string(), "blog.db".to_string())];
        let settings: Settings = envy::from_iter(vars).unwrap();
        assert_eq!(settings.bind_addr(), "127.0.0.1:8080");
        assert_eq!(settings.session_ttl_secs, 3600);
        assert!(settings.smtp_host.is_empty());
        assert!(settings.admin_seed().is_none());
    }

    #[test]
    fn admin_seed_requires_all_three_keys() {
        let vars = vec![
            ("DATABASE_URL".to_string(), "blog.db".to_string()),
            ("ADMIN_USERNAME".to_string(), "admin".to_string()),
            ("ADMIN_EMAIL".to_string(), "admin@example.com".to_string()),
            ("ADMIN_PASSWORD".to_string(), "s3cret-pass".to_string()),
            ("PORT".to_string(), "9000".to_string()),
        ];
        let settings: Settings = envy::from_iter(vars).unwrap();
        assert_eq!(
            settings.admin_seed(),
            Some(("admin", "admin@example.com", "s3cret-pass"))
        );
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn database_url_is_required() {
        let vars: Vec<(String, String)> = Vec::new();
        assert!(envy::from_iter::<_, Settings>(vars).is_err());
    }
}
