use super::Session;
use crate::{
    error::{AppError, Result},
    utils::{constant_time_eq, generate_token},
};

const KEY_PREFIX: &str = "_csrf/";

fn key(id: &str) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

/// Returns the token for `id`, creating one on first use.
pub fn token(session: &Session, id: &str) -> Result<String> {
    if let Some(token) = session.get::<String>(&key(id))? {
        return Ok(token);
    }

    let token = generate_token();
    session.insert(key(id), &token)?;
    Ok(token)
}

pub fn is_valid(session: &Session, id: &str, value: &str) -> bool {
    match session.get::<String>(&key(id)) {
        Ok(Some(token)) => !value.is_empty() && constant_time_eq(token.as_bytes(), value.as_bytes()),
        _ => false,
    }
}

pub fn verify(session: &Session, id: &str, value: &str) -> Result<()> {
    if is_valid(session, id, value) {
        Ok(())
    } else {
        tracing::warn!(token_id = id, "rejected request with invalid CSRF token");
        Err(AppError::InvalidCsrfToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn token_is_stable_per_id() {
        let session = Session::load(None, HashMap::new());
        let first = token(&session, "comment_token").unwrap();
        let again = token(&session, "comment_token").unwrap();
        let other = token(&session, "contact_token").unwrap();
        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn only_the_issued_token_verifies() {
        let session = Session::load(None, HashMap::new());
        let issued = token(&session, "post_token").unwrap();

        assert!(verify(&session, "post_token", &issued).is_ok());
        assert!(matches!(
            verify(&session, "post_token", "forged"),
            Err(AppError::InvalidCsrfToken)
        ));
        assert!(!is_valid(&session, "post_token", ""));
        assert!(!is_valid(&session, "user_token", &issued));
    }

    #[test]
    fn nothing_verifies_without_a_session_token() {
        let session = Session::load(None, HashMap::new());
        assert!(!is_valid(&session, "login_token", ""));
        assert!(!is_valid(&session, "login_token", "anything"));
    }
}
