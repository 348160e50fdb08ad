use anyhow::Context;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use blake2::{Blake2s256, Digest};
use chrono::{NaiveDateTime, Utc};
use rand::Rng;

pub const TIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_str() -> String {
    format_time_str(&Utc::now().naive_utc())
}

pub fn format_time_str(time: &NaiveDateTime) -> String {
    time.format(TIME_FMT).to_string()
}

pub fn parse_time_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.as_ref(), TIME_FMT).context("malformed timestamp")
}

/// `2024-03-05 14:02:11` -> `March 5, 2024`
pub fn display_date<S: AsRef<str>>(s: S) -> String {
    match parse_time_str(&s) {
        Ok(time) => time.format("%B %-d, %Y").to_string(),
        Err(_) => s.as_ref().to_string(),
    }
}

pub fn generate_token() -> String {
    let seed: [u8; 32] = rand::thread_rng().gen();
    format!("{:x}", Blake2s256::digest(seed))
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(rand::thread_rng());
    let hashed = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("failed to hash password: {}", err))?;
    Ok(hashed.to_string())
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    match PasswordHash::new(hashed) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_str_round_trips_through_storage_format() {
        let stored = "2024-03-05 14:02:11";
        let parsed = parse_time_str(stored).unwrap();
        assert_eq!(format_time_str(&parsed), stored);
        assert!(parse_time_str("yesterday").is_err());
    }

    #[test]
    fn display_date_falls_back_to_raw_value() {
        assert_eq!(display_date("2024-03-05 14:02:11"), "March 5, 2024");
        assert_eq!(display_date("soon"), "soon");
    }

    #[test]
    fn tokens_are_unique_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hashed));
        assert!(!verify_password("battery staple", &hashed));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }

    #[test]
    fn constant_time_eq_compares_content_and_length() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
