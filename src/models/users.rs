use crate::schema::users;
use diesel::prelude::*;
use validator::{Validate, ValidationError};

pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

#[derive(Queryable, Selectable, Identifiable, Clone, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[derive(Insertable, Validate, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
    pub created_at: String,
}

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    match role {
        ROLE_USER | ROLE_ADMIN => Ok(()),
        _ => Err(ValidationError::new("role")),
    }
}
