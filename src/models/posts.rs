use crate::schema::posts;
use diesel::prelude::*;
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub lede: String,
    pub content: String,
    pub author: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Insertable, Validate, Debug)]
#[diesel(table_name = posts)]
pub struct NewPost {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 500))]
    pub lede: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub author: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(AsChangeset, Validate, Debug)]
#[diesel(table_name = posts)]
pub struct UpdatePost {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 500))]
    pub lede: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub updated_at: String,
}

/// A post together with its author's username, as shown on public pages.
#[derive(Clone, Debug)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author_name: String,
}
